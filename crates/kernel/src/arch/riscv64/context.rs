//! Trap frames and kernel context switching.
//!
//! `TrapFrame` is the full register capture built by `trap_entry` (see
//! trap.S) on every entry to supervisor mode: syscalls, timer ticks, external
//! interrupts, and exceptions all land here. `sscratch` holds the current
//! task's kernel-stack pointer while it runs in user mode (zero while the
//! hart is already in supervisor mode); the entry stub carves the frame out
//! of that stack, and the matching exit stub restores from it and `sret`s.
//!
//! Each task owns its kernel stack for the lifetime of the task, so a
//! syscall that blocks (a locked mutex, an empty pipe, `sleep`) can call
//! straight into `scheduler::schedule()`, which performs a real
//! callee-saved-register context switch (`cpu_context_switch`, below) onto a
//! different task's kernel stack. When this task is rescheduled later,
//! `schedule()` simply returns to its caller on this same stack, and the
//! syscall handler continues exactly where it left off.

use core::fmt;

/// Register capture taken on every trap. Field order and offsets are fixed
/// by trap.S and must not change without updating it in lockstep.
/// Size in bytes of `TrapFrame` as laid out on the stack by trap.S. Kept in
/// sync with `.equ FRAME_SIZE, 35*8` there.
pub const TRAP_FRAME_SIZE: u64 = 35 * 8;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TrapFrame {
    pub ra: u64,
    pub sp: u64,
    pub gp: u64,
    pub tp: u64,
    pub t0: u64,
    pub t1: u64,
    pub t2: u64,
    pub s0: u64,
    pub s1: u64,
    pub a0: u64,
    pub a1: u64,
    pub a2: u64,
    pub a3: u64,
    pub a4: u64,
    pub a5: u64,
    pub a6: u64,
    pub a7: u64,
    pub s2: u64,
    pub s3: u64,
    pub s4: u64,
    pub s5: u64,
    pub s6: u64,
    pub s7: u64,
    pub s8: u64,
    pub s9: u64,
    pub s10: u64,
    pub s11: u64,
    pub t3: u64,
    pub t4: u64,
    pub t5: u64,
    pub t6: u64,
    pub sepc: u64,
    pub sstatus: u64,
    pub scause: u64,
    pub stval: u64,
}

/// sstatus.SPP: 1 if the trap came from supervisor mode, 0 from user mode.
const SSTATUS_SPP: u64 = 1 << 8;
/// sstatus.SPIE: interrupt-enable state to restore into sstatus.SIE on sret.
const SSTATUS_SPIE: u64 = 1 << 5;
const SSTATUS_SIE: u64 = 1 << 1;

impl TrapFrame {
    pub const fn zeroed() -> Self {
        Self {
            ra: 0, sp: 0, gp: 0, tp: 0,
            t0: 0, t1: 0, t2: 0,
            s0: 0, s1: 0,
            a0: 0, a1: 0, a2: 0, a3: 0, a4: 0, a5: 0, a6: 0, a7: 0,
            s2: 0, s3: 0, s4: 0, s5: 0, s6: 0, s7: 0, s8: 0, s9: 0, s10: 0, s11: 0,
            t3: 0, t4: 0, t5: 0, t6: 0,
            sepc: 0, sstatus: 0, scause: 0, stval: 0,
        }
    }

    /// Frame a brand new user task resumes into: entry point in `sepc`,
    /// `sp` set to the top of its user stack, SPP=0 (return to user mode)
    /// with interrupts enabled after the sret.
    pub fn new_user(entry: u64, user_sp: u64) -> Self {
        let mut tf = Self::zeroed();
        tf.sepc = entry;
        tf.sp = user_sp;
        tf.sstatus = SSTATUS_SPIE;
        tf
    }

    pub fn from_user(&self) -> bool {
        self.sstatus & SSTATUS_SPP == 0
    }

    /// Syscall number, per the a7 register convention.
    pub fn syscall_number(&self) -> u64 {
        self.a7
    }

    pub fn syscall_arg(&self, index: usize) -> u64 {
        match index {
            0 => self.a0,
            1 => self.a1,
            2 => self.a2,
            3 => self.a3,
            4 => self.a4,
            5 => self.a5,
            _ => 0,
        }
    }

    pub fn set_return(&mut self, value: i64) {
        self.a0 = value as u64;
    }

    /// Step past the `ecall` that caused this trap, so resuming doesn't
    /// re-execute it. Called once a syscall has fully run to completion
    /// (including any blocking it did internally via `schedule()`).
    /// `execve` is the one exception: a successful exec overwrites the
    /// frame wholesale and must not call this.
    pub fn advance_past_ecall(&mut self) {
        self.sepc = self.sepc.wrapping_add(4);
    }
}

impl Default for TrapFrame {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl fmt::Display for TrapFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sepc={:#018x} sstatus={:#018x} scause={:#018x} stval={:#018x} sp={:#018x} a0={:#018x} a7={:#018x}",
            self.sepc, self.sstatus, self.scause, self.stval, self.sp, self.a0, self.a7
        )
    }
}

/// Callee-saved registers for switching between kernel-mode execution
/// contexts: one per task (so `schedule()` can suspend and resume its call
/// chain) plus one for the scheduler's own idle loop.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CpuContext {
    pub ra: u64,
    pub sp: u64,
    pub s0: u64,
    pub s1: u64,
    pub s2: u64,
    pub s3: u64,
    pub s4: u64,
    pub s5: u64,
    pub s6: u64,
    pub s7: u64,
    pub s8: u64,
    pub s9: u64,
    pub s10: u64,
    pub s11: u64,
}

impl CpuContext {
    pub const fn new() -> Self {
        Self {
            ra: 0, sp: 0,
            s0: 0, s1: 0, s2: 0, s3: 0, s4: 0, s5: 0,
            s6: 0, s7: 0, s8: 0, s9: 0, s10: 0, s11: 0,
        }
    }

    /// Context for a task that has never been scheduled before. `ret` in
    /// `cpu_context_switch` lands on `trap_return` (trap.S) with `sp` pointing
    /// at a `TrapFrame` already built at `frame_addr`, so the first schedule
    /// of this task falls straight into the normal trap-return path instead
    /// of resuming a call stack that never existed.
    pub fn first_run(frame_addr: u64) -> Self {
        let mut ctx = Self::new();
        ctx.ra = trap_return as u64;
        ctx.sp = frame_addr;
        ctx
    }
}

impl Default for CpuContext {
    fn default() -> Self {
        Self::new()
    }
}

unsafe extern "C" {
    /// Save the caller's callee-saved registers into `*from`, load them from
    /// `*to`, and return into whatever `to.ra` points at. Defined in switch.S.
    pub fn cpu_context_switch(from: *mut CpuContext, to: *const CpuContext);

    /// Trap-return tail in trap.S, exposed as a jump target for a task's
    /// first-ever context switch. See `CpuContext::first_run`.
    fn trap_return();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_frame_targets_entry_and_stack() {
        let tf = TrapFrame::new_user(0x1000, 0x8000_0000);
        assert_eq!(tf.sepc, 0x1000);
        assert_eq!(tf.sp, 0x8000_0000);
        assert!(tf.from_user());
    }

    #[test]
    fn advance_past_ecall_adds_four() {
        let mut tf = TrapFrame::zeroed();
        tf.sepc = 0x2000;
        tf.advance_past_ecall();
        assert_eq!(tf.sepc, 0x2004);
    }

    #[test]
    fn syscall_args_read_a0_through_a5() {
        let mut tf = TrapFrame::zeroed();
        tf.a0 = 10;
        tf.a1 = 11;
        tf.a5 = 15;
        assert_eq!(tf.syscall_arg(0), 10);
        assert_eq!(tf.syscall_arg(1), 11);
        assert_eq!(tf.syscall_arg(5), 15);
        assert_eq!(tf.syscall_arg(6), 0);
    }
}
