//! Per-process pending signals, dispositions, and delivery at trap return.

use crate::lib::error::{Errno, Result};
use core::sync::atomic::{AtomicU64, Ordering};

pub type Pid = u32;

/// Fixed user-space address the signal trampoline is mapped at (one page
/// below the top of the user stack region, alongside the stack itself so
/// every process has it regardless of where its text segment lands).
/// `execve`'s address-space setup is responsible for actually mapping a
/// trampoline (`li a7, SYS_SIGRETURN; ecall`) there.
pub const SIGNAL_TRAMPOLINE_VA: u64 = crate::mm::USER_STACK_TOP;

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    SIGHUP = 1,
    SIGINT = 2,
    SIGQUIT = 3,
    SIGILL = 4,
    SIGTRAP = 5,
    SIGABRT = 6,
    SIGBUS = 7,
    SIGFPE = 8,
    SIGKILL = 9,
    SIGUSR1 = 10,
    SIGSEGV = 11,
    SIGUSR2 = 12,
    SIGPIPE = 13,
    SIGALRM = 14,
    SIGTERM = 15,
    SIGCHLD = 17,
    SIGCONT = 18,
    SIGSTOP = 19,
    SIGTSTP = 20,
    SIGTTIN = 21,
    SIGTTOU = 22,
}

impl Signal {
    pub fn from_u32(signo: u32) -> Option<Self> {
        match signo {
            1 => Some(Signal::SIGHUP),
            2 => Some(Signal::SIGINT),
            3 => Some(Signal::SIGQUIT),
            4 => Some(Signal::SIGILL),
            5 => Some(Signal::SIGTRAP),
            6 => Some(Signal::SIGABRT),
            7 => Some(Signal::SIGBUS),
            8 => Some(Signal::SIGFPE),
            9 => Some(Signal::SIGKILL),
            10 => Some(Signal::SIGUSR1),
            11 => Some(Signal::SIGSEGV),
            12 => Some(Signal::SIGUSR2),
            13 => Some(Signal::SIGPIPE),
            14 => Some(Signal::SIGALRM),
            15 => Some(Signal::SIGTERM),
            17 => Some(Signal::SIGCHLD),
            18 => Some(Signal::SIGCONT),
            19 => Some(Signal::SIGSTOP),
            20 => Some(Signal::SIGTSTP),
            21 => Some(Signal::SIGTTIN),
            22 => Some(Signal::SIGTTOU),
            _ => None,
        }
    }

    pub fn to_u32(self) -> u32 {
        self as u32
    }

    pub fn is_catchable(self) -> bool {
        !matches!(self, Signal::SIGKILL | Signal::SIGSTOP)
    }

    /// Terminate: HUP, INT, QUIT, ILL, ABRT, BUS, FPE, KILL, USR1, SEGV,
    /// USR2, PIPE, ALRM, TERM. Stop: STOP, TSTP, TTIN, TTOU. Continue: CONT.
    /// Ignore: CHLD.
    pub fn default_action(self) -> SignalAction {
        match self {
            Signal::SIGSTOP | Signal::SIGTSTP | Signal::SIGTTIN | Signal::SIGTTOU => {
                SignalAction::Stop
            }
            Signal::SIGCONT => SignalAction::Continue,
            Signal::SIGCHLD => SignalAction::Ignore,
            _ => SignalAction::Terminate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalAction {
    Ignore,
    Terminate,
    Stop,
    Continue,
    Handler(u64),
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct SigAction {
    pub sa_handler: u64,
    pub sa_mask: u64,
    pub sa_flags: i32,
    pub sa_restorer: u64,
}

impl Default for SigAction {
    fn default() -> Self {
        Self { sa_handler: 0, sa_mask: 0, sa_flags: 0, sa_restorer: 0 }
    }
}

/// Per-process pending/blocked bitmasks, NSIG dispositions, and the saved
/// trap frame `sigreturn` restores from.
pub struct SignalQueue {
    pending: AtomicU64,
    blocked: AtomicU64,
    handlers: [SignalAction; 32],
    saved_frame: Option<crate::arch::TrapFrame>,
}

impl SignalQueue {
    pub fn new() -> Self {
        Self {
            pending: AtomicU64::new(0),
            blocked: AtomicU64::new(0),
            handlers: [SignalAction::Terminate; 32],
            saved_frame: None,
        }
    }

    pub fn add_signal(&self, sig: Signal) {
        let bit = 1u64 << (sig.to_u32() - 1);
        self.pending.fetch_or(bit, Ordering::SeqCst);
    }

    pub fn remove_signal(&self, sig: Signal) {
        let bit = 1u64 << (sig.to_u32() - 1);
        self.pending.fetch_and(!bit, Ordering::SeqCst);
    }

    pub fn is_pending(&self, sig: Signal) -> bool {
        let bit = 1u64 << (sig.to_u32() - 1);
        (self.pending.load(Ordering::SeqCst) & bit) != 0
    }

    /// Lowest-numbered deliverable signal: pending and not blocked.
    pub fn next_pending(&self) -> Option<Signal> {
        let pending = self.pending.load(Ordering::SeqCst);
        let blocked = self.blocked.load(Ordering::SeqCst);
        let deliverable = pending & !blocked;
        if deliverable == 0 {
            return None;
        }
        let signo = deliverable.trailing_zeros() + 1;
        Signal::from_u32(signo)
    }

    pub fn block(&self, sig: Signal) {
        let bit = 1u64 << (sig.to_u32() - 1);
        self.blocked.fetch_or(bit, Ordering::SeqCst);
    }

    pub fn unblock(&self, sig: Signal) {
        let bit = 1u64 << (sig.to_u32() - 1);
        self.blocked.fetch_and(!bit, Ordering::SeqCst);
    }

    pub fn set_handler(&mut self, sig: Signal, action: SignalAction) {
        let idx = (sig.to_u32() - 1) as usize;
        if idx < 32 {
            self.handlers[idx] = action;
        }
    }

    pub fn get_handler(&self, sig: Signal) -> SignalAction {
        let idx = (sig.to_u32() - 1) as usize;
        self.handlers.get(idx).copied().unwrap_or(SignalAction::Terminate)
    }

    pub fn clear_all(&self) {
        self.pending.store(0, Ordering::SeqCst);
    }

    fn save_frame(&mut self, frame: crate::arch::TrapFrame) {
        self.saved_frame = Some(frame);
    }

    fn take_saved_frame(&mut self) -> Option<crate::arch::TrapFrame> {
        self.saved_frame.take()
    }
}

impl Clone for SignalQueue {
    fn clone(&self) -> Self {
        Self {
            pending: AtomicU64::new(self.pending.load(Ordering::SeqCst)),
            blocked: AtomicU64::new(self.blocked.load(Ordering::SeqCst)),
            handlers: self.handlers,
            saved_frame: self.saved_frame,
        }
    }
}

impl Default for SignalQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Mark `sig` pending on `pid`. Wakes it if it was sleeping so the signal
/// gets a chance to be checked at the next trap return.
pub fn send_signal(pid: Pid, sig: Signal) -> Result<()> {
    let should_wake = {
        let mut table = crate::process::get_process_table();
        let tbl = table.as_mut().ok_or(Errno::ESRCH)?;
        let task = tbl.get_mut(pid).ok_or(Errno::ESRCH)?;
        task.signals.add_signal(sig);
        task.state == crate::process::ProcessState::Sleeping
    };
    if should_wake {
        crate::process::wake_pid(pid);
    }
    Ok(())
}

/// Called on every trap return to user mode. Delivers at most one signal:
/// ignore / terminate / stop / continue, or rewrite the trap frame to enter
/// a user handler. Returns `true` if delivery left the process `Stopped`
/// (the caller must reschedule instead of returning to user mode).
pub fn deliver_signals() -> bool {
    let pid = crate::process::current_pid();
    let mut table = crate::process::get_process_table();
    let Some(tbl) = table.as_mut() else { return false };
    let Some(task) = tbl.get_mut(pid) else { return false };

    let Some(sig) = task.signals.next_pending() else { return false };
    task.signals.remove_signal(sig);

    let action = task.signals.get_handler(sig);
    match action {
        SignalAction::Ignore => false,
        SignalAction::Terminate => {
            crate::info!("process {} terminated by signal {:?}", pid, sig);
            task.exit_code = 128 + sig.to_u32() as i32;
            task.state = crate::process::ProcessState::Zombie;
            let ppid = task.ppid;
            drop(table);
            if ppid != 0 {
                let _ = send_signal(ppid, Signal::SIGCHLD);
            }
            false
        }
        SignalAction::Stop => {
            task.state = crate::process::ProcessState::Stopped;
            true
        }
        SignalAction::Continue => {
            if task.state == crate::process::ProcessState::Stopped {
                task.state = crate::process::ProcessState::Ready;
            }
            false
        }
        SignalAction::Handler(handler_addr) => {
            let saved = task.trap_frame;
            task.signals.save_frame(saved);

            let frame_size = core::mem::size_of::<crate::arch::TrapFrame>() as u64;
            let new_sp = (saved.sp.saturating_sub(frame_size)) & !0xf;

            match crate::syscall::uaccess::copy_to_user(
                new_sp as *mut crate::arch::TrapFrame,
                core::slice::from_ref(&saved),
            ) {
                Ok(()) => {
                    task.trap_frame.sp = new_sp;
                    task.trap_frame.sepc = handler_addr;
                    task.trap_frame.a0 = sig.to_u32() as u64;
                    task.trap_frame.ra = SIGNAL_TRAMPOLINE_VA;
                }
                Err(_) => {
                    // Couldn't write the signal frame to the user stack;
                    // the handler is unreachable so the default action wins.
                    task.exit_code = 128 + sig.to_u32() as i32;
                    task.state = crate::process::ProcessState::Zombie;
                }
            }
            false
        }
    }
}

/// `sigreturn`: pop the handler activation and resume exactly where the
/// signal interrupted the process.
pub fn do_sigreturn(pid: Pid) -> Result<()> {
    let mut table = crate::process::get_process_table();
    let tbl = table.as_mut().ok_or(Errno::ESRCH)?;
    let task = tbl.get_mut(pid).ok_or(Errno::ESRCH)?;
    let saved = task.signals.take_saved_frame().ok_or(Errno::EINVAL)?;
    task.trap_frame = saved;
    Ok(())
}

pub const SIG_DFL: u64 = 0;
pub const SIG_IGN: u64 = 1;

pub const SA_RESTART: i32 = 0x10000000;
pub const SA_SIGINFO: i32 = 0x00000004;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_actions_match_the_named_table() {
        assert_eq!(Signal::SIGCHLD.default_action(), SignalAction::Ignore);
        assert_eq!(Signal::SIGCONT.default_action(), SignalAction::Continue);
        assert_eq!(Signal::SIGSTOP.default_action(), SignalAction::Stop);
        assert_eq!(Signal::SIGTSTP.default_action(), SignalAction::Stop);
        assert_eq!(Signal::SIGTERM.default_action(), SignalAction::Terminate);
        assert_eq!(Signal::SIGKILL.default_action(), SignalAction::Terminate);
    }

    #[test]
    fn pending_mask_tracks_lowest_numbered_first() {
        let q = SignalQueue::new();
        q.add_signal(Signal::SIGTERM);
        q.add_signal(Signal::SIGINT);
        assert_eq!(q.next_pending(), Some(Signal::SIGINT));
    }

    #[test]
    fn blocked_signal_is_not_deliverable() {
        let q = SignalQueue::new();
        q.add_signal(Signal::SIGUSR1);
        q.block(Signal::SIGUSR1);
        assert_eq!(q.next_pending(), None);
    }
}
