/// Tracks which PID is presently assigned to the one hart this kernel runs
/// on. `switch_to` additionally installs that task's address space and arms
/// `sscratch` so the next trap from user mode finds the right kernel stack.

use super::task::Pid;
use core::sync::atomic::{AtomicU32, Ordering};

static CURRENT_PID: AtomicU32 = AtomicU32::new(0);

pub fn current_pid() -> Pid {
    CURRENT_PID.load(Ordering::Acquire)
}

/// Same as [`current_pid`], but `None` before any task has been switched in
/// (PID 0 is reserved and never assigned to a real task).
pub fn current_pid_checked() -> Option<Pid> {
    match current_pid() {
        0 => None,
        pid => Some(pid),
    }
}

pub fn set_current_pid(pid: Pid) {
    CURRENT_PID.store(pid, Ordering::Release);
}

/// Install `pid` as the running task: activates its page table and points
/// `sscratch` at its kernel-stack top. Called by the scheduler immediately
/// before a `cpu_context_switch` into it.
pub fn switch_to(pid: Pid) {
    set_current_pid(pid);
    let mut table = super::get_process_table();
    if let Some(task) = table.as_mut().and_then(|tbl| tbl.get_mut(pid)) {
        crate::arch::riscv64::mmu::activate(task.mm.page_table, 0);
        let top = task.kstack_top();
        unsafe {
            core::arch::asm!("csrw sscratch, {}", in(reg) top);
        }
    }
}
