//! Round-robin scheduler.
//!
//! Single hart, preemptive, strict FIFO ready queue. `schedule()` is the one
//! place that actually moves the CPU from one task's kernel stack to
//! another's; everything else (timer ticks, voluntary yields, blocking
//! syscalls) just arranges state and calls it.

use alloc::collections::VecDeque;
use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU64, Ordering};

use crate::arch::CpuContext;
use crate::arch::riscv64::context::cpu_context_switch;

use super::{current, Pid, ProcessState};

struct ReadyQueueCell(UnsafeCell<VecDeque<Pid>>);
unsafe impl Sync for ReadyQueueCell {}

static READY_QUEUE: ReadyQueueCell = ReadyQueueCell(UnsafeCell::new(VecDeque::new()));

static TICKS: AtomicU64 = AtomicU64::new(0);

/// Tasks parked in `sys_sleep`, each keyed by the tick count at which it
/// should be woken. Checked once per timer tick rather than on every
/// `schedule()` call, since it only ever changes on a tick boundary.
struct SleepersCell(UnsafeCell<VecDeque<(Pid, u64)>>);
unsafe impl Sync for SleepersCell {}

static SLEEPERS: SleepersCell = SleepersCell(UnsafeCell::new(VecDeque::new()));

/// Park the current task until `ticks()` reaches `wake_at`. Never busy
/// waits: the caller's state is set to `Sleeping` and the CPU is handed to
/// another runnable task; `timer_tick()` wakes it once the tick arrives.
pub fn sleep_until(wake_at: u64) {
    crate::lib::critical::without_interrupts(|| {
        let pid = current::current_pid();
        super::set_state(pid, ProcessState::Sleeping);
        let sleepers = unsafe { &mut *SLEEPERS.0.get() };
        sleepers.push_back((pid, wake_at));
    });
    schedule();
}

fn wake_timer_sleepers(now: u64) {
    crate::lib::critical::without_interrupts(|| {
        let sleepers = unsafe { &mut *SLEEPERS.0.get() };
        let mut i = 0;
        while i < sleepers.len() {
            if sleepers[i].1 <= now {
                let (pid, _) = sleepers.remove(i).unwrap();
                super::wake_pid(pid);
            } else {
                i += 1;
            }
        }
    });
}

/// Append `pid` to the tail of the ready queue, unless it's already there.
/// Called whenever a task becomes runnable: after fork, after `wake_pid`,
/// and by `schedule()` itself when demoting the outgoing task.
pub fn enqueue(pid: Pid) {
    crate::lib::critical::without_interrupts(|| {
        let q = unsafe { &mut *READY_QUEUE.0.get() };
        if !q.contains(&pid) {
            q.push_back(pid);
        }
    });
}

fn pick_next() -> Option<Pid> {
    crate::lib::critical::without_interrupts(|| {
        let q = unsafe { &mut *READY_QUEUE.0.get() };
        q.pop_front()
    })
}

/// Demote the current task back to `Ready` and enqueue it, but only if it's
/// still `Running` — a task that called this after putting itself to sleep
/// or exiting has already set its own terminal state and must not be
/// resurrected here.
fn requeue_if_runnable(pid: Pid) {
    let mut table = super::get_process_table();
    if let Some(task) = table.as_mut().and_then(|t| t.get_mut(pid)) {
        if task.state == ProcessState::Running {
            task.state = ProcessState::Ready;
            drop(table);
            enqueue(pid);
        }
    }
}

fn mark_running(pid: Pid) {
    let mut table = super::get_process_table();
    if let Some(task) = table.as_mut().and_then(|t| t.get_mut(pid)) {
        task.state = ProcessState::Running;
    }
}

/// Throwaway context for the boot hart before any task has run. PID 0 is
/// reserved and never has a PCB, so the very first `schedule()` call (from
/// `run()`, switching away from "nothing") saves its outgoing registers
/// here instead of indexing into the process table.
static mut BOOT_CONTEXT: CpuContext = CpuContext::new();

fn context_ptr(pid: Pid) -> *mut CpuContext {
    if pid == 0 {
        return &raw mut BOOT_CONTEXT;
    }
    let mut table = super::get_process_table();
    let task = table
        .as_mut()
        .and_then(|t| t.get_mut(pid))
        .expect("scheduled pid vanished from the process table");
    &mut task.cpu_context as *mut CpuContext
}

/// Give up the CPU. Demotes the caller to `Ready` if it's still runnable,
/// picks the next `Ready` task (spinning on `wfi` if none exists yet), and
/// context-switches into it. Returns once this task is chosen again.
///
/// Must be called with interrupts already disabled; trap handlers get that
/// for free from the hardware trapping in with SIE cleared.
pub fn schedule() {
    let old_pid = current::current_pid();
    requeue_if_runnable(old_pid);

    loop {
        if let Some(next_pid) = pick_next() {
            if next_pid == old_pid {
                mark_running(next_pid);
                return;
            }
            let old_ctx = context_ptr(old_pid);
            current::switch_to(next_pid);
            mark_running(next_pid);
            let new_ctx = context_ptr(next_pid) as *const CpuContext;
            unsafe { cpu_context_switch(old_ctx, new_ctx) };
            // Resumed later, back on old_pid's kernel stack.
            return;
        }
        unsafe { core::arch::asm!("wfi") };
    }
}

/// Voluntary yield: give another `Ready` task a turn without changing this
/// task's state. `schedule()` already demotes a still-`Running` caller, so
/// this is just that.
pub fn yield_now() {
    schedule();
}

/// Called from the timer interrupt handler, once per tick: the resolved
/// answer to preempting on a fixed quantum vs. a variable one is to just
/// reschedule on every tick.
pub fn timer_tick() {
    let now = TICKS.fetch_add(1, Ordering::Relaxed) + 1;
    if let Some(pid) = current::current_pid_checked() {
        let mut table = super::get_process_table();
        if let Some(task) = table.as_mut().and_then(|t| t.get_mut(pid)) {
            task.ticks += 1;
        }
    }
    wake_timer_sleepers(now);
    schedule();
}

pub fn ticks() -> u64 {
    TICKS.load(Ordering::Relaxed)
}

/// Mark a sleeping/stopped task runnable and hand it to the ready queue.
/// Thin wrapper so callers outside `process` don't need to reach into
/// `process::wake_pid` directly.
pub fn wake_process(pid: Pid) {
    super::wake_pid(pid);
}

/// Boot-time entry point: seed the ready queue from whatever is already
/// `Ready` in the process table (normally just PID 1), then fall into
/// `schedule()` forever. Never returns.
pub fn run() -> ! {
    let ready = {
        let table = super::get_process_table();
        table.as_ref().map(|t| t.ready_pids()).unwrap_or_default()
    };
    for pid in ready {
        enqueue(pid);
    }

    loop {
        schedule();
        unsafe { core::arch::asm!("wfi") };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enqueue_does_not_duplicate() {
        enqueue(7);
        enqueue(7);
        let q = crate::lib::critical::without_interrupts(|| unsafe { (*READY_QUEUE.0.get()).clone() });
        assert_eq!(q.iter().filter(|&&p| p == 7).count(), 1);
        crate::lib::critical::without_interrupts(|| unsafe { (*READY_QUEUE.0.get()).clear() });
    }

    #[test]
    fn wake_timer_sleepers_only_wakes_due_entries() {
        crate::lib::critical::without_interrupts(|| unsafe {
            let sleepers = &mut *SLEEPERS.0.get();
            sleepers.push_back((41, 10));
            sleepers.push_back((42, 20));
        });
        wake_timer_sleepers(10);
        let remaining = crate::lib::critical::without_interrupts(|| unsafe { (*SLEEPERS.0.get()).clone() });
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0], (42, 20));
        crate::lib::critical::without_interrupts(|| unsafe { (*SLEEPERS.0.get()).clear() });
    }
}
