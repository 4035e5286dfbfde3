//! Wait queues: a bounded FIFO of processes blocked on one event source
//! (a mutex, a semaphore, a pipe, a parent's child list, ...).
//!
//! Capacity is fixed at 16 so a wake-all never walks or grows anything
//! unbounded on the kernel stack. Every operation here assumes the caller
//! already holds off interrupts (mutations race with the timer tick, which
//! reads the ready queue).

use super::Pid;

pub const WAIT_QUEUE_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy)]
pub struct WaitQueue {
    entries: [Pid; WAIT_QUEUE_CAPACITY],
    len: usize,
}

impl WaitQueue {
    pub const fn new() -> Self {
        Self {
            entries: [0; WAIT_QUEUE_CAPACITY],
            len: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn len(&self) -> usize {
        self.len
    }

    fn push(&mut self, pid: Pid) {
        if self.len < WAIT_QUEUE_CAPACITY {
            self.entries[self.len] = pid;
            self.len += 1;
        }
        // A full wait queue silently drops further waiters past the bound;
        // the bound exists precisely so this can never be unbounded.
    }

    fn pop_front(&mut self) -> Option<Pid> {
        if self.len == 0 {
            return None;
        }
        let pid = self.entries[0];
        for i in 1..self.len {
            self.entries[i - 1] = self.entries[i];
        }
        self.len -= 1;
        Some(pid)
    }

    /// Drop `pid` from wherever it sits in the queue, used when a sleeper
    /// exits or is signaled instead of woken normally.
    pub fn remove(&mut self, pid: Pid) {
        if let Some(pos) = self.entries[..self.len].iter().position(|&p| p == pid) {
            for i in pos..self.len - 1 {
                self.entries[i] = self.entries[i + 1];
            }
            self.len -= 1;
        }
    }

    /// Mark the current task `Sleeping`, append it here, and hand the CPU to
    /// the scheduler. Returns once something has woken this task and the
    /// scheduler has run it again.
    ///
    /// Not safe to call while already holding the process-table guard: it
    /// reacquires it internally via `set_state`. Callers sitting inside a
    /// table borrow (e.g. `wait4` scanning for a zombie child) should use
    /// [`Self::enqueue_current`] instead and call `schedule()` themselves
    /// once the borrow is dropped.
    pub fn sleep(&mut self) {
        let pid = super::current_pid();
        super::set_state(pid, super::ProcessState::Sleeping);
        self.push(pid);
        super::scheduler::schedule();
    }

    /// Mark the current task `Sleeping` and append it, without calling into
    /// the scheduler. For call sites that already hold a mutable borrow on
    /// the task whose state is being changed (so `set_state`'s own
    /// process-table lookup would alias it) and need to drop that borrow
    /// before yielding the CPU.
    pub fn enqueue_current(&mut self, pid: Pid, task_state: &mut super::ProcessState) {
        *task_state = super::ProcessState::Sleeping;
        self.push(pid);
    }

    /// Wake the oldest waiter, if any.
    pub fn wake_one(&mut self) {
        if let Some(pid) = self.pop_front() {
            super::wake_pid(pid);
        }
    }

    /// Wake every waiter, oldest first.
    pub fn wake_all(&mut self) {
        while let Some(pid) = self.pop_front() {
            super::wake_pid(pid);
        }
    }

    /// Mark the current task `Sleeping` and append it here, without calling
    /// the scheduler. Unlike [`Self::sleep`], safe to call while holding an
    /// unrelated lock (a pipe buffer's spinlock, say) that must be dropped
    /// before yielding the CPU — the caller drops that lock and then calls
    /// `scheduler::schedule()` itself.
    pub fn park(&mut self) {
        let pid = super::current_pid();
        super::set_state(pid, super::ProcessState::Sleeping);
        self.push(pid);
    }

    /// Pop every waiter without touching their process state. For call
    /// sites that already hold the process-table guard (so `wake_pid`'s own
    /// table lookup would alias it) — collect the pids here, drop the
    /// guard, then call `wake_pid` on each from the top level.
    pub fn drain(&mut self) -> impl Iterator<Item = Pid> + '_ {
        core::iter::from_fn(move || self.pop_front())
    }
}

impl Default for WaitQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_order_preserved() {
        let mut wq = WaitQueue::new();
        for pid in [2, 3, 4] {
            wq.push(pid);
        }
        assert_eq!(wq.len(), 3);
        wq.remove(3);
        assert_eq!(wq.len(), 2);
        assert_eq!(wq.pop_front(), Some(2));
        assert_eq!(wq.pop_front(), Some(4));
        assert!(wq.is_empty());
    }

    #[test]
    fn capacity_is_bounded() {
        let mut wq = WaitQueue::new();
        for pid in 0..(WAIT_QUEUE_CAPACITY as Pid + 4) {
            wq.push(pid);
        }
        assert_eq!(wq.len(), WAIT_QUEUE_CAPACITY);
    }
}
