//! `fork`: duplicate the calling process into a new child.
//!
//! The actual PCB duplication (address space, fd table, trap frame, signal
//! state) lives on [`Task::fork_from`]; this module just wires it to PID
//! allocation and the process table, and keeps the fork counters used for
//! diagnostics.

use crate::lib::error::Errno;
use super::{alloc_pid, get_process_table, insert_task, scheduler, Pid, Task};

/// Allocate a child PID, duplicate `parent_pid`'s PCB into it (eager copy,
/// no COW), enqueue the child as `Ready`, and hand the child's PID back to
/// the caller (the parent's syscall return value; the child's own `fork`
/// return is wired into its cloned trap frame by `fork_from`).
pub fn do_fork(parent_pid: Pid) -> Result<Pid, Errno> {
    let child_pid = alloc_pid().map_err(|_| {
        record_fork_failure();
        Errno::EAGAIN
    })?;

    let mut child = {
        let mut table = get_process_table();
        let tbl = table.as_mut().ok_or(Errno::ESRCH)?;
        let parent = tbl.get_mut(parent_pid).ok_or(Errno::ESRCH)?;
        Task::fork_from(parent, child_pid).map_err(|_| {
            record_fork_failure();
            Errno::ENOMEM
        })?
    };
    child.prepare_first_run();

    {
        let mut table = get_process_table();
        let tbl = table.as_mut().ok_or(Errno::ESRCH)?;
        let parent = tbl.get_mut(parent_pid).ok_or(Errno::ESRCH)?;
        parent.children.push(child_pid);
    }

    insert_task(child).map_err(|_| {
        record_fork_failure();
        Errno::EAGAIN
    })?;
    scheduler::enqueue(child_pid);

    record_fork_success();
    crate::info!("fork: pid {} -> child {}", parent_pid, child_pid);
    Ok(child_pid)
}

#[derive(Debug, Clone, Copy)]
pub struct ForkStats {
    pub total_forks: usize,
    pub failed_forks: usize,
}

use core::sync::atomic::{AtomicUsize, Ordering};

static TOTAL_FORKS: AtomicUsize = AtomicUsize::new(0);
static FAILED_FORKS: AtomicUsize = AtomicUsize::new(0);

pub fn record_fork_success() {
    TOTAL_FORKS.fetch_add(1, Ordering::Relaxed);
}

pub fn record_fork_failure() {
    FAILED_FORKS.fetch_add(1, Ordering::Relaxed);
}

pub fn get_fork_stats() -> ForkStats {
    ForkStats {
        total_forks: TOTAL_FORKS.load(Ordering::Relaxed),
        failed_forks: FAILED_FORKS.load(Ordering::Relaxed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fork_stats() {
        record_fork_success();
        record_fork_success();
        record_fork_failure();

        let stats = get_fork_stats();
        assert!(stats.total_forks >= 2);
        assert!(stats.failed_forks >= 1);
    }
}
