//! Process model: PCBs, scheduling, fork/exec/exit, signals, and the
//! synchronization primitives built on top of wait queues.

pub mod current;
pub mod exec;
pub mod fork;
pub mod pid;
pub mod queue;
pub mod scheduler;
pub mod signal;
pub mod sync;
pub mod task;
pub mod wait;

pub use current::current_pid;
pub use pid::{alloc_pid, get_process_table, init_process_table, insert_task, MAX_PROCS};
pub use queue::WaitQueue;
pub use task::{Credentials, FileTable, MemoryManager, Task, Vma, VmaFlags};

pub type Pid = u32;

/// `{Unused, Embryo, Ready, Running, Sleeping, Stopped, Zombie}`, per the
/// lifecycle in §4.3: a slot starts `Unused`, becomes `Embryo` while fork or
/// bootstrap is still populating it, `Ready` once runnable, cycles through
/// `Running`/`Sleeping`/`Stopped` while alive, and ends in `Zombie` until its
/// parent reaps it back to `Unused`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Unused,
    Embryo,
    Ready,
    Running,
    Sleeping,
    Stopped,
    Zombie,
}

/// Set `pid`'s state directly. Used by wait queues and signal delivery,
/// which need to flip state without going through the scheduler.
pub fn set_state(pid: Pid, state: ProcessState) {
    let mut table = get_process_table();
    if let Some(tbl) = table.as_mut() {
        if let Some(task) = tbl.get_mut(pid) {
            task.state = state;
        }
    }
}

pub fn get_state(pid: Pid) -> Option<ProcessState> {
    let table = get_process_table();
    table.as_ref().and_then(|tbl| tbl.get(pid)).map(|t| t.state)
}

/// Move a sleeping or stopped task back to `Ready` and enqueue it on the
/// scheduler's ready queue. No-op if the task is not actually off-CPU
/// (already ready/running) or does not exist.
pub fn wake_pid(pid: Pid) {
    let should_enqueue = {
        let mut table = get_process_table();
        match table.as_mut().and_then(|tbl| tbl.get_mut(pid)) {
            Some(task) if task.state == ProcessState::Sleeping || task.state == ProcessState::Stopped => {
                task.state = ProcessState::Ready;
                true
            }
            _ => false,
        }
    };
    if should_enqueue {
        scheduler::enqueue(pid);
    }
}

/// Current process's PID, or `None` before the process table exists.
pub fn current_process() -> Pid {
    current_pid()
}
