/// PID allocation and the fixed-size process table.
///
/// The process table, ready queue, and every other piece of global kernel
/// state are single-hart singletons protected by disabling interrupts for
/// the duration of the access rather than by a lock (see `lib::critical`).

use super::task::{Pid, Task};
use crate::lib::critical;
use crate::lib::error::KernelError;
use alloc::boxed::Box;
use alloc::vec::Vec;
use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, Ordering};

/// Fixed size of the PCB array: PIDs are assigned from a free pool this big.
pub const MAX_PROCS: usize = 64;

static NEXT_PID: AtomicU32 = AtomicU32::new(2); // PID 1 is init

enum PidEntry {
    Free,
    Used(Box<Task>),
}

pub struct PidTable {
    entries: Vec<PidEntry>,
}

impl PidTable {
    fn new() -> Self {
        let mut entries = Vec::with_capacity(MAX_PROCS);
        for _ in 0..MAX_PROCS {
            entries.push(PidEntry::Free);
        }
        Self { entries }
    }

    pub fn alloc_pid(&self) -> Result<Pid, KernelError> {
        let pid = NEXT_PID.fetch_add(1, Ordering::SeqCst);
        if pid as usize >= MAX_PROCS {
            return Err(KernelError::OutOfMemory);
        }
        Ok(pid)
    }

    pub fn insert(&mut self, task: Task) -> Result<(), KernelError> {
        let pid = task.pid as usize;
        if pid >= MAX_PROCS {
            return Err(KernelError::InvalidArgument);
        }
        self.entries[pid] = PidEntry::Used(Box::new(task));
        Ok(())
    }

    pub fn get(&self, pid: Pid) -> Option<&Task> {
        match self.entries.get(pid as usize)? {
            PidEntry::Used(task) => Some(task),
            PidEntry::Free => None,
        }
    }

    pub fn get_mut(&mut self, pid: Pid) -> Option<&mut Task> {
        match self.entries.get_mut(pid as usize)? {
            PidEntry::Used(task) => Some(task),
            PidEntry::Free => None,
        }
    }

    pub fn remove(&mut self, pid: Pid) -> Option<Task> {
        let idx = pid as usize;
        if idx >= self.entries.len() {
            return None;
        }
        match core::mem::replace(&mut self.entries[idx], PidEntry::Free) {
            PidEntry::Used(task) => Some(*task),
            PidEntry::Free => None,
        }
    }

    pub fn find_children(&self, ppid: Pid) -> Vec<Pid> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(idx, entry)| match entry {
                PidEntry::Used(task) if task.ppid == ppid => Some(idx as Pid),
                _ => None,
            })
            .collect()
    }

    pub fn reparent_to_init(&mut self, dying_pid: Pid) {
        for entry in self.entries.iter_mut() {
            if let PidEntry::Used(task) = entry {
                if task.ppid == dying_pid {
                    task.ppid = 1;
                }
            }
        }
    }

    pub fn count(&self) -> usize {
        self.entries.iter().filter(|e| matches!(e, PidEntry::Used(_))).count()
    }

    /// Every PID currently in `Ready`, in table order. Used at boot to seed
    /// the scheduler's ready queue after the initial process is inserted.
    pub fn ready_pids(&self) -> Vec<Pid> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(idx, entry)| match entry {
                PidEntry::Used(task) if task.state == super::ProcessState::Ready => Some(idx as Pid),
                _ => None,
            })
            .collect()
    }
}

struct ProcessTableCell(UnsafeCell<Option<PidTable>>);
unsafe impl Sync for ProcessTableCell {}

static PROCESS_TABLE: ProcessTableCell = ProcessTableCell(UnsafeCell::new(None));

/// Interrupts-disabled handle to the process table, held for as long as the
/// returned guard is alive (mirrors a lock guard's API without a lock).
pub struct ProcessTableGuard {
    _critical: critical::Guard,
}

impl core::ops::Deref for ProcessTableGuard {
    type Target = Option<PidTable>;
    fn deref(&self) -> &Self::Target {
        unsafe { &*PROCESS_TABLE.0.get() }
    }
}

impl core::ops::DerefMut for ProcessTableGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        unsafe { &mut *PROCESS_TABLE.0.get() }
    }
}

pub fn init_process_table() {
    let mut table = get_process_table();
    *table = Some(PidTable::new());
    crate::info!("Process table initialized (max {} PIDs)", MAX_PROCS);
}

pub fn get_process_table() -> ProcessTableGuard {
    ProcessTableGuard { _critical: critical::enter() }
}

pub fn alloc_pid() -> Result<Pid, KernelError> {
    let table = get_process_table();
    table.as_ref().ok_or(KernelError::NotInitialized)?.alloc_pid()
}

pub fn insert_task(task: Task) -> Result<(), KernelError> {
    let mut table = get_process_table();
    table.as_mut().ok_or(KernelError::NotInitialized)?.insert(task)
}
