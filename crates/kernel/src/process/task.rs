/// Process control block.
///
/// Bundles everything the kernel tracks about one process: identity,
/// scheduling state, its address space, open files, credentials, pending
/// trap frame, and the callee-saved context used to switch kernel call
/// chains in and out of it.

use crate::lib::error::{KernelError, Errno};
use crate::arch::{CpuContext, TrapFrame};
use alloc::string::String;
use alloc::vec::Vec;
use alloc::vec;

pub type Pid = u32;
pub use super::ProcessState;

/// 4 pages (16KB), enough headroom for the kernel-side call depth a syscall
/// handler or page-fault path ever reaches on this single-hart design.
pub const KSTACK_PAGES: usize = 4;
pub const KSTACK_SIZE: u64 = (KSTACK_PAGES * crate::mm::PAGE_SIZE) as u64;

#[derive(Debug, Clone, Copy)]
pub struct Credentials {
    pub uid: u32,
    pub gid: u32,
    pub euid: u32,
    pub egid: u32,
}

impl Default for Credentials {
    fn default() -> Self {
        Self { uid: 0, gid: 0, euid: 0, egid: 0 }
    }
}

/// Per-process address space: page-table root, VMA list, and the heap/stack
/// bookkeeping `sbrk`/`mmap` grow. The fuller operations (`find_vma`,
/// `do_brk`, `do_mmap`, ...) live in `mm::address_space` alongside the
/// Sv39-specific constants they use.
#[derive(Debug)]
pub struct MemoryManager {
    /// Physical address of the Sv39 root page table.
    pub page_table: u64,
    pub brk: u64,
    pub brk_start: u64,
    pub stack_top: u64,
    pub mmap_base: u64,
    pub vmas: Vec<Vma>,
}

impl MemoryManager {
    /// Allocate a fresh user address space with a zeroed root page table.
    pub fn new_user() -> Result<Self, KernelError> {
        let page_table = crate::mm::alloc_user_page_table()?;
        Ok(Self {
            page_table,
            brk: crate::mm::USER_HEAP_START,
            brk_start: crate::mm::USER_HEAP_START,
            stack_top: crate::mm::USER_STACK_TOP,
            mmap_base: crate::mm::USER_MMAP_BASE,
            vmas: Vec::new(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Vma {
    pub start: u64,
    pub end: u64,
    pub flags: VmaFlags,
    pub offset: u64,
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct VmaFlags: u32 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
        const EXEC = 1 << 2;
        const SHARED = 1 << 3;
        const ANONYMOUS = 1 << 4;
        const USER = 1 << 5;
    }
}

/// Bounded per-process file-descriptor table.
pub struct FileTable {
    pub fds: Vec<Option<alloc::sync::Arc<crate::vfs::File>>>,
}

impl FileTable {
    pub fn new() -> Self {
        Self { fds: vec![None; 256] }
    }

    pub fn alloc_fd(&mut self, file: alloc::sync::Arc<crate::vfs::File>) -> Result<i32, Errno> {
        for (i, slot) in self.fds.iter_mut().enumerate() {
            if slot.is_none() {
                *slot = Some(file);
                return Ok(i as i32);
            }
        }
        Err(Errno::EMFILE)
    }

    pub fn get(&self, fd: i32) -> Result<alloc::sync::Arc<crate::vfs::File>, Errno> {
        if fd < 0 || fd as usize >= self.fds.len() {
            return Err(Errno::EBADF);
        }
        self.fds[fd as usize].clone().ok_or(Errno::EBADF)
    }

    pub fn close(&mut self, fd: i32) -> Result<(), Errno> {
        if fd < 0 || fd as usize >= self.fds.len() {
            return Err(Errno::EBADF);
        }
        if self.fds[fd as usize].is_none() {
            return Err(Errno::EBADF);
        }
        self.fds[fd as usize] = None;
        Ok(())
    }

    pub fn dup(&mut self, oldfd: i32) -> Result<i32, Errno> {
        let file = self.get(oldfd)?;
        self.alloc_fd(file)
    }

    /// Install `file` at a specific fd, closing whatever was there (dup2).
    pub fn dup2(&mut self, oldfd: i32, newfd: i32) -> Result<i32, Errno> {
        let file = self.get(oldfd)?;
        if newfd < 0 || newfd as usize >= self.fds.len() {
            return Err(Errno::EBADF);
        }
        self.fds[newfd as usize] = Some(file);
        Ok(newfd)
    }
}

impl core::fmt::Debug for FileTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let open_fds: Vec<i32> = self
            .fds
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.is_some().then_some(i as i32))
            .collect();
        f.debug_struct("FileTable").field("open_fds", &open_fds).finish()
    }
}

pub struct Task {
    pub pid: Pid,
    pub ppid: Pid,
    /// Process-group ID; defaults to its own PID (new session/group leader)
    /// since the core does not implement job control beyond signal routing.
    pub pgid: Pid,
    pub sid: Pid,
    pub state: ProcessState,
    pub exit_code: i32,
    pub mm: MemoryManager,
    pub files: FileTable,
    pub cred: Credentials,
    /// Register state on the last trap taken from user mode. Signal
    /// delivery reads and rewrites this; `sret` resumes from it.
    pub trap_frame: TrapFrame,
    /// Callee-saved registers for resuming this task's kernel call chain
    /// after a context switch away from it.
    pub cpu_context: CpuContext,
    /// Physical base of this task's kernel stack (`KSTACK_PAGES` pages).
    pub kstack: u64,
    pub name: String,
    pub children: Vec<Pid>,
    pub signals: crate::process::signal::SignalQueue,
    pub cwd: String,
    /// Parents block here in `wait`/`waitpid` until a child becomes a zombie.
    pub child_wait: super::queue::WaitQueue,
    /// Scheduler tick count accrued while `Running`.
    pub ticks: u64,
    /// Present per the PCB layout; scheduling is strict FIFO round-robin
    /// and does not currently break ties on it.
    pub priority: i32,
}

impl Task {
    fn alloc_kstack() -> Result<u64, KernelError> {
        crate::mm::alloc_pages(KSTACK_PAGES).ok_or(KernelError::OutOfMemory)
    }

    /// Top-of-stack address (stack grows down from here), the value loaded
    /// into `sscratch` whenever this task is about to run in user mode.
    pub fn kstack_top(&self) -> u64 {
        self.kstack + KSTACK_SIZE
    }

    /// Construct the initial process (PID 1 / init). Caller still needs to
    /// load its ELF image and set up its trap frame before scheduling it.
    pub fn new_init() -> Self {
        let mm = MemoryManager::new_user().expect("failed to allocate page table for init");
        let kstack = Self::alloc_kstack().expect("failed to allocate kernel stack for init");

        Self {
            pid: 1,
            ppid: 0,
            pgid: 1,
            sid: 1,
            state: ProcessState::Embryo,
            exit_code: 0,
            mm,
            files: FileTable::new(),
            cred: Credentials::default(),
            trap_frame: TrapFrame::default(),
            cpu_context: CpuContext::new(),
            kstack,
            name: String::from("init"),
            children: Vec::new(),
            signals: crate::process::signal::SignalQueue::new(),
            cwd: String::from("/"),
            child_wait: super::queue::WaitQueue::new(),
            ticks: 0,
            priority: 0,
        }
    }

    /// Duplicate `parent` into a new PCB for `child_pid`: eager (non-COW)
    /// copy of every mapped page, duplicated fd table, cleared pending
    /// signals, cloned trap frame with `a0` zeroed so the child's fork
    /// return value is 0.
    pub fn fork_from(parent: &Task, child_pid: Pid) -> Result<Self, KernelError> {
        let child_page_table = crate::mm::duplicate_user_page_table(parent.mm.page_table)?;
        let kstack = Self::alloc_kstack()?;

        let child_mm = MemoryManager {
            page_table: child_page_table,
            brk: parent.mm.brk,
            brk_start: parent.mm.brk_start,
            stack_top: parent.mm.stack_top,
            mmap_base: parent.mm.mmap_base,
            vmas: parent.mm.vmas.clone(),
        };

        let mut child_files = FileTable::new();
        for (i, fd) in parent.files.fds.iter().enumerate() {
            child_files.fds[i] = fd.clone();
        }

        let mut child_tf = parent.trap_frame;
        child_tf.set_return(0);

        let mut signals = parent.signals.clone();
        signals.clear_all();

        Ok(Self {
            pid: child_pid,
            ppid: parent.pid,
            pgid: parent.pgid,
            sid: parent.sid,
            state: ProcessState::Ready,
            exit_code: 0,
            mm: child_mm,
            files: child_files,
            cred: parent.cred,
            trap_frame: child_tf,
            cpu_context: CpuContext::new(),
            kstack,
            name: parent.name.clone(),
            children: Vec::new(),
            signals,
            cwd: parent.cwd.clone(),
            child_wait: super::queue::WaitQueue::new(),
            ticks: 0,
            priority: parent.priority,
        })
    }

    pub fn exit(&mut self, code: i32) {
        self.state = ProcessState::Zombie;
        self.exit_code = code;
    }

    pub fn is_zombie(&self) -> bool {
        self.state == ProcessState::Zombie
    }

    /// Arm this task to be scheduled for the first time. `trap_frame` must
    /// already hold the register state it should resume into (set by
    /// `new_init`'s ELF load, or carried over from the parent by
    /// `fork_from`). Copies that frame onto the task's own kernel stack and
    /// points `cpu_context` at `trap_return` (trap.S), so `schedule()`'s
    /// `cpu_context_switch` lands this task directly on the normal
    /// trap-return path instead of resuming a call chain that never ran.
    pub fn prepare_first_run(&mut self) {
        let frame_addr = self.kstack_top() - crate::arch::TRAP_FRAME_SIZE;
        unsafe {
            core::ptr::write(frame_addr as *mut TrapFrame, self.trap_frame);
        }
        self.cpu_context = CpuContext::first_run(frame_addr);
    }
}

impl core::fmt::Debug for Task {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Task")
            .field("pid", &self.pid)
            .field("ppid", &self.ppid)
            .field("state", &self.state)
            .field("name", &self.name)
            .finish()
    }
}
