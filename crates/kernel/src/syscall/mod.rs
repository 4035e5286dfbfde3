//! System-call dispatch.
//!
//! `syscall_dispatcher` is reached from `arch::riscv64::interrupts::trap_handler`
//! on an ecall trap: `nr` is `a7`, `args` is `a0..a5`. The numbering is the
//! one userland is compiled against, not the host OS's — it only happens to
//! reuse several Linux RV64 values for the calls that existed in early
//! bring-up before the rest of the table was pinned down.

pub mod uaccess;

use crate::lib::error::{Errno, Result};

pub const SYS_EXIT: usize = 0;
pub const SYS_WRITE: usize = 1;
pub const SYS_READ: usize = 2;
pub const SYS_GETPID: usize = 3;
pub const SYS_SLEEP: usize = 5;
pub const SYS_YIELD: usize = 6;
pub const SYS_FORK: usize = 7;
pub const SYS_WAIT: usize = 9;
pub const SYS_OPEN: usize = 13;
pub const SYS_CLOSE: usize = 14;
pub const SYS_LSEEK: usize = 15;
pub const SYS_STAT: usize = 16;
pub const SYS_MKDIR: usize = 17;
pub const SYS_UNLINK: usize = 18;
pub const SYS_RMDIR: usize = 19;
pub const SYS_EXECVE: usize = 20;
pub const SYS_SIGNAL: usize = 21;
pub const SYS_SIGACTION: usize = 22;
pub const SYS_SIGRETURN: usize = 23;
pub const SYS_MMAP: usize = 24;
pub const SYS_MUNMAP: usize = 25;
pub const SYS_PIPE: usize = 26;
pub const SYS_GETDENTS: usize = 27;
pub const SYS_CHDIR: usize = 28;
pub const SYS_GETCWD: usize = 29;
pub const SYS_DUP2: usize = 35;
pub const SYS_MUTEX_CREATE: usize = 46;
pub const SYS_MUTEX_LOCK: usize = 47;
pub const SYS_MUTEX_UNLOCK: usize = 48;
pub const SYS_MUTEX_DESTROY: usize = 49;
pub const SYS_SEM_CREATE: usize = 50;
pub const SYS_SEM_WAIT: usize = 51;
pub const SYS_SEM_POST: usize = 52;
pub const SYS_SEM_DESTROY: usize = 53;
pub const SYS_COND_CREATE: usize = 54;
pub const SYS_COND_WAIT: usize = 55;
pub const SYS_COND_SIGNAL: usize = 56;
pub const SYS_COND_BROADCAST: usize = 57;
pub const SYS_COND_DESTROY: usize = 58;
pub const SYS_RWLOCK_CREATE: usize = 59;
pub const SYS_RWLOCK_RDLOCK: usize = 60;
pub const SYS_RWLOCK_WRLOCK: usize = 61;
pub const SYS_POWEROFF: usize = 200;
pub const SYS_REBOOT: usize = 201;

pub fn syscall_dispatcher(nr: usize, args: &[u64; 6]) -> isize {
    let result = match nr {
        SYS_EXIT => sys_exit(args[0] as i32),
        SYS_WRITE => sys_write(args[0] as i32, args[1] as *const u8, args[2] as usize),
        SYS_READ => sys_read(args[0] as i32, args[1] as *mut u8, args[2] as usize),
        SYS_GETPID => sys_getpid(),
        SYS_SLEEP => sys_sleep(args[0]),
        SYS_YIELD => sys_yield(),
        SYS_FORK => sys_fork(),
        SYS_WAIT => sys_wait4(args[0] as i32, args[1] as *mut i32, args[2] as i32),
        SYS_OPEN => sys_openat(args[0] as *const u8, args[1] as i32, args[2] as u32),
        SYS_CLOSE => sys_close(args[0] as i32),
        SYS_LSEEK => sys_lseek(args[0] as i32, args[1] as i64, args[2] as i32),
        SYS_STAT => sys_fstat(args[0] as i32, args[1] as *mut u8),
        SYS_MKDIR => sys_mkdir(args[0] as *const u8, args[1] as u32),
        SYS_UNLINK => sys_unlink(args[0] as *const u8),
        SYS_RMDIR => sys_rmdir(args[0] as *const u8),
        SYS_EXECVE => sys_execve(args[0] as *const u8, args[1] as *const *const u8, args[2] as *const *const u8),
        SYS_SIGNAL => sys_signal(args[0] as u32, args[1]),
        SYS_SIGACTION => sys_sigaction(args[0] as u32, args[1] as *const u8, args[2] as *mut u8),
        SYS_SIGRETURN => sys_sigreturn(),
        SYS_MMAP => sys_mmap(args[0] as *mut u8, args[1] as usize, args[2] as i32, args[3] as i32),
        SYS_MUNMAP => sys_munmap(args[0] as *mut u8, args[1] as usize),
        SYS_PIPE => sys_pipe(args[0] as *mut i32),
        SYS_GETDENTS => sys_getdents64(args[0] as i32, args[1] as *mut u8, args[2] as usize),
        SYS_CHDIR => sys_chdir(args[0] as *const u8),
        SYS_GETCWD => sys_getcwd(args[0] as *mut u8, args[1] as usize),
        SYS_DUP2 => sys_dup2(args[0] as i32, args[1] as i32),
        SYS_MUTEX_CREATE => sys_mutex_create(),
        SYS_MUTEX_LOCK => sys_mutex_lock(args[0] as i32),
        SYS_MUTEX_UNLOCK => sys_mutex_unlock(args[0] as i32),
        SYS_MUTEX_DESTROY => sys_sync_destroy(args[0] as i32),
        SYS_SEM_CREATE => sys_sem_create(args[0] as i32),
        SYS_SEM_WAIT => sys_sem_wait(args[0] as i32),
        SYS_SEM_POST => sys_sem_post(args[0] as i32),
        SYS_SEM_DESTROY => sys_sync_destroy(args[0] as i32),
        SYS_COND_CREATE => sys_cond_create(),
        SYS_COND_WAIT => sys_cond_wait(args[0] as i32, args[1] as i32),
        SYS_COND_SIGNAL => sys_cond_signal(args[0] as i32),
        SYS_COND_BROADCAST => sys_cond_broadcast(args[0] as i32),
        SYS_COND_DESTROY => sys_sync_destroy(args[0] as i32),
        SYS_RWLOCK_CREATE => sys_rwlock_create(),
        SYS_RWLOCK_RDLOCK => sys_rwlock_rdlock(args[0] as i32),
        SYS_RWLOCK_WRLOCK => sys_rwlock_wrlock(args[0] as i32),
        SYS_POWEROFF => sys_poweroff(),
        SYS_REBOOT => sys_reboot(),
        other => {
            crate::warn!("unimplemented syscall {}", other);
            Err(Errno::ENOSYS)
        }
    };

    match result {
        Ok(ret) => ret,
        Err(e) => -(e as isize),
    }
}

fn copy_path_from_user(ptr: *const u8) -> Result<alloc::string::String> {
    if ptr.is_null() {
        return Err(Errno::EFAULT);
    }
    let bytes = unsafe {
        let mut len = 0usize;
        while len < 4096 && *ptr.add(len) != 0 {
            len += 1;
        }
        core::slice::from_raw_parts(ptr, len)
    };
    core::str::from_utf8(bytes).map(alloc::string::String::from).map_err(|_| Errno::EINVAL)
}

fn current_file(fd: i32) -> Result<alloc::sync::Arc<crate::vfs::File>> {
    let pid = crate::process::current_pid();
    let table = crate::process::get_process_table();
    let table = table.as_ref().ok_or(Errno::ESRCH)?;
    let task = table.get(pid).ok_or(Errno::ESRCH)?;
    task.files.get(fd)
}

pub fn sys_openat(pathname: *const u8, flags: i32, mode: u32) -> Result<isize> {
    let path = copy_path_from_user(pathname)?;
    let open_flags = crate::vfs::OpenFlags::from_bits_truncate(flags as u32);

    let file = if open_flags.contains(crate::vfs::OpenFlags::O_CREAT) {
        match crate::vfs::open(&path, open_flags) {
            Ok(f) => f,
            Err(Errno::ENOENT) => {
                let inode = crate::vfs::create(&path, mode)?;
                alloc::sync::Arc::new(crate::vfs::File::new(inode, open_flags))
            }
            Err(e) => return Err(e),
        }
    } else {
        crate::vfs::open(&path, open_flags)?
    };

    let pid = crate::process::current_pid();
    let mut table = crate::process::get_process_table();
    let table = table.as_mut().ok_or(Errno::ESRCH)?;
    let task = table.get_mut(pid).ok_or(Errno::ESRCH)?;
    let fd = task.files.alloc_fd(file)?;

    crate::debug!("open({}) -> fd {}", path, fd);
    Ok(fd as isize)
}

pub fn sys_close(fd: i32) -> Result<isize> {
    let pid = crate::process::current_pid();
    let mut table = crate::process::get_process_table();
    let table = table.as_mut().ok_or(Errno::ESRCH)?;
    let task = table.get_mut(pid).ok_or(Errno::ESRCH)?;
    task.files.close(fd)?;
    Ok(0)
}

pub fn sys_lseek(fd: i32, offset: i64, whence: i32) -> Result<isize> {
    let file = current_file(fd)?;
    Ok(file.lseek(offset, whence)? as isize)
}

pub fn sys_read(fd: i32, buf: *mut u8, count: usize) -> Result<isize> {
    if buf.is_null() {
        return Err(Errno::EFAULT);
    }
    if count == 0 {
        return Ok(0);
    }
    let file = current_file(fd)?;
    let data = unsafe { core::slice::from_raw_parts_mut(buf, count) };
    Ok(file.read(data)? as isize)
}

pub fn sys_write(fd: i32, buf: *const u8, count: usize) -> Result<isize> {
    if buf.is_null() {
        return Err(Errno::EFAULT);
    }
    if count == 0 {
        return Ok(0);
    }
    let file = current_file(fd)?;
    let data = unsafe { core::slice::from_raw_parts(buf, count) };
    Ok(file.write(data)? as isize)
}

pub fn sys_fstat(fd: i32, statbuf: *mut u8) -> Result<isize> {
    if statbuf.is_null() {
        return Err(Errno::EFAULT);
    }
    let file = current_file(fd)?;
    let inode = file.inode.as_ref().ok_or(Errno::EBADF)?;
    let meta = inode.getattr()?;

    let stat = unsafe { core::slice::from_raw_parts_mut(statbuf, 128) };
    stat.fill(0);
    unsafe {
        let p = statbuf as *mut u64;
        *p.add(1) = meta.ino;
        *(statbuf.add(24) as *mut u32) = meta.mode;
        *(statbuf.add(48) as *mut u64) = meta.size;
    }
    Ok(0)
}

pub fn sys_getdents64(fd: i32, dirp: *mut u8, count: usize) -> Result<isize> {
    if dirp.is_null() {
        return Err(Errno::EFAULT);
    }
    let file = current_file(fd)?;
    let inode = file.inode.as_ref().ok_or(Errno::EBADF)?;
    if !inode.is_dir() {
        return Err(Errno::ENOTDIR);
    }

    let entries = inode.readdir()?;
    let mut offset = 0usize;
    for entry in entries {
        let name_bytes = entry.name.as_bytes();
        let reclen = ((19 + name_bytes.len() + 1 + 7) & !7) as u16;
        if offset + reclen as usize > count {
            break;
        }
        unsafe {
            let p = dirp.add(offset);
            *(p as *mut u64) = entry.ino;
            *(p.add(8) as *mut i64) = 0;
            *(p.add(16) as *mut u16) = reclen;
            *p.add(18) = match entry.itype {
                crate::vfs::InodeType::Regular => 8,
                crate::vfs::InodeType::Directory => 4,
                crate::vfs::InodeType::CharDevice => 2,
                crate::vfs::InodeType::BlockDevice => 6,
                crate::vfs::InodeType::Symlink => 10,
            };
            core::ptr::copy_nonoverlapping(name_bytes.as_ptr(), p.add(19), name_bytes.len());
            *p.add(19 + name_bytes.len()) = 0;
        }
        offset += reclen as usize;
    }
    Ok(offset as isize)
}

pub fn sys_mkdir(pathname: *const u8, mode: u32) -> Result<isize> {
    let path = copy_path_from_user(pathname)?;
    crate::vfs::mkdir(&path, mode)?;
    Ok(0)
}

pub fn sys_unlink(pathname: *const u8) -> Result<isize> {
    let path = copy_path_from_user(pathname)?;
    crate::vfs::unlink(&path)?;
    Ok(0)
}

pub fn sys_rmdir(pathname: *const u8) -> Result<isize> {
    let path = copy_path_from_user(pathname)?;
    crate::vfs::rmdir(&path)?;
    Ok(0)
}

pub fn sys_chdir(pathname: *const u8) -> Result<isize> {
    let path = copy_path_from_user(pathname)?;
    let _ = crate::vfs::open(&path, crate::vfs::OpenFlags::O_DIRECTORY)?;

    let pid = crate::process::current_pid();
    let mut table = crate::process::get_process_table();
    let table = table.as_mut().ok_or(Errno::ESRCH)?;
    let task = table.get_mut(pid).ok_or(Errno::ESRCH)?;
    task.cwd = path;
    Ok(0)
}

pub fn sys_getcwd(buf: *mut u8, size: usize) -> Result<isize> {
    if buf.is_null() {
        return Err(Errno::EFAULT);
    }
    let pid = crate::process::current_pid();
    let table = crate::process::get_process_table();
    let table = table.as_ref().ok_or(Errno::ESRCH)?;
    let task = table.get(pid).ok_or(Errno::ESRCH)?;

    let bytes = task.cwd.as_bytes();
    if bytes.len() + 1 > size {
        return Err(Errno::ERANGE);
    }
    unsafe {
        core::ptr::copy_nonoverlapping(bytes.as_ptr(), buf, bytes.len());
        *buf.add(bytes.len()) = 0;
    }
    Ok(bytes.len() as isize)
}

pub fn sys_dup2(oldfd: i32, newfd: i32) -> Result<isize> {
    let pid = crate::process::current_pid();
    let mut table = crate::process::get_process_table();
    let table = table.as_mut().ok_or(Errno::ESRCH)?;
    let task = table.get_mut(pid).ok_or(Errno::ESRCH)?;
    Ok(task.files.dup2(oldfd, newfd)? as isize)
}

pub fn sys_pipe(fds: *mut i32) -> Result<isize> {
    if fds.is_null() {
        return Err(Errno::EFAULT);
    }
    let (reader, writer) = crate::vfs::pipe::create_pipe();
    let read_file = alloc::sync::Arc::new(crate::vfs::File::from_pipe_reader(reader));
    let write_file = alloc::sync::Arc::new(crate::vfs::File::from_pipe_writer(writer));

    let pid = crate::process::current_pid();
    let mut table = crate::process::get_process_table();
    let table = table.as_mut().ok_or(Errno::ESRCH)?;
    let task = table.get_mut(pid).ok_or(Errno::ESRCH)?;

    let read_fd = task.files.alloc_fd(read_file)?;
    let write_fd = match task.files.alloc_fd(write_file) {
        Ok(fd) => fd,
        Err(e) => {
            task.files.close(read_fd).ok();
            return Err(e);
        }
    };

    unsafe {
        *fds = read_fd;
        *fds.add(1) = write_fd;
    }
    Ok(0)
}

pub fn sys_exit(code: i32) -> Result<isize> {
    let pid = crate::process::current_pid();
    crate::process::wait::do_exit(pid, code);
}

pub fn sys_getpid() -> Result<isize> {
    Ok(crate::process::current_pid() as isize)
}

/// Ticks (100ms each) to sleep for. Parks on a dedicated wait queue and
/// re-enables interrupts right after the enqueue commits so the timer
/// keeps advancing while this hart runs something else.
pub fn sys_sleep(ticks: u64) -> Result<isize> {
    let wake_at = crate::process::scheduler::ticks() + ticks;
    crate::process::scheduler::sleep_until(wake_at);
    Ok(0)
}

pub fn sys_yield() -> Result<isize> {
    crate::process::scheduler::yield_now();
    Ok(0)
}

pub fn sys_fork() -> Result<isize> {
    let parent_pid = crate::process::current_pid();
    let child_pid = crate::process::fork::do_fork(parent_pid)?;
    Ok(child_pid as isize)
}

pub fn sys_wait4(pid: i32, wstatus: *mut i32, options: i32) -> Result<isize> {
    let current_pid = crate::process::current_pid();
    let child_pid = crate::process::wait::do_wait4(current_pid, pid, wstatus, options)?;
    Ok(child_pid as isize)
}

pub fn sys_execve(pathname: *const u8, argv: *const *const u8, envp: *const *const u8) -> Result<isize> {
    use alloc::string::String;
    use alloc::vec::Vec;

    let current_pid = crate::process::current_pid();
    let path = copy_path_from_user(pathname)?;

    let read_arg_vec = |list: *const *const u8| -> Result<Vec<String>> {
        let mut out = Vec::new();
        if list.is_null() {
            return Ok(out);
        }
        for i in 0..1024 {
            let ptr = unsafe { *list.add(i) };
            if ptr.is_null() {
                return Ok(out);
            }
            out.push(copy_path_from_user(ptr)?);
        }
        Err(Errno::E2BIG)
    };

    let argv_vec = read_arg_vec(argv)?;
    let envp_vec = read_arg_vec(envp)?;

    let file = crate::vfs::open(&path, crate::vfs::OpenFlags::O_RDONLY)?;
    let inode = file.inode.as_ref().ok_or(Errno::ENOENT)?;
    let meta = inode.getattr()?;
    let file_size = meta.size as usize;
    if file_size > 16 * 1024 * 1024 {
        return Err(Errno::E2BIG);
    }

    let mut elf_data = Vec::with_capacity(file_size);
    elf_data.resize(file_size, 0);
    let bytes_read = inode.read(0, &mut elf_data)?;
    elf_data.truncate(bytes_read);

    let mut table = crate::process::get_process_table();
    let table = table.as_mut().ok_or(Errno::ESRCH)?;
    let task = table.get_mut(current_pid).ok_or(Errno::ESRCH)?;

    task.mm.vmas.clear();
    task.mm.brk = crate::mm::USER_HEAP_START;
    task.mm.brk_start = crate::mm::USER_HEAP_START;

    crate::process::exec::elf::load_elf(task, &elf_data, argv_vec, envp_vec)
        .map_err(Errno::from)?;

    crate::info!("execve: loaded {}", path);
    Ok(0)
}

pub fn sys_brk(addr: *const u8) -> Result<isize> {
    let pid = crate::process::current_pid();
    let mut table = crate::process::get_process_table();
    let table = table.as_mut().ok_or(Errno::ESRCH)?;
    let task = table.get_mut(pid).ok_or(Errno::ESRCH)?;
    Ok(task.mm.do_brk(addr as u64)? as isize)
}

pub fn sys_mmap(addr: *mut u8, length: usize, prot: i32, flags: i32) -> Result<isize> {
    let pid = crate::process::current_pid();
    let mut table = crate::process::get_process_table();
    let table = table.as_mut().ok_or(Errno::ESRCH)?;
    let task = table.get_mut(pid).ok_or(Errno::ESRCH)?;
    Ok(task.mm.do_mmap(addr as u64, length as u64, prot, flags)? as isize)
}

pub fn sys_munmap(addr: *mut u8, length: usize) -> Result<isize> {
    let pid = crate::process::current_pid();
    let mut table = crate::process::get_process_table();
    let table = table.as_mut().ok_or(Errno::ESRCH)?;
    let task = table.get_mut(pid).ok_or(Errno::ESRCH)?;
    task.mm.do_munmap(addr as u64, length as u64)?;
    Ok(0)
}

pub fn sys_signal(signum: u32, handler: u64) -> Result<isize> {
    let sig = crate::process::signal::Signal::from_u32(signum).ok_or(Errno::EINVAL)?;
    let action = match handler {
        crate::process::signal::SIG_DFL => sig.default_action(),
        crate::process::signal::SIG_IGN => crate::process::signal::SignalAction::Ignore,
        addr => crate::process::signal::SignalAction::Handler(addr),
    };

    let pid = crate::process::current_pid();
    let mut table = crate::process::get_process_table();
    let table = table.as_mut().ok_or(Errno::ESRCH)?;
    let task = table.get_mut(pid).ok_or(Errno::ESRCH)?;
    task.signals.set_handler(sig, action);
    Ok(0)
}

pub fn sys_sigaction(signum: u32, act: *const u8, oldact: *mut u8) -> Result<isize> {
    let sig = crate::process::signal::Signal::from_u32(signum).ok_or(Errno::EINVAL)?;
    let pid = crate::process::current_pid();
    let mut table = crate::process::get_process_table();
    let table = table.as_mut().ok_or(Errno::ESRCH)?;
    let task = table.get_mut(pid).ok_or(Errno::ESRCH)?;

    if !oldact.is_null() {
        let old = match task.signals.get_handler(sig) {
            crate::process::signal::SignalAction::Handler(addr) => addr,
            crate::process::signal::SignalAction::Ignore => crate::process::signal::SIG_IGN,
            _ => crate::process::signal::SIG_DFL,
        };
        unsafe { *(oldact as *mut crate::process::signal::SigAction) = crate::process::signal::SigAction { sa_handler: old, ..Default::default() } };
    }

    if !act.is_null() {
        let new = unsafe { *(act as *const crate::process::signal::SigAction) };
        sys_signal(signum, new.sa_handler)?;
    }
    Ok(0)
}

pub fn sys_sigreturn() -> Result<isize> {
    let pid = crate::process::current_pid();
    crate::process::signal::do_sigreturn(pid)?;
    Ok(0)
}

fn sync_mutex_mut(handle: i32) -> Result<&'static mut crate::process::sync::Mutex> {
    let ptr = crate::process::sync::object_ptr(handle)?;
    match unsafe { &mut *ptr } {
        crate::process::sync::SyncObject::Mutex(m) => Ok(m),
        _ => Err(Errno::EINVAL),
    }
}

fn sync_sem_mut(handle: i32) -> Result<&'static mut crate::process::sync::Semaphore> {
    let ptr = crate::process::sync::object_ptr(handle)?;
    match unsafe { &mut *ptr } {
        crate::process::sync::SyncObject::Semaphore(s) => Ok(s),
        _ => Err(Errno::EINVAL),
    }
}

fn sync_cond_mut(handle: i32) -> Result<&'static mut crate::process::sync::CondVar> {
    let ptr = crate::process::sync::object_ptr(handle)?;
    match unsafe { &mut *ptr } {
        crate::process::sync::SyncObject::CondVar(c) => Ok(c),
        _ => Err(Errno::EINVAL),
    }
}

fn sync_rwlock_mut(handle: i32) -> Result<&'static mut crate::process::sync::RwLock> {
    let ptr = crate::process::sync::object_ptr(handle)?;
    match unsafe { &mut *ptr } {
        crate::process::sync::SyncObject::RwLock(l) => Ok(l),
        _ => Err(Errno::EINVAL),
    }
}

pub fn sys_mutex_create() -> Result<isize> {
    Ok(crate::process::sync::create(crate::process::sync::SyncObject::Mutex(crate::process::sync::Mutex::new()))? as isize)
}

pub fn sys_mutex_lock(handle: i32) -> Result<isize> {
    sync_mutex_mut(handle)?.lock();
    Ok(0)
}

pub fn sys_mutex_unlock(handle: i32) -> Result<isize> {
    sync_mutex_mut(handle)?.unlock()?;
    Ok(0)
}

pub fn sys_sem_create(initial: i32) -> Result<isize> {
    Ok(crate::process::sync::create(crate::process::sync::SyncObject::Semaphore(crate::process::sync::Semaphore::new(initial)))? as isize)
}

pub fn sys_sem_wait(handle: i32) -> Result<isize> {
    sync_sem_mut(handle)?.wait();
    Ok(0)
}

pub fn sys_sem_post(handle: i32) -> Result<isize> {
    sync_sem_mut(handle)?.signal();
    Ok(0)
}

pub fn sys_cond_create() -> Result<isize> {
    Ok(crate::process::sync::create(crate::process::sync::SyncObject::CondVar(crate::process::sync::CondVar::new()))? as isize)
}

pub fn sys_cond_wait(cond_handle: i32, mutex_handle: i32) -> Result<isize> {
    let mutex = sync_mutex_mut(mutex_handle)?;
    sync_cond_mut(cond_handle)?.wait(mutex)?;
    Ok(0)
}

pub fn sys_cond_signal(handle: i32) -> Result<isize> {
    sync_cond_mut(handle)?.signal();
    Ok(0)
}

pub fn sys_cond_broadcast(handle: i32) -> Result<isize> {
    sync_cond_mut(handle)?.broadcast();
    Ok(0)
}

pub fn sys_rwlock_create() -> Result<isize> {
    Ok(crate::process::sync::create(crate::process::sync::SyncObject::RwLock(crate::process::sync::RwLock::new()))? as isize)
}

pub fn sys_rwlock_rdlock(handle: i32) -> Result<isize> {
    sync_rwlock_mut(handle)?.read_lock();
    Ok(0)
}

pub fn sys_rwlock_wrlock(handle: i32) -> Result<isize> {
    sync_rwlock_mut(handle)?.write_lock();
    Ok(0)
}

pub fn sys_sync_destroy(handle: i32) -> Result<isize> {
    crate::process::sync::destroy(handle)?;
    Ok(0)
}

pub fn sys_poweroff() -> Result<isize> {
    crate::platform::firmware_shutdown();
    Ok(0)
}

pub fn sys_reboot() -> Result<isize> {
    crate::platform::firmware_reboot();
    Ok(0)
}
