//! `wait4`/`waitpid` and `exit`.

use super::task::{Pid, ProcessState};
use super::pid::get_process_table;
use crate::lib::error::Errno;
use alloc::vec;
use alloc::vec::Vec;

pub const WNOHANG: i32 = 1;
pub const WUNTRACED: i32 = 2;
pub const WCONTINUED: i32 = 8;

pub fn w_exitcode(exit_code: i32, signal: i32) -> i32 {
    (exit_code << 8) | (signal & 0x7f)
}

/// `pid > 0` waits for that one child, `pid == -1` for any child. Process
/// groups (`pid == 0`, `pid < -1`) are not implemented. Blocks on the
/// caller's own `child_wait` queue — `exit` wakes it — unless `WNOHANG` is
/// set, in which case an empty result comes back as `Ok(0)` immediately.
pub fn do_wait4(current_pid: Pid, pid: i32, wstatus: *mut i32, options: i32) -> Result<Pid, Errno> {
    loop {
        let reaped = {
            let mut table = get_process_table();
            let tbl = table.as_mut().ok_or(Errno::ESRCH)?;

            let children: Vec<Pid> = if pid > 0 {
                vec![pid as Pid]
            } else if pid == -1 {
                tbl.find_children(current_pid)
            } else {
                return Err(Errno::EINVAL);
            };

            if children.is_empty() {
                return Err(Errno::ECHILD);
            }

            let mut found = None;
            for child_pid in children {
                if let Some(child) = tbl.get(child_pid) {
                    if child.is_zombie() {
                        found = Some((child.pid, child.exit_code));
                        break;
                    }
                }
            }

            match found {
                Some((child_pid, exit_code)) => {
                    tbl.remove(child_pid);
                    Some((child_pid, exit_code))
                }
                None => {
                    if (options & WNOHANG) != 0 {
                        return Ok(0);
                    }
                    let current = tbl.get_mut(current_pid).ok_or(Errno::ESRCH)?;
                    current.child_wait.enqueue_current(current_pid, &mut current.state);
                    None
                }
            }
        };

        if let Some((child_pid, exit_code)) = reaped {
            if !wstatus.is_null() {
                if (wstatus as u64) >= 0xFFFF_0000_0000_0000 {
                    return Err(Errno::EFAULT);
                }
                unsafe { *wstatus = w_exitcode(exit_code, 0) };
            }
            return Ok(child_pid);
        }

        crate::lib::critical::enable();
        crate::process::scheduler::schedule();
    }
}

/// Mark the current process `Zombie`, reparent its children to init, wake
/// its parent's `wait4`, and hand the CPU to the scheduler forever. Never
/// returns.
pub fn do_exit(current_pid: Pid, exit_code: i32) -> ! {
    let ppid = {
        let mut table = get_process_table();
        let tbl = table.as_mut().expect("process table not initialized");

        let ppid = tbl.get(current_pid).map(|t| t.ppid).unwrap_or(0);

        if let Some(task) = tbl.get_mut(current_pid) {
            task.exit(exit_code);
            crate::info!("process {} exited with code {}", current_pid, exit_code);
        }

        tbl.reparent_to_init(current_pid);
        ppid
    };

    if ppid != 0 {
        crate::process::signal::send_signal(ppid, crate::process::signal::Signal::SIGCHLD).ok();
        let woken: Vec<Pid> = {
            let mut table = get_process_table();
            table
                .as_mut()
                .and_then(|tbl| tbl.get_mut(ppid))
                .map(|parent| parent.child_wait.drain().collect())
                .unwrap_or_default()
        };
        for pid in woken {
            super::wake_pid(pid);
        }
    }

    crate::process::scheduler::schedule();

    loop {
        unsafe {
            core::arch::asm!("wfi", options(nostack, preserves_flags));
        }
    }
}
