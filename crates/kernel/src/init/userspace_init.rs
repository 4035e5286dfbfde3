//! Construct PID 1 and hand it to the scheduler.
//!
//! There is no userland binary bundled with this kernel; loading and execing
//! a real init program is an external collaborator's job, reached through
//! the same `process::exec::elf::load_elf` path a later `execve` syscall
//! uses. What this phase builds directly is the minimal trampoline needed to
//! prove that boot path end to end: one mapped, executable user page
//! containing `ecall; j .`, which exits with status 0 the first time it's
//! scheduled.

use crate::arch::TrapFrame;
use crate::lib::error::KernelError as MmError;
use crate::mm::{self, PteFlags, PAGE_SIZE};
use crate::process::{self, ProcessState, Task, Vma, VmaFlags};

use super::error::{KernelError, KernelResult};

/// `ecall` followed by `j .`. `a0`/`a7` are both 0 in a freshly built
/// `TrapFrame`, so the bare `ecall` invokes `SYS_EXIT(0)` with no register
/// setup needed; the jump-to-self after it is never reached since
/// `sys_exit` doesn't return, but guards against anything that changes.
const INIT_TRAMPOLINE: [u8; 8] = [
    0x73, 0x00, 0x00, 0x00, // ecall
    0x6f, 0x00, 0x00, 0x00, // j .
];

const INIT_TEXT_BASE: u64 = 0x0001_0000;

/// Build PID 1: a fresh address space with the trampoline above mapped
/// executable at `INIT_TEXT_BASE`, a stack VMA, and a trap frame pointed at
/// it. Marks it `Ready` and enqueues it on the scheduler.
pub fn spawn_init_process() -> KernelResult<()> {
    let mut task = Task::new_init();

    map_trampoline(&mut task)
        .map_err(|_| KernelError::UserspaceInit("failed to map init trampoline"))?;
    task.mm
        .setup_stack()
        .map_err(|_| KernelError::UserspaceInit("failed to set up init stack"))?;

    task.trap_frame = TrapFrame::new_user(INIT_TEXT_BASE, mm::USER_STACK_TOP);
    task.prepare_first_run();
    task.state = ProcessState::Ready;

    process::insert_task(task)
        .map_err(|_| KernelError::UserspaceInit("failed to insert init into process table"))?;
    process::scheduler::enqueue(1);

    crate::info!("init: pid 1 ready, entry={:#x}", INIT_TEXT_BASE);
    Ok(())
}

fn map_trampoline(task: &mut Task) -> Result<(), MmError> {
    let page = mm::alloc_page().ok_or(MmError::OutOfMemory)?;
    unsafe {
        core::ptr::write_bytes(page as *mut u8, 0, PAGE_SIZE);
        core::ptr::copy_nonoverlapping(INIT_TRAMPOLINE.as_ptr(), page as *mut u8, INIT_TRAMPOLINE.len());
    }

    task.mm.insert_vma(Vma {
        start: INIT_TEXT_BASE,
        end: INIT_TEXT_BASE + PAGE_SIZE as u64,
        flags: VmaFlags::READ | VmaFlags::EXEC | VmaFlags::USER,
        offset: 0,
    })?;

    let mut alloc = || mm::alloc_page();
    mm::map_page(task.mm.page_table, INIT_TEXT_BASE, page, PteFlags::user_rx(), &mut alloc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trampoline_is_ecall_then_self_jump() {
        assert_eq!(u32::from_le_bytes(INIT_TRAMPOLINE[0..4].try_into().unwrap()), 0x0000_0073);
        assert_eq!(u32::from_le_bytes(INIT_TRAMPOLINE[4..8].try_into().unwrap()), 0x0000_006f);
    }
}
