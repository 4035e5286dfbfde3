/// Page fault handling.
///
/// Handles the three RISC-V page-fault exceptions (instruction/load/store)
/// by lazily backing the faulting address from its VMA. There is no
/// copy-on-write here: fork duplicates every page up front, so a fault ever
/// reaching a mapped VMA with no backing page always means "allocate and
/// zero a fresh frame", never "split a shared page".

use crate::arch::TrapFrame;
use crate::process::{current_pid, get_process_table};
use crate::lib::error::Errno;
use super::paging::{PteFlags, map_page, flush_tlb, PAGE_SIZE};
use super::bitmap::alloc_page;

/// scause exception codes for the three page-fault causes.
pub const SCAUSE_INSTRUCTION_PAGE_FAULT: u64 = 12;
pub const SCAUSE_LOAD_PAGE_FAULT: u64 = 13;
pub const SCAUSE_STORE_PAGE_FAULT: u64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultType {
    InstructionFetch,
    Load,
    Store,
}

pub fn parse_fault_type(scause: u64) -> Option<FaultType> {
    match scause {
        SCAUSE_INSTRUCTION_PAGE_FAULT => Some(FaultType::InstructionFetch),
        SCAUSE_LOAD_PAGE_FAULT => Some(FaultType::Load),
        SCAUSE_STORE_PAGE_FAULT => Some(FaultType::Store),
        _ => None,
    }
}

pub fn is_write_fault(fault_type: FaultType) -> bool {
    fault_type == FaultType::Store
}

/// Handle a page fault trapped at `stval` (the faulting virtual address).
/// Called from the trap handler when scause is one of the page-fault codes.
pub fn handle_page_fault(_frame: &mut TrapFrame, stval: u64, scause: u64) -> Result<(), Errno> {
    let fault_type = parse_fault_type(scause).ok_or(Errno::EFAULT)?;
    let is_write = is_write_fault(fault_type);

    crate::debug!("page fault at {:#x}: {:?}, write={}", stval, fault_type, is_write);

    let pid = current_pid();
    let mut table = get_process_table();
    let table = table.as_mut().ok_or(Errno::ESRCH)?;
    let task = table.get_mut(pid).ok_or(Errno::ESRCH)?;

    let vma = task.mm.find_vma(stval).ok_or_else(|| {
        crate::warn!("page fault: no VMA for address {:#x}", stval);
        Errno::EFAULT
    })?;

    if is_write && !vma.flags.contains(crate::process::VmaFlags::WRITE) {
        return Err(Errno::EFAULT);
    }

    let vma_flags = vma.flags;
    handle_lazy_fault(task, stval, task.mm.page_table, vma_flags)
}

/// Back a faulting address with a freshly allocated, zeroed page.
fn handle_lazy_fault(
    task: &mut crate::process::Task,
    fault_addr: u64,
    page_table: u64,
    vma_flags: crate::process::VmaFlags,
) -> Result<(), Errno> {
    let page_addr = fault_addr & !(PAGE_SIZE as u64 - 1);

    let phys_page = alloc_page().ok_or(Errno::ENOMEM)?;
    unsafe {
        core::ptr::write_bytes(phys_page as *mut u8, 0, PAGE_SIZE);
    }

    let pte_flags = if vma_flags.contains(crate::process::VmaFlags::WRITE) {
        PteFlags::user_rw()
    } else if vma_flags.contains(crate::process::VmaFlags::EXEC) {
        PteFlags::user_rx()
    } else {
        PteFlags::user_ro()
    };

    let _ = task;
    let mut alloc = || super::bitmap::alloc_page();
    map_page(page_table, page_addr, phys_page, pte_flags, &mut alloc).map_err(|_| Errno::ENOMEM)?;
    flush_tlb(page_addr);

    crate::debug!("lazy fault: backed {:#x} with frame {:#x}", page_addr, phys_page);
    Ok(())
}
