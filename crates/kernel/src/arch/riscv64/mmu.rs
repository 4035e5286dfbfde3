//! SATP activation and the kernel's own identity-mapped page table.
//!
//! The page-table format itself (PTE layout, the three-level walk) lives in
//! `mm::paging` so user address spaces and the kernel's own mapping share
//! one implementation; this module only owns what is specific to turning a
//! table's physical address into a live translation: the `satp` CSR and TLB
//! maintenance around it.

use crate::mm::paging::{PageTable, PteFlags, map_page, flush_tlb_all, PAGE_SIZE};
use crate::mm::bitmap::alloc_page;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MmuError {
    OutOfMemory,
    AlreadyMapped,
}

/// satp MODE field values (RISC-V privileged spec table 4.3).
const SATP_MODE_SV39: u64 = 8;

static mut KERNEL_ROOT: u64 = 0;

/// Build the kernel's identity-mapped page table covering the first 64MB of
/// RAM (enough for kernel text/data/heap plus early page-table bookkeeping)
/// and activate it.
pub fn init_mmu() -> Result<(), MmuError> {
    let root = alloc_page().ok_or(MmuError::OutOfMemory)?;
    unsafe {
        core::ptr::write_bytes(root as *mut u8, 0, PAGE_SIZE);
    }

    let kernel_start: u64 = 0x8000_0000;
    let identity_map_size: u64 = 64 * 1024 * 1024;
    let mut alloc = || alloc_page();

    let mut off = 0u64;
    while off < identity_map_size {
        let addr = kernel_start + off;
        map_page(root, addr, addr, PteFlags::kernel_rw(), &mut alloc).map_err(|_| MmuError::AlreadyMapped)?;
        off += PAGE_SIZE as u64;
    }

    unsafe {
        KERNEL_ROOT = root;
    }
    activate(root, 0);
    Ok(())
}

/// Point `satp` at `root` (physical address of an Sv39 root table) with the
/// given ASID, then flush every TLB entry.
pub fn activate(root: u64, asid: u16) {
    let ppn = root >> 12;
    let satp = (SATP_MODE_SV39 << 60) | ((asid as u64) << 44) | ppn;
    unsafe {
        core::arch::asm!("csrw satp, {}", in(reg) satp);
    }
    flush_tlb_all();
}

pub fn kernel_root() -> u64 {
    unsafe { KERNEL_ROOT }
}

#[allow(dead_code)]
fn _assert_page_table_size() {
    let _: [u8; 4096] = [0; core::mem::size_of::<PageTable>()];
}
