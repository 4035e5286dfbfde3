/// Memory management subsystem
///
/// Bitmap-backed physical frame allocator, Sv39 page tables, virtual memory
/// areas, lazy-fault handling, and the page-table duplication fork needs for
/// an eager (non-COW) address-space copy.

pub mod page;
pub mod bitmap;
pub mod paging;
pub mod address_space;
pub mod fault;
pub mod pagetable;

use crate::lib::error::KernelError;

// Re-export commonly used items
pub use page::{
    PhysAddr, Pfn, Page, PageFlags,
    pa_to_pfn, pfn_to_pa,
    page_align_down, page_align_up,
};

pub use bitmap::{
    init_bitmap, alloc_page, alloc_pages,
    free_page, free_pages, get_stats,
    AllocStats,
};

pub use paging::{
    PAGE_SIZE, PAGE_SHIFT, KERNEL_BASE,
    PteFlags, Pte, PageTable,
    map_page, unmap_page,
    flush_tlb, flush_tlb_all,
};

pub use address_space::{
    USER_STACK_TOP, USER_STACK_SIZE,
    USER_HEAP_START, USER_MMAP_BASE,
};

pub use fault::{handle_page_fault, FaultType};

pub use pagetable::{duplicate_user_page_table, free_page_table, get_page_table_stats};

/// Allocate and zero a single page to serve as a fresh user root page table.
pub fn alloc_user_page_table() -> Result<u64, KernelError> {
    let pa = alloc_page().ok_or(KernelError::OutOfMemory)?;
    unsafe {
        core::ptr::write_bytes(pa as *mut u8, 0, PAGE_SIZE);
    }
    Ok(pa)
}
