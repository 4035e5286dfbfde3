//! Kernel heap allocator.
//!
//! A `linked_list_allocator` backed global allocator for everyday `alloc::format!`/
//! `Box`/`Vec` sized requests, with a large-allocation fast path that backs
//! multi-page requests directly with buddy-allocated pages instead of
//! fragmenting the linked-list heap.

use core::alloc::{GlobalAlloc, Layout};
use core::sync::atomic::{AtomicBool, Ordering};
use linked_list_allocator::LockedHeap;
use spin::Mutex;

use crate::mm;

#[repr(align(64))]
struct CacheAlignedArray([u8; HEAP_SIZE]);

static ALLOCATOR: LockedHeap = LockedHeap::empty();

const HEAP_START: usize = 0x444_44440_0000;
const HEAP_SIZE: usize = 8 * 1024 * 1024;

pub const fn heap_total_size() -> usize {
    HEAP_SIZE
}

static HEAP_INIT_DONE: AtomicBool = AtomicBool::new(false);

/// Initialize the kernel heap. Idempotent; the second and later calls are a no-op.
pub fn init_heap() -> Result<(), &'static str> {
    if HEAP_INIT_DONE
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_ok()
    {
        unsafe {
            static mut HEAP_MEMORY: CacheAlignedArray = CacheAlignedArray([0; HEAP_SIZE]);
            let heap_arr_ptr = core::ptr::addr_of_mut!(HEAP_MEMORY) as *mut CacheAlignedArray;
            let heap_start = core::ptr::addr_of_mut!((*heap_arr_ptr).0) as *mut u8;
            ALLOCATOR.lock().init(heap_start, HEAP_SIZE);
        }
        crate::info!("heap: {} KiB at {:#x}", HEAP_SIZE / 1024, HEAP_START);
    }
    Ok(())
}

pub struct HeapStats {
    total_allocations: usize,
    total_deallocations: usize,
    current_allocated: usize,
    peak_allocated: usize,
    allocation_failures: usize,
}

impl HeapStats {
    pub fn total_allocations(&self) -> usize { self.total_allocations }
    pub fn total_deallocations(&self) -> usize { self.total_deallocations }
    pub fn current_allocated(&self) -> usize { self.current_allocated }
    pub fn peak_allocated(&self) -> usize { self.peak_allocated }
    pub fn allocation_failures(&self) -> usize { self.allocation_failures }
}

static HEAP_STATS: Mutex<HeapStats> = Mutex::new(HeapStats {
    total_allocations: 0,
    total_deallocations: 0,
    current_allocated: 0,
    peak_allocated: 0,
    allocation_failures: 0,
});

struct StatsTrackingAllocator;

const LARGE_ALLOC_THRESHOLD: usize = 1024 * 1024;

unsafe impl GlobalAlloc for StatsTrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = if layout.size() >= LARGE_ALLOC_THRESHOLD {
            large_alloc(layout)
        } else {
            ALLOCATOR.alloc(layout)
        };

        let mut stats = HEAP_STATS.lock();
        if !ptr.is_null() {
            stats.total_allocations += 1;
            stats.current_allocated += layout.size();
            if stats.current_allocated > stats.peak_allocated {
                stats.peak_allocated = stats.current_allocated;
            }
        } else {
            stats.allocation_failures += 1;
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        let mut stats = HEAP_STATS.lock();
        stats.total_deallocations += 1;
        stats.current_allocated = stats.current_allocated.saturating_sub(layout.size());
        drop(stats);

        if large_dealloc(ptr) {
            return;
        }
        ALLOCATOR.dealloc(ptr, layout);
    }
}

#[global_allocator]
static GLOBAL_ALLOC: StatsTrackingAllocator = StatsTrackingAllocator;

#[alloc_error_handler]
fn alloc_error_handler(layout: Layout) -> ! {
    unsafe {
        crate::uart_print(b"[HEAP] allocation error: size=");
        print_number(layout.size());
        crate::uart_print(b" align=");
        print_number(layout.align());
        crate::uart_print(b"\n");
    }
    loop {}
}

/// Non-allocating decimal printer, used only from the OOM path where the
/// heap itself cannot be trusted.
unsafe fn print_number(mut num: usize) {
    if num == 0 {
        crate::uart_print(b"0");
        return;
    }
    let mut digits = [0u8; 20];
    let mut i = 0;
    while num > 0 {
        digits[i] = b'0' + (num % 10) as u8;
        num /= 10;
        i += 1;
    }
    while i > 0 {
        i -= 1;
        crate::uart_print(&[digits[i]]);
    }
}

const LARGE_MAGIC: u64 = 0x4C41_5247_5F41_4C4C;

#[repr(C)]
struct LargeAllocHeader {
    magic: u64,
    phys: u64,
    pages: u64,
}

fn align_up(value: usize, align: usize) -> usize {
    let a = align.max(1);
    (value + a - 1) & !(a - 1)
}

unsafe fn large_alloc(layout: Layout) -> *mut u8 {
    let header_size = core::mem::size_of::<LargeAllocHeader>();
    let align_req = layout.align().min(mm::PAGE_SIZE);
    let need = layout.size().saturating_add(header_size).saturating_add(align_req);
    let pages = (need + mm::PAGE_SIZE - 1) / mm::PAGE_SIZE;
    let phys = match mm::alloc_pages(pages) {
        Some(p) => p,
        None => return core::ptr::null_mut(),
    };
    let base = phys as usize;
    let ret_ptr = align_up(base + header_size, align_req);
    let header_ptr = (ret_ptr - header_size) as *mut LargeAllocHeader;
    core::ptr::write(header_ptr, LargeAllocHeader { magic: LARGE_MAGIC, phys, pages: pages as u64 });
    ret_ptr as *mut u8
}

unsafe fn large_dealloc(ptr: *mut u8) -> bool {
    if ptr.is_null() {
        return false;
    }
    let header_size = core::mem::size_of::<LargeAllocHeader>();
    let header_ptr = (ptr as usize - header_size) as *const LargeAllocHeader;
    let hdr = &*header_ptr;
    if hdr.magic != LARGE_MAGIC {
        return false;
    }
    mm::free_pages(hdr.phys, hdr.pages as usize);
    true
}

pub fn get_heap_stats() -> HeapStats {
    let stats = HEAP_STATS.lock();
    HeapStats {
        total_allocations: stats.total_allocations,
        total_deallocations: stats.total_deallocations,
        current_allocated: stats.current_allocated,
        peak_allocated: stats.peak_allocated,
        allocation_failures: stats.allocation_failures,
    }
}

pub fn is_valid_heap_ptr(ptr: *const u8, size: usize) -> bool {
    let addr = ptr as usize;
    addr >= HEAP_START && addr.saturating_add(size) <= HEAP_START + HEAP_SIZE
}
