/// Bitmap physical page frame allocator.
///
/// One bit per 4KB frame over a fixed-size RAM region. Allocation scans for
/// runs of free bits; this is simple rather than fast, which is fine for a
/// kernel that never needs to allocate more than a few hundred frames at once.

use core::sync::atomic::{AtomicUsize, Ordering};
use spin::Mutex;
use super::page::{PAGE_SIZE, PhysAddr};

/// Physical RAM window managed by the allocator (QEMU virt default: 128MB at 0x8000_0000).
const RAM_BASE: u64 = 0x8000_0000;
const RAM_SIZE: u64 = 128 * 1024 * 1024;
const FRAME_COUNT: usize = (RAM_SIZE / PAGE_SIZE as u64) as usize;
const WORDS: usize = FRAME_COUNT.div_ceil(64);

struct Bitmap {
    words: [u64; WORDS],
    next_hint: usize,
}

impl Bitmap {
    const fn new() -> Self {
        Self {
            words: [0; WORDS],
            next_hint: 0,
        }
    }

    fn is_set(&self, frame: usize) -> bool {
        (self.words[frame / 64] >> (frame % 64)) & 1 != 0
    }

    fn set(&mut self, frame: usize) {
        self.words[frame / 64] |= 1 << (frame % 64);
    }

    fn clear(&mut self, frame: usize) {
        self.words[frame / 64] &= !(1 << (frame % 64));
    }

    fn alloc_one(&mut self) -> Option<usize> {
        for offset in 0..FRAME_COUNT {
            let frame = (self.next_hint + offset) % FRAME_COUNT;
            if !self.is_set(frame) {
                self.set(frame);
                self.next_hint = (frame + 1) % FRAME_COUNT;
                return Some(frame);
            }
        }
        None
    }

    fn alloc_run(&mut self, count: usize) -> Option<usize> {
        if count == 1 {
            return self.alloc_one();
        }
        let mut run_start = 0;
        let mut run_len = 0;
        for frame in 0..FRAME_COUNT {
            if self.is_set(frame) {
                run_len = 0;
                run_start = frame + 1;
            } else {
                run_len += 1;
                if run_len == count {
                    for f in run_start..run_start + count {
                        self.set(f);
                    }
                    return Some(run_start);
                }
            }
        }
        None
    }
}

static BITMAP: Mutex<Bitmap> = Mutex::new(Bitmap::new());

static TOTAL_ALLOCS: AtomicUsize = AtomicUsize::new(0);
static TOTAL_FREES: AtomicUsize = AtomicUsize::new(0);
static ALLOC_FAILURES: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug, Clone, Copy, Default)]
pub struct AllocStats {
    pub total_allocations: usize,
    pub total_frees: usize,
    pub allocation_failures: usize,
    pub frames_total: usize,
    pub frames_free: usize,
}

fn frame_to_phys(frame: usize) -> PhysAddr {
    RAM_BASE + (frame * PAGE_SIZE) as u64
}

fn phys_to_frame(pa: PhysAddr) -> Option<usize> {
    if pa < RAM_BASE || pa >= RAM_BASE + RAM_SIZE {
        return None;
    }
    Some(((pa - RAM_BASE) / PAGE_SIZE as u64) as usize)
}

/// Reserve the frames backing the kernel image itself so they are never handed out.
pub fn init_bitmap(kernel_end: PhysAddr) {
    let reserved_frames = phys_to_frame(kernel_end.max(RAM_BASE)).unwrap_or(0);
    let mut bitmap = BITMAP.lock();
    for frame in 0..reserved_frames.min(FRAME_COUNT) {
        bitmap.set(frame);
    }
}

pub fn alloc_page() -> Option<PhysAddr> {
    let mut bitmap = BITMAP.lock();
    match bitmap.alloc_one() {
        Some(frame) => {
            TOTAL_ALLOCS.fetch_add(1, Ordering::Relaxed);
            Some(frame_to_phys(frame))
        }
        None => {
            ALLOC_FAILURES.fetch_add(1, Ordering::Relaxed);
            None
        }
    }
}

/// Allocate `count` contiguous pages.
pub fn alloc_pages(count: usize) -> Option<PhysAddr> {
    if count == 0 {
        return None;
    }
    let mut bitmap = BITMAP.lock();
    match bitmap.alloc_run(count) {
        Some(frame) => {
            TOTAL_ALLOCS.fetch_add(count, Ordering::Relaxed);
            Some(frame_to_phys(frame))
        }
        None => {
            ALLOC_FAILURES.fetch_add(1, Ordering::Relaxed);
            None
        }
    }
}

pub fn free_page(pa: PhysAddr) {
    free_pages(pa, 1);
}

pub fn free_pages(pa: PhysAddr, count: usize) {
    let Some(start_frame) = phys_to_frame(pa) else {
        crate::error!("free_pages: {:#x} outside managed RAM", pa);
        return;
    };
    let mut bitmap = BITMAP.lock();
    for frame in start_frame..start_frame + count {
        if frame < FRAME_COUNT {
            bitmap.clear(frame);
        }
    }
    TOTAL_FREES.fetch_add(count, Ordering::Relaxed);
}

pub fn get_stats() -> AllocStats {
    let bitmap = BITMAP.lock();
    let free_frames = (0..FRAME_COUNT).filter(|&f| !bitmap.is_set(f)).count();
    AllocStats {
        total_allocations: TOTAL_ALLOCS.load(Ordering::Relaxed),
        total_frees: TOTAL_FREES.load(Ordering::Relaxed),
        allocation_failures: ALLOC_FAILURES.load(Ordering::Relaxed),
        frames_total: FRAME_COUNT,
        frames_free: free_frames,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_then_free_reuses_frame() {
        let mut bitmap = Bitmap::new();
        let frame = bitmap.alloc_one().unwrap();
        bitmap.clear(frame);
        let frame2 = bitmap.alloc_one().unwrap();
        assert_eq!(frame, frame2);
    }

    #[test]
    fn alloc_run_finds_contiguous_frames() {
        let mut bitmap = Bitmap::new();
        bitmap.set(0);
        let start = bitmap.alloc_run(4).unwrap();
        assert_eq!(start, 1);
        for f in 1..5 {
            assert!(bitmap.is_set(f));
        }
    }

    #[test]
    fn phys_frame_round_trip() {
        let pa = RAM_BASE + 4096 * 10;
        let frame = phys_to_frame(pa).unwrap();
        assert_eq!(frame_to_phys(frame), pa);
    }
}
