//! Wall-clock reads and the timer-interrupt interval, via the `time` CSR
//! and the SBI firmware call interface (Timer extension, falling back to
//! the legacy `set_timer` call if the firmware doesn't advertise it).

use core::sync::atomic::{AtomicU64, Ordering};

/// QEMU virt's `riscv,clint0` ticks at 10MHz.
const TIMER_FREQ_HZ: u64 = 10_000_000;
/// Default preemption interval (spec's firmware-call section default).
const TICK_INTERVAL_MS: u64 = 100;

static BOOT_TIME: AtomicU64 = AtomicU64::new(0);

fn read_time_csr() -> u64 {
    let value: u64;
    unsafe { core::arch::asm!("rdtime {}", out(reg) value) };
    value
}

const SBI_EXT_TIME: u64 = 0x54494D45; // "TIME"
const SBI_EXT_LEGACY_SET_TIMER: u64 = 0x00;

fn sbi_call(ext: u64, func: u64, arg0: u64) -> i64 {
    let error: i64;
    unsafe {
        core::arch::asm!(
            "ecall",
            inlateout("a0") arg0 => error,
            in("a6") func,
            in("a7") ext,
        );
    }
    error
}

/// Arm the timer comparator for one tick interval from now. Tries the
/// modern Time extension (`sbi_set_timer`, func 0) first; if the firmware
/// returns `SBI_ERR_NOT_SUPPORTED` falls back to the legacy `set_timer`
/// ecall, which every SBI implementation is required to support.
pub fn reprogram_next_tick() {
    let deadline = read_time_csr() + TIMER_FREQ_HZ * TICK_INTERVAL_MS / 1000;
    if sbi_call(SBI_EXT_TIME, 0, deadline) != 0 {
        sbi_call(SBI_EXT_LEGACY_SET_TIMER, 0, deadline);
    }
}

/// Microseconds since the `time` CSR started counting (platform boot).
pub fn get_timestamp_us() -> u64 {
    read_time_csr() * 1_000_000 / TIMER_FREQ_HZ
}

pub fn init_boot_timestamp() {
    BOOT_TIME.store(get_timestamp_us(), Ordering::Relaxed);
}

pub fn get_time_since_boot_us() -> u64 {
    get_timestamp_us().saturating_sub(BOOT_TIME.load(Ordering::Relaxed))
}

pub fn get_time_since_boot_ms() -> u64 {
    get_time_since_boot_us() / 1000
}

pub fn get_uptime_ms() -> u64 {
    get_time_since_boot_ms()
}

/// Busy-wait for the given number of microseconds using the `time` CSR.
pub fn sleep_us(us: u64) {
    let start = get_timestamp_us();
    while get_timestamp_us().saturating_sub(start) < us {
        core::hint::spin_loop();
    }
}
