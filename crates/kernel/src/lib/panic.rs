// Panic handler: forensic dump to the console before halting.

use core::panic::PanicInfo;
use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Prevents recursive panics from clobbering the dump in progress.
static PANICKING: AtomicBool = AtomicBool::new(false);

static PANIC_COUNT: AtomicU64 = AtomicU64::new(0);

pub fn panic_handler(info: &PanicInfo) -> ! {
    if PANICKING.swap(true, Ordering::SeqCst) {
        unsafe {
            crate::uart_print(b"\n!!! RECURSIVE PANIC !!!\n");
        }
        halt();
    }

    let panic_num = PANIC_COUNT.fetch_add(1, Ordering::SeqCst) + 1;

    disable_interrupts();

    print_panic_header(panic_num);
    print_panic_info(info);
    print_registers();
    print_system_state();
    print_recent_logs();
    print_next_steps();

    halt();
}

fn print_panic_header(panic_num: u64) {
    unsafe {
        crate::uart_print(b"\n");
        crate::uart_print(b"================================================================================\n");
        crate::uart_print(b"!!!                        KERNEL PANIC                                      !!!\n");
        crate::uart_print(b"================================================================================\n");

        if panic_num > 1 {
            let msg = alloc::format!("Panic #{}\n", panic_num);
            crate::uart_print(msg.as_bytes());
        }
        crate::uart_print(b"\n");
    }
}

fn print_panic_info(info: &PanicInfo) {
    unsafe {
        crate::uart_print(b"PANIC INFORMATION:\n");
        crate::uart_print(b"------------------\n");

        if let Some(location) = info.location() {
            let loc = alloc::format!("  Location: {}:{}:{}\n",
                location.file(), location.line(), location.column());
            crate::uart_print(loc.as_bytes());
        } else {
            crate::uart_print(b"  Location: <unknown>\n");
        }

        if let Some(payload) = info.payload().downcast_ref::<&str>() {
            let msg = alloc::format!("  Message:  {}\n", payload);
            crate::uart_print(msg.as_bytes());
        } else if let Some(payload) = info.payload().downcast_ref::<alloc::string::String>() {
            let msg = alloc::format!("  Message:  {}\n", payload);
            crate::uart_print(msg.as_bytes());
        } else {
            crate::uart_print(b"  Message:  <no message>\n");
        }

        crate::uart_print(b"\n");
    }
}

fn print_registers() {
    unsafe {
        crate::uart_print(b"REGISTER DUMP:\n");
        crate::uart_print(b"--------------\n");
        print_riscv64_registers();
        crate::uart_print(b"\n");
    }
}

fn print_riscv64_registers() {
    use core::arch::asm;

    unsafe {
        let mut ra: u64; let mut sp: u64; let mut gp: u64; let mut tp: u64;
        let mut sepc: u64; let mut sstatus: u64; let mut scause: u64; let mut stval: u64;

        asm!("mv {}, ra", out(reg) ra);
        asm!("mv {}, sp", out(reg) sp);
        asm!("mv {}, gp", out(reg) gp);
        asm!("mv {}, tp", out(reg) tp);
        asm!("csrr {}, sepc", out(reg) sepc);
        asm!("csrr {}, sstatus", out(reg) sstatus);
        asm!("csrr {}, scause", out(reg) scause);
        asm!("csrr {}, stval", out(reg) stval);

        let regs = alloc::format!(
            "  ra: {:016x}  sp: {:016x}  gp: {:016x}  tp: {:016x}\n\
             sepc: {:016x}  sstatus: {:016x}\n\
             scause: {:016x}  stval: {:016x}\n",
            ra, sp, gp, tp, sepc, sstatus, scause, stval
        );
        crate::uart_print(regs.as_bytes());
    }
}

fn print_system_state() {
    unsafe {
        crate::uart_print(b"SYSTEM STATE:\n");
        crate::uart_print(b"-------------\n");

        let uptime_ms = crate::time::get_uptime_ms();
        let uptime_sec = uptime_ms / 1000;
        let msg = alloc::format!("  Uptime:       {} seconds ({} ms)\n", uptime_sec, uptime_ms);
        crate::uart_print(msg.as_bytes());

        {
            let stats = crate::heap::get_heap_stats();
            let current_kb = stats.current_allocated() / 1024;
            let peak_kb = stats.peak_allocated() / 1024;
            let allocs = stats.total_allocations();
            let deallocs = stats.total_deallocations();
            let failures = stats.allocation_failures();
            let msg = alloc::format!(
                "  Heap usage:   {} KB current, {} KB peak\n\
                 Allocations: {} allocs, {} deallocs, {} active\n\
                 Failures:    {}\n",
                current_kb, peak_kb, allocs, deallocs,
                allocs.saturating_sub(deallocs), failures
            );
            crate::uart_print(msg.as_bytes());
        }

        let build_info = crate::build_info::get_version_string();
        let msg = alloc::format!("  Version:      {}\n", build_info);
        crate::uart_print(msg.as_bytes());

        crate::uart_print(b"\n");
    }
}

fn print_recent_logs() {
    unsafe {
        crate::uart_print(b"RECENT LOGS:\n");
        crate::uart_print(b"------------\n");

        let entries = crate::lib::printk::KERNEL_LOG.drain_all();
        if entries.is_empty() {
            crate::uart_print(b"  <no entries>\n");
        } else {
            let start = entries.len().saturating_sub(20);
            for entry in &entries[start..] {
                let text = core::str::from_utf8(&entry.message[..entry.len]).unwrap_or("<invalid utf8>");
                let line = alloc::format!("  [{:>10}us] {:<5} {}\n", entry.timestamp_us, entry.level.as_str(), text);
                crate::uart_print(line.as_bytes());
            }
        }

        crate::uart_print(b"\n");
    }
}

fn print_next_steps() {
    unsafe {
        crate::uart_print(b"DEBUGGING STEPS:\n");
        crate::uart_print(b"----------------\n");
        crate::uart_print(b"  1. Check panic location and message above\n");
        crate::uart_print(b"  2. Examine register values for invalid pointers\n");
        crate::uart_print(b"  3. Check heap usage for memory exhaustion\n");
        crate::uart_print(b"  4. Review recent logs for error patterns\n");
        crate::uart_print(b"  5. Check system uptime for timing-related issues\n");
        crate::uart_print(b"\n");
    }
}

/// Disable interrupts at the supervisor level (SIE bit of sstatus).
#[inline(always)]
fn disable_interrupts() {
    unsafe {
        core::arch::asm!("csrci sstatus, 2");
    }
}

fn halt() -> ! {
    unsafe {
        crate::uart_print(b"================================================================================\n");
        crate::uart_print(b"System halted.\n");
        crate::uart_print(b"================================================================================\n");
    }

    loop {
        unsafe {
            core::arch::asm!("wfi");
        }
    }
}

pub fn get_panic_count() -> u64 {
    PANIC_COUNT.load(Ordering::Relaxed)
}

pub fn is_panicking() -> bool {
    PANICKING.load(Ordering::Relaxed)
}
