use super::{MmioRange, Platform, RamRange, TimerDesc, UartDesc};

/// QEMU `-machine virt` on riscv64: NS16550A UART, PLIC, CLINT, and a window
/// of virtio-mmio slots. These are fixed by QEMU's machine model, not
/// discovered at runtime.
pub struct QemuVirtPlatform;

pub static INSTANCE: QemuVirtPlatform = QemuVirtPlatform;

/// PLIC base (see `arch::riscv64::interrupts`, which owns the register-level
/// programming; this is only the descriptor the platform layer hands out).
pub const PLIC_BASE: usize = 0x0c00_0000;
pub const PLIC_SIZE: usize = 0x0400_0000;

impl Platform for QemuVirtPlatform {
    fn uart(&self) -> UartDesc {
        // ns16550a at 0x1000_0000, fixed 16x oversample clock of 3.6864 MHz
        // in QEMU's model (matches the real-hardware convention the 16550
        // divisor math assumes).
        UartDesc { base: 0x1000_0000, clock_hz: 3_686_400 }
    }

    fn timer(&self) -> TimerDesc {
        // QEMU riscv virt's `rdtime`/CLINT tick rate.
        TimerDesc { freq_hz: 10_000_000 }
    }

    fn mmio_ranges(&self) -> &'static [MmioRange] {
        const R: &[MmioRange] = &[
            MmioRange { start: 0x0200_0000, size: 0x0001_0000, device: true }, // CLINT
            MmioRange { start: PLIC_BASE, size: PLIC_SIZE, device: true },
            MmioRange { start: 0x1000_0000, size: 0x0000_1000, device: true }, // UART
            MmioRange { start: 0x1000_1000, size: 0x0000_8000, device: true }, // virtio-mmio window
        ];
        R
    }

    fn ram_ranges(&self) -> &'static [RamRange] {
        // QEMU virt RAM base 0x8000_0000; size follows `-m` (512 MiB in scripts).
        const R: &[RamRange] = &[
            RamRange { start: 0x8000_0000, size: 0x2000_0000 },
        ];
        R
    }

    fn virtio_mmio_hint(&self) -> Option<(usize, usize, u32)> {
        // QEMU virt: 8 virtio-mmio slots starting at 0x1000_1000, 0x1000 apart, IRQs 1..=8
        Some((0x1000_1000, 0x1000, 1))
    }
}
