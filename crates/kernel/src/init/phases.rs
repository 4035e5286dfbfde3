//! Ordered boot phases. `main()` runs these in sequence before falling into
//! the scheduler; each phase only touches subsystems that actually exist in
//! this build.

use super::error::{KernelError, KernelResult};

/// UART, heap allocator, boot timestamp. Must run before the first
/// `info!`/`warn!` log line, since those write through the UART driver and
/// allocate a `String` via `alloc::format!`.
pub fn early_init() -> KernelResult<()> {
    unsafe { crate::uart::init() };
    crate::heap::init_heap().map_err(KernelError::EarlyInit)?;
    crate::time::init_boot_timestamp();
    crate::info!("early init complete: uart, heap, boot clock");
    Ok(())
}

/// Process table and the root filesystem. Runs after `early_init` so it can
/// log through the now-ready UART/heap.
pub fn subsystem_init() -> KernelResult<()> {
    crate::process::init_process_table();

    crate::vfs::init_vfs();
    let root = crate::vfs::tmpfs::mount_tmpfs()
        .map_err(|_| KernelError::SubsystemInit("tmpfs root mount failed"))?;
    crate::vfs::mount("tmpfs", root, "/")
        .map_err(|_| KernelError::SubsystemInit("tmpfs root mount failed"))?;

    let dev = crate::vfs::devfs::mount_devfs()
        .map_err(|_| KernelError::SubsystemInit("devfs mount failed"))?;
    crate::vfs::mount("devfs", dev, "/dev")
        .map_err(|_| KernelError::SubsystemInit("devfs mount failed"))?;

    crate::info!("subsystem init complete: process table, tmpfs root, devfs");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subsystem_init_mounts_root() {
        let _ = subsystem_init();
        assert!(crate::vfs::get_root().is_some());
    }
}
