//! Contract-level VirtIO block driver.
//!
//! The actual virtqueue/MMIO transport is an external collaborator's job;
//! this type exists so `crate::block` has something that implements
//! `drivers::traits::BlockDevice` at the VirtIO MMIO base without requiring
//! a real virtqueue setup. Every I/O call fails until that transport exists.

use crate::drivers::traits::BlockDevice;
use crate::lib::error::{Errno, Result};

pub struct VirtioBlk {
    mmio_base: usize,
    block_size: usize,
    block_count: u64,
}

impl VirtioBlk {
    /// `mmio_base` is a VirtIO-MMIO slot base address (see
    /// `platform::Platform::virtio_mmio_hint`); capacity is unknown until
    /// the device config space is actually read.
    pub fn new(mmio_base: usize) -> Self {
        Self { mmio_base, block_size: 512, block_count: 0 }
    }

    pub fn mmio_base(&self) -> usize {
        self.mmio_base
    }
}

impl BlockDevice for VirtioBlk {
    fn read(&self, _block: u64, _buf: &mut [u8]) -> Result<()> {
        Err(Errno::ENOSYS)
    }

    fn write(&self, _block: u64, _buf: &[u8]) -> Result<()> {
        Err(Errno::ENOSYS)
    }

    fn flush(&self) -> Result<()> {
        Err(Errno::ENOSYS)
    }

    fn block_size(&self) -> usize {
        self.block_size
    }

    fn block_count(&self) -> u64 {
        self.block_count
    }

    fn name(&self) -> &str {
        "virtio-blk"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_are_not_yet_implemented() {
        let dev = VirtioBlk::new(0x1000_1000);
        let mut buf = [0u8; 512];
        assert_eq!(dev.read(0, &mut buf), Err(Errno::ENOSYS));
    }
}
