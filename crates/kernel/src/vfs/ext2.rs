//! ext2 `InodeOps` contract, with no on-disk parser behind it.
//!
//! Reading a real superblock/block-group/inode table off a block device is
//! an external collaborator's job; this module carries the shape a real
//! parser would plug into (one `InodeOps` impl per inode, backed by a
//! `BlockDevice`) so the rest of the VFS can be written against the trait
//! rather than against tmpfs specifically. Every operation returns `ENOSYS`
//! until a real backing implementation exists.

use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::block::BlockDevice;
use crate::lib::error::Errno;
use crate::vfs::inode::{DirEntry, Inode, InodeMeta, InodeOps, InodeType};

/// One ext2 inode, not yet backed by a block device read.
pub struct Ext2Inode {
    #[allow(dead_code)]
    device: Arc<BlockDevice>,
    #[allow(dead_code)]
    ino: u64,
}

impl Ext2Inode {
    pub fn new(device: Arc<BlockDevice>, ino: u64) -> Self {
        Self { device, ino }
    }
}

impl InodeOps for Ext2Inode {
    fn lookup(&self, _name: &str) -> Result<Arc<Inode>, Errno> {
        Err(Errno::ENOSYS)
    }

    fn create(&self, _name: &str, _mode: u32) -> Result<Arc<Inode>, Errno> {
        Err(Errno::ENOSYS)
    }

    fn read(&self, _offset: u64, _buf: &mut [u8]) -> Result<usize, Errno> {
        Err(Errno::ENOSYS)
    }

    fn write(&self, _offset: u64, _buf: &[u8]) -> Result<usize, Errno> {
        Err(Errno::ENOSYS)
    }

    fn readdir(&self) -> Result<Vec<DirEntry>, Errno> {
        Err(Errno::ENOSYS)
    }

    fn getattr(&self) -> Result<InodeMeta, Errno> {
        Err(Errno::ENOSYS)
    }
}

/// Mount an ext2 filesystem from `device`. Always fails: no superblock
/// reader exists yet, this is the seam a future one plugs into.
pub fn mount_ext2(device: Arc<BlockDevice>) -> Result<Arc<Inode>, Errno> {
    let _ = (device, InodeType::Directory);
    Err(Errno::ENOSYS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::String;

    struct NullOps;
    impl crate::block::BlockDeviceOps for NullOps {
        fn read_sectors(&self, _dev: &BlockDevice, _sector: u64, _buf: &mut [u8]) -> Result<(), Errno> {
            Err(Errno::ENOSYS)
        }
        fn write_sectors(&self, _dev: &BlockDevice, _sector: u64, _buf: &[u8]) -> Result<(), Errno> {
            Err(Errno::ENOSYS)
        }
        fn flush(&self, _dev: &BlockDevice) -> Result<(), Errno> {
            Err(Errno::ENOSYS)
        }
    }
    static OPS: NullOps = NullOps;

    #[test]
    fn mount_is_not_yet_implemented() {
        let device = Arc::new(BlockDevice::new(String::from("null"), 0, 0, 0, &OPS));
        assert!(matches!(mount_ext2(device), Err(Errno::ENOSYS)));
    }
}
