//! devfs: `/dev` backed by `Inode`/`InodeOps` nodes whose read/write calls
//! forward to a `FileOps` impl per device, rather than to a real backing
//! store.

use super::{Inode, InodeType, InodeOps, Ino, alloc_ino, S_IFCHR, S_IFDIR};
use super::inode::DirEntry;
use super::file::{File, FileOps};
use crate::lib::error::Errno;
use alloc::sync::Arc;
use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use alloc::collections::BTreeMap;
use spin::RwLock;

/// devfs root directory
pub struct DevfsRoot {
    meta: RwLock<DevfsRootMeta>,
}

struct DevfsRootMeta {
    ino: Ino,
    children: BTreeMap<String, Arc<Inode>>,
}

impl DevfsRoot {
    fn new() -> Self {
        Self {
            meta: RwLock::new(DevfsRootMeta {
                ino: alloc_ino(),
                children: BTreeMap::new(),
            }),
        }
    }

    /// Add a character device node
    pub fn add_char_device(&self, name: &str, fops: &'static dyn FileOps, mode: u32) -> Result<(), Errno> {
        let mut meta = self.meta.write();

        // Check if already exists
        if meta.children.contains_key(name) {
            return Err(Errno::EEXIST);
        }

        // Create character device inode
        let dev_node = DevfsCharDev::new(fops, mode);
        let dev_ops: &'static DevfsCharDev = Box::leak(Box::new(dev_node));

        let inode = Arc::new(Inode::new(
            InodeType::CharDevice,
            mode,
            dev_ops as &'static dyn InodeOps,
        ));

        meta.children.insert(name.into(), inode);

        crate::debug!("devfs: added char device '{}'", name);

        Ok(())
    }

    /// Add a subdirectory
    pub fn add_directory(&self, name: &str, inode: Arc<Inode>) -> Result<(), Errno> {
        let mut meta = self.meta.write();

        // Check if already exists
        if meta.children.contains_key(name) {
            return Err(Errno::EEXIST);
        }

        meta.children.insert(name.into(), inode);

        crate::debug!("devfs: added subdirectory '{}'", name);

        Ok(())
    }
}

impl InodeOps for DevfsRoot {
    fn lookup(&self, name: &str) -> Result<Arc<Inode>, Errno> {
        let meta = self.meta.read();
        meta.children.get(name).cloned().ok_or(Errno::ENOENT)
    }

    fn create(&self, _name: &str, _mode: u32) -> Result<Arc<Inode>, Errno> {
        // devfs is read-only
        Err(Errno::EROFS)
    }

    fn read(&self, _offset: u64, _buf: &mut [u8]) -> Result<usize, Errno> {
        Err(Errno::EISDIR)
    }

    fn write(&self, _offset: u64, _buf: &[u8]) -> Result<usize, Errno> {
        Err(Errno::EISDIR)
    }

    fn readdir(&self) -> Result<Vec<DirEntry>, Errno> {
        let meta = self.meta.read();
        let mut entries = Vec::new();

        // Add . and ..
        entries.push(DirEntry {
            ino: meta.ino,
            name: ".".into(),
            itype: InodeType::Directory,
        });
        entries.push(DirEntry {
            ino: meta.ino,
            name: "..".into(),
            itype: InodeType::Directory,
        });

        // Add device nodes
        for (name, inode) in meta.children.iter() {
            entries.push(DirEntry {
                ino: inode.ino(),
                name: name.clone(),
                itype: inode.itype(),
            });
        }

        Ok(entries)
    }

    fn getattr(&self) -> Result<super::inode::InodeMeta, Errno> {
        let meta = self.meta.read();
        Ok(super::inode::InodeMeta {
            ino: meta.ino,
            itype: InodeType::Directory,
            mode: S_IFDIR | 0o755,
            uid: 0,
            gid: 0,
            nlink: 2,
            size: 0,
            atime: 0,
            mtime: 0,
            ctime: 0,
        })
    }
}

/// Character device node
pub struct DevfsCharDev {
    ino: Ino,
    mode: u32,
    fops: &'static dyn FileOps,
}

impl DevfsCharDev {
    fn new(fops: &'static dyn FileOps, mode: u32) -> Self {
        Self {
            ino: alloc_ino(),
            mode: S_IFCHR | (mode & 0o777),
            fops,
        }
    }
}

impl InodeOps for DevfsCharDev {
    fn lookup(&self, _name: &str) -> Result<Arc<Inode>, Errno> {
        Err(Errno::ENOTDIR)
    }

    fn create(&self, _name: &str, _mode: u32) -> Result<Arc<Inode>, Errno> {
        Err(Errno::ENOTDIR)
    }

    fn read(&self, offset: u64, buf: &mut [u8]) -> Result<usize, Errno> {
        // For character devices, offset is typically ignored
        let _ = offset;

        // Create a temporary File for the FileOps call
        // This is a bit awkward but maintains the FileOps interface
        let file = crate::vfs::File::new_with_ops(
            Arc::new(Inode::new(InodeType::CharDevice, self.mode, self)),
            crate::vfs::OpenFlags::O_RDONLY,
            self.fops,
        );

        self.fops.read(&file, buf)
    }

    fn write(&self, offset: u64, buf: &[u8]) -> Result<usize, Errno> {
        // For character devices, offset is typically ignored
        let _ = offset;

        let file = crate::vfs::File::new_with_ops(
            Arc::new(Inode::new(InodeType::CharDevice, self.mode, self)),
            crate::vfs::OpenFlags::O_WRONLY,
            self.fops,
        );

        self.fops.write(&file, buf)
    }

    fn readdir(&self) -> Result<Vec<DirEntry>, Errno> {
        Err(Errno::ENOTDIR)
    }

    fn getattr(&self) -> Result<super::inode::InodeMeta, Errno> {
        Ok(super::inode::InodeMeta {
            ino: self.ino,
            itype: InodeType::CharDevice,
            mode: self.mode,
            uid: 0,
            gid: 0,
            nlink: 1,
            size: 0,
            atime: 0,
            mtime: 0,
            ctime: 0,
        })
    }
}

/// `/dev/console` and `/dev/tty`: reads/writes go through the UART driver.
pub struct ConsoleOps;
impl FileOps for ConsoleOps {
    fn read(&self, _file: &File, buf: &mut [u8]) -> Result<usize, Errno> {
        let mut n = 0;
        while n < buf.len() {
            match unsafe { crate::uart::read_byte() } {
                Some(b) => { buf[n] = b; n += 1; }
                None => break,
            }
        }
        Ok(n)
    }
    fn write(&self, _file: &File, buf: &[u8]) -> Result<usize, Errno> {
        unsafe { crate::uart::write_bytes(buf) };
        Ok(buf.len())
    }
}

/// `/dev/null`: writes are discarded, reads return EOF.
pub struct NullOps;
impl FileOps for NullOps {
    fn read(&self, _file: &File, _buf: &mut [u8]) -> Result<usize, Errno> {
        Ok(0)
    }
    fn write(&self, _file: &File, buf: &[u8]) -> Result<usize, Errno> {
        Ok(buf.len())
    }
}

/// `/dev/zero`: reads return zero bytes, writes are discarded.
pub struct ZeroOps;
impl FileOps for ZeroOps {
    fn read(&self, _file: &File, buf: &mut [u8]) -> Result<usize, Errno> {
        buf.fill(0);
        Ok(buf.len())
    }
    fn write(&self, _file: &File, buf: &[u8]) -> Result<usize, Errno> {
        Ok(buf.len())
    }
}

/// `/dev/random` and `/dev/urandom`: reads are filled from the kernel PRNG.
/// This is not a cryptographic source.
pub struct RandomOps;
impl FileOps for RandomOps {
    fn read(&self, _file: &File, buf: &mut [u8]) -> Result<usize, Errno> {
        for chunk in buf.chunks_mut(4) {
            let r = crate::prng::rand_u32().to_le_bytes();
            chunk.copy_from_slice(&r[..chunk.len()]);
        }
        Ok(buf.len())
    }
    fn write(&self, _file: &File, buf: &[u8]) -> Result<usize, Errno> {
        Ok(buf.len())
    }
}

static CONSOLE_OPS: ConsoleOps = ConsoleOps;
static NULL_OPS: NullOps = NullOps;
static ZERO_OPS: ZeroOps = ZeroOps;
static RANDOM_OPS: RandomOps = RandomOps;

/// Mount devfs and populate it with the standard character devices.
pub fn mount_devfs() -> Result<Arc<Inode>, Errno> {
    let root = DevfsRoot::new();

    root.add_char_device("console", &CONSOLE_OPS, 0o600)?;
    root.add_char_device("tty", &CONSOLE_OPS, 0o666)?;
    root.add_char_device("null", &NULL_OPS, 0o666)?;
    root.add_char_device("zero", &ZERO_OPS, 0o666)?;
    root.add_char_device("random", &RANDOM_OPS, 0o444)?;
    root.add_char_device("urandom", &RANDOM_OPS, 0o444)?;

    let root_ops: &'static DevfsRoot = Box::leak(Box::new(root));

    let root_inode = Arc::new(Inode::new(
        InodeType::Directory,
        0o755,
        root_ops as &'static dyn InodeOps,
    ));

    crate::info!("devfs: mounted at /dev with console, tty, null, zero, random, urandom");

    Ok(root_inode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_read_is_always_empty() {
        let mut buf = [0xffu8; 8];
        let file = File::new_with_ops(
            Arc::new(Inode::new(InodeType::CharDevice, 0o666, &NULL_OPS)),
            crate::vfs::OpenFlags::O_RDONLY,
            &NULL_OPS,
        );
        assert_eq!(NULL_OPS.read(&file, &mut buf).unwrap(), 0);
    }

    #[test]
    fn zero_read_fills_zero() {
        let mut buf = [0xffu8; 8];
        let file = File::new_with_ops(
            Arc::new(Inode::new(InodeType::CharDevice, 0o666, &ZERO_OPS)),
            crate::vfs::OpenFlags::O_RDONLY,
            &ZERO_OPS,
        );
        assert_eq!(ZERO_OPS.read(&file, &mut buf).unwrap(), 8);
        assert_eq!(buf, [0u8; 8]);
    }

    #[test]
    fn mount_devfs_registers_standard_nodes() {
        let root = mount_devfs().unwrap();
        let names: Vec<_> = root.readdir().unwrap().into_iter().map(|e| e.name).collect();
        for expect in ["console", "tty", "null", "zero", "random", "urandom"] {
            assert!(names.iter().any(|n| n == expect));
        }
    }
}
