//! Trait-based abstractions for the device contracts this kernel reaches
//! an external collaborator for: block storage, the NS16550A console, the
//! hardware timer, and a random number source. Mocking a driver for testing
//! just means implementing the trait without real MMIO.

use crate::lib::error::Result;

/// Block device trait - represents block-based storage
pub trait BlockDevice: Send + Sync {
    /// Read a block from the device
    fn read(&self, block: u64, buf: &mut [u8]) -> Result<()>;

    /// Write a block to the device
    fn write(&self, block: u64, buf: &[u8]) -> Result<()>;

    /// Flush any pending writes to the device
    fn flush(&self) -> Result<()>;

    /// Get the block size in bytes
    fn block_size(&self) -> usize;

    /// Get the total number of blocks
    fn block_count(&self) -> u64;

    /// Get total capacity in bytes
    fn capacity(&self) -> u64 {
        self.block_count() * (self.block_size() as u64)
    }

    /// Check if device is read-only
    fn is_readonly(&self) -> bool {
        false
    }

    /// Get device name/identifier
    fn name(&self) -> &str;

    /// Sync the device (ensure all writes are persisted)
    fn sync(&self) -> Result<()> {
        self.flush()
    }
}

/// Character device trait - represents byte-oriented devices
pub trait CharDevice: Send + Sync {
    /// Read bytes from the device
    fn read(&self, buf: &mut [u8]) -> Result<usize>;

    /// Write bytes to the device
    fn write(&self, buf: &[u8]) -> Result<usize>;

    /// Perform device-specific control operation
    fn ioctl(&self, cmd: u64, arg: u64) -> Result<u64>;

    /// Check if device is ready for reading
    fn can_read(&self) -> bool;

    /// Check if device is ready for writing
    fn can_write(&self) -> bool;

    /// Get device name
    fn name(&self) -> &str;
}

/// Timer device trait - represents hardware timer
pub trait TimerDevice: Send + Sync {
    /// Get current timer value (ticks since boot)
    fn read(&self) -> u64;

    /// Get timer frequency in Hz
    fn frequency(&self) -> u64;

    /// Set timer to fire after given ticks
    fn set_timeout(&self, ticks: u64) -> Result<()>;

    /// Cancel pending timeout
    fn cancel_timeout(&self) -> Result<()>;

    /// Get nanoseconds since boot
    fn nanos(&self) -> u64 {
        let ticks = self.read();
        let freq = self.frequency();
        (ticks * 1_000_000_000) / freq
    }

    /// Get microseconds since boot
    fn micros(&self) -> u64 {
        self.nanos() / 1000
    }

    /// Get milliseconds since boot
    fn millis(&self) -> u64 {
        self.micros() / 1000
    }
}

/// Random number generator device trait
pub trait RngDevice: Send + Sync {
    /// Fill buffer with random bytes
    fn fill_bytes(&self, buf: &mut [u8]) -> Result<()>;

    /// Get random u32
    fn next_u32(&self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.fill_bytes(&mut buf)?;
        Ok(u32::from_ne_bytes(buf))
    }

    /// Get random u64
    fn next_u64(&self) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.fill_bytes(&mut buf)?;
        Ok(u64::from_ne_bytes(buf))
    }
}
