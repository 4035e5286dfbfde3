/// Device drivers
//
// The VirtIO block transport itself is an external collaborator (see
// `crate::block` for the contract it is expected to satisfy); this module
// only carries the timeout/error plumbing and trait abstractions shared by
// whatever driver code sits on top of it.

pub mod timeout;   // Timeout utilities for hardware operations
pub mod error;     // Common driver error types

// Phase 6 - Production Readiness: Mock drivers and trait abstractions
pub mod traits;
pub mod virtio_blk;
#[cfg(feature = "mock-devices")]
pub mod mock;

// Re-export common types for convenience
pub use error::{DriverError, DriverResult, Validator};
pub use timeout::{Timeout, TimeoutError};

/// Route a claimed PLIC IRQ number to its owning device. Block and console
/// I/O in this build are synchronous/polled, so there is no device that
/// currently claims an interrupt line; this exists as the dispatch point
/// once one does.
pub fn dispatch_irq(irq: u32) {
    crate::warn!("unclaimed device interrupt, irq={}", irq);
}
