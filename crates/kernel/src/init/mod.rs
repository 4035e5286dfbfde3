//! Boot-time bring-up, run once from `main()` on the boot hart.
//!
//! Split into the same early/subsystem/userspace phase shape the rest of
//! the kernel's init error type still names, trimmed to the phases this
//! single-hart riscv64 build actually runs.

pub mod error;
pub mod phases;
pub mod userspace_init;

pub use error::{KernelError, KernelResult};
