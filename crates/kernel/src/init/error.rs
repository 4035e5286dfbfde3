/// Kernel initialization errors with detailed context
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    /// Early initialization failed (UART, heap, boot timestamp)
    EarlyInit(&'static str),

    /// Subsystem initialization failed (process table, VFS)
    SubsystemInit(&'static str),

    /// Init process setup failed (address space, trampoline, scheduling)
    UserspaceInit(&'static str),
}

impl core::fmt::Display for KernelError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::EarlyInit(msg) => write!(f, "early init failed: {}", msg),
            Self::SubsystemInit(msg) => write!(f, "subsystem init failed: {}", msg),
            Self::UserspaceInit(msg) => write!(f, "userspace init failed: {}", msg),
        }
    }
}

pub type KernelResult<T> = core::result::Result<T, KernelError>;
