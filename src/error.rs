//! Errors returned by the driver.

use thiserror::Error;

/// The union of all errors the driver reports to its callers. `E` is the error type of the
/// `ModuleInterface` in use; register access failures are carried unchanged in `Interface`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error<E> {
    /// A register access on the module interface failed.
    #[error("register access failed: {0:?}")]
    Interface(E),

    /// A channel index outside `0..16`, a zero signal id or an output direction was passed.
    #[error("invalid parameter")]
    InvalidParameter,

    /// The operation is not available on this hardware. Writes are never supported (the module
    /// is input only), hysteresis only exists on the M82, and the interrupt enable toggle always
    /// reports this after performing its side effect.
    #[error("operation not supported")]
    UnsupportedOperation,

    /// A notification signal is already installed.
    #[error("signal already installed")]
    AlreadyRegistered,

    /// No notification signal is installed.
    #[error("signal not installed")]
    NotRegistered,

    /// Change flags were queried while change tracking is disabled.
    #[error("device not ready, change tracking disabled")]
    DeviceNotReady,

    /// The caller's buffer is too small for the requested block transfer.
    #[error("user buffer too small")]
    BufferTooSmall,

    /// The identification PROM does not describe a supported module. Only returned at open.
    #[error("illegal module identity (magic 0x{magic:04x}, id {id})")]
    HardwareIdentityMismatch { magic: u16, id: u16 },
}
