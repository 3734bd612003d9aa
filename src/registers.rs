//! The register offsets within the M31 family address space.

use crate::error::Error;

/// Number of input channels on every module of the family.
pub const CHANNEL_COUNT: usize = 16;

/// Size in bytes of the module identification PROM.
pub const ID_PROM_SIZE: usize = 128;

/// A register address within the module's A08/D16 address space. These are created by
/// conversion from `Register`, so that no invalid offset can be forged and handed to a
/// `ModuleInterface`.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct RegisterAddress(pub(crate) u8);

impl From<RegisterAddress> for u8 {
    /// Convert a `RegisterAddress` into a `u8` corresponding to the hardware offset.
    fn from(addr: RegisterAddress) -> u8 {
        addr.0
    }
}

pub enum Register {
    /// Data register. Reading it returns the instantaneous level of all 16 inputs, channel `i` in
    /// bit `i`.
    Data,

    /// Mode register (M82 only). Bit `i` selects input hysteresis for channel `i`.
    Mode,

    /// Interrupt clear register. Any read access clears the pending interrupt latch; the value
    /// read is meaningless.
    IrqClear,
}

/// Check a channel index supplied by a caller.
pub(crate) fn valid_channel<E>(ch: usize) -> Result<usize, Error<E>> {
    if ch < CHANNEL_COUNT {
        Ok(ch)
    } else {
        Err(Error::InvalidParameter)
    }
}

impl From<Register> for RegisterAddress {
    /// Convert a `Register` into a `RegisterAddress`.
    fn from(reg: Register) -> RegisterAddress {
        use self::Register::*;
        match reg {
            Data => RegisterAddress(0x00),
            Mode => RegisterAddress(0x04),
            IrqClear => RegisterAddress(0x80),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    #[test]
    fn register_addresses() {
        assert_eq!(RegisterAddress::from(Register::Data), RegisterAddress(0x00));
        assert_eq!(RegisterAddress::from(Register::Mode), RegisterAddress(0x04));
        assert_eq!(RegisterAddress::from(Register::IrqClear), RegisterAddress(0x80));
    }

    #[test]
    fn channel_index_valid() {
        assert_eq!(valid_channel::<Infallible>(0), Ok(0));
        assert_eq!(valid_channel::<Infallible>(15), Ok(15));
    }

    #[test]
    fn channel_index_invalid() {
        assert_eq!(valid_channel::<Infallible>(16), Err(Error::InvalidParameter));
        assert_eq!(
            valid_channel::<Infallible>(usize::MAX),
            Err(Error::InvalidParameter)
        );
    }
}
