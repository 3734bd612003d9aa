//! This module provides shims between the host's bus access and the module's registers. A host
//! framework supplies one `ModuleInterface` per opened device.

use crate::registers::RegisterAddress;

/// An interface to an M31 family module implements this trait, which provides the basic
/// operations for 16-bit register accesses and for reading the identification PROM.
pub trait ModuleInterface {
    /// The type of error that register reads and writes may return.
    type Error;
    /// Write `value` into the register at `addr`.
    fn write_register(&mut self, addr: RegisterAddress, value: u16) -> Result<(), Self::Error>;
    /// Fetch the `u16` value of the register at `addr`.
    fn read_register(&mut self, addr: RegisterAddress) -> Result<u16, Self::Error>;
    /// Fetch word `index` (0..64) of the identification PROM.
    fn read_id_word(&mut self, index: u8) -> Result<u16, Self::Error>;
}

// This is here (and has to be pub) for doctests only. It's useless otherwise.
#[doc(hidden)]
pub mod noop {
    use super::ModuleInterface;
    use crate::ident::{ID_MAGIC, M82_ID};
    use crate::registers::RegisterAddress;
    pub struct NoopInterface;
    impl ModuleInterface for NoopInterface {
        type Error = core::convert::Infallible;
        fn write_register(
            &mut self,
            _addr: RegisterAddress,
            _value: u16,
        ) -> Result<(), Self::Error> {
            Ok(())
        }
        fn read_register(&mut self, _addr: RegisterAddress) -> Result<u16, Self::Error> {
            Ok(0u16)
        }
        fn read_id_word(&mut self, index: u8) -> Result<u16, Self::Error> {
            Ok(match index {
                0 => ID_MAGIC,
                1 => M82_ID,
                _ => 0,
            })
        }
    }
}

pub mod mmio {
    //! Memory-mapped access to a module whose A08/D16 window is mapped into the CPU's address
    //! space by the carrier board.

    use super::{ModuleInterface, RegisterAddress};

    /// A configured `ModuleInterface` for a module mapped at a fixed address.
    pub struct MmioInterface<P> {
        /// Start of the module's register window.
        base: *mut u8,
        /// Reader for the identification PROM, which sits behind a serial interface on the
        /// carrier and is not part of the register window.
        id_prom: P,
    }

    // The window is owned exclusively by this interface, so moving it to another context is
    // sound.
    unsafe impl<P: Send> Send for MmioInterface<P> {}

    impl<P> MmioInterface<P>
    where
        P: FnMut(u8) -> u16,
    {
        /// Create an interface for the module whose register window starts at `base`. `id_prom`
        /// is called with a word index to read the identification PROM.
        ///
        /// # Safety
        ///
        /// `base` must point to the module's mapped register window, valid for volatile 16-bit
        /// accesses up to offset `0x80` for as long as the interface lives, and nothing else may
        /// access that window concurrently.
        pub unsafe fn new(base: *mut u8, id_prom: P) -> Self {
            Self { base, id_prom }
        }
    }

    impl<P> ModuleInterface for MmioInterface<P>
    where
        P: FnMut(u8) -> u16,
    {
        type Error = core::convert::Infallible;

        fn write_register(&mut self, addr: RegisterAddress, value: u16) -> Result<(), Self::Error> {
            // Offsets are produced from `Register` only and stay inside the window.
            unsafe {
                let reg = self.base.add(u8::from(addr) as usize) as *mut u16;
                core::ptr::write_volatile(reg, value);
            }
            Ok(())
        }

        fn read_register(&mut self, addr: RegisterAddress) -> Result<u16, Self::Error> {
            let value = unsafe {
                let reg = self.base.add(u8::from(addr) as usize) as *const u16;
                core::ptr::read_volatile(reg)
            };
            Ok(value)
        }

        fn read_id_word(&mut self, index: u8) -> Result<u16, Self::Error> {
            Ok((self.id_prom)(index))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::registers::Register;

        #[test]
        fn volatile_accesses_hit_window() {
            let mut window = [0u16; 0x41];
            window[0x00] = 0xA5A5;
            let mut ei =
                unsafe { MmioInterface::new(window.as_mut_ptr() as *mut u8, |i| i as u16 * 2) };

            assert_eq!(ei.read_register(Register::Data.into()), Ok(0xA5A5));
            assert!(ei.write_register(Register::Mode.into(), 0x0102).is_ok());
            assert_eq!(ei.read_register(Register::Mode.into()), Ok(0x0102));
            assert_eq!(ei.read_id_word(3), Ok(6));
            drop(ei);
            assert_eq!(window[0x02], 0x0102);
        }
    }
}
