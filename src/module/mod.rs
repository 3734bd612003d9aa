//! The device API. This provides the `Module` type, the state of one opened M31/M32/M82 together
//! with its register interface. It offers every operation of the driver: the interrupt handler,
//! channel reads, change-flag queries, notification management and hysteresis control.

use log::{debug, error, trace};

use crate::config::{HysteresisConfigurator, OpenOptions};
use crate::error::Error;
use crate::ident::Variant;
use crate::interface::ModuleInterface;
use crate::module::shared::SharedModule;
use crate::module::tracker::ChangeTracker;
use crate::mutex::IOMutex;
use crate::notify::{NotificationChannel, Signal};
use crate::registers::{valid_channel, Register, ID_PROM_SIZE};

pub mod pin;
pub mod shared;
pub(crate) mod tracker;

/// What the interrupt handler reports to the host's interrupt dispatcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IrqResult {
    /// The interrupt was caused by this device.
    Claimed,
    /// The cause could not be attributed; the host should keep calling other handlers on the
    /// line.
    Unknown,
}

/// One opened module.
///
/// All methods take `&mut self`. When the interrupt handler and the query path run in different
/// contexts, convert the module into a [`SharedModule`] with [`Module::into_shared`], which puts it
/// behind a device-scoped lock.
pub struct Module<MI: ModuleInterface, S: Signal> {
    iface: MI,
    variant: Option<Variant>,
    id_check: bool,
    tracker: ChangeTracker,
    notify: NotificationChannel<S>,
    irq_count: u32,
}

impl<MI: ModuleInterface, S: Signal> Module<MI, S> {
    /// Open the module behind `iface` with default [`OpenOptions`], verifying its identity.
    pub fn open(iface: MI) -> Result<Self, Error<MI::Error>> {
        OpenOptions::new().open(iface)
    }

    pub(crate) fn from_parts(iface: MI, variant: Option<Variant>, id_check: bool) -> Self {
        Self {
            iface,
            variant,
            id_check,
            tracker: ChangeTracker::new(),
            notify: NotificationChannel::new(),
            irq_count: 0,
        }
    }

    /// Put the module behind a mutex of type `M`, so the interrupt handler and the query path can
    /// share it.
    ///
    /// See [`SharedModule`] for detail.
    pub fn into_shared<M: IOMutex<Self>>(self) -> SharedModule<M, MI, S> {
        SharedModule::new(self)
    }

    /// Close the module. Any installed signal is removed first and handed back together with the
    /// interface.
    pub fn close(mut self) -> (MI, Option<S>) {
        let signal = self.shutdown();
        (self.iface, signal)
    }

    pub(crate) fn shutdown(&mut self) -> Option<S> {
        self.tracker.disable();
        let signal = self.notify.deregister();
        debug!("close: signal removed={}", signal.is_some());
        signal
    }

    /// The detected module variant, `None` when opened without identity check.
    pub fn variant(&self) -> Option<Variant> {
        self.variant
    }

    /// Whether the module identity was verified at open.
    pub fn id_check(&self) -> bool {
        self.id_check
    }

    pub fn hysteresis_capable(&self) -> bool {
        self.variant.map_or(false, Variant::has_hysteresis)
    }

    /// Service one hardware interrupt.
    ///
    /// With change tracking enabled, the current levels are merged into the change flags and the
    /// installed signal, if any, is sent once. The interrupt latch is cleared last, after the
    /// levels were read, so an edge arriving in between re-latches and is seen on the next
    /// interrupt. Always returns [`IrqResult::Unknown`]: the module cannot tell its own
    /// interrupts from those of other devices sharing the line.
    pub fn handle_interrupt(&mut self) -> IrqResult {
        self.irq_count = self.irq_count.wrapping_add(1);
        match self.iface.read_register(Register::Data.into()) {
            Ok(current) => {
                if let Some(delta) = self.tracker.record(current) {
                    trace!("irq: levels=0x{:04x} delta=0x{:04x}", current, delta);
                    self.notify.deliver();
                }
            }
            Err(_) => error!("irq: data register read failed"),
        }
        if self.iface.read_register(Register::IrqClear.into()).is_err() {
            error!("irq: interrupt clear failed");
        }
        IrqResult::Unknown
    }

    /// Number of interrupts serviced since open, or since the last `set_irq_count`.
    pub fn irq_count(&self) -> u32 {
        self.irq_count
    }

    pub fn set_irq_count(&mut self, count: u32) {
        self.irq_count = count;
    }

    /// Number of signal sends that failed in the interrupt handler.
    pub fn notify_failures(&self) -> u32 {
        self.notify.failures()
    }

    /// Read the current level of all 16 channels, channel `i` in bit `i`.
    pub fn read_all_channels(&mut self) -> Result<u16, Error<MI::Error>> {
        self.iface
            .read_register(Register::Data.into())
            .map_err(Error::Interface)
    }

    /// Read the current level of channel `ch`.
    pub fn read_channel(&mut self, ch: usize) -> Result<bool, Error<MI::Error>> {
        let ch = valid_channel(ch)?;
        Ok(self.read_all_channels()? >> ch & 1 == 1)
    }

    /// Block read of all channels into `buf`, least significant byte first. `buf` must hold at
    /// least 2 bytes. Returns the number of bytes written.
    pub fn read_block(&mut self, buf: &mut [u8]) -> Result<usize, Error<MI::Error>> {
        if buf.len() < 2 {
            return Err(Error::BufferTooSmall);
        }
        let levels = self.read_all_channels()?;
        buf[..2].copy_from_slice(&levels.to_le_bytes());
        Ok(2)
    }

    /// The module is input only; always fails with `UnsupportedOperation`.
    pub fn write_channel(&mut self, _ch: usize, _value: bool) -> Result<(), Error<MI::Error>> {
        Err(Error::UnsupportedOperation)
    }

    /// The module is input only; always fails with `UnsupportedOperation`.
    pub fn write_block(&mut self, _buf: &[u8]) -> Result<usize, Error<MI::Error>> {
        Err(Error::UnsupportedOperation)
    }

    /// Switch change tracking on or off.
    ///
    /// Enabling takes a fresh snapshot of the levels and clears the change flags, even when
    /// tracking was already on; transitions before this point are never reported. Disabling keeps
    /// everything else as is.
    ///
    /// The hardware interrupt itself cannot be switched off, so after doing the above this always
    /// returns `Err(Error::UnsupportedOperation)` (or an interface error if the snapshot failed).
    pub fn set_tracking_enabled(&mut self, enable: bool) -> Result<(), Error<MI::Error>> {
        if enable {
            let snapshot = self.read_all_channels()?;
            self.tracker.enable(snapshot);
            debug!("tracking enabled, levels=0x{:04x}", snapshot);
        } else {
            self.tracker.disable();
            debug!("tracking disabled");
        }
        Err(Error::UnsupportedOperation)
    }

    pub fn tracking_enabled(&self) -> bool {
        self.tracker.is_enabled()
    }

    /// Return the channels that changed since the last call (or since tracking was enabled) and
    /// reset the flags. Fails with `DeviceNotReady` while tracking is disabled.
    pub fn take_change_flags(&mut self) -> Result<u16, Error<MI::Error>> {
        self.tracker.take().ok_or(Error::DeviceNotReady)
    }

    /// Install `signal` to be sent on every tracked interrupt.
    ///
    /// Fails with `AlreadyRegistered` if a signal is installed, and with `InvalidParameter` for
    /// signal id 0. The rejected signal is dropped.
    pub fn register_notification(&mut self, signal: S) -> Result<(), Error<MI::Error>> {
        if self.notify.target_id().is_some() {
            error!("signal already installed");
            return Err(Error::AlreadyRegistered);
        }
        if signal.id() == 0 {
            return Err(Error::InvalidParameter);
        }
        let id = signal.id();
        self.notify
            .register(signal)
            .map_err(|_| Error::AlreadyRegistered)?;
        debug!("signal {} installed", id);
        Ok(())
    }

    /// Remove the installed signal and hand it back. Fails with `NotRegistered` if there is none.
    pub fn deregister_notification(&mut self) -> Result<S, Error<MI::Error>> {
        match self.notify.deregister() {
            Some(signal) => {
                debug!("signal {} removed", signal.id());
                Ok(signal)
            }
            None => {
                error!("signal not installed");
                Err(Error::NotRegistered)
            }
        }
    }

    /// The id of the installed signal.
    pub fn notification_target(&self) -> Option<u32> {
        self.notify.target_id()
    }

    /// Read the hysteresis selection of channel `ch` (M82 only).
    pub fn hysteresis(&mut self, ch: usize) -> Result<bool, Error<MI::Error>> {
        self.check_hysteresis()?;
        let ch = valid_channel(ch)?;
        let mode = self.read_mode()?;
        Ok(mode >> ch & 1 == 1)
    }

    /// Select or deselect hysteresis for channel `ch` (M82 only).
    pub fn set_hysteresis(&mut self, ch: usize, enable: bool) -> Result<(), Error<MI::Error>> {
        self.check_hysteresis()?;
        let ch = valid_channel(ch)?;
        self.read_modify_mode(|mode| {
            if enable {
                mode | 1 << ch
            } else {
                mode & !(1 << ch)
            }
        })
    }

    /// Begin changing the hysteresis of several channels at once by returning a
    /// [`HysteresisConfigurator`].
    pub fn configure_hysteresis<'m>(&'m mut self) -> HysteresisConfigurator<'m, MI, S> {
        HysteresisConfigurator::new(self)
    }

    /// Copy the identification PROM into `buf`, each word least significant byte first like
    /// [`Module::read_block`]. `buf` must hold at least 128 bytes. Returns the number of bytes
    /// written.
    pub fn read_id_prom(&mut self, buf: &mut [u8]) -> Result<usize, Error<MI::Error>> {
        if buf.len() < ID_PROM_SIZE {
            return Err(Error::BufferTooSmall);
        }
        for (index, chunk) in buf[..ID_PROM_SIZE].chunks_exact_mut(2).enumerate() {
            let word = self
                .iface
                .read_id_word(index as u8)
                .map_err(Error::Interface)?;
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        Ok(ID_PROM_SIZE)
    }

    fn check_hysteresis(&self) -> Result<(), Error<MI::Error>> {
        if self.hysteresis_capable() {
            Ok(())
        } else {
            Err(Error::UnsupportedOperation)
        }
    }

    fn read_mode(&mut self) -> Result<u16, Error<MI::Error>> {
        self.iface
            .read_register(Register::Mode.into())
            .map_err(Error::Interface)
    }

    pub(crate) fn write_mode(&mut self, mode: u16) -> Result<(), Error<MI::Error>> {
        self.iface
            .write_register(Register::Mode.into(), mode)
            .map_err(Error::Interface)
    }

    pub(crate) fn read_modify_mode(
        &mut self,
        f: impl Fn(u16) -> u16,
    ) -> Result<(), Error<MI::Error>> {
        let current = self.read_mode()?;
        self.write_mode(f(current))
    }
}
