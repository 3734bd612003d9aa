//! Shared access to a module from the interrupt and the query context.

use core::marker::PhantomData;

use crate::error::Error;
use crate::interface::ModuleInterface;
use crate::module::pin::{ChannelIO, ChannelPin};
use crate::module::{IrqResult, Module};
use crate::mutex::IOMutex;
use crate::notify::Signal;
use crate::registers::valid_channel;

/// This adapter captures the `Module` behind a device-scoped lock. The host's interrupt dispatch
/// calls [`SharedModule::handle_interrupt`] while application callers use the query methods, each
/// of which runs as one critical section. The change-flag merge of an interrupt and the
/// get-and-reset of a query therefore never interleave, and no transition is lost or reported
/// twice.
///
/// The methods mirror those of [`Module`]; see there for their semantics.
pub struct SharedModule<M, MI, S>
where
    M: IOMutex<Module<MI, S>>,
    MI: ModuleInterface,
    S: Signal,
{
    module: M,
    _m: PhantomData<fn() -> (MI, S)>,
}

impl<M, MI, S> SharedModule<M, MI, S>
where
    M: IOMutex<Module<MI, S>>,
    MI: ModuleInterface,
    S: Signal,
{
    pub(crate) fn new(module: Module<MI, S>) -> Self {
        SharedModule {
            module: M::new(module),
            _m: PhantomData,
        }
    }

    // cortex-m Mutex has no into_inner, so the module cannot be released again; `close` tears
    // down what must not outlive the device instead.

    /// Interrupt dispatch entry point.
    pub fn handle_interrupt(&self) -> IrqResult {
        self.module.lock(|m| m.handle_interrupt())
    }

    /// Disable tracking and remove the installed signal under the lock, so an interrupt racing
    /// with the close can no longer send it. The signal is handed back for the host to dispose
    /// of.
    pub fn close(&self) -> Option<S> {
        self.module.lock(|m| m.shutdown())
    }

    /// Create a `ChannelPin` for input channel `ch`. Every `InputPin` call on it reads the data
    /// register under the lock. Fails with `InvalidParameter` for `ch >= 16`.
    pub fn channel_pin<'io>(
        &'io self,
        ch: usize,
    ) -> Result<ChannelPin<'io, Self>, Error<MI::Error>> {
        Ok(ChannelPin::new(self, valid_channel(ch)?))
    }

    pub fn read_all_channels(&self) -> Result<u16, Error<MI::Error>> {
        self.module.lock(|m| m.read_all_channels())
    }

    pub fn read_block(&self, buf: &mut [u8]) -> Result<usize, Error<MI::Error>> {
        self.module.lock(|m| m.read_block(buf))
    }

    pub fn set_tracking_enabled(&self, enable: bool) -> Result<(), Error<MI::Error>> {
        self.module.lock(|m| m.set_tracking_enabled(enable))
    }

    pub fn tracking_enabled(&self) -> bool {
        self.module.lock(|m| m.tracking_enabled())
    }

    pub fn take_change_flags(&self) -> Result<u16, Error<MI::Error>> {
        self.module.lock(|m| m.take_change_flags())
    }

    pub fn register_notification(&self, signal: S) -> Result<(), Error<MI::Error>> {
        self.module.lock(|m| m.register_notification(signal))
    }

    pub fn deregister_notification(&self) -> Result<S, Error<MI::Error>> {
        self.module.lock(|m| m.deregister_notification())
    }

    pub fn notification_target(&self) -> Option<u32> {
        self.module.lock(|m| m.notification_target())
    }

    pub fn hysteresis(&self, ch: usize) -> Result<bool, Error<MI::Error>> {
        self.module.lock(|m| m.hysteresis(ch))
    }

    pub fn set_hysteresis(&self, ch: usize, enable: bool) -> Result<(), Error<MI::Error>> {
        self.module.lock(|m| m.set_hysteresis(ch, enable))
    }

    pub fn irq_count(&self) -> u32 {
        self.module.lock(|m| m.irq_count())
    }

    pub fn notify_failures(&self) -> u32 {
        self.module.lock(|m| m.notify_failures())
    }

    /// Run `f` on the module inside one critical section, for sequences of operations that must
    /// not be split by an interrupt, or for the status dispatch.
    pub fn with<R, F: FnOnce(&mut Module<MI, S>) -> R>(&self, f: F) -> R {
        self.module.lock(f)
    }
}

impl<M, MI, S> ChannelIO for SharedModule<M, MI, S>
where
    M: IOMutex<Module<MI, S>>,
    MI: ModuleInterface,
    S: Signal,
{
    type Error = Error<MI::Error>;

    fn read_channel(&self, ch: usize) -> Result<bool, Self::Error> {
        self.module.lock(|m| m.read_channel(ch))
    }
}
