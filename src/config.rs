//! Abstractions used to open and configure the module.

use log::debug;

use crate::error::Error;
use crate::ident::identify;
use crate::interface::ModuleInterface;
use crate::module::Module;
use crate::notify::Signal;
use crate::registers::CHANNEL_COUNT;

/// Options controlling how a device is opened.
///
/// ```
/// # use m31::interface::noop::NoopInterface;
/// # use m31::notify::Signal;
/// # struct NoSignal;
/// # impl Signal for NoSignal {
/// #     type Error = ();
/// #     fn id(&self) -> u32 { 0 }
/// #     fn send(&self) -> Result<(), ()> { Ok(()) }
/// # }
/// let module = m31::OpenOptions::new()
///     .id_check(true)
///     .open::<_, NoSignal>(NoopInterface)
///     .unwrap();
/// assert!(module.hysteresis_capable());
/// ```
#[derive(Clone, Copy, Debug)]
pub struct OpenOptions {
    id_check: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self { id_check: true }
    }
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Verify the module identity from the ID PROM before opening (default `true`). Without the
    /// check the variant stays unknown, and variant-specific features such as hysteresis are not
    /// available.
    pub fn id_check(mut self, enable: bool) -> Self {
        self.id_check = enable;
        self
    }

    /// Open the device behind `iface`. Fails with `HardwareIdentityMismatch` when the identity
    /// check is enabled and the ID PROM does not describe an M31, M32 or M82.
    pub fn open<MI, S>(self, mut iface: MI) -> Result<Module<MI, S>, Error<MI::Error>>
    where
        MI: ModuleInterface,
        S: Signal,
    {
        let variant = if self.id_check {
            Some(identify(&mut iface)?)
        } else {
            None
        };
        debug!("open: id_check={} variant={:?}", self.id_check, variant);
        Ok(Module::from_parts(iface, variant, self.id_check))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum ModeUpdate {
    Unchanged,
    ReadModify,
    Overwrite,
}

/// Pending hysteresis settings: which channels were specified, and their values.
#[derive(Clone, Copy, Debug, Default)]
struct ModeConfig {
    mask: u16,
    value: u16,
}

impl ModeConfig {
    fn set_channel(&mut self, ch: usize, enable: bool) {
        let bit = 1u16 << ch;
        self.mask |= bit;
        if enable {
            self.value |= bit;
        } else {
            self.value &= !bit;
        }
    }
    fn status(&self) -> ModeUpdate {
        match self.mask {
            0x0000 => ModeUpdate::Unchanged,
            0xFFFF => ModeUpdate::Overwrite,
            _ => ModeUpdate::ReadModify,
        }
    }
    fn merge(&self, current: u16) -> u16 {
        current & !self.mask | self.value
    }
}

/// A `HysteresisConfigurator` collects hysteresis settings for any number of channels and commits
/// them to the M82 mode register in one go. Obtain one from `Module::configure_hysteresis()`,
/// chain calls on it, and end the chain with `commit()`.
///
/// ```
/// # use m31::interface::noop::NoopInterface;
/// # use m31::notify::Signal;
/// # struct NoSignal;
/// # impl Signal for NoSignal {
/// #     type Error = ();
/// #     fn id(&self) -> u32 { 0 }
/// #     fn send(&self) -> Result<(), ()> { Ok(()) }
/// # }
/// let mut module = m31::Module::<_, NoSignal>::open(NoopInterface).unwrap();
/// module
///     .configure_hysteresis()
///     .channels(0..8, true)
///     .channel(3, false)
///     .commit()
///     .unwrap();
/// ```
#[must_use = "Hysteresis changes are not applied unless committed"]
pub struct HysteresisConfigurator<'m, MI: ModuleInterface, S: Signal> {
    module: &'m mut Module<MI, S>,
    mode: ModeConfig,
    invalid: bool,
}

impl<'m, MI: ModuleInterface, S: Signal> HysteresisConfigurator<'m, MI, S> {
    pub(crate) fn new(module: &'m mut Module<MI, S>) -> Self {
        Self {
            module,
            mode: ModeConfig::default(),
            invalid: false,
        }
    }

    fn set_channel(&mut self, ch: usize, enable: bool) {
        if ch < CHANNEL_COUNT {
            self.mode.set_channel(ch, enable);
        } else {
            self.invalid = true;
        }
    }

    /// Select (`true`) or deselect hysteresis for channel `ch`, in the range `0..16`.
    pub fn channel(mut self, ch: usize, enable: bool) -> Self {
        self.set_channel(ch, enable);
        self
    }

    /// Select or deselect hysteresis for every channel yielded by `channels`. Later calls win over
    /// earlier ones for the same channel.
    pub fn channels<I>(mut self, channels: I, enable: bool) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        for ch in channels {
            self.set_channel(ch, enable);
        }
        self
    }

    /// Commit the settings to the mode register. When every channel was specified the register is
    /// overwritten, otherwise it is read, merged and written back; nothing is accessed when no
    /// channel was specified. Fails with `InvalidParameter` if any channel index was out of
    /// range, and with `UnsupportedOperation` on modules without hysteresis.
    pub fn commit(self) -> Result<(), Error<MI::Error>> {
        if !self.module.hysteresis_capable() {
            return Err(Error::UnsupportedOperation);
        }
        if self.invalid {
            return Err(Error::InvalidParameter);
        }
        match self.mode.status() {
            ModeUpdate::Unchanged => Ok(()),
            ModeUpdate::Overwrite => self.module.write_mode(self.mode.value),
            ModeUpdate::ReadModify => {
                let mode = self.mode;
                self.module.read_modify_mode(|cur| mode.merge(cur))
            }
        }
    }
}
