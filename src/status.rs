//! The get/set status dispatch used by host frameworks that address driver features by code.

use crate::error::Error;
use crate::ident::Variant;
use crate::interface::ModuleInterface;
use crate::module::Module;
use crate::notify::Signal;
use crate::registers::{CHANNEL_COUNT, ID_PROM_SIZE};

/// Channel direction as reported and accepted by the status interface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
    InOut,
}

impl From<Direction> for u32 {
    fn from(dir: Direction) -> u32 {
        match dir {
            Direction::Input => 0,
            Direction::Output => 1,
            Direction::InOut => 2,
        }
    }
}

/// Kind of data a channel carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelType {
    Binary,
}

impl From<ChannelType> for u32 {
    fn from(ty: ChannelType) -> u32 {
        match ty {
            ChannelType::Binary => 1,
        }
    }
}

/// Codes for `get_status`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GetStatus {
    /// Number of channels (16).
    ChannelCount,
    /// Channel direction, always [`Direction::Input`].
    ChannelDirection,
    /// Channel width in bits (1).
    ChannelWidth,
    /// Channel type, always [`ChannelType::Binary`].
    ChannelType,
    /// Id of the installed signal, 0 when none.
    Signal,
    /// Get and reset the change flags.
    ChangeFlags,
    /// Hysteresis selection of the addressed channel (M82 only).
    Hysteresis,
    /// Interrupt counter.
    IrqCount,
    /// 1 when the module identity was verified at open.
    IdCheck,
    /// Size of the ID PROM in bytes.
    IdSize,
    /// Detected module id, 0 when unchecked.
    ModuleId,
}

/// Codes for `set_status`, with their argument.
pub enum SetStatus<S> {
    /// Only [`Direction::Input`] is accepted.
    ChannelDirection(Direction),
    /// Preset the interrupt counter.
    IrqCount(u32),
    /// Toggle change tracking. Always reports `UnsupportedOperation`, see
    /// [`Module::set_tracking_enabled`].
    TrackingEnable(bool),
    /// Install a signal.
    Signal(S),
    /// Remove the installed signal.
    ClearSignal,
    /// Select or deselect hysteresis for the addressed channel (M82 only).
    Hysteresis(bool),
}

impl<MI: ModuleInterface, S: Signal> Module<MI, S> {
    /// Query status `code`. `ch` addresses the channel for per-channel codes and is ignored
    /// otherwise.
    pub fn get_status(&mut self, code: GetStatus, ch: usize) -> Result<u32, Error<MI::Error>> {
        Ok(match code {
            GetStatus::ChannelCount => CHANNEL_COUNT as u32,
            GetStatus::ChannelDirection => Direction::Input.into(),
            GetStatus::ChannelWidth => 1,
            GetStatus::ChannelType => ChannelType::Binary.into(),
            GetStatus::Signal => self.notification_target().unwrap_or(0),
            GetStatus::ChangeFlags => self.take_change_flags()?.into(),
            GetStatus::Hysteresis => self.hysteresis(ch)?.into(),
            GetStatus::IrqCount => self.irq_count(),
            GetStatus::IdCheck => self.id_check().into(),
            GetStatus::IdSize => ID_PROM_SIZE as u32,
            GetStatus::ModuleId => self.variant().map_or(0, Variant::id).into(),
        })
    }

    /// Apply status `code`. `ch` addresses the channel for per-channel codes and is ignored
    /// otherwise. Returns the signal released by `ClearSignal`, for the host to dispose of.
    pub fn set_status(
        &mut self,
        code: SetStatus<S>,
        ch: usize,
    ) -> Result<Option<S>, Error<MI::Error>> {
        match code {
            SetStatus::ChannelDirection(Direction::Input) => {}
            SetStatus::ChannelDirection(_) => return Err(Error::InvalidParameter),
            SetStatus::IrqCount(count) => self.set_irq_count(count),
            SetStatus::TrackingEnable(enable) => self.set_tracking_enabled(enable)?,
            SetStatus::Signal(signal) => self.register_notification(signal)?,
            SetStatus::ClearSignal => return self.deregister_notification().map(Some),
            SetStatus::Hysteresis(enable) => self.set_hysteresis(ch, enable)?,
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::{M31_ID, M82_ID};
    use crate::interface::test_spy::TestSpyInterface;
    use crate::notify::test_signal::CountingSignal;

    fn open(ei: &TestSpyInterface) -> Module<TestSpyInterface, CountingSignal> {
        Module::open(ei.split()).unwrap()
    }

    #[test]
    fn constant_codes() {
        let ei = TestSpyInterface::new(M31_ID);
        let mut m = open(&ei);
        assert_eq!(m.get_status(GetStatus::ChannelCount, 0), Ok(16));
        assert_eq!(m.get_status(GetStatus::ChannelDirection, 0), Ok(0));
        assert_eq!(m.get_status(GetStatus::ChannelWidth, 0), Ok(1));
        assert_eq!(m.get_status(GetStatus::ChannelType, 0), Ok(1));
        assert_eq!(m.get_status(GetStatus::IdCheck, 0), Ok(1));
        assert_eq!(m.get_status(GetStatus::IdSize, 0), Ok(128));
        assert_eq!(m.get_status(GetStatus::ModuleId, 0), Ok(31));
    }

    #[test]
    fn direction_input_only() {
        let ei = TestSpyInterface::new(M31_ID);
        let mut m = open(&ei);
        assert!(m
            .set_status(SetStatus::ChannelDirection(Direction::Input), 0)
            .is_ok());
        assert!(m
            .set_status(SetStatus::ChannelDirection(Direction::Output), 0)
            .is_err());
    }

    #[test]
    fn signal_codes() {
        let ei = TestSpyInterface::new(M31_ID);
        let mut m = open(&ei);
        assert_eq!(m.get_status(GetStatus::Signal, 0), Ok(0));
        assert!(m
            .set_status(SetStatus::Signal(CountingSignal::new(12)), 0)
            .is_ok());
        assert_eq!(m.get_status(GetStatus::Signal, 0), Ok(12));
        assert_eq!(
            m.set_status(SetStatus::Signal(CountingSignal::new(13)), 0)
                .err(),
            Some(Error::AlreadyRegistered)
        );
        let released = m.set_status(SetStatus::ClearSignal, 0).unwrap();
        assert_eq!(released.map(|s| s.id()), Some(12));
        assert_eq!(
            m.set_status(SetStatus::ClearSignal, 0).err(),
            Some(Error::NotRegistered)
        );
    }

    #[test]
    fn tracking_and_change_flags() {
        let ei = TestSpyInterface::new(M31_ID);
        let mut m = open(&ei);
        assert_eq!(
            m.get_status(GetStatus::ChangeFlags, 0),
            Err(Error::DeviceNotReady)
        );
        assert_eq!(
            m.set_status(SetStatus::TrackingEnable(true), 0).err(),
            Some(Error::UnsupportedOperation)
        );
        assert!(m.tracking_enabled());
        ei.set_levels(0x0400);
        m.handle_interrupt();
        assert_eq!(m.get_status(GetStatus::ChangeFlags, 0), Ok(0x0400));
        assert_eq!(m.get_status(GetStatus::ChangeFlags, 0), Ok(0));
    }

    #[test]
    fn irq_count_codes() {
        let ei = TestSpyInterface::new(M31_ID);
        let mut m = open(&ei);
        m.handle_interrupt();
        assert_eq!(m.get_status(GetStatus::IrqCount, 0), Ok(1));
        assert!(m.set_status(SetStatus::IrqCount(100), 0).is_ok());
        m.handle_interrupt();
        assert_eq!(m.get_status(GetStatus::IrqCount, 0), Ok(101));
    }

    #[test]
    fn hysteresis_codes() {
        let ei = TestSpyInterface::new(M82_ID);
        let mut m = open(&ei);
        assert!(m.set_status(SetStatus::Hysteresis(true), 9).is_ok());
        assert_eq!(m.get_status(GetStatus::Hysteresis, 9), Ok(1));
        assert_eq!(m.get_status(GetStatus::Hysteresis, 8), Ok(0));
        assert_eq!(ei.mode(), 0x0200);

        let ei = TestSpyInterface::new(M31_ID);
        let mut m = open(&ei);
        assert_eq!(
            m.get_status(GetStatus::Hysteresis, 0),
            Err(Error::UnsupportedOperation)
        );
    }
}
