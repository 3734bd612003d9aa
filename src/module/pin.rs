//! APIs for reading individual input channels through an `embedded-hal` API.

#[cfg(feature = "unproven")]
use hal::digital::v2::InputPin;

/// An indirection between pin abstractions and the shared module.
pub trait ChannelIO {
    /// The type of error a channel read may return.
    type Error;

    /// Read the level of input channel `ch` (`true` is logic high).
    fn read_channel(&self, ch: usize) -> Result<bool, Self::Error>;
}

/// A single input channel. Implements the `embedded-hal` `InputPin` trait, so drivers written
/// against it can consume module inputs directly. There is no `OutputPin` impl: the module has
/// no outputs.
pub struct ChannelPin<'io, IO: ChannelIO> {
    io: &'io IO,
    ch: usize,
}

impl<'io, IO: ChannelIO> ChannelPin<'io, IO> {
    pub(crate) fn new(io: &'io IO, ch: usize) -> Self {
        Self { io, ch }
    }

    /// The channel number this pin reads.
    pub fn channel(&self) -> usize {
        self.ch
    }
}

#[cfg(feature = "unproven")]
impl<'io, IO: ChannelIO> InputPin for ChannelPin<'io, IO> {
    type Error = IO::Error;

    fn is_high(&self) -> Result<bool, Self::Error> {
        self.io.read_channel(self.ch)
    }
    fn is_low(&self) -> Result<bool, Self::Error> {
        self.io.read_channel(self.ch).map(|b| !b)
    }
}
