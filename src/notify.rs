//! The notification channel: at most one signal that fires on every tracked interrupt.

use log::{trace, warn};

/// A signal created by the host for one consumer. The driver only needs to know its id and how
/// to send it; creating and removing it is the host's business, done through ownership: the
/// signal is handed over on registration and returned on deregistration.
pub trait Signal {
    /// The type of error sending may return.
    type Error;

    /// The host-level signal id. Zero is not a valid signal.
    fn id(&self) -> u32;

    /// Deliver one event to the consumer. Must not block.
    fn send(&self) -> Result<(), Self::Error>;
}

/// The single notification slot of a device.
pub(crate) struct NotificationChannel<S> {
    target: Option<S>,
    failures: u32,
}

impl<S: Signal> NotificationChannel<S> {
    pub(crate) fn new() -> Self {
        Self {
            target: None,
            failures: 0,
        }
    }

    /// Install `signal`. Hands it back when a signal is already installed so the caller keeps
    /// ownership.
    pub(crate) fn register(&mut self, signal: S) -> Result<(), S> {
        if self.target.is_some() {
            return Err(signal);
        }
        self.target = Some(signal);
        Ok(())
    }

    pub(crate) fn deregister(&mut self) -> Option<S> {
        self.target.take()
    }

    pub(crate) fn target_id(&self) -> Option<u32> {
        self.target.as_ref().map(|s| s.id())
    }

    /// Send one event if a signal is installed. A failed send is counted and logged, never
    /// retried.
    pub(crate) fn deliver(&mut self) {
        if let Some(signal) = &self.target {
            match signal.send() {
                Ok(()) => trace!("signal {} sent", signal.id()),
                Err(_) => {
                    self.failures = self.failures.wrapping_add(1);
                    warn!("failed to send signal {}", signal.id());
                }
            }
        }
    }

    pub(crate) fn failures(&self) -> u32 {
        self.failures
    }
}


#[cfg(test)]
mod tests {
    use super::test_signal::CountingSignal;
    use super::*;

    #[test]
    fn register_once() {
        let mut ch = NotificationChannel::new();
        assert!(ch.register(CountingSignal::new(10)).is_ok());
        let rejected = ch.register(CountingSignal::new(11));
        assert_eq!(rejected.map_err(|s| s.id()), Err(11));
        assert_eq!(ch.target_id(), Some(10));
    }

    #[test]
    fn deregister_returns_signal() {
        let mut ch = NotificationChannel::new();
        assert!(ch.deregister().is_none());
        assert!(ch.register(CountingSignal::new(10)).is_ok());
        assert_eq!(ch.deregister().map(|s| s.id()), Some(10));
        assert_eq!(ch.target_id(), None);
    }

    #[test]
    fn deliver_sends_exactly_once() {
        let sig = CountingSignal::new(3);
        let mut ch = NotificationChannel::new();
        ch.deliver();
        assert!(ch.register(sig.split()).is_ok());
        ch.deliver();
        assert_eq!(sig.sent(), 1);
        assert_eq!(ch.failures(), 0);
    }

    #[test]
    fn deliver_failure_is_counted() {
        let sig = CountingSignal::new(3);
        sig.break_delivery(true);
        let mut ch = NotificationChannel::new();
        assert!(ch.register(sig.split()).is_ok());
        ch.deliver();
        ch.deliver();
        assert_eq!(sig.sent(), 0);
        assert_eq!(ch.failures(), 2);
    }
}
