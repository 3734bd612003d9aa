//! Change tracking: turns raw level snapshots taken on every interrupt into sticky per-channel
//! change flags.

/// Sticky change flags plus the snapshot they are computed against.
///
/// While enabled, every call to `record` ORs the channels that differ from the previous snapshot
/// into the change flags. Any number of toggles on a channel between two `take` calls collapse
/// into one set bit. Transitions seen while disabled, or before the most recent `enable`, are
/// never reported.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct ChangeTracker {
    last_state: u16,
    change_flags: u16,
    enabled: bool,
}

impl ChangeTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) tracking against `snapshot`, dropping any pending flags.
    pub(crate) fn enable(&mut self, snapshot: u16) {
        self.last_state = snapshot;
        self.change_flags = 0;
        self.enabled = true;
    }

    pub(crate) fn disable(&mut self) {
        self.enabled = false;
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Merge a new snapshot. Returns the channels that differ from the previous snapshot, or
    /// `None` when tracking is disabled and nothing was recorded.
    pub(crate) fn record(&mut self, current: u16) -> Option<u16> {
        if !self.enabled {
            return None;
        }
        let delta = self.last_state ^ current;
        self.change_flags |= delta;
        self.last_state = current;
        Some(delta)
    }

    /// Return the accumulated flags and reset them. `None` when tracking is disabled, in which
    /// case nothing changes.
    pub(crate) fn take(&mut self) -> Option<u16> {
        if !self.enabled {
            return None;
        }
        let flags = self.change_flags;
        self.change_flags = 0;
        Some(flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn disabled_records_nothing() {
        let mut t = ChangeTracker::new();
        assert_eq!(t.record(0xFFFF), None);
        assert_eq!(t.take(), None);
        assert_eq!(t, ChangeTracker::new());
    }

    #[test]
    fn single_edge() {
        let mut t = ChangeTracker::new();
        t.enable(0x0000);
        assert_eq!(t.record(0x0001), Some(0x0001));
        assert_eq!(t.take(), Some(0x0001));
        assert_eq!(t.take(), Some(0x0000));
    }

    #[test]
    fn toggles_coalesce() {
        let mut t = ChangeTracker::new();
        t.enable(0x0000);
        t.record(0x0003);
        t.record(0x0001);
        assert_eq!(t.take(), Some(0x0003));
    }

    #[test]
    fn enable_resynchronizes() {
        let mut t = ChangeTracker::new();
        t.enable(0x0000);
        t.record(0x00F0);
        t.enable(0x00F0);
        assert_eq!(t.take(), Some(0x0000));
        assert_eq!(t.record(0x00F1), Some(0x0001));
    }

    #[test]
    fn disable_keeps_state_but_blocks_take() {
        let mut t = ChangeTracker::new();
        t.enable(0x0000);
        t.record(0x0100);
        t.disable();
        let before = t;
        assert_eq!(t.take(), None);
        assert_eq!(t, before);
        assert_eq!(t.record(0x0300), None);
        assert_eq!(t.take(), None);
        assert!(!t.is_enabled());
    }

    proptest! {
        #[test]
        fn flags_are_or_of_consecutive_xors(
            start in any::<u16>(),
            snapshots in prop::collection::vec(any::<u16>(), 0..32),
        ) {
            let mut t = ChangeTracker::new();
            t.enable(start);
            let mut expected = 0u16;
            let mut prev = start;
            for &s in &snapshots {
                t.record(s);
                expected |= prev ^ s;
                prev = s;
            }
            prop_assert_eq!(t.take(), Some(expected));
            prop_assert_eq!(t.take(), Some(0));
        }

        #[test]
        fn take_splits_history(
            start in any::<u16>(),
            before in prop::collection::vec(any::<u16>(), 1..16),
            after in prop::collection::vec(any::<u16>(), 0..16),
        ) {
            let mut t = ChangeTracker::new();
            t.enable(start);
            for &s in &before {
                t.record(s);
            }
            t.take();
            let mut expected = 0u16;
            let mut prev = *before.last().unwrap();
            for &s in &after {
                t.record(s);
                expected |= prev ^ s;
                prev = s;
            }
            prop_assert_eq!(t.take(), Some(expected));
        }
    }
}
