//! The lock a [`SharedModule`](crate::SharedModule) keeps its module behind.

/// Lock serialising the interrupt handler against the query path of one module.
///
/// Implementations exist for `std::sync::Mutex` (feature `std`) and for
/// `cortex_m::interrupt::Mutex<RefCell<_>>` (feature `cortexm`). The latter holds the lock by
/// masking interrupts, so the handler cannot preempt a query on a single core. [`DefaultMutex`]
/// names whichever of the two is enabled.
pub trait IOMutex<T> {
    /// Wrap the module state `v`.
    fn new(v: T) -> Self;

    /// Run `f` on the guarded state as one critical section and return its result.
    fn lock<R, F: FnOnce(&mut T) -> R>(&self, f: F) -> R;
}

#[cfg(feature = "std")]
pub type DefaultMutex<T> = std::sync::Mutex<T>;

#[cfg(all(feature = "cortexm", not(feature = "std")))]
pub type DefaultMutex<T> = cortex_m::interrupt::Mutex<core::cell::RefCell<T>>;

#[cfg(feature = "std")]
impl<T> IOMutex<T> for std::sync::Mutex<T> {
    fn new(v: T) -> Self {
        std::sync::Mutex::new(v)
    }
    fn lock<R, F: FnOnce(&mut T) -> R>(&self, f: F) -> R {
        // Tracker and counters are plain words, so state left by a panicking holder is usable.
        let mut state = std::sync::Mutex::lock(self).unwrap_or_else(|p| p.into_inner());
        f(&mut state)
    }
}

#[cfg(feature = "cortexm")]
impl<T> IOMutex<T> for cortex_m::interrupt::Mutex<core::cell::RefCell<T>> {
    fn new(v: T) -> Self {
        cortex_m::interrupt::Mutex::new(core::cell::RefCell::new(v))
    }
    fn lock<R, F: FnOnce(&mut T) -> R>(&self, f: F) -> R {
        cortex_m::interrupt::free(|cs| f(&mut self.borrow(cs).borrow_mut()))
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::IOMutex;
    use std::sync::Mutex;

    #[test]
    fn lock_survives_panicking_holder() {
        let m = std::sync::Arc::new(<Mutex<u16> as IOMutex<u16>>::new(0x0001));
        let held = m.clone();
        let res = std::thread::spawn(move || {
            IOMutex::lock(&*held, |v| {
                *v |= 0x0002;
                panic!("holder died");
            })
        })
        .join();
        assert!(res.is_err());
        assert_eq!(IOMutex::lock(&*m, |v| *v), 0x0003);
    }
}
