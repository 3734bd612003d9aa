//! Driver core for the MEN M31, M32 and M82 binary input M-Modules.
//!
//! These modules provide 16 binary input channels. Every edge on any input raises an interrupt;
//! the interrupt source itself cannot be switched off. The M82 additionally offers a selectable
//! input hysteresis per channel.
//!
//! This crate implements the part of the driver that has state: it turns the raw interrupts into
//! sticky per-channel change flags, sends an optional notification signal on every interrupt,
//! and serves channel reads and control requests from the application side, concurrently with
//! the interrupt handler. Bus access, interrupt dispatch and signal creation belong to the host
//! and are reached through the [`ModuleInterface`] and [`Signal`] traits.
//!
//! # Construction
//!
//! - Implement [`ModuleInterface`] for your bus access, or use
//!   [`interface::mmio::MmioInterface`] when the module's register window is memory mapped.
//! - Open a [`Module`], which takes ownership of the interface and verifies the module identity
//!   in its ID PROM. Use [`OpenOptions`] to open without the identity check.
//!
//! ```
//! # use m31::notify::Signal;
//! # struct MySignal;
//! # impl Signal for MySignal {
//! #     type Error = ();
//! #     fn id(&self) -> u32 { 1 }
//! #     fn send(&self) -> Result<(), ()> { Ok(()) }
//! # }
//! # let ei = m31::interface::noop::NoopInterface;
//! let mut module = m31::Module::<_, MySignal>::open(ei).unwrap();
//! assert_eq!(module.variant(), Some(m31::Variant::M82));
//! ```
//!
//! # Change tracking
//!
//! *See [`Module::set_tracking_enabled`] and [`Module::take_change_flags`].*
//!
//! Tracking is off after open. Enabling it takes a snapshot of the levels; from then on every
//! interrupt ORs the channels that changed since the previous snapshot into the change flags.
//! Querying the flags returns and resets them. Any number of toggles of one channel between two
//! queries show up as one set bit.
//!
//! The hardware interrupt cannot be disabled, so the tracking toggle always reports
//! [`Error::UnsupportedOperation`] after doing its work, which callers may ignore:
//!
//! ```
//! # use m31::notify::Signal;
//! # struct MySignal;
//! # impl Signal for MySignal {
//! #     type Error = ();
//! #     fn id(&self) -> u32 { 1 }
//! #     fn send(&self) -> Result<(), ()> { Ok(()) }
//! # }
//! # let ei = m31::interface::noop::NoopInterface;
//! # let mut module = m31::Module::<_, MySignal>::open(ei).unwrap();
//! let _ = module.set_tracking_enabled(true);
//! module.register_notification(MySignal).unwrap();
//!
//! // In the interrupt handler:
//! module.handle_interrupt();
//!
//! // After the signal arrived:
//! let changed: u16 = module.take_change_flags().unwrap();
//! let levels: u16 = module.read_all_channels().unwrap();
//! # assert_eq!((changed, levels), (0, 0));
//! ```
//!
//! # Sharing between interrupt and application context
//!
//! *See [`Module::into_shared`] and [`SharedModule`].*
//!
//! The interrupt handler and the application run concurrently. Converting the module into a
//! `SharedModule` puts it behind a device-scoped lock, and every operation then runs as one
//! critical section, so an interrupt can never split the get-and-reset of the change flags.
//!
//! ```
//! # use m31::notify::Signal;
//! # struct MySignal;
//! # impl Signal for MySignal {
//! #     type Error = ();
//! #     fn id(&self) -> u32 { 1 }
//! #     fn send(&self) -> Result<(), ()> { Ok(()) }
//! # }
//! # let ei = m31::interface::noop::NoopInterface;
//! let shared = m31::Module::<_, MySignal>::open(ei)
//!     .unwrap()
//!     .into_shared::<m31::DefaultMutex<_>>();
//!
//! // Hand `&shared` to the interrupt dispatcher, which calls:
//! shared.handle_interrupt();
//!
//! // Individual channels as embedded-hal input pins:
//! let door_contact = shared.channel_pin(5).unwrap();
//! # drop(door_contact);
//! ```
//!
//! ## Mutual exclusion
//!
//! The lock is any type implementing [`IOMutex`]. In a `std` environment enable the `std` Cargo
//! feature, and `mutex::DefaultMutex<T>` is `std::sync::Mutex<T>`. For Cortex-M targets using
//! the `cortex-m` crate, enable `cortexm` instead; `DefaultMutex<T>` is then
//! `cortex_m::interrupt::Mutex<core::cell::RefCell<T>>`, whose critical sections mask
//! interrupts.
//!
//! # Status interface
//!
//! Host frameworks that address driver features by code can use [`Module::get_status`] and
//! [`Module::set_status`] with the codes in [`status`].

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(test)]
extern crate proptest;

extern crate embedded_hal as hal;

pub mod config;
pub mod error;
pub mod ident;
pub mod interface;
pub mod module;
pub mod mutex;
pub mod notify;
pub mod registers;
pub mod status;

pub use config::{HysteresisConfigurator, OpenOptions};
pub use error::Error;
pub use ident::Variant;
pub use interface::ModuleInterface;
pub use module::pin::{ChannelIO, ChannelPin};
pub use module::shared::SharedModule;
pub use module::{IrqResult, Module};
pub use mutex::IOMutex;
#[cfg(any(feature = "std", feature = "cortexm"))]
pub use mutex::DefaultMutex;
pub use notify::Signal;
pub use status::{Direction, GetStatus, SetStatus};
