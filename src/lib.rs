//! Epson S1D135xx E-Paper Display Controller Driver
//!
//! A driver for the command protocol of the Epson S1D135xx family
//! (S1D13524, S1D13541) of electrophoretic display controllers.
//!
//! ## Features
//!
//! - `no_std` compatible
//! - `embedded-hal` v1.0 support
//! - Readiness from the HRDY line or the system status register
//! - Init code loading from any [`Storage`] with checksum verification
//! - Power state control
//! - Full and area updates with two-phase completion (trigger, then frame end)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use core::convert::Infallible;
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::{InputPin, OutputPin};
//! use embedded_hal::spi::{ErrorType, SpiBus};
//! use s1d135xx::{Builder, Controller, Interface, MemoryStorage, PowerState, command};
//!
//! # struct MockSpi;
//! # impl ErrorType for MockSpi { type Error = Infallible; }
//! # impl SpiBus for MockSpi {
//! #     fn read(&mut self, _words: &mut [u8]) -> Result<(), Self::Error> { Ok(()) }
//! #     fn write(&mut self, _words: &[u8]) -> Result<(), Self::Error> { Ok(()) }
//! #     fn transfer(&mut self, _r: &mut [u8], _w: &[u8]) -> Result<(), Self::Error> { Ok(()) }
//! #     fn transfer_in_place(&mut self, _words: &mut [u8]) -> Result<(), Self::Error> { Ok(()) }
//! #     fn flush(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl InputPin for MockPin {
//! #     fn is_high(&mut self) -> Result<bool, Self::Error> { Ok(true) }
//! #     fn is_low(&mut self) -> Result<bool, Self::Error> { Ok(false) }
//! # }
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # let mut delay = MockDelay;
//! # static ECODE: [u8; 4] = [0; 4];
//! let interface = Interface::new(MockSpi, MockPin, MockPin, MockPin, MockPin);
//! let config = match Builder::new().build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//! let mut storage = MemoryStorage::new(command::INIT_CODE_PATH, &ECODE);
//!
//! let mut controller = Controller::new(interface, config);
//! if controller.boot(&mut delay, &mut storage).is_err() {
//!     return;
//! }
//! let _ = controller.set_power_state(&mut delay, PowerState::Run);
//! let _ = controller.update(&mut delay, 2);
//! let _ = controller.wait_update_end(&mut delay);
//! ```

#![no_std]

#[cfg(test)]
extern crate alloc;

/// S1D135xx command and register definitions
pub mod command;
/// Board wiring configuration and builder
pub mod config;
/// Controller command protocol
pub mod controller;
/// Error types for the driver
pub mod error;
/// Hardware interface abstraction
pub mod interface;
/// Init code storage abstraction
pub mod storage;

#[cfg(test)]
mod mock;

pub use config::{Builder, Config, ReadyDetection};
pub use controller::{Controller, PowerState, UpdateArea};
pub use error::{BuilderError, Error, IoError};
pub use interface::{ControllerInterface, Interface, InterfaceError, Line, NoPin};
pub use storage::{MemoryStorage, MemoryStorageError, Storage};
