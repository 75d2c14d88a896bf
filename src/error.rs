//! Error types for the driver
//!
//! This module defines error types for configuration building ([`BuilderError`])
//! and controller operations ([`Error`]).
//!
//! ## Error Types
//!
//! - [`BuilderError`] - Errors during configuration construction
//! - [`Error`] - Runtime errors during controller operations
//! - [`IoError`] - Failures while streaming the init code
//! - [`InterfaceError`](crate::interface::InterfaceError) - Low-level hardware communication errors
//!
//! Any failure during the boot sequence leaves the controller in an unknown
//! state; start again from a hard reset.
//!
//! ## Example
//!
//! ```
//! use s1d135xx::{Builder, BuilderError, ReadyDetection};
//!
//! // Expected status bits outside the mask can never match
//! let result = Builder::new()
//!     .ready_detection(ReadyDetection::StatusRegister { mask: 0x0F00, result: 0x1000 })
//!     .build();
//! assert!(matches!(result, Err(BuilderError::UnreachableReadyCondition { .. })));
//! ```

use crate::interface::ControllerInterface;

/// Errors that can occur when interacting with the controller
///
/// Generic over the interface type to preserve the specific error type.
/// This allows error handling code to match on the underlying hardware error.
#[derive(Debug)]
pub enum Error<I: ControllerInterface> {
    /// Interface error (SPI/GPIO)
    ///
    /// Wraps the underlying hardware error from the [`ControllerInterface`] implementation.
    Interface(I::Error),
    /// The controller did not report ready within the polling window
    Timeout,
    /// The init code failed the controller's checksum
    Checksum {
        /// Value read back from the autoboot command register
        status: u16,
    },
    /// The init code could not be opened, read or streamed
    Io(IoError),
}

impl<I: ControllerInterface> core::fmt::Display for Error<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Interface(_) => write!(f, "Interface error"),
            Self::Timeout => write!(f, "Timeout waiting for HRDY"),
            Self::Checksum { status } => write!(
                f,
                "Init code checksum error (autoboot status {status:#06x})"
            ),
            Self::Io(e) => write!(f, "Init code I/O error: {e}"),
        }
    }
}

impl<I: ControllerInterface + core::fmt::Debug> core::error::Error for Error<I> {}

impl<I: ControllerInterface> From<IoError> for Error<I> {
    fn from(e: IoError) -> Self {
        Self::Io(e)
    }
}

/// Failures while loading the init code
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IoError {
    /// The init code file could not be opened
    Open,
    /// Reading the init code file failed
    Read(embedded_io::ErrorKind),
    /// The interface failed while streaming the init code
    Transfer,
}

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Open => write!(f, "failed to open file"),
            Self::Read(kind) => write!(f, "failed to read file: {kind:?}"),
            Self::Transfer => write!(f, "failed to transfer file"),
        }
    }
}

impl core::error::Error for IoError {}

/// Errors that can occur when building configuration
///
/// These errors occur during the builder pattern before the controller is created.
#[derive(Debug)]
pub enum BuilderError {
    /// The status register fallback expects bits outside its mask
    ///
    /// `status & mask == result` can never hold, so every wait would time out.
    UnreachableReadyCondition {
        /// Status bits to compare
        mask: u16,
        /// Expected value of the masked bits
        result: u16,
    },
}

impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnreachableReadyCondition { mask, result } => write!(
                f,
                "Ready condition {result:#06x} has bits outside mask {mask:#06x}"
            ),
        }
    }
}

impl core::error::Error for BuilderError {}
