//! Board wiring configuration and builder

pub use crate::error::BuilderError;

/// How the controller signals that it is ready for the next command
///
/// Chosen once per session. Boards that route HRDY to the host poll the line,
/// others read the system status register and compare the masked value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReadyDetection {
    /// Poll the HRDY line (high = ready)
    #[default]
    Line,
    /// Poll the system status register
    StatusRegister {
        /// Bits of the status register to look at
        mask: u16,
        /// Expected value of the masked bits when ready
        result: u16,
    },
}

impl ReadyDetection {
    /// Whether a system status value means ready
    ///
    /// Always false for [`ReadyDetection::Line`].
    pub fn status_is_ready(&self, status: u16) -> bool {
        match *self {
            Self::Line => false,
            Self::StatusRegister { mask, result } => status & mask == result,
        }
    }
}

/// Board wiring configuration
///
/// Describes which optional lines are connected to the controller and how
/// readiness is detected. Use [`Builder`] to create a Config.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Whether the reset line is wired
    pub reset_line: bool,
    /// Whether the host data/command line is wired
    pub host_data_command_line: bool,
    /// Ready detection strategy
    pub ready: ReadyDetection,
}

/// Builder for constructing the wiring configuration
///
/// # Example
///
/// ```rust,no_run
/// use s1d135xx::{Builder, ReadyDetection};
///
/// // No HRDY line: bit 13 of the status register reads 1 when ready
/// let config = match Builder::new()
///     .ready_detection(ReadyDetection::StatusRegister {
///         mask: 1 << 13,
///         result: 1 << 13,
///     })
///     .build()
/// {
///     Ok(config) => config,
///     Err(_) => return,
/// };
/// let _ = config;
/// ```
#[must_use]
pub struct Builder {
    reset_line: bool,
    host_data_command_line: bool,
    ready: ReadyDetection,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            reset_line: true,
            host_data_command_line: true,
            ready: ReadyDetection::Line,
        }
    }
}

impl Builder {
    /// Create a new Builder with default values
    ///
    /// Defaults: reset and HDC wired, readiness from the HRDY line.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether the reset line is wired
    ///
    /// Without it, hard reset is skipped. Pass `false` whenever the
    /// interface has no reset pin ([`NoPin`](crate::NoPin)), otherwise the
    /// reset pulse goes nowhere and hard reset only sleeps.
    pub fn reset_line(mut self, wired: bool) -> Self {
        self.reset_line = wired;
        self
    }

    /// Set whether the host data/command line is wired
    ///
    /// Pass `false` when the interface has no HDC pin.
    pub fn host_data_command_line(mut self, wired: bool) -> Self {
        self.host_data_command_line = wired;
        self
    }

    /// Set the ready detection strategy
    ///
    /// [`ReadyDetection::Line`] needs a wired HRDY pin. A
    /// [`NoPin`](crate::NoPin) always reads low, so with it every wait times
    /// out; use [`ReadyDetection::StatusRegister`] instead.
    pub fn ready_detection(mut self, ready: ReadyDetection) -> Self {
        self.ready = ready;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::UnreachableReadyCondition` if the status register
    /// fallback expects bits outside its own mask, which could never match.
    pub fn build(self) -> Result<Config, BuilderError> {
        if let ReadyDetection::StatusRegister { mask, result } = self.ready {
            if result & !mask != 0 {
                return Err(BuilderError::UnreachableReadyCondition { mask, result });
            }
        }

        Ok(Config {
            reset_line: self.reset_line,
            host_data_command_line: self.host_data_command_line,
            ready: self.ready,
        })
    }
}
