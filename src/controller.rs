//! Controller command protocol
//!
//! [`Controller`] owns one session with one physical S1D135xx. Every exchange
//! is a chip-select frame holding a 16-bit command word and its 16-bit
//! parameters, all big-endian. Readiness is polled between commands, either on
//! the HRDY line or through the system status register, as fixed by the
//! [`Config`].
//!
//! Typical bring-up:
//!
//! 1. [`Controller::hard_reset`]
//! 2. [`Controller::soft_reset`]
//! 3. [`Controller::load_init_code`]
//! 4. [`Controller::set_power_state`] to [`PowerState::Run`]
//!
//! after which [`Controller::update`] / [`Controller::update_area`] followed by
//! [`Controller::wait_update_end`] drive the panel.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::PinState;
use embedded_io::Error as _;

use crate::command::{
    EPD_GDRV_CLR, HRDY_TIMEOUT_POLLS, INIT_CODE_CHECKSUM_OK, INIT_CODE_PATH, INIT_SET, INIT_STBY,
    INIT_STBY_SETTLE_MS, READ_REG, REG_SEQ_AUTOBOOT_CMD, REG_SOFTWARE_RESET, REG_SYSTEM_STATUS,
    RESET_PULSE_MS, RESET_SETTLE_MS, RUN, SLEEP, STBY, UPDATE_FULL, UPDATE_FULL_AREA,
    WAIT_DSPE_FREND, WAIT_DSPE_TRG, WRITE_REG, X_MASK, Y_MASK, waveform_mode,
};
use crate::config::{Config, ReadyDetection};
use crate::error::{Error, IoError};
use crate::interface::{ControllerInterface, Line};
use crate::storage::Storage;

type ControllerResult<I, T = ()> = core::result::Result<T, Error<I>>;

/// Size of the chunks used to stream the init code
const INIT_CODE_CHUNK: usize = 64;

/// Controller power state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PowerState {
    /// Display engine running, updates possible
    Run,
    /// Clocks running, display engine stopped
    Standby,
    /// Lowest power state with the init code retained
    Sleep,
    /// Not supported by the controller; requesting it does nothing
    Off,
}

impl PowerState {
    /// Command word entering this state, if the controller has one
    pub const fn command(self) -> Option<u16> {
        match self {
            Self::Run => Some(RUN),
            Self::Standby => Some(STBY),
            Self::Sleep => Some(SLEEP),
            Self::Off => None,
        }
    }
}

/// Rectangle for an area update, in panel pixels
///
/// Values are not validated. On the wire X values (`left`, `width`) keep 9
/// bits and Y values (`top`, `height`) keep 10 bits, so anything larger wraps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateArea {
    /// Left edge
    pub left: u16,
    /// Top edge
    pub top: u16,
    /// Width
    pub width: u16,
    /// Height
    pub height: u16,
}

impl UpdateArea {
    /// Create a new area
    pub const fn new(left: u16, top: u16, width: u16, height: u16) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Geometry parameters as sent on the wire: left, top, width, height
    pub const fn params(&self) -> [u16; 4] {
        [
            self.left & X_MASK,
            self.top & Y_MASK,
            self.width & X_MASK,
            self.height & Y_MASK,
        ]
    }
}

/// Driver session for one S1D135xx controller
///
/// The interface can be owned or borrowed (`&mut I` also implements
/// [`ControllerInterface`]).
pub struct Controller<I>
where
    I: ControllerInterface,
{
    /// Hardware interface
    interface: I,
    /// Board wiring
    config: Config,
}

impl<I> Controller<I>
where
    I: ControllerInterface,
{
    /// Create a new Controller instance
    ///
    /// Does not touch the hardware.
    pub fn new(interface: I, config: Config) -> Self {
        Self { interface, config }
    }

    /// Access the board wiring configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Consume the controller and return the interface
    pub fn release(self) -> I {
        self.interface
    }

    /// Run hard reset, soft reset and init code load in order
    ///
    /// Stops at the first failing stage. The controller ends in standby.
    pub fn boot<D, S>(&mut self, delay: &mut D, storage: &mut S) -> ControllerResult<I>
    where
        D: DelayNs,
        S: Storage,
    {
        self.hard_reset(delay)?;
        self.soft_reset(delay)?;
        self.load_init_code(delay, storage)
    }

    /// Pulse the reset line
    ///
    /// Skipped with a warning when no reset line is wired.
    pub fn hard_reset<D: DelayNs>(&mut self, delay: &mut D) -> ControllerResult<I> {
        if !self.config.reset_line {
            log::warn!("No hard reset line, skipping hard reset");
            return Ok(());
        }

        self.set_line(Line::Reset, PinState::Low)?;
        delay.delay_ms(RESET_PULSE_MS);
        self.set_line(Line::Reset, PinState::High)?;
        delay.delay_ms(RESET_SETTLE_MS);

        Ok(())
    }

    /// Reset the controller logic through the software reset register
    pub fn soft_reset<D: DelayNs>(&mut self, delay: &mut D) -> ControllerResult<I> {
        self.write_register(REG_SOFTWARE_RESET, 0)?;
        self.wait_idle(delay)
    }

    /// Stream the init code and start it
    ///
    /// Opens [`INIT_CODE_PATH`] on `storage`, sends it after the init set
    /// command, checks the controller's checksum flag and finally issues
    /// init-then-standby.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] if the file cannot be opened, read or streamed
    /// - [`Error::Checksum`] if the controller rejects the init code; no further
    ///   command is sent in that case
    /// - [`Error::Timeout`] if HRDY is not seen around any stage
    pub fn load_init_code<D, S>(&mut self, delay: &mut D, storage: &mut S) -> ControllerResult<I>
    where
        D: DelayNs,
        S: Storage,
    {
        let mut file = storage.open(INIT_CODE_PATH).map_err(|e| {
            log::error!("Failed to open init code {}: {:?}", INIT_CODE_PATH, e);
            IoError::Open
        })?;

        self.wait_idle(delay)?;

        let streamed = self.frame(|this| {
            this.send_command(INIT_SET)?;
            Ok(this.stream(&mut file))
        })?;
        drop(file);

        self.wait_idle(delay)?;

        if let Err(e) = streamed {
            log::error!("Failed to transfer init code file: {}", e);
            return Err(e.into());
        }

        let status = self.read_register(REG_SEQ_AUTOBOOT_CMD)?;
        if status & INIT_CODE_CHECKSUM_OK == 0 {
            log::error!("Init code checksum error ({:#06x})", status);
            return Err(Error::Checksum { status });
        }

        self.command(INIT_STBY, &[])?;
        delay.delay_ms(INIT_STBY_SETTLE_MS);

        self.wait_idle(delay)
    }

    /// Switch to run and clear the gate drivers
    pub fn init_gate_driver<D: DelayNs>(&mut self, delay: &mut D) -> ControllerResult<I> {
        self.set_power_state(delay, PowerState::Run)?;
        self.command(EPD_GDRV_CLR, &[])?;
        self.wait_idle(delay)
    }

    /// Change the controller power state
    ///
    /// Waits for idle before and after the transition. [`PowerState::Off`] has
    /// no controller command: it logs a warning and returns `Ok` without any
    /// bus traffic, so it does not reduce power.
    pub fn set_power_state<D: DelayNs>(
        &mut self,
        delay: &mut D,
        state: PowerState,
    ) -> ControllerResult<I> {
        let Some(cmd) = state.command() else {
            log::warn!("{:?} power state not supported", state);
            return Ok(());
        };

        log::debug!("power state {:?}", state);

        self.wait_idle(delay)?;
        self.command(cmd, &[])?;
        self.wait_idle(delay)
    }

    /// Start a full panel update with waveform `wfid`
    ///
    /// Returns once the display engine has accepted the update. Call
    /// [`Controller::wait_update_end`] to know when the panel has finished.
    pub fn update<D: DelayNs>(&mut self, delay: &mut D, wfid: u8) -> ControllerResult<I> {
        log::debug!("update {}", wfid);

        self.command(UPDATE_FULL, &[waveform_mode(wfid)])?;
        self.wait_idle(delay)?;
        self.wait_dspe_trig(delay)
    }

    /// Start an update of `area` with waveform `wfid`
    ///
    /// Same completion rules as [`Controller::update`]. Coordinates are masked,
    /// not checked.
    pub fn update_area<D: DelayNs>(
        &mut self,
        delay: &mut D,
        wfid: u8,
        area: &UpdateArea,
    ) -> ControllerResult<I> {
        log::debug!(
            "update area {} ({}, {}) {}x{}",
            wfid,
            area.left,
            area.top,
            area.width,
            area.height
        );

        let [left, top, width, height] = area.params();
        self.command(
            UPDATE_FULL_AREA,
            &[waveform_mode(wfid), left, top, width, height],
        )?;
        self.wait_idle(delay)?;
        self.wait_dspe_trig(delay)
    }

    /// Wait until the display engine has picked up the pending update
    pub fn wait_dspe_trig<D: DelayNs>(&mut self, delay: &mut D) -> ControllerResult<I> {
        self.command(WAIT_DSPE_TRG, &[])?;
        self.wait_idle(delay)
    }

    /// Wait until the panel has finished the last update
    pub fn wait_update_end<D: DelayNs>(&mut self, delay: &mut D) -> ControllerResult<I> {
        self.command(WAIT_DSPE_FREND, &[])?;
        self.wait_idle(delay)
    }

    /// Poll until the controller is ready
    ///
    /// Checks readiness up to [`HRDY_TIMEOUT_POLLS`] times with 1ms between
    /// checks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if the controller never reports ready.
    pub fn wait_idle<D: DelayNs>(&mut self, delay: &mut D) -> ControllerResult<I> {
        for poll in 1..=HRDY_TIMEOUT_POLLS {
            if self.is_ready()? {
                return Ok(());
            }
            if poll < HRDY_TIMEOUT_POLLS {
                delay.delay_ms(1);
            }
        }

        log::error!("HRDY timeout");
        Err(Error::Timeout)
    }

    /// Send an arbitrary command with its parameters in one frame
    ///
    /// Does not wait for idle.
    pub fn command(&mut self, cmd: u16, params: &[u16]) -> ControllerResult<I> {
        self.frame(|this| {
            this.send_command(cmd)?;
            this.send_params(params)
        })
    }

    /// Read a 16-bit register
    pub fn read_register(&mut self, reg: u16) -> ControllerResult<I, u16> {
        let value = self.frame(|this| {
            this.send_command(READ_REG)?;
            this.send_params(&[reg])?;
            // First word out is garbage, the value follows
            let mut word = [0u8; 2];
            this.interface
                .receive_bytes(&mut word)
                .map_err(Error::Interface)?;
            this.interface
                .receive_bytes(&mut word)
                .map_err(Error::Interface)?;
            Ok(u16::from_be_bytes(word))
        })?;

        log::trace!("read reg {:#06x} = {:#06x}", reg, value);

        Ok(value)
    }

    /// Write a 16-bit register
    pub fn write_register(&mut self, reg: u16, value: u16) -> ControllerResult<I> {
        log::trace!("write reg {:#06x} = {:#06x}", reg, value);

        self.command(WRITE_REG, &[reg, value])
    }

    fn is_ready(&mut self) -> ControllerResult<I, bool> {
        match self.config.ready {
            ReadyDetection::Line => {
                let level = self
                    .interface
                    .get_line(Line::HostReady)
                    .map_err(Error::Interface)?;
                Ok(level == PinState::High)
            }
            ready @ ReadyDetection::StatusRegister { .. } => {
                let status = self.read_register(REG_SYSTEM_STATUS)?;
                Ok(ready.status_is_ready(status))
            }
        }
    }

    /// Run `f` with chip-select asserted
    ///
    /// Chip-select is released even when `f` fails.
    fn frame<T, F>(&mut self, f: F) -> ControllerResult<I, T>
    where
        F: FnOnce(&mut Self) -> ControllerResult<I, T>,
    {
        self.set_line(Line::ChipSelect, PinState::Low)?;
        let result = f(self);
        let released = self.set_line(Line::ChipSelect, PinState::High);
        let value = result?;
        released?;
        Ok(value)
    }

    /// Forward the init code file to the interface
    fn stream<R: embedded_io::Read>(&mut self, file: &mut R) -> Result<(), IoError> {
        let mut chunk = [0u8; INIT_CODE_CHUNK];
        loop {
            let n = file.read(&mut chunk).map_err(|e| IoError::Read(e.kind()))?;
            if n == 0 {
                return Ok(());
            }
            self.interface
                .send_bytes(&chunk[..n])
                .map_err(|_| IoError::Transfer)?;
        }
    }

    /// Send a command word, with HDC low if wired
    ///
    /// Early S1D135xx drivers left HDC alone and only framed commands with
    /// chip-select. Later revisions drive HDC low around the command word
    /// whenever the line is wired, and this follows the later behavior.
    /// Without an HDC line the wire trace is the chip-select-only one.
    fn send_command(&mut self, cmd: u16) -> ControllerResult<I> {
        let hdc = self.config.host_data_command_line;
        if hdc {
            self.set_line(Line::HostDataCommand, PinState::Low)?;
        }
        self.interface
            .send_bytes(&cmd.to_be_bytes())
            .map_err(Error::Interface)?;
        if hdc {
            self.set_line(Line::HostDataCommand, PinState::High)?;
        }
        Ok(())
    }

    /// Send parameter words
    fn send_params(&mut self, params: &[u16]) -> ControllerResult<I> {
        for param in params {
            self.interface
                .send_bytes(&param.to_be_bytes())
                .map_err(Error::Interface)?;
        }
        Ok(())
    }

    fn set_line(&mut self, line: Line, level: PinState) -> ControllerResult<I> {
        self.interface
            .set_line(line, level)
            .map_err(Error::Interface)
    }
}
