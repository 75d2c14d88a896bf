//! S1D135xx command, register and field definitions
//!
//! This module defines the 16-bit command codes and register addresses
//! understood by the Epson S1D135xx family of electrophoretic display
//! controllers. Every command and parameter travels as a big-endian 16-bit
//! word over SPI, bracketed by chip-select.
//!
//! ## Command Structure
//!
//! All commands follow the pattern:
//! 1. Assert CS (Chip Select, active low)
//! 2. Send the command word (HDC low, if wired)
//! 3. Send parameter words (HDC high, if wired)
//! 4. Deassert CS
//!
//! ## Example
//!
//! ```rust,no_run
//! use s1d135xx::command;
//!
//! let words = [command::UPDATE_FULL, command::waveform_mode(2)];
//! assert_eq!(words, [0x0033, 0x0200]);
//! ```

// Power and boot commands

/// Load init code command (0x00)
///
/// Followed by the raw microcode blob while CS stays asserted.
pub const INIT_SET: u16 = 0x00;

/// Run power state command (0x02)
pub const RUN: u16 = 0x02;

/// Standby power state command (0x04)
pub const STBY: u16 = 0x04;

/// Sleep power state command (0x05)
pub const SLEEP: u16 = 0x05;

/// Init then standby command (0x06)
///
/// Starts the loaded init code and leaves the controller in standby.
pub const INIT_STBY: u16 = 0x06;

// Register access commands

/// Read register command (0x10)
///
/// Requires 1 parameter: register address. The controller answers with a
/// dummy word followed by the register value.
pub const READ_REG: u16 = 0x10;

/// Write register command (0x11)
///
/// Requires 2 parameters: [register address, value]
pub const WRITE_REG: u16 = 0x11;

// Display engine commands

/// Wait for display engine trigger command (0x28)
///
/// HRDY goes high once the pending update has been accepted.
pub const WAIT_DSPE_TRG: u16 = 0x28;

/// Wait for display engine frame end command (0x29)
///
/// HRDY goes high once the panel has finished the optical transition.
pub const WAIT_DSPE_FREND: u16 = 0x29;

/// Full update command (0x33)
///
/// Requires 1 parameter: waveform mode word (see [`waveform_mode`]).
pub const UPDATE_FULL: u16 = 0x33;

/// Full area update command (0x34)
///
/// Requires 5 parameters: [waveform mode, left, top, width, height]
pub const UPDATE_FULL_AREA: u16 = 0x34;

/// EPD gate driver clear command (0x37)
pub const EPD_GDRV_CLR: u16 = 0x37;

// Registers

/// Software reset register (0x0008)
///
/// Writing any value resets the controller logic.
pub const REG_SOFTWARE_RESET: u16 = 0x0008;

/// System status register (0x000A)
///
/// Used to detect readiness on boards without a wired HRDY line.
pub const REG_SYSTEM_STATUS: u16 = 0x000A;

/// Sequencer autoboot command register (0x02A8)
///
/// Bit 15 reports whether the loaded init code passed its checksum.
pub const REG_SEQ_AUTOBOOT_CMD: u16 = 0x02A8;

// Fields

/// Checksum OK bit in [`REG_SEQ_AUTOBOOT_CMD`]
pub const INIT_CODE_CHECKSUM_OK: u16 = 1 << 15;

/// Mask applied to X axis values (left, width): 9 bits
pub const X_MASK: u16 = 0x01FF;

/// Mask applied to Y axis values (top, height): 10 bits
pub const Y_MASK: u16 = 0x03FF;

/// Mask of the waveform mode field within its parameter word
pub const WF_MODE_MASK: u16 = 0x0F00;

/// Encode a waveform identifier into bits 8..=11 of a parameter word
///
/// Only the low 4 bits of `wfid` are kept.
pub const fn waveform_mode(wfid: u8) -> u16 {
    ((wfid as u16) << 8) & WF_MODE_MASK
}

// Timing

/// Maximum number of HRDY polls before giving up, 1ms apart
pub const HRDY_TIMEOUT_POLLS: u32 = 3000;

/// Time the reset line is held low during a hard reset
pub const RESET_PULSE_MS: u32 = 4;

/// Time to wait after releasing the reset line
pub const RESET_SETTLE_MS: u32 = 10;

/// Fixed settle time after the init-then-standby command
pub const INIT_STBY_SETTLE_MS: u32 = 100;

/// Path of the init code blob on the storage medium
pub const INIT_CODE_PATH: &str = "bin/Ecode.bin";
