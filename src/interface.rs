//! Hardware interface abstraction
//!
//! This module provides the [`ControllerInterface`] trait and the [`Interface`] struct
//! for communicating with an S1D135xx controller over SPI.
//!
//! ## Hardware Requirements
//!
//! The S1D135xx requires:
//! - SPI bus (MOSI + MISO + SCK), mode 0, 16-bit big-endian words
//! - GPIO pins:
//!   - **CS**: Chip select (output, active low, required)
//!   - **HDC**: Host data/command select (output, optional)
//!   - **RST**: Reset (output, active low, optional)
//!   - **HRDY**: Host ready (input, active high, optional)
//!
//! Unwired pins are passed as [`NoPin`]. The controller must then be told
//! through [`Builder`](crate::config::Builder) which lines are missing.
//!
//! ## Example
//!
//! ```rust,no_run
//! use embedded_hal::digital::PinState;
//! use embedded_hal::spi::{ErrorType, SpiBus};
//! use s1d135xx::{ControllerInterface, Interface, Line, NoPin};
//! # use core::convert::Infallible;
//! # struct MockSpi;
//! # impl ErrorType for MockSpi { type Error = Infallible; }
//! # impl SpiBus for MockSpi {
//! #     fn read(&mut self, _words: &mut [u8]) -> Result<(), Self::Error> { Ok(()) }
//! #     fn write(&mut self, _words: &[u8]) -> Result<(), Self::Error> { Ok(()) }
//! #     fn transfer(&mut self, _r: &mut [u8], _w: &[u8]) -> Result<(), Self::Error> { Ok(()) }
//! #     fn transfer_in_place(&mut self, _words: &mut [u8]) -> Result<(), Self::Error> { Ok(()) }
//! #     fn flush(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # #[derive(Debug)]
//! # struct PinError;
//! # impl embedded_hal::digital::Error for PinError {
//! #     fn kind(&self) -> embedded_hal::digital::ErrorKind { embedded_hal::digital::ErrorKind::Other }
//! # }
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = PinError; }
//! # impl embedded_hal::digital::OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl embedded_hal::digital::InputPin for MockPin {
//! #     fn is_high(&mut self) -> Result<bool, Self::Error> { Ok(true) }
//! #     fn is_low(&mut self) -> Result<bool, Self::Error> { Ok(false) }
//! # }
//! // CS and RST wired, no HDC, HRDY wired
//! let mut interface = Interface::new(MockSpi, MockPin, NoPin::<PinError>::new(), MockPin, MockPin);
//!
//! let _ = interface.set_line(Line::ChipSelect, PinState::Low);
//! let _ = interface.send_bytes(&[0x00, 0x02]); // RUN
//! let _ = interface.set_line(Line::ChipSelect, PinState::High);
//! ```

use core::fmt::Debug;
use core::marker::PhantomData;
use embedded_hal::digital::{self, InputPin, OutputPin, PinState};
use embedded_hal::spi::SpiBus;

type InterfaceResult<T, E> = core::result::Result<T, E>;

/// Digital lines between the host and the controller, by role
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Line {
    /// Chip select, active low
    ChipSelect,
    /// Host data/command select (low = command, high = parameter)
    HostDataCommand,
    /// Controller reset, active low
    Reset,
    /// Host ready, high when the controller can accept a command
    HostReady,
}

/// Trait for the link transport to an S1D135xx controller
///
/// This trait abstracts over different hardware implementations,
/// allowing the [`Controller`](crate::controller::Controller) to work with any
/// SPI + GPIO implementation. The controller sequences chip-select itself,
/// so implementations must not toggle it on their own between calls.
///
/// ## Implementing
///
/// For most cases, use the provided [`Interface`] struct. If the lines are
/// routed through an I/O expander or a shared bus, implement this trait on your
/// own type.
pub trait ControllerInterface {
    /// Error type for interface operations
    ///
    /// Must implement [`Debug`] for error reporting.
    type Error: Debug;

    /// Drive a line to the given level
    ///
    /// # Errors
    ///
    /// Returns an error if the GPIO fails.
    fn set_line(&mut self, line: Line, level: PinState) -> InterfaceResult<(), Self::Error>;

    /// Read the level of a line
    ///
    /// # Errors
    ///
    /// Returns an error if the GPIO fails or the line cannot be read.
    fn get_line(&mut self, line: Line) -> InterfaceResult<PinState, Self::Error>;

    /// Send raw bytes over the serial bus
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails.
    fn send_bytes(&mut self, bytes: &[u8]) -> InterfaceResult<(), Self::Error>;

    /// Receive raw bytes from the serial bus
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails.
    fn receive_bytes(&mut self, buffer: &mut [u8]) -> InterfaceResult<(), Self::Error>;
}

impl<T: ControllerInterface + ?Sized> ControllerInterface for &mut T {
    type Error = T::Error;

    fn set_line(&mut self, line: Line, level: PinState) -> InterfaceResult<(), Self::Error> {
        (**self).set_line(line, level)
    }

    fn get_line(&mut self, line: Line) -> InterfaceResult<PinState, Self::Error> {
        (**self).get_line(line)
    }

    fn send_bytes(&mut self, bytes: &[u8]) -> InterfaceResult<(), Self::Error> {
        (**self).send_bytes(bytes)
    }

    fn receive_bytes(&mut self, buffer: &mut [u8]) -> InterfaceResult<(), Self::Error> {
        (**self).receive_bytes(buffer)
    }
}

/// Errors that can occur at the interface level
///
/// Generic over SPI and GPIO error types.
#[derive(Debug)]
pub enum InterfaceError<SpiErr, PinErr> {
    /// SPI communication error
    Spi(SpiErr),
    /// GPIO pin error
    Pin(PinErr),
    /// The line cannot be used in the requested direction
    ///
    /// Only HRDY can be read and HRDY cannot be driven.
    WrongDirection(Line),
}

impl<SpiErr: Debug, PinErr: Debug> core::fmt::Display for InterfaceError<SpiErr, PinErr> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Spi(e) => write!(f, "SPI error: {e:?}"),
            Self::Pin(e) => write!(f, "Pin error: {e:?}"),
            Self::WrongDirection(line) => write!(f, "Line {line:?} used in the wrong direction"),
        }
    }
}

impl<SpiErr: Debug, PinErr: Debug> core::error::Error for InterfaceError<SpiErr, PinErr> {}

/// Placeholder for a line that is not wired on the board
///
/// Writes are ignored and reads report low. The error type follows the
/// other pins so that an [`Interface`] keeps a single pin error type.
///
/// The [`Config`](crate::Config) must describe the same wiring:
///
/// | `NoPin` as | Builder setting |
/// |------------|-----------------|
/// | `RST`  | [`reset_line(false)`](crate::Builder::reset_line), otherwise hard reset only waits |
/// | `HDC`  | [`host_data_command_line(false)`](crate::Builder::host_data_command_line) |
/// | `HRDY` | [`ReadyDetection::StatusRegister`](crate::ReadyDetection::StatusRegister), otherwise every wait times out |
pub struct NoPin<E> {
    _error: PhantomData<E>,
}

impl<E> NoPin<E> {
    /// Create a placeholder pin
    pub const fn new() -> Self {
        Self {
            _error: PhantomData,
        }
    }
}

impl<E> Default for NoPin<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Debug for NoPin<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "NoPin")
    }
}

impl<E: digital::Error> digital::ErrorType for NoPin<E> {
    type Error = E;
}

impl<E: digital::Error> OutputPin for NoPin<E> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<E: digital::Error> InputPin for NoPin<E> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(false)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

/// Hardware interface implementation for S1D135xx
///
/// Implements [`ControllerInterface`] for embedded-hal v1.0 SPI bus and GPIO traits.
/// Chip-select is a plain GPIO because one command exchange spans several
/// bus operations (command, parameters, read-back or init code stream).
///
/// ## Type Parameters
///
/// * `SPI` - SPI bus implementing [`SpiBus`]
/// * `CS` - Chip select pin implementing [`OutputPin`]
/// * `HDC` - Host data/command pin implementing [`OutputPin`], or [`NoPin`]
/// * `RST` - Reset pin implementing [`OutputPin`], or [`NoPin`]
/// * `HRDY` - Host ready pin implementing [`InputPin`], or [`NoPin`]
#[derive(Debug)]
pub struct Interface<SPI, CS, HDC, RST, HRDY> {
    /// SPI bus for communication
    spi: SPI,
    /// Chip select pin (active low)
    cs: CS,
    /// Host data/command pin (low=command, high=parameter)
    hdc: HDC,
    /// Reset pin (active low)
    rst: RST,
    /// Host ready pin (active high)
    hrdy: HRDY,
}

impl<SPI, CS, HDC, RST, HRDY> Interface<SPI, CS, HDC, RST, HRDY>
where
    SPI: SpiBus,
    CS: OutputPin,
    HDC: OutputPin,
    RST: OutputPin,
    HRDY: InputPin,
{
    /// Create a new Interface
    ///
    /// # Arguments
    ///
    /// * `spi` - SPI bus (must implement [`SpiBus`])
    /// * `cs` - Chip select pin (output, active low)
    /// * `hdc` - Host data/command pin (output), [`NoPin`] if not wired
    /// * `rst` - Reset pin (output, active low), [`NoPin`] if not wired
    /// * `hrdy` - Host ready pin (input, active high), [`NoPin`] if not wired
    pub fn new(spi: SPI, cs: CS, hdc: HDC, rst: RST, hrdy: HRDY) -> Self {
        Self {
            spi,
            cs,
            hdc,
            rst,
            hrdy,
        }
    }

    /// Consume the interface and return the SPI bus and pins
    pub fn release(self) -> (SPI, CS, HDC, RST, HRDY) {
        (self.spi, self.cs, self.hdc, self.rst, self.hrdy)
    }
}

impl<SPI, CS, HDC, RST, HRDY, PinErr> ControllerInterface for Interface<SPI, CS, HDC, RST, HRDY>
where
    SPI: SpiBus,
    SPI::Error: Debug,
    CS: OutputPin<Error = PinErr>,
    HDC: OutputPin<Error = PinErr>,
    RST: OutputPin<Error = PinErr>,
    HRDY: InputPin<Error = PinErr>,
    PinErr: Debug,
{
    type Error = InterfaceError<SPI::Error, PinErr>;

    fn set_line(&mut self, line: Line, level: PinState) -> InterfaceResult<(), Self::Error> {
        match line {
            Line::ChipSelect => {
                // Words still queued in the bus must go out before CS is released
                if level == PinState::High {
                    self.spi.flush().map_err(InterfaceError::Spi)?;
                }
                self.cs.set_state(level).map_err(InterfaceError::Pin)
            }
            Line::HostDataCommand => {
                self.spi.flush().map_err(InterfaceError::Spi)?;
                self.hdc.set_state(level).map_err(InterfaceError::Pin)
            }
            Line::Reset => self.rst.set_state(level).map_err(InterfaceError::Pin),
            Line::HostReady => Err(InterfaceError::WrongDirection(line)),
        }
    }

    fn get_line(&mut self, line: Line) -> InterfaceResult<PinState, Self::Error> {
        match line {
            Line::HostReady => self
                .hrdy
                .is_high()
                .map(PinState::from)
                .map_err(InterfaceError::Pin),
            _ => Err(InterfaceError::WrongDirection(line)),
        }
    }

    fn send_bytes(&mut self, bytes: &[u8]) -> InterfaceResult<(), Self::Error> {
        self.spi.write(bytes).map_err(InterfaceError::Spi)
    }

    fn receive_bytes(&mut self, buffer: &mut [u8]) -> InterfaceResult<(), Self::Error> {
        self.spi.read(buffer).map_err(InterfaceError::Spi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use embedded_hal::spi::ErrorType as SpiErrorType;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct MockError;

    impl core::fmt::Display for MockError {
        fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            write!(f, "mock error")
        }
    }

    impl digital::Error for MockError {
        fn kind(&self) -> digital::ErrorKind {
            digital::ErrorKind::Other
        }
    }

    impl embedded_hal::spi::Error for MockError {
        fn kind(&self) -> embedded_hal::spi::ErrorKind {
            embedded_hal::spi::ErrorKind::Other
        }
    }

    #[derive(Debug, Default)]
    struct MockSpi {
        written: Vec<u8>,
        reply: Vec<u8>,
        flushes: usize,
    }

    impl SpiErrorType for MockSpi {
        type Error = MockError;
    }

    impl SpiBus for MockSpi {
        fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
            for word in words.iter_mut() {
                *word = if self.reply.is_empty() {
                    0
                } else {
                    self.reply.remove(0)
                };
            }
            Ok(())
        }

        fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
            self.written.extend_from_slice(words);
            Ok(())
        }

        fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
            self.write(write)?;
            self.read(read)
        }

        fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
            self.read(words)
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            self.flushes += 1;
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct MockPin {
        high: bool,
        fail: bool,
    }

    impl digital::ErrorType for MockPin {
        type Error = MockError;
    }

    impl OutputPin for MockPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            if self.fail {
                return Err(MockError);
            }
            self.high = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            if self.fail {
                return Err(MockError);
            }
            self.high = true;
            Ok(())
        }
    }

    impl InputPin for MockPin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            if self.fail {
                return Err(MockError);
            }
            Ok(self.high)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            self.is_high().map(|high| !high)
        }
    }

    type TestInterface = Interface<MockSpi, MockPin, MockPin, MockPin, MockPin>;

    fn test_interface() -> TestInterface {
        Interface::new(
            MockSpi::default(),
            MockPin::default(),
            MockPin::default(),
            MockPin::default(),
            MockPin::default(),
        )
    }

    #[test]
    fn test_send_bytes_reaches_bus_in_order() {
        let mut interface = test_interface();
        interface.send_bytes(&[0x00, 0x11]).unwrap();
        interface.send_bytes(&[0x02, 0xA8]).unwrap();
        let (spi, ..) = interface.release();
        assert_eq!(spi.written, [0x00, 0x11, 0x02, 0xA8]);
    }

    #[test]
    fn test_receive_bytes_reads_from_bus() {
        let mut interface = test_interface();
        interface.spi.reply = alloc::vec![0x12, 0x34];
        let mut buf = [0u8; 2];
        interface.receive_bytes(&mut buf).unwrap();
        assert_eq!(buf, [0x12, 0x34]);
    }

    #[test]
    fn test_set_lines_drive_pins() {
        let mut interface = test_interface();
        interface
            .set_line(Line::ChipSelect, PinState::High)
            .unwrap();
        interface.set_line(Line::Reset, PinState::High).unwrap();
        interface
            .set_line(Line::HostDataCommand, PinState::High)
            .unwrap();
        let (_, cs, hdc, rst, _) = interface.release();
        assert!(cs.high);
        assert!(hdc.high);
        assert!(rst.high);
    }

    #[test]
    fn test_chip_select_release_flushes_bus() {
        let mut interface = test_interface();
        interface.set_line(Line::ChipSelect, PinState::Low).unwrap();
        assert_eq!(interface.spi.flushes, 0);
        interface
            .set_line(Line::ChipSelect, PinState::High)
            .unwrap();
        assert_eq!(interface.spi.flushes, 1);
    }

    #[test]
    fn test_get_host_ready_level() {
        let mut interface = test_interface();
        assert_eq!(interface.get_line(Line::HostReady).unwrap(), PinState::Low);
        interface.hrdy.high = true;
        assert_eq!(interface.get_line(Line::HostReady).unwrap(), PinState::High);
    }

    #[test]
    fn test_output_lines_cannot_be_read() {
        let mut interface = test_interface();
        let result = interface.get_line(Line::Reset);
        assert!(matches!(
            result,
            Err(InterfaceError::WrongDirection(Line::Reset))
        ));
    }

    #[test]
    fn test_host_ready_cannot_be_driven() {
        let mut interface = test_interface();
        let result = interface.set_line(Line::HostReady, PinState::High);
        assert!(matches!(
            result,
            Err(InterfaceError::WrongDirection(Line::HostReady))
        ));
    }

    #[test]
    fn test_pin_error_is_wrapped() {
        let mut interface = test_interface();
        interface.rst.fail = true;
        let result = interface.set_line(Line::Reset, PinState::Low);
        assert!(matches!(result, Err(InterfaceError::Pin(MockError))));
    }

    #[test]
    fn test_no_pin_accepts_writes_and_reads_low() {
        let mut interface = Interface::new(
            MockSpi::default(),
            MockPin::default(),
            NoPin::<MockError>::new(),
            NoPin::<MockError>::new(),
            NoPin::<MockError>::new(),
        );
        interface.set_line(Line::Reset, PinState::Low).unwrap();
        interface
            .set_line(Line::HostDataCommand, PinState::High)
            .unwrap();
        assert_eq!(interface.get_line(Line::HostReady).unwrap(), PinState::Low);
    }

    #[derive(Debug, Default)]
    struct CountingDelay(usize);

    impl embedded_hal::delay::DelayNs for CountingDelay {
        fn delay_ns(&mut self, _ns: u32) {
            self.0 += 1;
        }
    }

    #[test]
    fn test_board_without_optional_lines() {
        // Dummy word, then a status with the ready bit set
        let spi = MockSpi {
            reply: alloc::vec![0xDE, 0xAD, 0x20, 0x00],
            ..MockSpi::default()
        };
        let interface = Interface::new(
            spi,
            MockPin::default(),
            NoPin::<MockError>::new(),
            NoPin::<MockError>::new(),
            NoPin::<MockError>::new(),
        );
        let config = crate::Builder::new()
            .reset_line(false)
            .host_data_command_line(false)
            .ready_detection(crate::ReadyDetection::StatusRegister {
                mask: 0x2000,
                result: 0x2000,
            })
            .build()
            .unwrap();
        let mut controller = crate::Controller::new(interface, config);
        let mut delay = CountingDelay::default();

        controller.hard_reset(&mut delay).unwrap();
        controller.soft_reset(&mut delay).unwrap();
        assert_eq!(delay.0, 0);

        let (spi, ..) = controller.release().release();
        assert_eq!(
            spi.written,
            [0x00, 0x11, 0x00, 0x08, 0x00, 0x00, 0x00, 0x10, 0x00, 0x0A]
        );
    }

    #[test]
    fn test_borrowed_interface_forwards_calls() {
        fn send_marker<I: ControllerInterface>(mut interface: I) -> Result<(), I::Error> {
            interface.send_bytes(&[0xAB])
        }

        let mut interface = test_interface();
        send_marker(&mut interface).unwrap();
        assert_eq!(interface.spi.written, [0xAB]);
    }
}
