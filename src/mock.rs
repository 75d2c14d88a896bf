//! Recording chip model used by the unit tests
//!
//! Every chip-select frame, reset edge, HRDY poll and delay lands in one
//! shared event log so tests can compare the exact wire trace.

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::PinState;

use crate::command::{READ_REG, REG_SEQ_AUTOBOOT_CMD, REG_SYSTEM_STATUS, WRITE_REG};
use crate::interface::{ControllerInterface, Line};

/// Word returned by the first (discarded) read of a register read
pub const DUMMY_WORD: u16 = 0xDEAD;

pub const fn ms(ms: u32) -> u32 {
    ms * 1_000_000
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Bytes written while chip-select was asserted
    Frame(Vec<u8>),
    /// Edge on a line other than CS and HDC
    Line(Line, PinState),
    /// One readiness check through the HRDY line
    Poll(bool),
    /// One delay call, in nanoseconds
    Delay(u32),
}

#[derive(Debug)]
pub struct ChipState {
    pub events: Vec<Event>,
    /// Bytes clocked out while HDC was low
    pub command_bytes: Vec<u8>,
    /// Not-ready checks left before the chip reports ready, `None` = never
    pub busy_checks: Option<usize>,
    /// System status value while busy
    pub busy_status: u16,
    /// System status value once ready
    pub ready_status: u16,
    /// Value of the autoboot command register
    pub autoboot: u16,
    /// Index of the first `send_bytes` call that fails
    pub fail_sends_from: Option<usize>,
    pub registers: BTreeMap<u16, u16>,
    cs_low: bool,
    hdc_low: bool,
    frame: Vec<u8>,
    reads_in_frame: usize,
    sends: usize,
}

impl ChipState {
    fn new() -> Self {
        Self {
            events: Vec::new(),
            command_bytes: Vec::new(),
            busy_checks: Some(0),
            busy_status: 0x0000,
            ready_status: 0x2000,
            autoboot: 0x8000,
            fail_sends_from: None,
            registers: BTreeMap::new(),
            cs_low: false,
            hdc_low: false,
            frame: Vec::new(),
            reads_in_frame: 0,
            sends: 0,
        }
    }

    /// Consume one readiness check
    fn check_ready(&mut self) -> bool {
        match self.busy_checks {
            None => false,
            Some(0) => true,
            Some(n) => {
                self.busy_checks = Some(n - 1);
                false
            }
        }
    }

    fn end_frame(&mut self) {
        let frame = core::mem::take(&mut self.frame);
        let words = words(&frame);
        if words.len() == 3 && words[0] == WRITE_REG {
            self.registers.insert(words[1], words[2]);
        }
        self.events.push(Event::Frame(frame));
    }

    fn register_value(&mut self) -> u16 {
        let words = words(&self.frame);
        if words.len() != 2 || words[0] != READ_REG {
            return 0xFFFF;
        }
        match words[1] {
            REG_SYSTEM_STATUS => {
                if self.check_ready() {
                    self.ready_status
                } else {
                    self.busy_status
                }
            }
            REG_SEQ_AUTOBOOT_CMD => self.autoboot,
            reg => self.registers.get(&reg).copied().unwrap_or(0),
        }
    }
}

/// Split wire bytes into big-endian words
pub fn words(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect()
}

/// Encode words as big-endian wire bytes
pub fn frame(words: &[u16]) -> Event {
    Event::Frame(words.iter().flat_map(|word| word.to_be_bytes()).collect())
}

#[derive(Debug, PartialEq, Eq)]
pub struct MockError;

#[derive(Debug)]
pub struct MockInterface(Rc<RefCell<ChipState>>);

impl ControllerInterface for MockInterface {
    type Error = MockError;

    fn set_line(&mut self, line: Line, level: PinState) -> Result<(), Self::Error> {
        let mut chip = self.0.borrow_mut();
        match line {
            Line::ChipSelect => {
                let selecting = level == PinState::Low;
                if chip.cs_low && !selecting {
                    chip.end_frame();
                }
                if selecting {
                    chip.frame.clear();
                    chip.reads_in_frame = 0;
                }
                chip.cs_low = selecting;
            }
            Line::HostDataCommand => chip.hdc_low = level == PinState::Low,
            Line::Reset | Line::HostReady => chip.events.push(Event::Line(line, level)),
        }
        Ok(())
    }

    fn get_line(&mut self, line: Line) -> Result<PinState, Self::Error> {
        let mut chip = self.0.borrow_mut();
        if line != Line::HostReady {
            return Err(MockError);
        }
        let ready = chip.check_ready();
        chip.events.push(Event::Poll(ready));
        Ok(PinState::from(ready))
    }

    fn send_bytes(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        let mut chip = self.0.borrow_mut();
        let index = chip.sends;
        chip.sends += 1;
        if chip.fail_sends_from.is_some_and(|from| index >= from) {
            return Err(MockError);
        }
        if chip.hdc_low {
            chip.command_bytes.extend_from_slice(bytes);
        }
        if chip.cs_low {
            chip.frame.extend_from_slice(bytes);
        }
        Ok(())
    }

    fn receive_bytes(&mut self, buffer: &mut [u8]) -> Result<(), Self::Error> {
        let mut chip = self.0.borrow_mut();
        let word = if chip.reads_in_frame == 0 {
            DUMMY_WORD
        } else {
            chip.register_value()
        };
        chip.reads_in_frame += 1;
        for (dst, src) in buffer.iter_mut().zip(word.to_be_bytes()) {
            *dst = src;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct MockDelay(Rc<RefCell<ChipState>>);

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0.borrow_mut().events.push(Event::Delay(ns));
    }
}

/// Create a chip model plus the interface and delay bound to it
pub fn chip() -> (Rc<RefCell<ChipState>>, MockInterface, MockDelay) {
    let state = Rc::new(RefCell::new(ChipState::new()));
    (
        Rc::clone(&state),
        MockInterface(Rc::clone(&state)),
        MockDelay(state),
    )
}
