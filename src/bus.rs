//! Host side of the PS/2 bus: line control, bit transfer and byte framing.

pub mod io;
pub mod raw;
pub mod line;
pub mod bit;
pub mod frame;
pub mod debug;

#[cfg(feature = "embedded-hal")]
pub mod hal;

use self::io::{PinIO, TimeSource};
use self::raw::{Level, Line, Timing};

use core::fmt;

/// How much of a received frame is checked.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Validation {
    /// Parity, start and stop bits and acknowledgement bytes are read
    /// but not checked.
    Lenient,
    /// Bad parity or framing and unexpected acknowledgement bytes
    /// are reported as errors.
    Strict,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BusConfig {
    pub timeout_micros: u32,
    pub validation: Validation,
    /// How many times a byte is sent again after the device answers
    /// with resend. Only used with `Validation::Strict`.
    pub resend_attempts: u8,
}

impl BusConfig {
    pub const fn new() -> Self {
        Self {
            timeout_micros: Timing::DEFAULT_TIMEOUT,
            validation: Validation::Lenient,
            resend_attempts: 2,
        }
    }

    pub const fn timeout_micros(mut self, timeout_micros: u32) -> Self {
        self.timeout_micros = timeout_micros;
        self
    }

    pub const fn validation(mut self, validation: Validation) -> Self {
        self.validation = validation;
        self
    }

    pub const fn resend_attempts(mut self, resend_attempts: u8) -> Self {
        self.resend_attempts = resend_attempts;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.validation == Validation::Strict
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BusError {
    /// `line` did not reach `level` before the timeout.
    Timeout { line: Line, level: Level },
    Parity { data: u8 },
    /// Start bit was high or stop bit was low.
    Framing { data: u8 },
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BusError::Timeout { line, level } => write!(f, "timeout waiting for {:?} line to go {:?}", line, level),
            BusError::Parity { data } => write!(f, "parity error in received byte {:#04x}", data),
            BusError::Framing { data } => write!(f, "framing error in received byte {:#04x}", data),
        }
    }
}

/// The two lines of one PS/2 port and the time source used to pace them.
#[derive(Debug)]
pub struct Bus<P: PinIO, T: TimeSource> {
    pins: P,
    time: T,
    clock_pin: P::PinID,
    data_pin: P::PinID,
    config: BusConfig,
}

impl <P: PinIO, T: TimeSource> Bus<P, T> {
    pub fn new(pins: P, time: T, clock_pin: P::PinID, data_pin: P::PinID) -> Self {
        Self::with_config(pins, time, clock_pin, data_pin, BusConfig::default())
    }

    pub fn with_config(pins: P, time: T, clock_pin: P::PinID, data_pin: P::PinID, config: BusConfig) -> Self {
        Self {
            pins,
            time,
            clock_pin,
            data_pin,
            config,
        }
    }

    pub fn clock_pin(&self) -> P::PinID {
        self.clock_pin
    }

    pub fn data_pin(&self) -> P::PinID {
        self.data_pin
    }

    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: BusConfig) {
        self.config = config;
    }

    pub fn delay(&mut self, micros: u32) {
        self.time.delay_micros(micros);
    }

    /// Gives back the pins and the time source.
    pub fn release(self) -> (P, T) {
        (self.pins, self.time)
    }

    fn pin(&self, line: Line) -> P::PinID {
        match line {
            Line::Clock => self.clock_pin,
            Line::Data => self.data_pin,
        }
    }
}
