
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl Level {
    pub fn is_high(self) -> bool {
        self == Level::High
    }

    pub fn is_low(self) -> bool {
        self == Level::Low
    }
}

impl From<bool> for Level {
    fn from(bit: bool) -> Self {
        if bit {
            Level::High
        } else {
            Level::Low
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Output,
    /// High impedance. The external pull-up keeps the line high
    /// unless the device drives it low.
    Input,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Line {
    Clock,
    Data,
}

/// Delays used by the host side of the protocol, in microseconds.
#[derive(Debug)]
pub struct Timing;

impl Timing {
    /// Lines released before a request-to-send.
    pub const REQUEST_TO_SEND_RELEASE: u32 = 300;
    /// Clock held low before the start bit. The minimum is 100 µs.
    pub const INHIBIT_HOLD: u32 = 300;
    pub const START_BIT_HOLD: u32 = 10;
    /// Lines released before waiting for a device frame.
    pub const READ_SETTLE: u32 = 50;
    pub const START_BIT_SETTLE: u32 = 5;
    pub const COMMAND_SETTLE: u32 = 100;
    pub const POWER_ON_SETTLE: u32 = 20_000;
    pub const RESET_SETTLE: u32 = 20_000;

    /// No clock edge for this long means the device is gone.
    pub const DEFAULT_TIMEOUT: u32 = 1_000_000;
}

/// Number of clock cycles in one frame: start, 8 data bits, parity, stop.
pub const FRAME_BITS: u8 = 11;
