
use super::raw::{Direction, Level};

use core::fmt;

/// Access to the two GPIO pins wired to the PS/2 connector.
pub trait PinIO {
    type PinID: Copy + fmt::Debug;

    fn set_direction(&mut self, pin: Self::PinID, direction: Direction);
    fn write_level(&mut self, pin: Self::PinID, level: Level);

    // Reading is `&mut self`, because on some targets (and in the
    // simulator) sampling a pin can change state.
    fn read_level(&mut self, pin: Self::PinID) -> Level;
}

/// Monotonic microsecond clock and blocking delay.
pub trait TimeSource {
    /// Free running counter. Wrapping is allowed.
    fn now_micros(&mut self) -> u64;
    fn delay_micros(&mut self, micros: u32);
}
