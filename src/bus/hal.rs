//! `PinIO` for `embedded-hal` pins configured as open drain outputs.
//!
//! With open drain pins there is no direction to switch: writing high
//! releases the line to the pull-up, and the pin can be read at any time.

use super::{
    io::PinIO,
    raw::{Direction, Level, Line},
};

use core::convert::Infallible;

use embedded_hal::digital::{InputPin, OutputPin};

#[derive(Debug)]
pub struct OpenDrainLines<CLK, DAT> {
    clock: CLK,
    data: DAT,
}

impl <CLK, DAT> OpenDrainLines<CLK, DAT>
where
    CLK: InputPin<Error = Infallible> + OutputPin,
    DAT: InputPin<Error = Infallible> + OutputPin,
{
    pub fn new(clock: CLK, data: DAT) -> Self {
        Self { clock, data }
    }

    pub fn release(self) -> (CLK, DAT) {
        (self.clock, self.data)
    }

    fn set(&mut self, pin: Line, level: Level) {
        let result = match (pin, level) {
            (Line::Clock, Level::Low) => self.clock.set_low(),
            (Line::Clock, Level::High) => self.clock.set_high(),
            (Line::Data, Level::Low) => self.data.set_low(),
            (Line::Data, Level::High) => self.data.set_high(),
        };

        match result {
            Ok(()) => (),
            Err(e) => match e {},
        }
    }
}

impl <CLK, DAT> PinIO for OpenDrainLines<CLK, DAT>
where
    CLK: InputPin<Error = Infallible> + OutputPin,
    DAT: InputPin<Error = Infallible> + OutputPin,
{
    type PinID = Line;

    fn set_direction(&mut self, pin: Line, direction: Direction) {
        if direction == Direction::Input {
            self.set(pin, Level::High);
        }
    }

    fn write_level(&mut self, pin: Line, level: Level) {
        self.set(pin, level);
    }

    fn read_level(&mut self, pin: Line) -> Level {
        let result = match pin {
            Line::Clock => self.clock.is_high(),
            Line::Data => self.data.is_high(),
        };

        match result {
            Ok(high) => Level::from(high),
            Err(e) => match e {},
        }
    }
}
