//! Open collector emulation on top of plain GPIO.

use super::{
    Bus,
    io::{PinIO, TimeSource},
    raw::{Direction, Level, Line},
};

impl <P: PinIO, T: TimeSource> Bus<P, T> {
    pub fn drive_low(&mut self, line: Line) {
        let pin = self.pin(line);
        self.pins.set_direction(pin, Direction::Output);
        self.pins.write_level(pin, Level::Low);
    }

    /// Actively drive the line high. The device must not pull the
    /// line low at the same time.
    pub fn drive_high(&mut self, line: Line) {
        let pin = self.pin(line);
        self.pins.set_direction(pin, Direction::Output);
        self.pins.write_level(pin, Level::High);
    }

    /// Let the pull-up (or the device) decide the line level.
    pub fn release_as_input(&mut self, line: Line) {
        let pin = self.pin(line);
        self.pins.set_direction(pin, Direction::Input);
    }

    pub fn sample(&mut self, line: Line) -> Level {
        let pin = self.pin(line);
        self.pins.read_level(pin)
    }

    pub fn drive(&mut self, line: Line, level: Level) {
        match level {
            Level::Low => self.drive_low(line),
            Level::High => self.drive_high(line),
        }
    }

    pub fn release_lines(&mut self) {
        self.release_as_input(Line::Clock);
        self.release_as_input(Line::Data);
    }

    /// Hold the clock low so the device can't start a transfer.
    pub fn inhibit(&mut self) {
        self.drive_low(Line::Clock);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimulatedMouse;

    #[test]
    fn released_lines_idle_high() {
        let sim = SimulatedMouse::new();
        let mut bus = Bus::new(&sim, &sim, Line::Clock, Line::Data);

        bus.release_lines();

        assert_eq!(bus.sample(Line::Clock), Level::High);
        assert_eq!(bus.sample(Line::Data), Level::High);
    }

    #[test]
    fn driven_low_line_reads_low_until_released() {
        let sim = SimulatedMouse::new();
        let mut bus = Bus::new(&sim, &sim, Line::Clock, Line::Data);

        bus.drive_low(Line::Data);
        assert_eq!(bus.sample(Line::Data), Level::Low);

        bus.drive_high(Line::Data);
        assert_eq!(bus.sample(Line::Data), Level::High);

        bus.inhibit();
        assert_eq!(bus.sample(Line::Clock), Level::Low);

        bus.release_as_input(Line::Clock);
        assert_eq!(bus.sample(Line::Clock), Level::High);
    }
}
