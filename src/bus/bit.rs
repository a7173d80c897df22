//! Single bit transfers, paced by the clock the device generates.
//!
//! Every wait is bounded by `BusConfig::timeout_micros`, so a device
//! which stops clocking results in `BusError::Timeout` instead of a hang.

use super::{
    Bus,
    BusError,
    io::{PinIO, TimeSource},
    raw::{Level, Line},
};

impl <P: PinIO, T: TimeSource> Bus<P, T> {
    /// Poll `line` until it reads `level` or `timeout_micros` has elapsed.
    pub fn wait_for_line(&mut self, line: Line, level: Level, timeout_micros: u32) -> Result<(), BusError> {
        let start = self.time.now_micros();

        loop {
            if self.sample(line) == level {
                return Ok(());
            }

            if self.time.now_micros().wrapping_sub(start) >= u64::from(timeout_micros) {
                return Err(BusError::Timeout { line, level });
            }
        }
    }

    pub fn wait_for_clock(&mut self, level: Level, timeout_micros: u32) -> Result<(), BusError> {
        self.wait_for_line(Line::Clock, level, timeout_micros)
    }

    /// Wait for one clock high period followed by the falling edge.
    pub fn wait_for_clock_flip(&mut self, timeout_micros: u32) -> Result<(), BusError> {
        self.wait_for_clock(Level::High, timeout_micros)?;
        self.wait_for_clock(Level::Low, timeout_micros)
    }

    pub(crate) fn await_clock(&mut self, level: Level) -> Result<(), BusError> {
        let timeout = self.config.timeout_micros;
        self.wait_for_clock(level, timeout)
    }

    pub(crate) fn await_data(&mut self, level: Level) -> Result<(), BusError> {
        let timeout = self.config.timeout_micros;
        self.wait_for_line(Line::Data, level, timeout)
    }

    /// Host to device. Called while the clock is low; the device
    /// samples data on the rising edge.
    pub fn send_bit(&mut self, bit: Level) -> Result<(), BusError> {
        self.drive(Line::Data, bit);
        self.await_clock(Level::High)?;
        self.await_clock(Level::Low)
    }

    /// Device to host. Data is valid while the clock is low.
    pub fn receive_bit(&mut self) -> Result<Level, BusError> {
        self.await_clock(Level::Low)?;
        let bit = self.sample(Line::Data);
        self.await_clock(Level::High)?;
        Ok(bit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::BusConfig;
    use crate::sim::SimulatedMouse;

    #[test]
    fn wait_on_dead_bus_times_out_within_window() {
        let sim = SimulatedMouse::unresponsive();
        let mut bus = Bus::new(&sim, &sim, Line::Clock, Line::Data);
        bus.release_lines();

        let start = sim.now();
        let result = bus.wait_for_clock(Level::Low, 2_000);
        let elapsed = sim.now() - start;

        assert_eq!(result, Err(BusError::Timeout { line: Line::Clock, level: Level::Low }));
        assert!(elapsed >= 2_000);
        assert!(elapsed < 2_100);
    }

    #[test]
    fn wait_for_current_level_returns_immediately() {
        let sim = SimulatedMouse::unresponsive();
        let mut bus = Bus::new(&sim, &sim, Line::Clock, Line::Data);
        bus.release_lines();

        assert_eq!(bus.wait_for_clock(Level::High, 0), Ok(()));
        assert_eq!(bus.wait_for_line(Line::Data, Level::High, 0), Ok(()));
    }

    #[test]
    fn receive_bit_on_dead_bus_uses_configured_timeout() {
        let sim = SimulatedMouse::unresponsive();
        let config = BusConfig::new().timeout_micros(500);
        let mut bus = Bus::with_config(&sim, &sim, Line::Clock, Line::Data, config);
        bus.release_lines();

        assert_eq!(bus.receive_bit(), Err(BusError::Timeout { line: Line::Clock, level: Level::Low }));
    }
}
