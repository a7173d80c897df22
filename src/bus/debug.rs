
use super::{
    Bus,
    BusError,
    io::{PinIO, TimeSource},
    raw::{Level, Line},
};

/// Bypass the session state kept by the device driver. This should be
/// used only for debugging purposes.
#[derive(Debug)]
pub struct DebugMode<'a, P: PinIO, T: TimeSource>(&'a mut Bus<P, T>);

impl<'a, P: PinIO, T: TimeSource> DebugMode<'a, P, T> {
    pub fn new(bus: &'a mut Bus<P, T>) -> Self {
        DebugMode(bus)
    }

    pub fn write_byte(&mut self, data: u8) -> Result<(), BusError> {
        self.0.write_byte(data)
    }

    pub fn read_byte(&mut self) -> Result<u8, BusError> {
        self.0.read_byte()
    }

    pub fn sample(&mut self, line: Line) -> Level {
        self.0.sample(line)
    }

    pub fn wait_for_clock(&mut self, level: Level, timeout_micros: u32) -> Result<(), BusError> {
        self.0.wait_for_clock(level, timeout_micros)
    }

    pub fn wait_for_clock_flip(&mut self, timeout_micros: u32) -> Result<(), BusError> {
        self.0.wait_for_clock_flip(timeout_micros)
    }

    /// Release the lines and check that the clock toggles within
    /// `timeout_micros`. Only a device with something to send will
    /// toggle the clock, so `false` is expected from an idle device.
    pub fn probe(&mut self, timeout_micros: u32) -> bool {
        self.0.release_lines();
        let alive = self.0.wait_for_clock_flip(timeout_micros).is_ok();
        self.0.inhibit();

        if !alive {
            log::warn!("ps2: the clock line did not flip, assuming the device has died");
        }

        alive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::BusConfig;
    use crate::device::mouse::raw::{Command, FromMouse};
    use crate::sim::SimulatedMouse;

    #[test]
    fn probe_fails_on_dead_bus() {
        let sim = SimulatedMouse::unresponsive();
        let mut bus = Bus::new(&sim, &sim, Line::Clock, Line::Data);

        assert!(!DebugMode::new(&mut bus).probe(1_000));
        assert_eq!(bus.sample(Line::Clock), Level::Low);
    }

    #[test]
    fn probe_succeeds_while_device_is_sending() {
        let sim = SimulatedMouse::new();
        let config = BusConfig::new().timeout_micros(1_000);
        let mut bus = Bus::with_config(&sim, &sim, Line::Clock, Line::Data, config);

        let mut debug = DebugMode::new(&mut bus);
        debug.write_byte(Command::GET_DEVICE_ID).unwrap();
        assert_eq!(debug.read_byte(), Ok(FromMouse::ACK));

        // The id byte is waiting to be clocked out.
        assert!(debug.probe(1_000));
    }
}
