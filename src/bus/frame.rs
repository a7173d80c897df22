//! 11 bit frames: start bit, 8 data bits LSB first, odd parity, stop bit.

use super::{
    Bus,
    BusError,
    io::{PinIO, TimeSource},
    raw::{Level, Line, Timing},
};

/// One data byte and its parity bit.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Frame {
    data: u8,
    parity: Level,
}

impl Frame {
    pub const START_BIT: Level = Level::Low;
    pub const STOP_BIT: Level = Level::High;

    pub fn new(data: u8) -> Self {
        Self {
            data,
            parity: odd_parity(data),
        }
    }

    /// Frame from received bits. Fails if the parity bit doesn't make
    /// the number of ones odd.
    pub fn checked(data: u8, parity: Level) -> Result<Self, BusError> {
        let frame = Frame::new(data);

        if frame.parity == parity {
            Ok(frame)
        } else {
            Err(BusError::Parity { data })
        }
    }

    pub fn data(&self) -> u8 {
        self.data
    }

    pub fn parity(&self) -> Level {
        self.parity
    }

    /// Data bits, LSB first.
    pub fn data_bits(&self) -> impl Iterator<Item = Level> {
        let data = self.data;
        (0..8).map(move |i| Level::from(data & (1 << i) != 0))
    }

    /// Bit `index` of the frame as it appears on the wire, start bit
    /// being index 0 and stop bit index 10.
    pub fn wire_bit(&self, index: u8) -> Level {
        match index {
            0 => Self::START_BIT,
            1..=8 => Level::from(self.data & (1 << (index - 1)) != 0),
            9 => self.parity,
            _ => Self::STOP_BIT,
        }
    }
}

/// Parity bit which makes the count of ones in data + parity odd.
pub fn odd_parity(data: u8) -> Level {
    Level::from(data.count_ones() % 2 == 0)
}

impl <P: PinIO, T: TimeSource> Bus<P, T> {
    /// Send one byte to the device. The bus is left inhibited.
    ///
    /// The device acknowledges the frame on the line level; the
    /// acknowledgement byte which follows most commands must be read
    /// separately with `read_byte`.
    pub fn write_byte(&mut self, data: u8) -> Result<(), BusError> {
        log::trace!("ps2 write {:#04x}", data);

        let result = self.write_frame(Frame::new(data));
        self.inhibit();

        if let Err(e) = &result {
            log::warn!("ps2 write {:#04x} failed: {}", data, e);
        }

        result
    }

    /// Receive one byte from the device. The bus is left inhibited.
    pub fn read_byte(&mut self) -> Result<u8, BusError> {
        let result = self.read_frame();
        self.inhibit();

        match &result {
            Ok(data) => log::trace!("ps2 read {:#04x}", data),
            Err(e) => log::warn!("ps2 read failed: {}", e),
        }

        result
    }

    fn write_frame(&mut self, frame: Frame) -> Result<(), BusError> {
        self.release_lines();
        self.delay(Timing::REQUEST_TO_SEND_RELEASE);

        // Request-to-send. Holding the clock low aborts a frame the device
        // may have started, and the device drops its queued output when the
        // command arrives.
        self.drive_low(Line::Clock);
        self.delay(Timing::INHIBIT_HOLD);
        self.drive_low(Line::Data);
        self.delay(Timing::START_BIT_HOLD);
        self.release_as_input(Line::Clock);

        // Device starts generating the clock.
        self.await_clock(Level::Low)?;

        for bit in frame.data_bits() {
            self.send_bit(bit)?;
        }
        self.send_bit(frame.parity())?;

        // Stop bit.
        self.release_as_input(Line::Data);
        self.await_clock(Level::High)?;
        self.await_clock(Level::Low)?;

        // Line level acknowledgement, then the device releases both lines.
        self.await_data(Level::Low)?;
        self.await_clock(Level::High)?;
        self.await_data(Level::High)
    }

    fn read_frame(&mut self) -> Result<u8, BusError> {
        self.release_lines();
        self.delay(Timing::READ_SETTLE);

        self.await_clock(Level::Low)?;
        let start = self.sample(Line::Data);
        self.delay(Timing::START_BIT_SETTLE);
        self.await_clock(Level::High)?;

        let mut data = 0;
        for i in 0..8 {
            if self.receive_bit()?.is_high() {
                data |= 1 << i;
            }
        }

        let parity = self.receive_bit()?;
        let stop = self.receive_bit()?;

        if self.config.is_strict() {
            if start != Frame::START_BIT || stop != Frame::STOP_BIT {
                return Err(BusError::Framing { data });
            }

            Frame::checked(data, parity)?;
        }

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{BusConfig, Validation};
    use crate::device::mouse::raw::{Command, FromMouse};
    use crate::sim::SimulatedMouse;

    #[test]
    fn parity_is_odd_over_data_and_parity_bit() {
        for value in 0..=255u8 {
            let frame = Frame::new(value);
            let ones = value.count_ones() + frame.parity().is_high() as u32;
            assert_eq!(ones % 2, 1, "value {:#04x}", value);
        }

        assert_eq!(odd_parity(0x00), Level::High);
        assert_eq!(odd_parity(0x01), Level::Low);
        assert_eq!(odd_parity(0xFA), Level::Low);
        assert_eq!(odd_parity(0xFF), Level::High);
    }

    #[test]
    fn checked_rejects_even_parity() {
        assert!(Frame::checked(0x03, Level::High).is_ok());
        assert_eq!(Frame::checked(0x03, Level::Low), Err(BusError::Parity { data: 0x03 }));
    }

    #[test]
    fn wire_bits_are_start_data_lsb_first_parity_stop() {
        let frame = Frame::new(0b1000_0001);

        assert_eq!(frame.wire_bit(0), Level::Low);
        assert_eq!(frame.wire_bit(1), Level::High);
        assert_eq!(frame.wire_bit(2), Level::Low);
        assert_eq!(frame.wire_bit(8), Level::High);
        assert_eq!(frame.wire_bit(9), Level::High);
        assert_eq!(frame.wire_bit(10), Level::High);
    }

    #[test]
    fn every_byte_reaches_the_device_intact() {
        let sim = SimulatedMouse::new();
        let mut bus = Bus::new(&sim, &sim, Line::Clock, Line::Data);

        for value in 0..=255u8 {
            bus.write_byte(value).unwrap();
            assert_eq!(sim.last_received(), Some(value));
            sim.clear_output();
        }

        assert_eq!(sim.parity_errors(), 0);
    }

    #[test]
    fn wrap_mode_echoes_written_bytes() {
        let sim = SimulatedMouse::new();
        let config = BusConfig::new().validation(Validation::Strict);
        let mut bus = Bus::with_config(&sim, &sim, Line::Clock, Line::Data, config);

        bus.write_byte(Command::SET_WRAP_MODE).unwrap();
        assert_eq!(bus.read_byte(), Ok(FromMouse::ACK));

        // Reset and reset-wrap-mode are the only bytes not echoed.
        for value in (0..=255u8).filter(|v| *v != Command::RESET && *v != Command::RESET_WRAP_MODE) {
            bus.write_byte(value).unwrap();
            assert_eq!(bus.read_byte(), Ok(value));
        }
    }

    #[test]
    fn bad_parity_is_reported_only_when_strict() {
        let sim = SimulatedMouse::new();
        sim.set_corrupt_parity(true);

        let mut bus = Bus::new(&sim, &sim, Line::Clock, Line::Data);
        bus.write_byte(Command::ENABLE_DATA_REPORTING).unwrap();
        assert_eq!(bus.read_byte(), Ok(FromMouse::ACK));

        bus.set_config(BusConfig::new().validation(Validation::Strict));
        bus.write_byte(Command::DISABLE_DATA_REPORTING).unwrap();
        assert_eq!(bus.read_byte(), Err(BusError::Parity { data: FromMouse::ACK }));
    }

    #[test]
    fn write_takes_the_bus_from_a_sending_device() {
        let sim = SimulatedMouse::new();
        let mut bus = Bus::new(&sim, &sim, Line::Clock, Line::Data);

        sim.send_raw(&[0x08, 0x01, 0x01]);
        bus.release_lines();
        // Device starts the first frame.
        assert_eq!(bus.sample(Line::Clock), Level::Low);

        assert_eq!(bus.write_byte(Command::DISABLE_DATA_REPORTING), Ok(()));
        assert_eq!(sim.last_received(), Some(Command::DISABLE_DATA_REPORTING));
        assert_eq!(bus.read_byte(), Ok(FromMouse::ACK));
        assert_eq!(sim.pending_output(), 0);
    }

    #[test]
    fn write_to_absent_device_times_out() {
        let sim = SimulatedMouse::unresponsive();
        let config = BusConfig::new().timeout_micros(1_000);
        let mut bus = Bus::with_config(&sim, &sim, Line::Clock, Line::Data, config);

        assert_eq!(bus.write_byte(Command::RESET), Err(BusError::Timeout { line: Line::Clock, level: Level::Low }));
        assert_eq!(bus.sample(Line::Clock), Level::Low);
    }
}
