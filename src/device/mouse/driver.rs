use crate::bus::{
    Bus,
    BusError,
    debug::DebugMode,
    io::{PinIO, TimeSource},
    raw::Timing,
};
use crate::device::identify::Device;

use super::raw::{Command, FromMouse, PacketStatus, Resolution, SampleRate, Scaling};
use super::report::{DeviceStatus, MotionReport};

use bitflags::bitflags;

use core::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Remote mode. The mouse sends data only when asked with
    /// `Mouse::poll_report`.
    Polled,
    /// Stream mode. The mouse sends a packet whenever it moves, while
    /// data reporting is enabled.
    Continuous,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Polled
    }
}

bitflags! {
    struct SessionFlags: u8 {
        const INITIALIZED = 0b0000_0001;
        const REPORTING_ENABLED = 0b0000_0010;
        const REPORTING_DISABLED = 0b0000_0100;
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MouseError {
    Bus(BusError),
    UnexpectedAcknowledgment { command: u8, received: u8 },
    /// Basic assurance test result other than success.
    SelfTestFailed(u8),
    /// Status byte of a streamed packet doesn't have bit 3 set.
    PacketOutOfSync(u8),
}

impl From<BusError> for MouseError {
    fn from(e: BusError) -> Self {
        MouseError::Bus(e)
    }
}

impl fmt::Display for MouseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MouseError::Bus(e) => write!(f, "{}", e),
            MouseError::UnexpectedAcknowledgment { command, received } => {
                write!(f, "command {:#04x} acknowledged with {:#04x}", command, received)
            }
            MouseError::SelfTestFailed(code) => write!(f, "self test failed with {:#04x}", code),
            MouseError::PacketOutOfSync(status) => write!(f, "packet status byte {:#04x} is out of sync", status),
        }
    }
}

/// PS/2 mouse connected to a bit-banged bus.
#[derive(Debug)]
pub struct Mouse<P: PinIO, T: TimeSource> {
    bus: Bus<P, T>,
    mode: Mode,
    flags: SessionFlags,
    device: Option<Device>,
}

impl <P: PinIO, T: TimeSource> Mouse<P, T> {
    /// Mouse in polled mode. Nothing is sent before `initialize`.
    pub fn new(bus: Bus<P, T>) -> Self {
        Self::with_mode(bus, Mode::Polled)
    }

    pub fn with_mode(bus: Bus<P, T>, mode: Mode) -> Self {
        Self {
            bus,
            mode,
            flags: SessionFlags::REPORTING_DISABLED,
            device: None,
        }
    }

    pub fn clock_pin(&self) -> P::PinID {
        self.bus.clock_pin()
    }

    pub fn data_pin(&self) -> P::PinID {
        self.bus.data_pin()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_initialized(&self) -> bool {
        self.flags.contains(SessionFlags::INITIALIZED)
    }

    pub fn reporting_enabled(&self) -> bool {
        self.flags.contains(SessionFlags::REPORTING_ENABLED)
    }

    pub fn reporting_disabled(&self) -> bool {
        self.flags.contains(SessionFlags::REPORTING_DISABLED)
    }

    /// Device type read during `initialize` or `read_device_id`.
    pub fn device(&self) -> Option<Device> {
        self.device
    }

    pub fn bus(&self) -> &Bus<P, T> {
        &self.bus
    }

    /// Raw access to the bus. Session state is not updated.
    pub fn debug_mode(&mut self) -> DebugMode<'_, P, T> {
        DebugMode::new(&mut self.bus)
    }

    pub fn exit(self) -> Bus<P, T> {
        self.bus
    }

    /// Reset the mouse and put it in the configured mode.
    ///
    /// The self test result and the device id which follow the reset
    /// acknowledgement are read too. In lenient mode a device which sends
    /// neither is accepted after one timeout, and `device` stays `None`.
    pub fn initialize(&mut self) -> Result<(), MouseError> {
        self.bus.release_lines();
        self.bus.delay(Timing::POWER_ON_SETTLE);

        // Reset leaves data reporting disabled.
        self.flags = SessionFlags::REPORTING_DISABLED;
        self.device = None;

        log::debug!("ps2 mouse: reset");
        self.bus.write_byte(Command::RESET)?;
        self.bus.delay(Timing::RESET_SETTLE);
        let ack = self.bus.read_byte()?;
        self.check_ack(Command::RESET, ack)?;

        if let Some(self_test) = self.read_reset_response()? {
            if self_test != FromMouse::BAT_COMPLETION_CODE {
                log::warn!("ps2 mouse: self test result {:#04x}", self_test);

                if self.bus.config().is_strict() {
                    return Err(MouseError::SelfTestFailed(self_test));
                }
            }

            if let Some(id) = self.read_reset_response()? {
                self.device = Some(Device::from_id(id, None));
            }
        }

        self.apply_mode()?;

        self.bus.delay(Timing::COMMAND_SETTLE);
        self.flags.insert(SessionFlags::INITIALIZED);
        log::debug!("ps2 mouse: initialized in {:?} mode", self.mode);

        Ok(())
    }

    /// Request one movement data packet. Works in both modes.
    pub fn poll_report(&mut self) -> Result<MotionReport, MouseError> {
        self.command(Command::READ_DATA)?;
        self.read_packet()
    }

    /// Read the next packet the mouse sends on its own in continuous mode.
    pub fn read_streamed_report(&mut self) -> Result<MotionReport, MouseError> {
        let report = self.read_packet()?;

        if self.bus.config().is_strict() && !report.status().contains(PacketStatus::ALWAYS_ONE) {
            return Err(MouseError::PacketOutOfSync(report.status().bits()));
        }

        Ok(report)
    }

    pub fn set_polled_mode(&mut self) -> Result<(), MouseError> {
        self.select_mode(Command::SET_REMOTE_MODE, Mode::Polled)?;
        self.mode = Mode::Polled;
        Ok(())
    }

    pub fn set_continuous_mode(&mut self) -> Result<(), MouseError> {
        self.select_mode(Command::SET_STREAM_MODE, Mode::Continuous)?;
        self.mode = Mode::Continuous;
        Ok(())
    }

    pub fn set_sample_rate(&mut self, rate: SampleRate) -> Result<(), MouseError> {
        self.reconfigure(|mouse| mouse.command_with_data(Command::SET_SAMPLE_RATE, rate as u8))
    }

    pub fn set_resolution(&mut self, resolution: Resolution) -> Result<(), MouseError> {
        self.reconfigure(|mouse| mouse.command_with_data(Command::SET_RESOLUTION, resolution as u8))
    }

    pub fn set_scaling(&mut self, scaling: Scaling) -> Result<(), MouseError> {
        self.reconfigure(|mouse| mouse.command(scaling as u8))
    }

    pub fn set_scaling_2to1(&mut self) -> Result<(), MouseError> {
        self.set_scaling(Scaling::TwoToOne)
    }

    pub fn set_scaling_1to1(&mut self) -> Result<(), MouseError> {
        self.set_scaling(Scaling::OneToOne)
    }

    /// Only affects continuous mode. Does nothing if reporting is
    /// already enabled.
    pub fn enable_reporting(&mut self) -> Result<(), MouseError> {
        if self.reporting_enabled() {
            return Ok(());
        }

        self.command(Command::ENABLE_DATA_REPORTING)?;
        self.flags.insert(SessionFlags::REPORTING_ENABLED);
        self.flags.remove(SessionFlags::REPORTING_DISABLED);
        Ok(())
    }

    /// In continuous mode the mouse then behaves like in polled mode.
    /// Does nothing if reporting is already disabled.
    pub fn disable_reporting(&mut self) -> Result<(), MouseError> {
        if self.reporting_disabled() {
            return Ok(());
        }

        self.command(Command::DISABLE_DATA_REPORTING)?;
        self.flags.insert(SessionFlags::REPORTING_DISABLED);
        self.flags.remove(SessionFlags::REPORTING_ENABLED);
        Ok(())
    }

    /// Restore sample rate, resolution and scaling defaults. The
    /// configured mode is applied again afterwards.
    pub fn set_defaults(&mut self) -> Result<(), MouseError> {
        self.command(Command::SET_DEFAULTS)?;
        self.flags.remove(SessionFlags::REPORTING_ENABLED);
        self.flags.insert(SessionFlags::REPORTING_DISABLED);
        self.apply_mode()?;
        self.bus.delay(Timing::COMMAND_SETTLE);
        Ok(())
    }

    pub fn read_device_id(&mut self) -> Result<Device, MouseError> {
        let device = self.reconfigure(|mouse| {
            mouse.command(Command::GET_DEVICE_ID)?;
            let first_byte = mouse.bus.read_byte()?;
            let second_byte = if Device::has_second_byte(first_byte) {
                Some(mouse.bus.read_byte()?)
            } else {
                None
            };

            Ok(Device::from_id(first_byte, second_byte))
        })?;

        self.device = Some(device);
        Ok(device)
    }

    pub fn status_request(&mut self) -> Result<DeviceStatus, MouseError> {
        self.reconfigure(|mouse| {
            mouse.command(Command::STATUS_REQUEST)?;
            let flags = mouse.bus.read_byte()?;
            let resolution = mouse.bus.read_byte()?;
            let sample_rate = mouse.bus.read_byte()?;

            Ok(DeviceStatus::from_bytes(flags, resolution, sample_rate))
        })
    }

    /// Polled mode is selected explicitly, continuous mode only needs
    /// reporting enabled since it is the mode after reset.
    fn apply_mode(&mut self) -> Result<(), MouseError> {
        match self.mode {
            Mode::Polled => self.set_polled_mode(),
            Mode::Continuous => self.enable_reporting(),
        }
    }

    fn select_mode(&mut self, command: u8, target: Mode) -> Result<(), MouseError> {
        log::debug!("ps2 mouse: select {:?} mode", target);

        if self.mode == Mode::Continuous {
            self.disable_reporting()?;
        }

        self.command(command)?;

        if target == Mode::Continuous {
            self.enable_reporting()?;
        }

        if self.is_initialized() {
            self.bus.delay(Timing::COMMAND_SETTLE);
        }

        Ok(())
    }

    /// The mouse must not be streaming while its settings change.
    fn reconfigure<R, F>(&mut self, f: F) -> Result<R, MouseError>
        where F: FnOnce(&mut Self) -> Result<R, MouseError>
    {
        let streaming = self.mode == Mode::Continuous;

        if streaming {
            self.disable_reporting()?;
        }

        let value = f(self)?;

        if streaming {
            self.enable_reporting()?;
        }

        self.bus.delay(Timing::COMMAND_SETTLE);
        Ok(value)
    }

    fn command(&mut self, command: u8) -> Result<(), MouseError> {
        log::debug!("ps2 mouse: command {:#04x}", command);
        self.send_acknowledged(command, command)
    }

    fn command_with_data(&mut self, command: u8, data: u8) -> Result<(), MouseError> {
        log::debug!("ps2 mouse: command {:#04x} data {:#04x}", command, data);
        self.send_acknowledged(command, command)?;
        self.send_acknowledged(command, data)
    }

    /// Write `byte` and read the acknowledgement. `command` is only used
    /// for error reporting.
    fn send_acknowledged(&mut self, command: u8, byte: u8) -> Result<(), MouseError> {
        let mut attempts = 0;

        loop {
            self.bus.write_byte(byte)?;
            let response = self.bus.read_byte()?;

            match self.check_ack(command, response) {
                Err(MouseError::UnexpectedAcknowledgment { received: FromMouse::RESEND, .. })
                    if attempts < self.bus.config().resend_attempts =>
                {
                    attempts += 1;
                    log::debug!("ps2 mouse: resend {:#04x}", byte);
                }
                result => return result,
            }
        }
    }

    fn check_ack(&self, command: u8, received: u8) -> Result<(), MouseError> {
        if received == FromMouse::ACK || !self.bus.config().is_strict() {
            return Ok(());
        }

        log::warn!("ps2 mouse: command {:#04x} acknowledged with {:#04x}", command, received);
        Err(MouseError::UnexpectedAcknowledgment { command, received })
    }

    /// Byte sent after the reset acknowledgement. A timeout means `None`
    /// unless validation is strict.
    fn read_reset_response(&mut self) -> Result<Option<u8>, MouseError> {
        match self.bus.read_byte() {
            Ok(byte) => Ok(Some(byte)),
            Err(BusError::Timeout { .. }) if !self.bus.config().is_strict() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn read_packet(&mut self) -> Result<MotionReport, MouseError> {
        let status = self.bus.read_byte()?;
        let x = self.bus.read_byte()?;
        let y = self.bus.read_byte()?;

        Ok(MotionReport::from_bytes(status, x, y))
    }
}
