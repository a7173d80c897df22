//! Simulated PS/2 mouse.
//!
//! `&SimulatedMouse` implements both `PinIO` and `TimeSource`, so one
//! simulator can be handed to `Bus::new` twice. The simulated device
//! advances its clock by one half cycle every time the host samples the
//! clock line, and each `now_micros` call advances time by one
//! microsecond.
//!
//! When the host releases the clock the device starts sending queued
//! bytes. Pulling the clock low aborts the frame being sent and leaves the
//! byte queued, and a command from the host drops everything still queued,
//! like real hardware would.

use crate::bus::{
    frame::Frame,
    io::{PinIO, TimeSource},
    raw::{Direction, Level, Line, FRAME_BITS},
};
use crate::device::identify::DeviceId;
use crate::device::mouse::raw::{Command, FromMouse, PacketStatus, StatusFlags};

use arraydeque::{ArrayDeque, Saturating};

use core::cell::RefCell;

const TRANSCRIPT_CAPACITY: usize = 64;

/// Bytes the device received from the host, oldest first.
#[derive(Debug, Copy, Clone)]
pub struct Transcript {
    bytes: [u8; TRANSCRIPT_CAPACITY],
    len: usize,
}

impl Transcript {
    fn new() -> Self {
        Self {
            bytes: [0; TRANSCRIPT_CAPACITY],
            len: 0,
        }
    }

    /// Bytes beyond the capacity are not recorded.
    fn push(&mut self, byte: u8) {
        if self.len < TRANSCRIPT_CAPACITY {
            self.bytes[self.len] = byte;
            self.len += 1;
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

#[derive(Debug, Copy, Clone)]
struct HostPin {
    direction: Direction,
    latch: Level,
}

impl HostPin {
    fn driven_low(&self) -> bool {
        self.direction == Direction::Output && self.latch == Level::Low
    }
}

#[derive(Debug, Copy, Clone)]
enum Phase {
    Idle,
    /// `bits` holds the bits sampled on each rising edge: 8 data bits,
    /// parity and stop.
    Receiving { edges: u8, bits: u16 },
    Acknowledging { bits: u16 },
    Transmitting { bit: u8, frame: Frame },
}

#[derive(Debug, Copy, Clone)]
struct Settings {
    remote: bool,
    reporting: bool,
    scaling_2_to_1: bool,
    resolution: u8,
    sample_rate: u8,
    wrap: bool,
}

impl Settings {
    fn defaults() -> Self {
        Self {
            remote: false,
            reporting: false,
            scaling_2_to_1: false,
            resolution: 2,
            sample_rate: 100,
            wrap: false,
        }
    }

    fn status_flags(&self) -> StatusFlags {
        let mut flags = StatusFlags::empty();
        flags.set(StatusFlags::REMOTE_MODE, self.remote);
        flags.set(StatusFlags::DATA_REPORTING, self.reporting);
        flags.set(StatusFlags::SCALING_2_TO_1, self.scaling_2_to_1);
        flags
    }
}

#[derive(Debug)]
struct Peripheral {
    host_clock: HostPin,
    host_data: HostPin,
    device_clock: Level,
    device_data: Level,
    phase: Phase,
    output: ArrayDeque<[u8; 16], Saturating>,
    settings: Settings,
    /// Command waiting for its data byte.
    expecting: Option<u8>,
    last_sent: u8,
    motion: [u8; 3],
    device_id: (u8, Option<u8>),
    self_test_result: u8,
    reports_self_test: bool,
    transcript: Transcript,
    last_received: Option<u8>,
    parity_errors: usize,
    now: u64,
    responsive: bool,
    corrupt_parity: bool,
    resend_count: u8,
}

impl Peripheral {
    fn new(responsive: bool) -> Self {
        let released = HostPin {
            direction: Direction::Input,
            latch: Level::High,
        };

        Self {
            host_clock: released,
            host_data: released,
            device_clock: Level::High,
            device_data: Level::High,
            phase: Phase::Idle,
            output: ArrayDeque::new(),
            settings: Settings::defaults(),
            expecting: None,
            last_sent: FromMouse::ACK,
            motion: packet(0, 0, PacketStatus::empty()),
            device_id: (DeviceId::STANDARD_MOUSE, None),
            self_test_result: FromMouse::BAT_COMPLETION_CODE,
            reports_self_test: true,
            transcript: Transcript::new(),
            last_received: None,
            parity_errors: 0,
            now: 0,
            responsive,
            corrupt_parity: false,
            resend_count: 0,
        }
    }

    fn host_pin(&mut self, line: Line) -> &mut HostPin {
        match line {
            Line::Clock => &mut self.host_clock,
            Line::Data => &mut self.host_data,
        }
    }

    fn level(&self, line: Line) -> Level {
        let (host, device) = match line {
            Line::Clock => (self.host_clock, self.device_clock),
            Line::Data => (self.host_data, self.device_data),
        };

        if host.driven_low() || device == Level::Low {
            Level::Low
        } else {
            Level::High
        }
    }

    /// Host pulling the clock low aborts any transfer.
    fn host_changed(&mut self) {
        if self.host_clock.driven_low() {
            if let Phase::Idle = self.phase {
                return;
            }

            self.phase = Phase::Idle;
            self.device_clock = Level::High;
            self.device_data = Level::High;
        }
    }

    fn clock_sampled(&mut self) {
        if !self.responsive {
            return;
        }

        match self.phase {
            Phase::Idle => {
                if self.host_clock.driven_low() {
                    return;
                }

                if self.host_data.driven_low() {
                    // Request-to-send. The host command replaces anything
                    // the device still had to say.
                    self.output.clear();
                    self.phase = Phase::Receiving { edges: 0, bits: 0 };
                    self.device_clock = Level::Low;
                } else if let Some(&byte) = self.output.front() {
                    let frame = Frame::new(byte);
                    self.phase = Phase::Transmitting { bit: 0, frame };
                    self.device_data = self.wire_bit(frame, 0);
                    self.device_clock = Level::Low;
                }
            }
            Phase::Receiving { edges, bits } => {
                if self.device_clock == Level::Low {
                    let bit = self.level(Line::Data).is_high() as u16;
                    self.device_clock = Level::High;
                    self.phase = Phase::Receiving { edges: edges + 1, bits: bits | bit << edges };
                } else if edges == FRAME_BITS - 1 {
                    self.device_data = Level::Low;
                    self.device_clock = Level::Low;
                    self.phase = Phase::Acknowledging { bits };
                } else {
                    self.device_clock = Level::Low;
                }
            }
            Phase::Acknowledging { bits } => {
                self.device_clock = Level::High;
                self.device_data = Level::High;
                self.phase = Phase::Idle;
                self.frame_received(bits);
            }
            Phase::Transmitting { bit, frame } => {
                if self.device_clock == Level::Low {
                    self.device_clock = Level::High;

                    if bit + 1 == FRAME_BITS {
                        self.device_data = Level::High;
                        self.phase = Phase::Idle;
                        self.output.pop_front();
                        self.last_sent = frame.data();
                    }
                } else {
                    let bit = bit + 1;
                    self.device_data = self.wire_bit(frame, bit);
                    self.device_clock = Level::Low;
                    self.phase = Phase::Transmitting { bit, frame };
                }
            }
        }
    }

    fn wire_bit(&self, frame: Frame, index: u8) -> Level {
        let level = frame.wire_bit(index);

        if index == 9 && self.corrupt_parity {
            Level::from(level.is_low())
        } else {
            level
        }
    }

    fn frame_received(&mut self, bits: u16) {
        let data = bits as u8;
        let parity = Level::from(bits & (1 << 8) != 0);

        self.transcript.push(data);
        self.last_received = Some(data);

        if Frame::checked(data, parity).is_err() {
            self.parity_errors += 1;
            self.respond(&[FromMouse::RESEND]);
        } else {
            self.handle(data);
        }
    }

    fn respond(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            let _ = self.output.push_back(byte);
        }
    }

    fn handle(&mut self, byte: u8) {
        if self.settings.wrap && byte != Command::RESET {
            if byte == Command::RESET_WRAP_MODE {
                self.settings.wrap = false;
                self.respond(&[FromMouse::ACK]);
            } else {
                self.respond(&[byte]);
            }
            return;
        }

        if let Some(command) = self.expecting.take() {
            match command {
                Command::SET_SAMPLE_RATE => self.settings.sample_rate = byte,
                Command::SET_RESOLUTION => self.settings.resolution = byte,
                _ => (),
            }
            self.respond(&[FromMouse::ACK]);
            return;
        }

        if self.resend_count > 0 {
            self.resend_count -= 1;
            self.respond(&[FromMouse::RESEND]);
            return;
        }

        match byte {
            Command::RESET => {
                self.settings = Settings::defaults();
                let (id, _) = self.device_id;
                let result = self.self_test_result;
                self.respond(&[FromMouse::ACK]);
                if self.reports_self_test {
                    self.respond(&[result, id]);
                }
            }
            Command::RESEND => {
                let last = self.last_sent;
                self.respond(&[last]);
            }
            Command::SET_DEFAULTS => {
                self.settings = Settings::defaults();
                self.respond(&[FromMouse::ACK]);
            }
            Command::DISABLE_DATA_REPORTING => {
                self.settings.reporting = false;
                self.respond(&[FromMouse::ACK]);
            }
            Command::ENABLE_DATA_REPORTING => {
                self.settings.reporting = true;
                self.respond(&[FromMouse::ACK]);
            }
            Command::SET_SAMPLE_RATE | Command::SET_RESOLUTION => {
                self.expecting = Some(byte);
                self.respond(&[FromMouse::ACK]);
            }
            Command::GET_DEVICE_ID => {
                let (first, second) = self.device_id;
                self.respond(&[FromMouse::ACK, first]);
                if let Some(second) = second {
                    self.respond(&[second]);
                }
            }
            Command::SET_REMOTE_MODE => {
                self.settings.remote = true;
                self.respond(&[FromMouse::ACK]);
            }
            Command::SET_STREAM_MODE => {
                self.settings.remote = false;
                self.respond(&[FromMouse::ACK]);
            }
            Command::SET_WRAP_MODE => {
                self.settings.wrap = true;
                self.respond(&[FromMouse::ACK]);
            }
            Command::READ_DATA => {
                let motion = self.motion;
                self.respond(&[FromMouse::ACK]);
                self.respond(&motion);
                // Movement counters are cleared once reported.
                self.motion[1] = 0;
                self.motion[2] = 0;
                self.motion[0] &= !(PacketStatus::X_SIGN | PacketStatus::Y_SIGN).bits();
            }
            Command::STATUS_REQUEST => {
                let settings = self.settings;
                self.respond(&[
                    FromMouse::ACK,
                    settings.status_flags().bits(),
                    settings.resolution,
                    settings.sample_rate,
                ]);
            }
            Command::SET_SCALING_2_TO_1 => {
                self.settings.scaling_2_to_1 = true;
                self.respond(&[FromMouse::ACK]);
            }
            Command::SET_SCALING_1_TO_1 => {
                self.settings.scaling_2_to_1 = false;
                self.respond(&[FromMouse::ACK]);
            }
            Command::RESET_WRAP_MODE => self.respond(&[FromMouse::ACK]),
            _ => self.respond(&[FromMouse::RESEND]),
        }
    }
}

fn packet(dx: i16, dy: i16, pressed: PacketStatus) -> [u8; 3] {
    let buttons = PacketStatus::LEFT_BUTTON | PacketStatus::RIGHT_BUTTON | PacketStatus::MIDDLE_BUTTON;
    let mut status = PacketStatus::ALWAYS_ONE | (buttons & pressed);
    status.set(PacketStatus::X_SIGN, dx < 0);
    status.set(PacketStatus::Y_SIGN, dy < 0);

    [status.bits(), dx as u8, dy as u8]
}

#[derive(Debug)]
pub struct SimulatedMouse {
    state: RefCell<Peripheral>,
}

impl SimulatedMouse {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(Peripheral::new(true)),
        }
    }

    /// Device which never drives the clock.
    pub fn unresponsive() -> Self {
        Self {
            state: RefCell::new(Peripheral::new(false)),
        }
    }

    /// Current simulated time in microseconds.
    pub fn now(&self) -> u64 {
        self.state.borrow().now
    }

    pub fn received(&self) -> Transcript {
        self.state.borrow().transcript
    }

    pub fn clear_received(&self) {
        self.state.borrow_mut().transcript = Transcript::new();
    }

    pub fn last_received(&self) -> Option<u8> {
        self.state.borrow().last_received
    }

    /// Frames from the host which had even parity.
    pub fn parity_errors(&self) -> usize {
        self.state.borrow().parity_errors
    }

    /// Drop bytes queued for the host.
    pub fn clear_output(&self) {
        self.state.borrow_mut().output.clear();
    }

    pub fn pending_output(&self) -> usize {
        self.state.borrow().output.len()
    }

    /// Queue bytes for the host as they are.
    pub fn send_raw(&self, bytes: &[u8]) {
        self.state.borrow_mut().respond(bytes);
    }

    pub fn set_corrupt_parity(&self, corrupt: bool) {
        self.state.borrow_mut().corrupt_parity = corrupt;
    }

    /// Answer the next `count` commands with resend.
    pub fn answer_with_resend(&self, count: u8) {
        self.state.borrow_mut().resend_count = count;
    }

    pub fn set_device_id(&self, first_byte: u8, second_byte: Option<u8>) {
        self.state.borrow_mut().device_id = (first_byte, second_byte);
    }

    /// Byte sent after the reset acknowledgement.
    pub fn set_self_test_result(&self, result: u8) {
        self.state.borrow_mut().self_test_result = result;
    }

    /// With `false` the reset command is only acknowledged.
    pub fn set_reports_self_test(&self, reports: bool) {
        self.state.borrow_mut().reports_self_test = reports;
    }

    /// Move the mouse. In stream mode with reporting enabled the packet
    /// is queued for the host, otherwise it is kept for the next read
    /// data command.
    pub fn move_by(&self, dx: i16, dy: i16, buttons: PacketStatus) {
        let mut state = self.state.borrow_mut();
        let packet = packet(dx, dy, buttons);

        if !state.settings.remote && state.settings.reporting {
            state.respond(&packet);
        } else {
            state.motion = packet;
        }
    }

    pub fn remote_mode(&self) -> bool {
        self.state.borrow().settings.remote
    }

    pub fn reporting(&self) -> bool {
        self.state.borrow().settings.reporting
    }

    pub fn sample_rate(&self) -> u8 {
        self.state.borrow().settings.sample_rate
    }

    pub fn resolution(&self) -> u8 {
        self.state.borrow().settings.resolution
    }

    pub fn scaling_2_to_1(&self) -> bool {
        self.state.borrow().settings.scaling_2_to_1
    }
}

impl Default for SimulatedMouse {
    fn default() -> Self {
        Self::new()
    }
}

impl <'a> PinIO for &'a SimulatedMouse {
    type PinID = Line;

    fn set_direction(&mut self, pin: Line, direction: Direction) {
        let mut state = self.state.borrow_mut();
        state.host_pin(pin).direction = direction;
        state.host_changed();
    }

    fn write_level(&mut self, pin: Line, level: Level) {
        let mut state = self.state.borrow_mut();
        state.host_pin(pin).latch = level;
        state.host_changed();
    }

    fn read_level(&mut self, pin: Line) -> Level {
        let mut state = self.state.borrow_mut();

        if pin == Line::Clock {
            state.clock_sampled();
        }

        state.level(pin)
    }
}

impl <'a> TimeSource for &'a SimulatedMouse {
    fn now_micros(&mut self) -> u64 {
        let mut state = self.state.borrow_mut();
        state.now += 1;
        state.now
    }

    fn delay_micros(&mut self, micros: u32) {
        self.state.borrow_mut().now += u64::from(micros);
    }
}
