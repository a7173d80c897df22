use bitflags::bitflags;

/// Host to mouse commands.
#[derive(Debug)]
pub struct Command;

impl Command {
    pub const RESET: u8 = 0xFF;
    pub const RESEND: u8 = 0xFE;
    pub const SET_DEFAULTS: u8 = 0xF6;
    pub const DISABLE_DATA_REPORTING: u8 = 0xF5;
    pub const ENABLE_DATA_REPORTING: u8 = 0xF4;
    /// Followed by `SampleRate`.
    pub const SET_SAMPLE_RATE: u8 = 0xF3;
    pub const GET_DEVICE_ID: u8 = 0xF2;
    pub const SET_REMOTE_MODE: u8 = 0xF0;
    pub const SET_WRAP_MODE: u8 = 0xEE;
    pub const RESET_WRAP_MODE: u8 = 0xEC;
    pub const READ_DATA: u8 = 0xEB;
    pub const SET_STREAM_MODE: u8 = 0xEA;
    pub const STATUS_REQUEST: u8 = 0xE9;
    /// Followed by `Resolution`.
    pub const SET_RESOLUTION: u8 = 0xE8;
    pub const SET_SCALING_2_TO_1: u8 = 0xE7;
    pub const SET_SCALING_1_TO_1: u8 = 0xE6;
}

#[derive(Debug)]
pub struct FromMouse;

impl FromMouse {
    pub const ACK: u8 = 0xFA;
    pub const RESEND: u8 = 0xFE;
    pub const ERROR: u8 = 0xFC;
    pub const BAT_COMPLETION_CODE: u8 = 0xAA;
    pub const BAT_FAILURE_CODE: u8 = 0xFC;
}

bitflags! {
    /// First byte of a movement data packet.
    pub struct PacketStatus: u8 {
        const LEFT_BUTTON = 0b0000_0001;
        const RIGHT_BUTTON = 0b0000_0010;
        const MIDDLE_BUTTON = 0b0000_0100;
        const ALWAYS_ONE = 0b0000_1000;
        const X_SIGN = 0b0001_0000;
        const Y_SIGN = 0b0010_0000;
        const X_OVERFLOW = 0b0100_0000;
        const Y_OVERFLOW = 0b1000_0000;
    }
}

bitflags! {
    /// First byte of the status request response.
    pub struct StatusFlags: u8 {
        const RIGHT_BUTTON = 0b0000_0001;
        const MIDDLE_BUTTON = 0b0000_0010;
        const LEFT_BUTTON = 0b0000_0100;
        const SCALING_2_TO_1 = 0b0001_0000;
        const DATA_REPORTING = 0b0010_0000;
        const REMOTE_MODE = 0b0100_0000;
    }
}

/// Reports per second in stream mode.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum SampleRate {
    Hz10 = 10,
    Hz20 = 20,
    Hz40 = 40,
    Hz60 = 60,
    Hz80 = 80,
    /// Default value.
    Hz100 = 100,
    Hz200 = 200,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum Resolution {
    CountsPerMm1 = 0,
    CountsPerMm2 = 1,
    /// Default value.
    CountsPerMm4 = 2,
    CountsPerMm8 = 3,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum Scaling {
    /// Default value.
    OneToOne = Command::SET_SCALING_1_TO_1,
    TwoToOne = Command::SET_SCALING_2_TO_1,
}
