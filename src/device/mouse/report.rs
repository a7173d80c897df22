//! Decoded mouse data.

use super::raw::{PacketStatus, StatusFlags, Resolution, Scaling};

/// One movement data packet.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MotionReport {
    status: PacketStatus,
    dx: i16,
    dy: i16,
}

impl MotionReport {
    pub fn from_bytes(status: u8, x: u8, y: u8) -> Self {
        let status = PacketStatus::from_bits_truncate(status);

        Self {
            status,
            dx: sign_extend(x, status.contains(PacketStatus::X_SIGN)),
            dy: sign_extend(y, status.contains(PacketStatus::Y_SIGN)),
        }
    }

    pub fn status(&self) -> PacketStatus {
        self.status
    }

    /// Horizontal movement, positive is right.
    pub fn dx(&self) -> i16 {
        self.dx
    }

    /// Vertical movement, positive is up.
    pub fn dy(&self) -> i16 {
        self.dy
    }

    pub fn left_button(&self) -> bool {
        self.status.contains(PacketStatus::LEFT_BUTTON)
    }

    pub fn right_button(&self) -> bool {
        self.status.contains(PacketStatus::RIGHT_BUTTON)
    }

    pub fn middle_button(&self) -> bool {
        self.status.contains(PacketStatus::MIDDLE_BUTTON)
    }

    /// Movement was too large for the packet and `dx` is not reliable.
    pub fn x_overflow(&self) -> bool {
        self.status.contains(PacketStatus::X_OVERFLOW)
    }

    pub fn y_overflow(&self) -> bool {
        self.status.contains(PacketStatus::Y_OVERFLOW)
    }
}

/// Fill the upper byte with ones if `negative` is set.
pub fn sign_extend(value: u8, negative: bool) -> i16 {
    if negative {
        (0xFF00 | u16::from(value)) as i16
    } else {
        i16::from(value)
    }
}

/// Response to the status request command.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DeviceStatus {
    flags: StatusFlags,
    resolution: u8,
    sample_rate: u8,
}

impl DeviceStatus {
    pub fn from_bytes(flags: u8, resolution: u8, sample_rate: u8) -> Self {
        Self {
            flags: StatusFlags::from_bits_truncate(flags),
            resolution,
            sample_rate,
        }
    }

    pub fn flags(&self) -> StatusFlags {
        self.flags
    }

    pub fn remote_mode(&self) -> bool {
        self.flags.contains(StatusFlags::REMOTE_MODE)
    }

    pub fn data_reporting(&self) -> bool {
        self.flags.contains(StatusFlags::DATA_REPORTING)
    }

    pub fn scaling(&self) -> Scaling {
        if self.flags.contains(StatusFlags::SCALING_2_TO_1) {
            Scaling::TwoToOne
        } else {
            Scaling::OneToOne
        }
    }

    /// `None` if the device reported a value outside 0..=3.
    pub fn resolution(&self) -> Option<Resolution> {
        match self.resolution {
            0 => Some(Resolution::CountsPerMm1),
            1 => Some(Resolution::CountsPerMm2),
            2 => Some(Resolution::CountsPerMm4),
            3 => Some(Resolution::CountsPerMm8),
            _ => None,
        }
    }

    /// Samples per second.
    pub fn sample_rate(&self) -> u8 {
        self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_movement_is_sign_extended() {
        let report = MotionReport::from_bytes(0b0001_1000, 0xFF, 0x05);

        assert_eq!(report.dx(), -1);
        assert_eq!(report.dx() as u16, 0xFFFF);
        assert_eq!(report.dy(), 5);
    }

    #[test]
    fn positive_movement_is_kept() {
        let report = MotionReport::from_bytes(0b0000_1000, 0x05, 0x80);

        assert_eq!(report.dx(), 5);
        assert_eq!(report.dy(), 128);
    }

    #[test]
    fn y_uses_its_own_sign_bit() {
        let report = MotionReport::from_bytes(0b0010_1000, 0x80, 0x80);

        assert_eq!(report.dx(), 128);
        assert_eq!(report.dy(), -128);
    }

    #[test]
    fn buttons_and_overflow() {
        let report = MotionReport::from_bytes(0b1100_1101, 0, 0);

        assert!(report.left_button());
        assert!(!report.right_button());
        assert!(report.middle_button());
        assert!(report.x_overflow());
        assert!(report.y_overflow());
    }

    #[test]
    fn status_response() {
        let status = DeviceStatus::from_bytes(0b0111_0100, 3, 200);

        assert!(status.remote_mode());
        assert!(status.data_reporting());
        assert_eq!(status.scaling(), Scaling::TwoToOne);
        assert!(status.flags().contains(StatusFlags::LEFT_BUTTON));
        assert_eq!(status.resolution(), Some(Resolution::CountsPerMm8));
        assert_eq!(status.sample_rate(), 200);
        assert_eq!(DeviceStatus::from_bytes(0, 9, 100).resolution(), None);
    }
}
