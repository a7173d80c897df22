/// Device type reported by the get device id command.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Device {
    StandardMouse,
    /// IntelliMouse with scroll wheel.
    ScrollMouse,
    FiveButtonMouse,
    Keyboard,
    UnknownID { first_byte: u8, second_byte: Option<u8> },
}

#[derive(Debug)]
pub struct DeviceId;

impl DeviceId {
    pub const STANDARD_MOUSE: u8 = 0x00;
    pub const SCROLL_MOUSE: u8 = 0x03;
    pub const FIVE_BUTTON_MOUSE: u8 = 0x04;
    pub const KEYBOARD_FIRST_BYTE: u8 = 0xAB;
    pub const KEYBOARD_SECOND_BYTE: u8 = 0x83;
}

impl Device {
    /// Keyboards reply with two id bytes, mice with one.
    pub fn has_second_byte(first_byte: u8) -> bool {
        first_byte == DeviceId::KEYBOARD_FIRST_BYTE
    }

    pub fn from_id(first_byte: u8, second_byte: Option<u8>) -> Self {
        match (first_byte, second_byte) {
            (DeviceId::STANDARD_MOUSE, None) => Device::StandardMouse,
            (DeviceId::SCROLL_MOUSE, None) => Device::ScrollMouse,
            (DeviceId::FIVE_BUTTON_MOUSE, None) => Device::FiveButtonMouse,
            (DeviceId::KEYBOARD_FIRST_BYTE, Some(DeviceId::KEYBOARD_SECOND_BYTE)) => Device::Keyboard,
            (first_byte, second_byte) => Device::UnknownID { first_byte, second_byte },
        }
    }

    pub fn is_mouse(&self) -> bool {
        match self {
            Device::StandardMouse | Device::ScrollMouse | Device::FiveButtonMouse => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_ids() {
        assert_eq!(Device::from_id(0x00, None), Device::StandardMouse);
        assert_eq!(Device::from_id(0x03, None), Device::ScrollMouse);
        assert_eq!(Device::from_id(0x04, None), Device::FiveButtonMouse);
        assert_eq!(Device::from_id(0xAB, Some(0x83)), Device::Keyboard);
        assert!(Device::has_second_byte(0xAB));
        assert!(!Device::has_second_byte(0x00));
    }

    #[test]
    fn unknown_id_keeps_bytes() {
        assert_eq!(Device::from_id(0xAB, Some(0x41)), Device::UnknownID { first_byte: 0xAB, second_byte: Some(0x41) });
        assert_eq!(Device::from_id(0x10, None), Device::UnknownID { first_byte: 0x10, second_byte: None });
        assert!(!Device::Keyboard.is_mouse());
        assert!(Device::ScrollMouse.is_mouse());
    }
}
