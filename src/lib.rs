
//! Bit-banged host driver for PS/2 pointing devices.
//!
//! The driver toggles and samples the PS/2 clock and data lines through
//! general purpose pins, so it works on microcontrollers without a
//! PS/2 controller.
//!
//! # Reference material
//! * <http://classiccomputers.info/down/IBM_PS2/documents/PS2_Hardware_Interface_Technical_Reference_May88.pdf>
//!     * Keyboard/Auxiliary Device Controller and Pointing Device sections
//! * <https://wiki.osdev.org/PS/2_Mouse>
//! * <https://www.burtonsys.com/ps2_chapweske.htm>

#![no_std]
#![forbid(missing_debug_implementations)]

pub mod bus;
pub mod device;

#[cfg(any(test, feature = "sim"))]
pub mod sim;

pub use crate::bus::{Bus, BusConfig, BusError, Validation};
pub use crate::device::mouse::driver::{Mode, Mouse, MouseError};
pub use crate::device::mouse::report::MotionReport;
