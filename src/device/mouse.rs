//! Pointing device command set and packet decoding.

pub mod raw;
pub mod report;
pub mod driver;
