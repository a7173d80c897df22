//! PS/2 device protocols on top of `bus`.

pub mod identify;
pub mod mouse;
