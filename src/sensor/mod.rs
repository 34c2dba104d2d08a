//! step.sensor_event.v1 input schema
//!
//! Serialized form of the platform step-counter callback, used to feed the
//! tracker from the FFI surface and to replay recorded streams.

mod event;
mod reader;

pub use event::*;
pub use reader::*;
