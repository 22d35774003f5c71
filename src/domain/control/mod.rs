//! Control-plane trigger events

mod event;

pub use event::{ControlEvent, DEFAULT_CONTROL_ADDRESS, DEFAULT_CONTROL_PORT};
