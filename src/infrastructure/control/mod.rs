//! Control transport adapters

mod osc;

pub use osc::{OscControlClient, OscControlServer};
