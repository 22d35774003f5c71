//! Application layer - Use cases and port interfaces
//!
//! Contains the recorder use case and the trait definitions
//! for external system interactions.

pub mod ports;
pub mod recorder;

// Re-export use cases
pub use recorder::{
    CaptureProducer, ControlHandler, ControlOutcome, RecorderContext, RecorderError,
    RecorderService, RecorderSettings,
};
