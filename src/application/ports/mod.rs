//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod capture;
pub mod codec;
pub mod config;
pub mod control;

// Re-export common types
pub use capture::{AudioSource, CaptureError, CaptureSession};
pub use codec::AudioFileWriter;
pub use config::ConfigStore;
pub use control::{ControlSink, ControlSource};
