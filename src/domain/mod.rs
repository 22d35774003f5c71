//! Domain layer - Core buffering engine and value objects
//!
//! Contains the retention buffer, marker handling, value objects, and
//! domain errors. This layer has no dependencies on external systems.

pub mod buffer;
pub mod config;
pub mod control;
pub mod error;
pub mod recording;

// Re-export common types
pub use buffer::{AudioBuffer, ChannelBuffer, ExportSummary, MarkerPattern, RawRing};
pub use config::AppConfig;
pub use control::ControlEvent;
pub use error::*;
pub use recording::Duration;
