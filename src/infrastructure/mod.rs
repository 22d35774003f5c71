//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with external systems like cpal, OSC over UDP and WAV files.

pub mod capture;
pub mod codec;
pub mod config;
pub mod control;

// Re-export adapters
pub use capture::CpalCapture;
pub use codec::WavFileWriter;
pub use config::{default_output_path, XdgConfigStore};
pub use control::{OscControlClient, OscControlServer};
