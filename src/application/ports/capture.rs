//! Audio capture port interface

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread::JoinHandle;

use thiserror::Error;

use crate::application::recorder::CaptureProducer;

/// Capture errors
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    #[error("No audio device available")]
    NoAudioDevice,

    #[error("Failed to start capture: {0}")]
    StartFailed(String),

    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),
}

/// A running capture stream
pub struct CaptureSession {
    /// Human-readable device name
    pub device: String,
    /// Rate the transport settled on
    pub sample_rate: u32,
    /// Interleaved channels delivered by the device
    pub channels: u16,
    /// Thread owning the stream; exits once the stop flag is raised
    pub thread: JoinHandle<()>,
}

/// Port for the real-time audio transport.
///
/// The transport decides block size and sample rate; every block is
/// handed to the producer on the transport's own real-time thread.
pub trait AudioSource: Send + Sync {
    /// Start delivering blocks to `producer` until `stop` is raised.
    fn start(
        &self,
        producer: CaptureProducer,
        stop: Arc<AtomicBool>,
    ) -> Result<CaptureSession, CaptureError>;
}
