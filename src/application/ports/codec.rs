//! File codec port interface

use std::path::Path;

use crate::domain::error::CodecError;

/// Port for serializing float samples to an audio container.
///
/// Implementations receive samples already limited to `[-1.0, 1.0]` and
/// must either replace the destination completely or leave it untouched.
pub trait AudioFileWriter: Send + Sync {
    /// Write a mono file at `path`.
    fn write_mono(&self, path: &Path, samples: &[f32], sample_rate: u32) -> Result<(), CodecError>;
}
