//! 24-bit PCM WAV writer using hound

use std::fs;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::application::ports::AudioFileWriter;
use crate::domain::error::CodecError;

/// Bits per exported sample
pub const BITS_PER_SAMPLE: u16 = 24;

/// Full-scale value of a 24-bit sample
const FULL_SCALE_24: f32 = 8_388_607.0;

/// Writes mono 24-bit integer WAV files.
///
/// The file is rendered next to the destination and renamed over it, so
/// a failed write never clobbers the previous export.
#[derive(Debug, Default, Clone, Copy)]
pub struct WavFileWriter;

impl WavFileWriter {
    pub fn new() -> Self {
        Self
    }

    fn spec(sample_rate: u32) -> WavSpec {
        WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: BITS_PER_SAMPLE,
            sample_format: SampleFormat::Int,
        }
    }

    fn staging_path(path: &Path) -> PathBuf {
        let mut name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".partial");
        path.with_file_name(name)
    }

    fn quantize(sample: f32) -> i32 {
        (sample.clamp(-1.0, 1.0) * FULL_SCALE_24).round() as i32
    }

    fn render(path: &Path, samples: &[f32], sample_rate: u32) -> Result<(), CodecError> {
        let mut writer = WavWriter::create(path, Self::spec(sample_rate))
            .map_err(|e| CodecError::Create(format!("{}: {}", path.display(), e)))?;

        for &sample in samples {
            writer
                .write_sample(Self::quantize(sample))
                .map_err(|e| CodecError::Write(e.to_string()))?;
        }

        writer
            .finalize()
            .map_err(|e| CodecError::Finalize(e.to_string()))
    }
}

impl AudioFileWriter for WavFileWriter {
    fn write_mono(&self, path: &Path, samples: &[f32], sample_rate: u32) -> Result<(), CodecError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| CodecError::Create(format!("{}: {}", parent.display(), e)))?;
        }

        let staging = Self::staging_path(path);
        if let Err(e) = Self::render(&staging, samples, sample_rate) {
            let _ = fs::remove_file(&staging);
            return Err(e);
        }

        fs::rename(&staging, path)
            .map_err(|e| CodecError::Finalize(format!("{}: {}", path.display(), e)))
    }
}
