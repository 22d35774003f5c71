//! Locate command handler: finds the alignment marker in a WAV file

use std::path::Path;

use hound::{SampleFormat, WavReader};
use thiserror::Error;

use crate::domain::buffer::MarkerPattern;

use super::presenter::Presenter;

/// Locate errors
#[derive(Debug, Error)]
pub enum LocateError {
    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("No marker found in {0}")]
    NotFound(String),
}

/// Where the marker sits in a file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerLocation {
    /// Frame index of the first marker sample
    pub frame: usize,
    pub sample_rate: u32,
}

impl MarkerLocation {
    pub fn seconds(&self) -> f64 {
        self.frame as f64 / self.sample_rate as f64
    }
}

/// Print the marker's frame index on stdout
pub fn handle_locate_command(path: &Path, presenter: &Presenter) -> Result<(), LocateError> {
    let location = locate_marker(path)?;
    presenter.output(&location.frame.to_string());
    presenter.info(&format!(
        "Marker at {:.6}s ({} Hz)",
        location.seconds(),
        location.sample_rate
    ));
    Ok(())
}

/// Scan the first channel of `path` for the marker pattern
pub fn locate_marker(path: &Path) -> Result<MarkerLocation, LocateError> {
    let read_error = |e: hound::Error| LocateError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    let mut reader = WavReader::open(path).map_err(read_error)?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(read_error)?,
        SampleFormat::Int => {
            let full_scale = ((1i64 << (spec.bits_per_sample - 1)) - 1) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / full_scale))
                .collect::<Result<_, _>>()
                .map_err(read_error)?
        }
    };

    let first_channel: Vec<f32> = interleaved.iter().step_by(channels).copied().collect();

    MarkerPattern::find(&first_channel)
        .map(|frame| MarkerLocation {
            frame,
            sample_rate: spec.sample_rate,
        })
        .ok_or_else(|| LocateError::NotFound(path.display().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::AudioFileWriter;
    use crate::domain::buffer::MARKER_PATTERN;
    use crate::infrastructure::WavFileWriter;

    #[test]
    fn finds_marker_in_exported_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("take.wav");
        let mut samples = vec![0.2f32; 1_000];
        samples[300..316].copy_from_slice(&MARKER_PATTERN);
        WavFileWriter::new().write_mono(&path, &samples, 48_000).unwrap();

        let location = locate_marker(&path).unwrap();

        assert_eq!(location.frame, 300);
        assert!((location.seconds() - 0.00625).abs() < 1e-9);
    }

    #[test]
    fn finds_marker_in_float_stereo_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 44_100,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for i in 0..200 {
            let left = if (50..66).contains(&i) { MARKER_PATTERN[i - 50] } else { 0.1 };
            writer.write_sample(left).unwrap();
            writer.write_sample(-0.3f32).unwrap();
        }
        writer.finalize().unwrap();

        assert_eq!(locate_marker(&path).unwrap().frame, 50);
    }

    #[test]
    fn missing_marker_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.wav");
        WavFileWriter::new().write_mono(&path, &[0.1; 100], 8_000).unwrap();

        assert!(matches!(locate_marker(&path), Err(LocateError::NotFound(_))));
    }

    #[test]
    fn unreadable_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = locate_marker(&dir.path().join("absent.wav")).unwrap_err();
        assert!(matches!(err, LocateError::Read { .. }));
    }
}
