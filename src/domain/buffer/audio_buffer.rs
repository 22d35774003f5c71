//! Multi-channel retention buffer with alignment marker tracking

use std::path::Path;

use super::channel_buffer::ChannelBuffer;
use super::marker::MarkerPattern;
use crate::domain::error::{BufferError, CodecError, ExportError};

/// Samples above this magnitude are treated as wild values
const CLAMP_THRESHOLD: f32 = 1.0;

/// Replacement magnitude for wild values
const CLAMP_REPLACEMENT: f32 = 0.99;

/// Result of a successful export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    /// Samples written to the file
    pub samples: usize,
    /// Samples replaced by the clamp guard
    pub clamped: usize,
    pub sample_rate: u32,
}

impl ExportSummary {
    /// Duration of the exported slice in seconds
    pub fn duration_secs(&self) -> f64 {
        self.samples as f64 / self.sample_rate as f64
    }
}

/// Retained history for every captured channel plus the marker timer.
///
/// Marker state is global to the buffer: pushes on any channel advance
/// the same timer.
#[derive(Debug)]
pub struct AudioBuffer {
    channels: Vec<ChannelBuffer>,
    sample_rate: u32,
    retention_secs: u32,
    marker_active: bool,
    samples_since_marker: Option<u64>,
}

impl AudioBuffer {
    /// Allocate `channel_count` channels of `sample_rate * retention_secs` samples.
    pub fn new(
        channel_count: usize,
        sample_rate: u32,
        retention_secs: u32,
    ) -> Result<Self, BufferError> {
        if channel_count == 0 {
            return Err(BufferError::Validation(
                "at least one channel is required".to_string(),
            ));
        }
        if sample_rate == 0 {
            return Err(BufferError::Validation(
                "sample rate must be positive".to_string(),
            ));
        }

        let channels = (0..channel_count)
            .map(|_| ChannelBuffer::new(sample_rate, retention_secs))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            channels,
            sample_rate,
            retention_secs,
            marker_active: false,
            samples_since_marker: None,
        })
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn retention_secs(&self) -> u32 {
        self.retention_secs
    }

    /// Whether a marker has been injected and not yet stopped
    pub fn marker_active(&self) -> bool {
        self.marker_active
    }

    /// Buffer a block on `channel`, optionally stamping the marker first.
    ///
    /// The block is consumed and handed back: when `inject_marker` is set
    /// its first `min(len, 16)` samples come back replaced by the marker
    /// pattern, exactly as they were written to the ring. An out-of-range
    /// channel is a no-op.
    pub fn push<B: AsMut<[f32]>>(&mut self, mut block: B, channel: usize, inject_marker: bool) -> B {
        if channel >= self.channels.len() {
            return block;
        }

        let samples = block.as_mut();
        if inject_marker {
            MarkerPattern::stamp(samples);
            self.marker_active = true;
            self.samples_since_marker = Some(0);
        } else if self.marker_active {
            if let Some(elapsed) = self.samples_since_marker.as_mut() {
                *elapsed += samples.len() as u64;
            }
        }

        self.channels[channel].write(samples);
        block
    }

    /// Seconds elapsed since the last injection, `None` when no marker is pending.
    pub fn seconds_since_marker(&self) -> Option<f64> {
        if !self.marker_active {
            return None;
        }
        self.samples_since_marker
            .map(|samples| samples as f64 / self.sample_rate as f64)
    }

    /// Forget the pending marker. Buffered audio is left untouched.
    pub fn stop_marker(&mut self) {
        self.marker_active = false;
        self.samples_since_marker = None;
    }

    /// Read a window from `channel` and apply the clamp guard.
    ///
    /// Returns the samples and how many of them were clamped.
    pub fn clamped_window(
        &self,
        channel: usize,
        offset_secs: f64,
        duration_secs: f64,
    ) -> Result<(Vec<f32>, usize), ExportError> {
        let channel_buffer = self.channels.get(channel).ok_or_else(|| {
            ExportError::Validation(format!(
                "channel {} out of range ({} channels)",
                channel,
                self.channels.len()
            ))
        })?;

        let requested = channel_buffer.duration_to_samples(duration_secs);
        let mut scratch = vec![0.0f32; requested];
        let produced = channel_buffer.read(&mut scratch, offset_secs, duration_secs);
        if produced == 0 {
            return Err(ExportError::InsufficientData {
                requested,
                produced,
            });
        }
        scratch.truncate(produced);

        let clamped = clamp_wild_samples(&mut scratch);
        Ok((scratch, clamped))
    }

    /// Export a window of one channel to a mono file at `path`.
    ///
    /// `write` receives the destination, the clamped samples and the
    /// buffer's sample rate. It is not called when the window is empty.
    pub fn export_channel_to_file<W>(
        &self,
        channel: usize,
        offset_secs: f64,
        duration_secs: f64,
        path: &Path,
        write: W,
    ) -> Result<ExportSummary, ExportError>
    where
        W: FnOnce(&Path, &[f32], u32) -> Result<(), CodecError>,
    {
        let (samples, clamped) = self.clamped_window(channel, offset_secs, duration_secs)?;
        write(path, &samples, self.sample_rate)?;

        Ok(ExportSummary {
            samples: samples.len(),
            clamped,
            sample_rate: self.sample_rate,
        })
    }
}

/// Replace samples outside `[-1.0, 1.0]` with `±0.99`.
///
/// Everything inside the range, including values such as `0.995`, passes
/// through unchanged.
fn clamp_wild_samples(samples: &mut [f32]) -> usize {
    let mut clamped = 0;
    for sample in samples.iter_mut() {
        if *sample > CLAMP_THRESHOLD {
            *sample = CLAMP_REPLACEMENT;
            clamped += 1;
        } else if *sample < -CLAMP_THRESHOLD {
            *sample = -CLAMP_REPLACEMENT;
            clamped += 1;
        }
    }
    clamped
}
