//! Per-channel adapter between seconds and ring offsets

use super::raw_ring::RawRing;
use crate::domain::error::BufferError;

/// One channel of retained history, sized by sample rate and retention.
#[derive(Debug, Clone)]
pub struct ChannelBuffer {
    ring: RawRing,
    sample_rate: u32,
    retention_secs: u32,
}

impl ChannelBuffer {
    /// Create a channel holding `sample_rate * retention_secs` samples.
    pub fn new(sample_rate: u32, retention_secs: u32) -> Result<Self, BufferError> {
        let capacity = (sample_rate as usize)
            .checked_mul(retention_secs as usize)
            .ok_or(BufferError::Allocation { samples: usize::MAX })?;
        Ok(Self {
            ring: RawRing::new(capacity)?,
            sample_rate,
            retention_secs,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn retention_secs(&self) -> u32 {
        self.retention_secs
    }

    /// Ring capacity in samples
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// Append a block; its last element becomes the newest sample.
    pub fn write(&mut self, samples: &[f32]) {
        for &sample in samples {
            self.ring.write(sample);
        }
    }

    /// Truncating seconds to samples conversion
    pub fn duration_to_samples(&self, seconds: f64) -> usize {
        to_samples(seconds, self.sample_rate).max(0) as usize
    }

    /// Read a window of history into `out`, oldest sample first.
    ///
    /// `out[0]` is the sample `offset_secs` before now and each following
    /// element is one sample later. At most `out.len()` samples are
    /// produced; the count written is returned.
    pub fn read(&self, out: &mut [f32], offset_secs: f64, duration_secs: f64) -> usize {
        let offset = to_samples(offset_secs, self.sample_rate);
        let wanted = to_samples(duration_secs, self.sample_rate).max(0) as usize;
        let produced = wanted.min(out.len());

        for (i, slot) in out.iter_mut().take(produced).enumerate() {
            *slot = self.ring.read(offset - i as i64);
        }
        produced
    }
}

fn to_samples(seconds: f64, sample_rate: u32) -> i64 {
    (seconds * sample_rate as f64).floor() as i64
}
