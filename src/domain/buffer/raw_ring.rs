//! Fixed-capacity circular store of single samples
//!
//! Addressing is most-recent-first: offset 0 is the newest sample,
//! offset 1 the one written before it, and so on.

use crate::domain::error::BufferError;

/// Circular sample store with most-recent-first offset addressing.
///
/// The ring does not track how many samples have ever been written.
/// Reading an offset older than the oldest real write returns the
/// zero-initialized (or stale) slot instead of failing.
#[derive(Debug, Clone)]
pub struct RawRing {
    samples: Box<[f32]>,
    /// Slot the next sample lands in
    next_write: usize,
    /// Most recently written slot, always `next_write - 1 mod capacity`
    last_write: usize,
}

impl RawRing {
    /// Allocate a ring of `capacity` zeroed samples.
    ///
    /// Allocation is fallible so that an oversized retention window
    /// surfaces as [`BufferError::Allocation`] rather than aborting.
    pub fn new(capacity: usize) -> Result<Self, BufferError> {
        if capacity == 0 {
            return Err(BufferError::Validation(
                "ring capacity must be at least one sample".to_string(),
            ));
        }

        let mut samples: Vec<f32> = Vec::new();
        samples
            .try_reserve_exact(capacity)
            .map_err(|_| BufferError::Allocation { samples: capacity })?;
        samples.resize(capacity, 0.0);

        Ok(Self {
            samples: samples.into_boxed_slice(),
            next_write: 0,
            last_write: capacity - 1,
        })
    }

    /// Number of slots in the ring
    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    /// Store one sample and advance both indices.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.samples[self.next_write] = sample;
        self.last_write = self.next_write;
        self.next_write = (self.next_write + 1) % self.samples.len();
    }

    /// Sample written `offset` writes before the most recent one.
    ///
    /// Negative offsets wrap around the ring, which lands on the oldest
    /// retained samples.
    #[inline]
    pub fn read(&self, offset: i64) -> f32 {
        let capacity = self.samples.len() as i64;
        let index = (self.last_write as i64 - offset).rem_euclid(capacity);
        self.samples[index as usize]
    }
}
