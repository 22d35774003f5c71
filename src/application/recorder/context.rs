//! Shared capture state handed to every thread entry point

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, TryLockError};

use crate::domain::buffer::AudioBuffer;
use crate::domain::recording::Duration;

/// Fixed parameters of a recorder instance
#[derive(Debug, Clone)]
pub struct RecorderSettings {
    /// Channels held by the buffer
    pub channel_count: usize,
    /// Channel written to the export file
    pub export_channel: usize,
    /// Retained history per channel
    pub retention: Duration,
    /// Delay between an arm event and marker injection
    pub pre_roll: Duration,
    /// Margin exported before the marker
    pub pre_time: Duration,
    /// Floor for the exported duration
    pub min_duration: Duration,
    /// Destination overwritten by every export
    pub output_path: PathBuf,
}

impl RecorderSettings {
    /// Single-channel settings with default timings
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            channel_count: 1,
            export_channel: 0,
            retention: Duration::default_retention(),
            pre_roll: Duration::default_pre_roll(),
            pre_time: Duration::default_pre_time(),
            min_duration: Duration::default_min_export(),
            output_path: output_path.into(),
        }
    }

    /// Retention in whole seconds, at least one
    pub fn retention_secs(&self) -> u32 {
        self.retention.as_secs().clamp(1, u32::MAX as u64) as u32
    }
}

/// Buffer lifecycle: sized on the first delivered block
#[derive(Debug)]
pub enum BufferSlot {
    Unconfigured,
    Active(AudioBuffer),
}

/// Everything the producer, control handler and exporter share.
///
/// One lock guards the buffer and its marker state. The export gate and
/// the pending-marker flag are atomics so the control plane never needs
/// the lock.
#[derive(Debug)]
pub struct RecorderContext {
    settings: RecorderSettings,
    slot: Mutex<BufferSlot>,
    configured: AtomicBool,
    exporting: AtomicBool,
    marker_pending: AtomicBool,
    blocks_buffered: AtomicU64,
    blocks_dropped: AtomicU64,
}

impl RecorderContext {
    pub fn new(settings: RecorderSettings) -> Self {
        Self {
            settings,
            slot: Mutex::new(BufferSlot::Unconfigured),
            configured: AtomicBool::new(false),
            exporting: AtomicBool::new(false),
            marker_pending: AtomicBool::new(false),
            blocks_buffered: AtomicU64::new(0),
            blocks_dropped: AtomicU64::new(0),
        }
    }

    pub fn settings(&self) -> &RecorderSettings {
        &self.settings
    }

    /// Claim the single export slot. Returns false if an export is running.
    pub fn try_begin_export(&self) -> bool {
        self.exporting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Release the export slot
    pub fn finish_export(&self) {
        self.exporting.store(false, Ordering::Release);
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting.load(Ordering::Acquire)
    }

    /// Request a marker; the producer injects it after the pre-roll
    pub fn arm_marker(&self) {
        self.marker_pending.store(true, Ordering::Release);
    }

    pub fn marker_pending(&self) -> bool {
        self.marker_pending.load(Ordering::Acquire)
    }

    /// Consume the pending request, returning whether one was set
    pub(super) fn take_marker_pending(&self) -> bool {
        self.marker_pending.swap(false, Ordering::AcqRel)
    }

    /// Whether the first block has sized the buffer
    pub fn is_configured(&self) -> bool {
        self.configured.load(Ordering::Acquire)
    }

    pub(super) fn mark_configured(&self) {
        self.configured.store(true, Ordering::Release);
    }

    pub fn blocks_buffered(&self) -> u64 {
        self.blocks_buffered.load(Ordering::Relaxed)
    }

    pub fn blocks_dropped(&self) -> u64 {
        self.blocks_dropped.load(Ordering::Relaxed)
    }

    pub(super) fn record_buffered(&self) {
        self.blocks_buffered.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn record_dropped(&self) {
        self.blocks_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Blocking lock, for paths allowed to wait
    pub fn lock(&self) -> MutexGuard<'_, BufferSlot> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Non-blocking lock for the real-time path
    pub(super) fn try_lock(&self) -> Option<MutexGuard<'_, BufferSlot>> {
        match self.slot.try_lock() {
            Ok(guard) => Some(guard),
            Err(TryLockError::Poisoned(e)) => Some(e.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }

    /// Run `f` against the active buffer, waiting for the lock.
    /// Returns `None` before the first block has arrived.
    pub fn with_buffer<R>(&self, f: impl FnOnce(&mut AudioBuffer) -> R) -> Option<R> {
        let mut slot = self.lock();
        match &mut *slot {
            BufferSlot::Active(buffer) => Some(f(buffer)),
            BufferSlot::Unconfigured => None,
        }
    }

    /// Sample rate of the active buffer
    pub fn sample_rate(&self) -> Option<u32> {
        self.with_buffer(|buffer| buffer.sample_rate())
    }
}
