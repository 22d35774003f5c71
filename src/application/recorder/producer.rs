//! Real-time producer: the per-block audio callback

use std::sync::Arc;

use super::context::{BufferSlot, RecorderContext};
use crate::domain::buffer::AudioBuffer;
use crate::domain::error::BufferError;

/// Invoked once if the buffer cannot be constructed on the first block
pub type FaultCallback = Arc<dyn Fn(BufferError) + Send + Sync>;

/// Owned by the transport's real-time thread.
///
/// `process` never waits on the buffer lock: a block that arrives while
/// an export holds the lock is dropped from the live buffer.
pub struct CaptureProducer {
    context: Arc<RecorderContext>,
    on_fault: Option<FaultCallback>,
    /// Seconds accumulated since an arm was first observed
    pre_roll_elapsed: f64,
    /// Reused copy of the incoming block
    scratch: Vec<f32>,
    failed: bool,
}

impl CaptureProducer {
    pub fn new(context: Arc<RecorderContext>) -> Self {
        Self {
            context,
            on_fault: None,
            pre_roll_elapsed: 0.0,
            scratch: Vec::new(),
            failed: false,
        }
    }

    /// Report buffer construction failure through `callback`
    pub fn with_fault_callback(mut self, callback: FaultCallback) -> Self {
        self.on_fault = Some(callback);
        self
    }

    /// Whether buffer construction failed; the producer only passes audio through afterwards
    pub fn has_failed(&self) -> bool {
        self.failed
    }

    /// Handle one block of mono samples delivered at `sample_rate`.
    ///
    /// When both `input` and `output` are present the output receives the
    /// block as buffered, marker included. With only an output it receives
    /// silence.
    pub fn process(&mut self, input: Option<&[f32]>, output: Option<&mut [f32]>, sample_rate: u32) {
        let buffered = match input {
            Some(block) if !self.failed && sample_rate > 0 => self.buffer_block(block, sample_rate),
            _ => false,
        };

        match (input, output) {
            (Some(block), Some(out)) => {
                let source = if buffered { &self.scratch[..] } else { block };
                let n = source.len().min(out.len());
                out[..n].copy_from_slice(&source[..n]);
                out[n..].fill(0.0);
            }
            (None, Some(out)) => out.fill(0.0),
            _ => {}
        }
    }

    /// Returns true when the block landed in the buffer
    fn buffer_block(&mut self, block: &[f32], sample_rate: u32) -> bool {
        if !self.context.is_configured() && !self.configure(sample_rate) {
            return false;
        }

        let mut inject = self.advance_pre_roll(block.len(), sample_rate);

        if self.context.is_exporting() {
            self.context.record_dropped();
            return false;
        }
        let Some(mut slot) = self.context.try_lock() else {
            self.context.record_dropped();
            return false;
        };
        let BufferSlot::Active(buffer) = &mut *slot else {
            return false;
        };

        // Consumed under the lock; an arm after this point waits for the next block
        if inject {
            inject = self.context.take_marker_pending();
            self.pre_roll_elapsed = 0.0;
        }

        let mut scratch = std::mem::take(&mut self.scratch);
        scratch.clear();
        scratch.extend_from_slice(block);
        let channel = self.context.settings().export_channel;
        self.scratch = buffer.push(scratch, channel, inject);
        drop(slot);

        self.context.record_buffered();
        true
    }

    /// Decide whether this block carries the marker.
    ///
    /// While an arm is pending, elapsed block time accumulates until it
    /// reaches the pre-roll; the block after that carries the marker.
    fn advance_pre_roll(&mut self, block_len: usize, sample_rate: u32) -> bool {
        if !self.context.marker_pending() {
            self.pre_roll_elapsed = 0.0;
            return false;
        }
        let pre_roll = self.context.settings().pre_roll.as_secs_f64();
        if self.pre_roll_elapsed >= pre_roll {
            return true;
        }
        self.pre_roll_elapsed += block_len as f64 / sample_rate as f64;
        false
    }

    /// One-time construction of the buffer from the first block's rate
    fn configure(&mut self, sample_rate: u32) -> bool {
        let Some(mut slot) = self.context.try_lock() else {
            return false;
        };
        if let BufferSlot::Unconfigured = &*slot {
            let settings = self.context.settings();
            match AudioBuffer::new(settings.channel_count, sample_rate, settings.retention_secs()) {
                Ok(buffer) => *slot = BufferSlot::Active(buffer),
                Err(e) => {
                    drop(slot);
                    self.failed = true;
                    if let Some(callback) = &self.on_fault {
                        callback(e);
                    }
                    return false;
                }
            }
        }
        self.context.mark_configured();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::recorder::RecorderSettings;
    use crate::domain::buffer::MARKER_PATTERN;
    use crate::domain::recording::Duration;
    use std::sync::Mutex;

    const RATE: u32 = 1_000;

    fn setup(retention_secs: u64) -> (Arc<RecorderContext>, CaptureProducer) {
        let mut settings = RecorderSettings::new("/tmp/ghost-rec-producer.wav");
        settings.retention = Duration::from_secs(retention_secs);
        settings.pre_roll = Duration::from_millis(100);
        let ctx = Arc::new(RecorderContext::new(settings));
        let producer = CaptureProducer::new(Arc::clone(&ctx));
        (ctx, producer)
    }

    #[test]
    fn first_block_configures_buffer() {
        let (ctx, mut producer) = setup(2);
        assert!(!ctx.is_configured());

        producer.process(Some(&[0.1; 10]), None, RATE);

        assert!(ctx.is_configured());
        assert_eq!(ctx.sample_rate(), Some(RATE));
        assert_eq!(ctx.blocks_buffered(), 1);
    }

    #[test]
    fn later_rate_changes_do_not_resize() {
        let (ctx, mut producer) = setup(1);
        producer.process(Some(&[0.1; 10]), None, RATE);
        producer.process(Some(&[0.1; 10]), None, 48_000);
        assert_eq!(ctx.sample_rate(), Some(RATE));
    }

    #[test]
    fn allocation_failure_reports_fault_once() {
        let mut settings = RecorderSettings::new("/tmp/x.wav");
        settings.retention = Duration::from_secs(u32::MAX as u64);
        let ctx = Arc::new(RecorderContext::new(settings));
        let faults = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&faults);
        let mut producer = CaptureProducer::new(Arc::clone(&ctx))
            .with_fault_callback(Arc::new(move |e| sink.lock().unwrap().push(e)));

        let mut out = [1.0f32; 4];
        producer.process(Some(&[0.5; 4]), Some(&mut out), u32::MAX);
        producer.process(Some(&[0.5; 4]), Some(&mut out), u32::MAX);

        assert!(producer.has_failed());
        assert!(!ctx.is_configured());
        assert_eq!(faults.lock().unwrap().len(), 1);
        assert!(matches!(faults.lock().unwrap()[0], BufferError::Allocation { .. }));
        // Passthrough keeps working
        assert_eq!(out, [0.5; 4]);
    }

    #[test]
    fn marker_waits_for_pre_roll() {
        let (ctx, mut producer) = setup(2);
        producer.process(Some(&[0.0; 50]), None, RATE);
        ctx.arm_marker();

        // 100ms of pre-roll at 50 samples per block
        producer.process(Some(&[0.0; 50]), None, RATE);
        producer.process(Some(&[0.0; 50]), None, RATE);
        assert!(ctx.marker_pending());
        assert_eq!(ctx.with_buffer(|b| b.seconds_since_marker()), Some(None));

        producer.process(Some(&[0.0; 50]), None, RATE);
        assert!(!ctx.marker_pending());
        assert_eq!(ctx.with_buffer(|b| b.seconds_since_marker()), Some(Some(0.0)));

        producer.process(Some(&[0.0; 50]), None, RATE);
        assert_eq!(ctx.with_buffer(|b| b.seconds_since_marker()), Some(Some(0.05)));
    }

    #[test]
    fn passthrough_carries_marker() {
        let mut settings = RecorderSettings::new("/tmp/ghost-rec-producer.wav");
        settings.pre_roll = Duration::from_millis(0);
        let ctx = Arc::new(RecorderContext::new(settings));
        let mut producer = CaptureProducer::new(Arc::clone(&ctx));

        ctx.arm_marker();
        let mut out = [0.0f32; 32];
        producer.process(Some(&[0.5; 32]), Some(&mut out), RATE);

        assert_eq!(&out[..16], &MARKER_PATTERN[..]);
        assert!(out[16..].iter().all(|&v| v == 0.5));
    }

    #[test]
    fn output_only_is_silence() {
        let (_ctx, mut producer) = setup(1);
        let mut out = [0.7f32; 8];
        producer.process(None, Some(&mut out), RATE);
        assert_eq!(out, [0.0; 8]);
    }

    #[test]
    fn input_only_buffers_without_output() {
        let (ctx, mut producer) = setup(1);
        producer.process(Some(&[0.2; 8]), None, RATE);
        assert_eq!(ctx.blocks_buffered(), 1);
    }

    #[test]
    fn longer_input_than_output_is_truncated() {
        let (_ctx, mut producer) = setup(1);
        let mut out = [0.0f32; 4];
        producer.process(Some(&[0.3; 8]), Some(&mut out), RATE);
        assert_eq!(out, [0.3; 4]);

        let mut out = [1.0f32; 8];
        producer.process(Some(&[0.3; 4]), Some(&mut out), RATE);
        assert_eq!(out, [0.3, 0.3, 0.3, 0.3, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn blocks_are_dropped_while_exporting() {
        let (ctx, mut producer) = setup(1);
        producer.process(Some(&[0.1; 10]), None, RATE);
        assert!(ctx.try_begin_export());

        let mut out = [0.0f32; 10];
        producer.process(Some(&[0.4; 10]), Some(&mut out), RATE);

        assert_eq!(ctx.blocks_buffered(), 1);
        assert_eq!(ctx.blocks_dropped(), 1);
        // Passthrough is unaffected
        assert_eq!(out, [0.4; 10]);
    }

    #[test]
    fn blocks_are_dropped_while_lock_is_held() {
        let (ctx, mut producer) = setup(1);
        producer.process(Some(&[0.1; 10]), None, RATE);

        let guard = ctx.lock();
        producer.process(Some(&[0.4; 10]), None, RATE);
        drop(guard);

        assert_eq!(ctx.blocks_dropped(), 1);
    }

    #[test]
    fn pending_marker_survives_dropped_block() {
        let (ctx, mut producer) = setup(1);
        producer.process(Some(&[0.0; 100]), None, RATE);
        ctx.arm_marker();
        producer.process(Some(&[0.0; 100]), None, RATE);

        // The injecting block is dropped; the marker stays pending
        assert!(ctx.try_begin_export());
        producer.process(Some(&[0.0; 100]), None, RATE);
        assert!(ctx.marker_pending());
        ctx.finish_export();

        producer.process(Some(&[0.0; 100]), None, RATE);
        assert!(!ctx.marker_pending());
        assert_eq!(ctx.with_buffer(|b| b.seconds_since_marker()), Some(Some(0.0)));
    }

    #[test]
    fn arm_after_injection_starts_a_new_marker() {
        let (ctx, mut producer) = setup(1);
        producer.process(Some(&[0.0; 100]), None, RATE);
        ctx.arm_marker();
        producer.process(Some(&[0.0; 100]), None, RATE);
        producer.process(Some(&[0.0; 100]), None, RATE);
        assert!(!ctx.marker_pending());
        assert_eq!(ctx.with_buffer(|b| b.seconds_since_marker()), Some(Some(0.0)));

        ctx.arm_marker();
        producer.process(Some(&[0.0; 100]), None, RATE);
        assert!(ctx.marker_pending());
        assert_eq!(ctx.with_buffer(|b| b.seconds_since_marker()), Some(Some(0.1)));

        producer.process(Some(&[0.0; 100]), None, RATE);
        assert!(!ctx.marker_pending());
        assert_eq!(ctx.with_buffer(|b| b.seconds_since_marker()), Some(Some(0.0)));
    }
}
