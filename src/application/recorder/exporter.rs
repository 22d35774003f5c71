//! Blocking export of the marker-aligned window

use super::context::{BufferSlot, RecorderContext};
use crate::application::ports::AudioFileWriter;
use crate::domain::buffer::ExportSummary;
use crate::domain::error::ExportError;

/// Offset and duration of the window around a marker seen `elapsed` seconds ago.
///
/// The window starts `pre_time` before the marker and runs for
/// `elapsed - pre_time`, so its newest sample is `2 * pre_time` before now.
/// It is never shorter than `min_duration`.
pub fn export_window(elapsed: f64, pre_time: f64, min_duration: f64) -> (f64, f64) {
    let offset = elapsed + pre_time;
    let duration = (elapsed - pre_time).max(min_duration);
    (offset, duration)
}

/// Write the marker window to the configured output path.
///
/// Runs on a worker thread that may block on the buffer lock. The export
/// slot must already be claimed; it is released before the lock is,
/// whatever the outcome.
pub fn run_export(
    context: &RecorderContext,
    writer: &dyn AudioFileWriter,
) -> Result<ExportSummary, ExportError> {
    let mut slot = context.lock();
    let result = export_locked(context, &mut slot, writer);
    context.finish_export();
    drop(slot);
    result
}

fn export_locked(
    context: &RecorderContext,
    slot: &mut BufferSlot,
    writer: &dyn AudioFileWriter,
) -> Result<ExportSummary, ExportError> {
    let BufferSlot::Active(buffer) = slot else {
        return Err(ExportError::NotConfigured);
    };
    let Some(elapsed) = buffer.seconds_since_marker() else {
        return Err(ExportError::NoMarker);
    };

    let settings = context.settings();
    let (offset, duration) = export_window(
        elapsed,
        settings.pre_time.as_secs_f64(),
        settings.min_duration.as_secs_f64(),
    );

    let retention = buffer.retention_secs() as f64;
    if offset >= retention {
        buffer.stop_marker();
        let requested = (duration * buffer.sample_rate() as f64) as usize;
        return Err(ExportError::InsufficientData {
            requested,
            produced: 0,
        });
    }

    tracing::debug!(
        elapsed,
        offset,
        duration,
        path = %settings.output_path.display(),
        "exporting marker window"
    );

    buffer.export_channel_to_file(
        settings.export_channel,
        offset,
        duration,
        &settings.output_path,
        |path, samples, rate| writer.write_mono(path, samples, rate),
    )
}
