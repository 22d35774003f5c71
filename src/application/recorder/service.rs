//! Recorder service: wires producer, control handler and exporter together

use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;

use super::context::{RecorderContext, RecorderSettings};
use super::exporter::run_export;
use super::producer::CaptureProducer;
use crate::application::ports::{AudioFileWriter, CaptureError};
use crate::domain::buffer::ExportSummary;
use crate::domain::control::ControlEvent;
use crate::domain::error::{BufferError, ExportError};

/// Errors that stop the recorder as a whole
#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("Audio capture failed: {0}")]
    Capture(#[from] CaptureError),

    #[error("Buffer allocation failed: {0}")]
    Buffer(#[from] BufferError),

    #[error("Control listener failed: {0}")]
    Control(#[from] std::io::Error),
}

/// Handle to a running export
pub type ExportTask = JoinHandle<Result<ExportSummary, ExportError>>;

/// What a control event caused
#[derive(Debug)]
pub enum ControlOutcome {
    /// Marker requested; injected after the pre-roll
    Armed,
    /// Export spawned on the blocking pool
    ExportStarted(ExportTask),
    /// Commit ignored, another export holds the slot
    ExportAlreadyRunning,
}

/// One recorder instance and its shared state
pub struct RecorderService {
    context: Arc<RecorderContext>,
    writer: Arc<dyn AudioFileWriter>,
}

impl RecorderService {
    pub fn new(settings: RecorderSettings, writer: Arc<dyn AudioFileWriter>) -> Self {
        Self {
            context: Arc::new(RecorderContext::new(settings)),
            writer,
        }
    }

    pub fn context(&self) -> &Arc<RecorderContext> {
        &self.context
    }

    /// Producer for the capture thread
    pub fn producer(&self) -> CaptureProducer {
        CaptureProducer::new(Arc::clone(&self.context))
    }

    pub fn control_handler(&self) -> ControlHandler {
        ControlHandler {
            context: Arc::clone(&self.context),
            writer: Arc::clone(&self.writer),
        }
    }
}

/// Applies arm and commit events to the shared context
#[derive(Clone)]
pub struct ControlHandler {
    context: Arc<RecorderContext>,
    writer: Arc<dyn AudioFileWriter>,
}

impl ControlHandler {
    /// Apply `event`. Must be called from within a Tokio runtime.
    pub fn handle(&self, event: ControlEvent) -> ControlOutcome {
        match event {
            ControlEvent::Arm => {
                self.context.arm_marker();
                tracing::debug!("marker armed");
                ControlOutcome::Armed
            }
            ControlEvent::Commit => {
                if !self.context.try_begin_export() {
                    tracing::debug!("commit ignored, export in progress");
                    return ControlOutcome::ExportAlreadyRunning;
                }
                let context = Arc::clone(&self.context);
                let writer = Arc::clone(&self.writer);
                let task = tokio::task::spawn_blocking(move || run_export(&context, writer.as_ref()));
                ControlOutcome::ExportStarted(task)
            }
        }
    }
}
