//! Recorder use case: real-time producer, control handling and export

mod context;
mod exporter;
mod producer;
mod service;

pub use context::{BufferSlot, RecorderContext, RecorderSettings};
pub use exporter::{export_window, run_export};
pub use producer::{CaptureProducer, FaultCallback};
pub use service::{ControlHandler, ControlOutcome, ExportTask, RecorderError, RecorderService};
