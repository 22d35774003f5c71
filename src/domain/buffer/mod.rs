//! Buffering engine: ring store, per-channel adapter, multi-channel buffer

mod audio_buffer;
mod channel_buffer;
mod marker;
mod raw_ring;

pub use audio_buffer::{AudioBuffer, ExportSummary};
pub use channel_buffer::ChannelBuffer;
pub use marker::{MarkerPattern, MARKER_LEN, MARKER_PATTERN, MARKER_TOLERANCE};
pub use raw_ring::RawRing;
