//! Recording domain module

mod duration;

pub use duration::{
    Duration, DEFAULT_MIN_EXPORT_MS, DEFAULT_PRE_ROLL_MS, DEFAULT_PRE_TIME_MS,
    DEFAULT_RETENTION_SECS,
};
