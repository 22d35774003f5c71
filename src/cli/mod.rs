//! CLI layer - Command-line interface
//!
//! Contains argument parsing, output formatting, signal handling,
//! and the recorder runner.

pub mod app;
pub mod args;
pub mod config_cmd;
pub mod locate_cmd;
#[cfg(unix)]
pub mod pid_file;
pub mod presenter;
pub mod signals;
pub mod trigger_cmd;

// Re-export commonly used types
pub use app::{run_recorder, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE_ERROR};
pub use args::{Cli, Commands, ConfigAction, RecorderOptions, TriggerArg};
pub use presenter::Presenter;
