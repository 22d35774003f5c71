//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::control::ControlEvent;
use crate::domain::recording::Duration;

/// ghost-rec - always-on black box audio recorder
#[derive(Parser, Debug)]
#[command(name = "ghost-rec")]
#[command(version)]
#[command(about = "Always-on audio recorder with retroactive, marker-aligned export")]
#[command(long_about = None)]
pub struct Cli {
    /// Retained history (e.g., 30s, 1m, 2m30s)
    #[arg(short = 'r', long, value_name = "TIME")]
    pub retention: Option<String>,

    /// Export destination, overwritten on every commit
    #[arg(short = 'o', long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// UDP port for OSC trigger messages
    #[arg(short = 'p', long, value_name = "PORT")]
    pub port: Option<u16>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a trigger to a running recorder
    Trigger {
        /// Event to send
        event: TriggerArg,

        /// Recorder's OSC port
        #[arg(short = 'p', long, value_name = "PORT")]
        port: Option<u16>,
    },
    /// Report where the alignment marker sits in a WAV file
    Locate {
        /// WAV file to scan
        path: PathBuf,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Trigger argument for clap ValueEnum
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum TriggerArg {
    /// Inject the alignment marker after the pre-roll
    Arm,
    /// Export the window around the marker
    Commit,
}

impl From<TriggerArg> for ControlEvent {
    fn from(arg: TriggerArg) -> Self {
        match arg {
            TriggerArg::Arm => ControlEvent::Arm,
            TriggerArg::Commit => ControlEvent::Commit,
        }
    }
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Parsed recorder options
#[derive(Debug, Clone)]
pub struct RecorderOptions {
    pub retention: Duration,
    pub pre_roll: Duration,
    pub pre_time: Duration,
    pub min_duration: Duration,
    pub output_path: PathBuf,
    pub osc_port: u16,
    pub osc_address: String,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "retention",
    "pre_roll",
    "pre_time",
    "min_duration",
    "output_path",
    "osc.port",
    "osc.address",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}
