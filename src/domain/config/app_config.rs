//! Application configuration value object

use serde::{Deserialize, Serialize};

use crate::domain::control::{DEFAULT_CONTROL_ADDRESS, DEFAULT_CONTROL_PORT};
use crate::domain::recording::Duration;

/// Control listener configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OscConfig {
    pub port: Option<u16>,
    pub address: Option<String>,
}

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub retention: Option<String>,
    pub pre_roll: Option<String>,
    pub pre_time: Option<String>,
    pub min_duration: Option<String>,
    pub output_path: Option<String>,
    pub osc: Option<OscConfig>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            retention: Some(Duration::default_retention().to_string()),
            pre_roll: Some(Duration::default_pre_roll().to_string()),
            pre_time: Some(Duration::default_pre_time().to_string()),
            min_duration: Some(Duration::default_min_export().to_string()),
            output_path: None,
            osc: Some(OscConfig {
                port: Some(DEFAULT_CONTROL_PORT),
                address: Some(DEFAULT_CONTROL_ADDRESS.to_string()),
            }),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            retention: other.retention.or(self.retention),
            pre_roll: other.pre_roll.or(self.pre_roll),
            pre_time: other.pre_time.or(self.pre_time),
            min_duration: other.min_duration.or(self.min_duration),
            output_path: other.output_path.or(self.output_path),
            osc: Self::merge_osc_config(self.osc, other.osc),
        }
    }

    fn merge_osc_config(base: Option<OscConfig>, other: Option<OscConfig>) -> Option<OscConfig> {
        match (base, other) {
            (None, None) => None,
            (Some(b), None) => Some(b),
            (None, Some(o)) => Some(o),
            (Some(b), Some(o)) => Some(OscConfig {
                port: o.port.or(b.port),
                address: o.address.or(b.address),
            }),
        }
    }

    fn parse_or(value: &Option<String>, default: Duration) -> Duration {
        value
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(default)
    }

    /// Retention window, or 60s if not set/invalid
    pub fn retention_or_default(&self) -> Duration {
        Self::parse_or(&self.retention, Duration::default_retention())
    }

    /// Arm-to-inject delay, or 100ms if not set/invalid
    pub fn pre_roll_or_default(&self) -> Duration {
        Self::parse_or(&self.pre_roll, Duration::default_pre_roll())
    }

    /// Margin exported before the marker, or 100ms if not set/invalid
    pub fn pre_time_or_default(&self) -> Duration {
        Self::parse_or(&self.pre_time, Duration::default_pre_time())
    }

    /// Export duration floor, or 10ms if not set/invalid
    pub fn min_duration_or_default(&self) -> Duration {
        Self::parse_or(&self.min_duration, Duration::default_min_export())
    }

    pub fn osc_port_or_default(&self) -> u16 {
        self.osc
            .as_ref()
            .and_then(|o| o.port)
            .unwrap_or(DEFAULT_CONTROL_PORT)
    }

    pub fn osc_address_or_default(&self) -> &str {
        self.osc
            .as_ref()
            .and_then(|o| o.address.as_deref())
            .unwrap_or(DEFAULT_CONTROL_ADDRESS)
    }
}
