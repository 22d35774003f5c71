//! Discrete trigger events delivered by the control transport

use std::fmt;

/// Address the control listener accepts events on
pub const DEFAULT_CONTROL_ADDRESS: &str = "/ghost-rec/marker";

/// Default UDP port for control messages
pub const DEFAULT_CONTROL_PORT: u16 = 9_000;

/// Trigger event from the control plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlEvent {
    /// Arm the marker; it is injected after the pre-roll elapses
    Arm,
    /// Export the window around the armed marker
    Commit,
}

impl ControlEvent {
    /// Map a numeric payload to an event. `1.0` arms, `0.0` commits,
    /// anything else is ignored.
    pub fn from_value(value: f32) -> Option<Self> {
        if value == 1.0 {
            Some(Self::Arm)
        } else if value == 0.0 {
            Some(Self::Commit)
        } else {
            None
        }
    }

    /// Numeric payload carrying this event
    pub const fn as_value(&self) -> f32 {
        match self {
            Self::Arm => 1.0,
            Self::Commit => 0.0,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Arm => "arm",
            Self::Commit => "commit",
        }
    }
}

impl fmt::Display for ControlEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_values() {
        assert_eq!(ControlEvent::from_value(1.0), Some(ControlEvent::Arm));
        assert_eq!(ControlEvent::from_value(0.0), Some(ControlEvent::Commit));
        assert_eq!(ControlEvent::from_value(-0.0), Some(ControlEvent::Commit));
    }

    #[test]
    fn ignores_other_values() {
        assert_eq!(ControlEvent::from_value(0.5), None);
        assert_eq!(ControlEvent::from_value(2.0), None);
        assert_eq!(ControlEvent::from_value(f32::NAN), None);
    }

    #[test]
    fn value_round_trips() {
        for event in [ControlEvent::Arm, ControlEvent::Commit] {
            assert_eq!(ControlEvent::from_value(event.as_value()), Some(event));
        }
    }

    #[test]
    fn display() {
        assert_eq!(ControlEvent::Arm.to_string(), "arm");
        assert_eq!(ControlEvent::Commit.to_string(), "commit");
    }
}
