//! Power, run, and service state enumerations.
//!
//! Each enumeration carries the fixed token set the fabric uses as discovery
//! value identifiers. Tokens are declared once here and never synthesized at
//! runtime, so lookups are plain matches rather than reflective maps.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The physical power condition of a node, as last observed or desired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerState {
    /// Power state has never been observed, or observation failed.
    Unknown,
    /// The node is powered off.
    Off,
    /// The node is powered on.
    On,
    /// The node is unresponsive; the universal failure sink.
    Hang,
}

impl PowerState {
    /// All power states, in declaration order.
    pub const ALL: [Self; 4] = [Self::Unknown, Self::Off, Self::On, Self::Hang];

    /// The fabric token identifying this state in observation events.
    #[must_use]
    pub const fn as_value_id(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Off => "OFF",
            Self::On => "ON",
            Self::Hang => "HANG",
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_value_id())
    }
}

impl FromStr for PowerState {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UNKNOWN" => Ok(Self::Unknown),
            "OFF" => Ok(Self::Off),
            "ON" => Ok(Self::On),
            "HANG" => Ok(Self::Hang),
            other => Err(CoreError::UnknownValueId(other.to_string())),
        }
    }
}

/// The node run-state values this module declares as discoverable.
///
/// Power control never advances a node's run state, so the only declared
/// value is `Unknown`: a node whose power just changed has no known runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunState {
    /// Runtime condition not known.
    Unknown,
}

impl RunState {
    /// The fabric token for this run state.
    #[must_use]
    pub const fn as_value_id(self) -> &'static str {
        match self {
            Self::Unknown => "RUN_UK",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_value_id())
    }
}

/// Liveness of the controller's own service entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceState {
    /// The service loop is running.
    Run,
}

impl ServiceState {
    /// The fabric token for this service state.
    #[must_use]
    pub const fn as_value_id(self) -> &'static str {
        match self {
            Self::Run => "RUN",
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_value_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_state_tokens_round_trip() {
        for state in PowerState::ALL {
            let parsed: PowerState = state.as_value_id().parse().unwrap();
            assert_eq!(parsed, state);
        }
    }

    #[test]
    fn unknown_token_is_an_error() {
        let result = "BLINKING".parse::<PowerState>();
        assert!(matches!(result, Err(CoreError::UnknownValueId(_))));
    }

    #[test]
    fn display_matches_value_id() {
        assert_eq!(PowerState::Hang.to_string(), "HANG");
        assert_eq!(RunState::Unknown.to_string(), "RUN_UK");
        assert_eq!(ServiceState::Run.to_string(), "RUN");
    }

    #[test]
    fn serde_round_trip() {
        let json = serde_json::to_string(&PowerState::Off).unwrap();
        let back: PowerState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, PowerState::Off);
    }
}
