//! ---
//! smartbin_section: "02-core-pipeline"
//! smartbin_subsection: "module"
//! smartbin_type: "source"
//! smartbin_scope: "code"
//! smartbin_description: "Device state enumeration and operator-facing status messages."
//! smartbin_version: "v0.1.0"
//! smartbin_owner: "tbd"
//! ---
use std::fmt;

use serde::{Deserialize, Serialize};

/// Operating mode of a bin's compression mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceState {
    Idle,
    Extending,
    Retracting,
    Jammed,
    #[default]
    Unknown,
    /// Sentinel for demonstration bins that have no mechanism.
    Simulated,
}

impl DeviceState {
    /// Parse the label reported by the device. Matching is exact; anything
    /// else, padded or lower-case labels included, maps to `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "IDLE" => DeviceState::Idle,
            "EXTENDING" => DeviceState::Extending,
            "RETRACTING" => DeviceState::Retracting,
            "JAMMED" => DeviceState::Jammed,
            "SIMULATED" => DeviceState::Simulated,
            _ => DeviceState::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceState::Idle => "IDLE",
            DeviceState::Extending => "EXTENDING",
            DeviceState::Retracting => "RETRACTING",
            DeviceState::Jammed => "JAMMED",
            DeviceState::Unknown => "UNKNOWN",
            DeviceState::Simulated => "SIMULATED",
        }
    }

    /// Message shown for a live bin reporting this state.
    pub fn message(self) -> StatusMessage {
        match self {
            DeviceState::Idle => StatusMessage::OPERATING_NORMALLY,
            DeviceState::Extending | DeviceState::Retracting => {
                StatusMessage::COMPRESSION_IN_PROGRESS
            }
            DeviceState::Jammed => StatusMessage::BIN_FULL,
            DeviceState::Unknown | DeviceState::Simulated => StatusMessage::STATUS_UNKNOWN,
        }
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plain-language status line with an urgency flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub text: &'static str,
    pub urgent: bool,
}

impl StatusMessage {
    pub const OPERATING_NORMALLY: Self = Self::calm("Operating normally");
    pub const COMPRESSION_IN_PROGRESS: Self = Self::calm("Compression in progress");
    pub const BIN_FULL: Self = Self::urgent("Bin full — please pick up trash");
    pub const STATUS_UNKNOWN: Self = Self::calm("Status unknown");
    pub const PICKUP_REQUIRED: Self = Self::urgent("Pickup required");

    const fn calm(text: &'static str) -> Self {
        Self {
            text,
            urgent: false,
        }
    }

    const fn urgent(text: &'static str) -> Self {
        Self { text, urgent: true }
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.urgent {
            write!(f, "🚨 {}", self.text)
        } else {
            f.write_str(self.text)
        }
    }
}

/// Map a raw device state label to its status message. Total over all inputs.
pub fn status_message(state: &str) -> StatusMessage {
    DeviceState::from_label(state).message()
}
