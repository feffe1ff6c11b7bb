//! ---
//! smartbin_section: "02-core-pipeline"
//! smartbin_subsection: "module"
//! smartbin_type: "source"
//! smartbin_scope: "code"
//! smartbin_description: "Presentation-ready bin model."
//! smartbin_version: "v0.1.0"
//! smartbin_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};

use crate::status::{DeviceState, StatusMessage};
use crate::telemetry::NormalizedTelemetry;

pub const LIVE_BIN_NAME: &str = "Bin A (LIVE)";

/// RGBA map marker colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkerColor(pub [u8; 4]);

impl MarkerColor {
    pub const LIVE: Self = Self([0, 0, 255, 200]);
    pub const SIMULATED: Self = Self([255, 0, 0, 200]);

    pub fn rgba(self) -> [u8; 4] {
        self.0
    }
}

/// One row of the fleet table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinViewModel {
    pub name: String,
    /// Occupancy in percent, 0 to 100.
    pub fill: f64,
    pub state: DeviceState,
    pub message: String,
    pub urgent: bool,
    pub lat: f64,
    pub lon: f64,
    pub live: bool,
    pub address: String,
    pub color: MarkerColor,
}

impl BinViewModel {
    /// View of the physical bin built from the latest normalised telemetry.
    pub fn live(telemetry: &NormalizedTelemetry, address: impl Into<String>) -> Self {
        let status = telemetry.state.message();
        Self {
            name: LIVE_BIN_NAME.to_owned(),
            fill: telemetry.fill,
            state: telemetry.state,
            message: status.to_string(),
            urgent: status.urgent,
            lat: telemetry.position.lat,
            lon: telemetry.position.lon,
            live: true,
            address: address.into(),
            color: MarkerColor::LIVE,
        }
    }

    pub(crate) fn simulated(
        name: String,
        fill: u8,
        status: StatusMessage,
        lat: f64,
        lon: f64,
        address: &str,
    ) -> Self {
        Self {
            name,
            fill: f64::from(fill),
            state: DeviceState::Simulated,
            message: status.to_string(),
            urgent: status.urgent,
            lat,
            lon,
            live: false,
            address: address.to_owned(),
            color: MarkerColor::SIMULATED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::Coordinates;

    #[test]
    fn live_bin_is_blue_and_carries_status() {
        let telemetry = NormalizedTelemetry {
            position: Coordinates::new(5.404, 100.302),
            state: DeviceState::Jammed,
            fill: 97.5,
        };
        let bin = BinViewModel::live(&telemetry, "Jalan Sultan Ahmad Shah");
        assert_eq!(bin.name, "Bin A (LIVE)");
        assert_eq!(bin.color, MarkerColor::LIVE);
        assert_eq!(bin.color.rgba(), [0, 0, 255, 200]);
        assert!(bin.live);
        assert!(bin.urgent);
        assert!(bin.message.contains("pick up trash"));
        assert_eq!(bin.address, "Jalan Sultan Ahmad Shah");
    }

    #[test]
    fn marker_color_serializes_as_array() {
        let json = serde_json::to_string(&MarkerColor::SIMULATED).unwrap();
        assert_eq!(json, "[255,0,0,200]");
    }
}
