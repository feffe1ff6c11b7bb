//! ---
//! smartbin_section: "05-networking-external-interfaces"
//! smartbin_subsection: "module"
//! smartbin_type: "source"
//! smartbin_scope: "code"
//! smartbin_description: "Network collaborators and the fleet REST API."
//! smartbin_version: "v0.1.0"
//! smartbin_owner: "tbd"
//! ---
#![warn(missing_docs)]
//! Concrete implementations of the telemetry store and geocoder seams, plus a
//! read-only REST surface publishing the latest fleet table.

pub mod bootstrap;
pub mod errors;
pub mod firebase;
pub mod geocode;
pub mod rest;

pub use bootstrap::{pipeline_from_config, pipeline_settings, DashboardPipeline};
pub use errors::NetError;
pub use firebase::FirebaseSource;
pub use geocode::NominatimGeocoder;
pub use rest::{FleetApiBuilder, FleetApiHandle, FleetProvider, FleetStatus, LatestFleet};
