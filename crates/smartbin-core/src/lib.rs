//! ---
//! smartbin_section: "02-core-pipeline"
//! smartbin_subsection: "module"
//! smartbin_type: "source"
//! smartbin_scope: "code"
//! smartbin_description: "Core pipeline module exports."
//! smartbin_version: "v0.1.0"
//! smartbin_owner: "tbd"
//! ---
//! Pure transformation rules that turn raw bin telemetry into the fleet table
//! consumed by the dashboard, plus the per-session state and refresh pipeline
//! that drive them.

pub mod assembler;
pub mod cache;
pub mod errors;
pub mod fleet;
pub mod model;
pub mod pipeline;
pub mod session;
pub mod sources;
pub mod status;
pub mod telemetry;

pub use assembler::{assemble, FleetTable, FLEET_SIZE};
pub use cache::TelemetryCache;
pub use errors::{PipelineError, Result, SourceError};
pub use fleet::{generate_synthetic_fleet, FleetOffsets, SYNTHETIC_BIN_COUNT};
pub use model::{BinViewModel, MarkerColor};
pub use pipeline::{PipelineSettings, RefreshPipeline};
pub use session::{AddressSlot, SessionContext};
pub use sources::{DisabledGeocoder, Geocoder, TelemetrySource};
pub use status::{status_message, DeviceState, StatusMessage};
pub use telemetry::{
    extract_value, normalize, resolve_coordinate, Coordinates, FieldValue, NormalizedTelemetry,
    TelemetryRecord,
};
