//! ---
//! smartbin_section: "02-core-pipeline"
//! smartbin_subsection: "module"
//! smartbin_type: "source"
//! smartbin_scope: "code"
//! smartbin_description: "Error taxonomy for the refresh pipeline."
//! smartbin_version: "v0.1.0"
//! smartbin_owner: "tbd"
//! ---
use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Failures reported by external collaborators (telemetry store, geocoder).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected status {status} from {endpoint}")]
    Status { status: u16, endpoint: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
}

/// Terminal failure of a single refresh cycle.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no data found at {path}")]
    EmptyTelemetry { path: String },
    #[error("telemetry at {path} is malformed: {reason}")]
    MalformedTelemetry { path: String, reason: String },
    #[error("telemetry fetch failed: {0}")]
    Source(#[from] SourceError),
}
