//! ---
//! smartbin_section: "02-core-pipeline"
//! smartbin_subsection: "module"
//! smartbin_type: "source"
//! smartbin_scope: "code"
//! smartbin_description: "Seams to the telemetry store and the reverse geocoder."
//! smartbin_version: "v0.1.0"
//! smartbin_owner: "tbd"
//! ---
use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SourceError;

/// Path-addressed read access to the remote telemetry store.
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Store path of the bin node, used in diagnostics and error messages.
    fn path(&self) -> &str;

    /// Read the node at [`TelemetrySource::path`]. A missing node is `Value::Null`.
    async fn fetch(&self) -> Result<Value, SourceError>;
}

/// Coordinate to address lookup.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Best-match address for the coordinate, `Ok(None)` when the service has no result.
    async fn reverse(&self, lat: f64, lon: f64) -> Result<Option<String>, SourceError>;

    /// `false` when lookups are switched off; callers then skip [`Geocoder::reverse`].
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Geocoder used when lookups are switched off in configuration.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledGeocoder;

#[async_trait]
impl Geocoder for DisabledGeocoder {
    async fn reverse(&self, _lat: f64, _lon: f64) -> Result<Option<String>, SourceError> {
        Err(SourceError::Unavailable("reverse geocoding disabled".to_owned()))
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

#[async_trait]
impl<T> Geocoder for Box<T>
where
    T: Geocoder + ?Sized,
{
    async fn reverse(&self, lat: f64, lon: f64) -> Result<Option<String>, SourceError> {
        (**self).reverse(lat, lon).await
    }

    fn is_enabled(&self) -> bool {
        (**self).is_enabled()
    }
}
