//! ---
//! smartbin_section: "05-networking-external-interfaces"
//! smartbin_subsection: "module"
//! smartbin_type: "source"
//! smartbin_scope: "code"
//! smartbin_description: "Nominatim reverse-geocoding client."
//! smartbin_version: "v0.1.0"
//! smartbin_owner: "tbd"
//! ---
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use smartbin_common::GeocoderConfig;
use smartbin_core::{Geocoder, SourceError};
use tracing::debug;
use url::Url;

use crate::errors::{request_error, NetError};

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Reverse geocoder backed by a Nominatim `/reverse` endpoint.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: Client,
    reverse_url: Url,
    timeout: Duration,
}

impl NominatimGeocoder {
    /// Build a client for `endpoint`. Nominatim's usage policy requires an
    /// identifying user agent.
    pub fn new(endpoint: &str, user_agent: &str, timeout: Duration) -> Result<Self, NetError> {
        let raw = format!("{}/reverse", endpoint.trim_end_matches('/'));
        let reverse_url = Url::parse(&raw).map_err(|source| NetError::InvalidUrl {
            endpoint: endpoint.to_owned(),
            source,
        })?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            reverse_url,
            timeout,
        })
    }

    /// Build a client from the `[geocoder]` configuration section.
    pub fn from_config(config: &GeocoderConfig) -> Result<Self, NetError> {
        Self::new(&config.endpoint, &config.user_agent, config.timeout)
    }

    fn request_url(&self, lat: f64, lon: f64) -> Url {
        let mut url = self.reverse_url.clone();
        url.query_pairs_mut()
            .append_pair("format", "jsonv2")
            .append_pair("lat", &lat.to_string())
            .append_pair("lon", &lon.to_string());
        url
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn reverse(&self, lat: f64, lon: f64) -> Result<Option<String>, SourceError> {
        let url = self.request_url(lat, lon);
        debug!(lat, lon, "reverse geocoding live bin position");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| request_error(err, self.timeout))?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                endpoint: self.reverse_url.to_string(),
            });
        }
        let body: ReverseResponse = response
            .json()
            .await
            .map_err(|err| request_error(err, self.timeout))?;
        if let Some(reason) = &body.error {
            debug!(lat, lon, %reason, "geocoder returned no result");
        }
        Ok(body.display_name.filter(|name| !name.trim().is_empty()))
    }
}
