//! ---
//! smartbin_section: "05-networking-external-interfaces"
//! smartbin_subsection: "module"
//! smartbin_type: "source"
//! smartbin_scope: "code"
//! smartbin_description: "Firebase Realtime Database REST reader."
//! smartbin_version: "v0.1.0"
//! smartbin_owner: "tbd"
//! ---
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use smartbin_common::StoreConfig;
use smartbin_core::{SourceError, TelemetrySource};
use tracing::debug;
use url::Url;

use crate::errors::{request_error, NetError};

/// Reads one node of a Firebase Realtime Database over its REST interface
/// (`GET <database>/<path>.json`).
#[derive(Debug, Clone)]
pub struct FirebaseSource {
    client: Client,
    url: Url,
    endpoint: String,
    path: String,
    timeout: Duration,
}

impl FirebaseSource {
    /// Build a reader for `path` below `database_url`. The optional token is
    /// sent as the `auth` query parameter.
    pub fn new(
        database_url: &str,
        path: &str,
        auth_token: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, NetError> {
        let mut url = Url::parse(database_url).map_err(|source| NetError::InvalidUrl {
            endpoint: database_url.to_owned(),
            source,
        })?;
        let node = path.trim_matches('/');
        url.set_path(&format!("/{node}.json"));
        let endpoint = url.to_string();
        if let Some(token) = auth_token {
            url.query_pairs_mut().append_pair("auth", token);
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url,
            endpoint,
            path: format!("/{node}"),
            timeout,
        })
    }

    /// Build a reader from the `[store]` configuration section.
    pub fn from_config(config: &StoreConfig) -> Result<Self, NetError> {
        Self::new(
            &config.database_url,
            &config.path,
            config.auth_token.as_deref(),
            config.timeout,
        )
    }

    /// Request URL without credentials.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TelemetrySource for FirebaseSource {
    fn path(&self) -> &str {
        &self.path
    }

    async fn fetch(&self) -> Result<Value, SourceError> {
        debug!(endpoint = %self.endpoint, "reading telemetry node");
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|err| request_error(err, self.timeout))?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                endpoint: self.endpoint.clone(),
            });
        }
        response
            .json::<Value>()
            .await
            .map_err(|err| request_error(err, self.timeout))
    }
}
