//! ---
//! smartbin_section: "05-networking-external-interfaces"
//! smartbin_subsection: "module"
//! smartbin_type: "source"
//! smartbin_scope: "code"
//! smartbin_description: "Client construction errors and request error mapping."
//! smartbin_version: "v0.1.0"
//! smartbin_owner: "tbd"
//! ---
use std::time::Duration;

use smartbin_core::SourceError;
use thiserror::Error;

/// Errors raised while building network clients.
#[derive(Debug, Error)]
pub enum NetError {
    /// The configured endpoint is not a usable URL.
    #[error("invalid endpoint {endpoint}: {source}")]
    InvalidUrl {
        /// Endpoint as configured.
        endpoint: String,
        /// Parser failure.
        source: url::ParseError,
    },
    /// The HTTP client could not be constructed.
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Map a request failure onto the collaborator error taxonomy. The URL is
/// stripped because it may carry credentials.
pub(crate) fn request_error(err: reqwest::Error, timeout: Duration) -> SourceError {
    if err.is_timeout() {
        return SourceError::Timeout(timeout);
    }
    if err.is_decode() {
        return SourceError::Decode(err.without_url().to_string());
    }
    SourceError::Transport(err.without_url().to_string())
}
