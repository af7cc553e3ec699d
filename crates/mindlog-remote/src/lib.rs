//! MindLog Remote - Gateway to the hosted backend
//!
//! Provides:
//! - A PostgREST client with the backend's key headers
//! - [`RestGateway`], the `IRemoteGateway` adapter used when a backend is configured
//! - [`OfflineGateway`], the adapter used in local-only mode
//! - [`connect`], which picks between them from the configuration
//!
//! ## Modules
//!
//! - [`client`] - HTTP client for `/rest/v1/<relation>` endpoints
//! - [`gateway`] - `IRemoteGateway` over the REST client
//! - [`offline`] - `IRemoteGateway` that never touches the network

pub mod client;
pub mod gateway;
pub mod offline;

use std::sync::Arc;

use mindlog_core::config::Config;
use mindlog_core::ports::{IRemoteGateway, RemoteError, RemoteErrorKind};
use thiserror::Error;

pub use client::RestClient;
pub use gateway::RestGateway;
pub use offline::OfflineGateway;

/// Errors that can occur when talking to the PostgREST endpoint
#[derive(Debug, Error)]
pub enum RestError {
    /// Endpoint URL or key is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The API key was refused
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A row-level policy denied the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The relation or route does not exist (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// A uniqueness or foreign-key constraint was violated
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Any other 4xx response
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// A server-side error occurred (5xx)
    #[error("Server error: {0}")]
    ServerError(String),

    /// A network-level error occurred
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The response body could not be parsed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<RestError> for RemoteError {
    fn from(e: RestError) -> Self {
        let kind = match &e {
            RestError::InvalidConfig(_) => RemoteErrorKind::NotConfigured,
            RestError::NetworkError(inner) if inner.is_decode() => RemoteErrorKind::InvalidResponse,
            RestError::NetworkError(_) => RemoteErrorKind::Network,
            RestError::InvalidResponse(_) => RemoteErrorKind::InvalidResponse,
            // A 404 names a missing relation, never a missing row
            RestError::NotFound(_)
            | RestError::Unauthorized(_)
            | RestError::Forbidden(_)
            | RestError::Conflict(_)
            | RestError::Rejected { .. }
            | RestError::ServerError(_) => RemoteErrorKind::Rejected,
        };
        RemoteError::new(kind, e.to_string())
    }
}

/// Builds the gateway the configuration calls for
///
/// Local-only mode, a missing endpoint or key, or an unparsable URL all
/// yield an [`OfflineGateway`].
pub fn connect(config: &Config) -> Arc<dyn IRemoteGateway + Send + Sync> {
    if !config.remote_enabled() {
        tracing::info!(offline = config.offline_mode, "Running in local-only mode");
        return Arc::new(OfflineGateway);
    }

    let url = config.remote.url.as_deref().unwrap_or_default();
    let key = config.remote.anon_key.as_deref().unwrap_or_default();
    match RestClient::new(url, key) {
        Ok(client) => {
            tracing::info!(url, "Remote backend configured");
            Arc::new(RestGateway::new(client))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Remote backend unusable, running in local-only mode");
            Arc::new(OfflineGateway)
        }
    }
}
