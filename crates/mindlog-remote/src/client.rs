//! PostgREST client
//!
//! Typed HTTP access to the backend's `/rest/v1/<relation>` endpoints.
//! Every request carries the project key twice, as the `apikey` header and
//! as a bearer token; the backend's row-level policies do the rest.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mindlog_remote::client::RestClient;
//!
//! # async fn example() -> Result<(), mindlog_remote::RestError> {
//! let client = RestClient::new("https://xyz.supabase.co", "anon-key")?;
//! let rows: Vec<serde_json::Value> = client
//!     .select("counselors", &[("is_active", "eq.true".to_string())])
//!     .await?;
//! println!("{} counselors", rows.len());
//! # Ok(())
//! # }
//! ```

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::RestError;

/// Path prefix of the REST interface below the project URL
const REST_PREFIX: &str = "/rest/v1";

/// How an upsert treats rows whose conflict key already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Overwrite the existing row's columns with the sent values
    MergeDuplicates,
    /// Keep the existing row untouched
    IgnoreDuplicates,
}

impl Resolution {
    fn prefer(self) -> &'static str {
        match self {
            Resolution::MergeDuplicates => "resolution=merge-duplicates,return=minimal",
            Resolution::IgnoreDuplicates => "resolution=ignore-duplicates,return=minimal",
        }
    }
}

/// HTTP client for PostgREST calls
pub struct RestClient {
    client: Client,
    /// `<project url>/rest/v1`, without a trailing slash
    base_url: String,
    anon_key: String,
}

impl RestClient {
    /// Creates a client for the project at `project_url`
    ///
    /// # Errors
    /// Returns [`RestError::InvalidConfig`] if the URL is not an absolute
    /// http(s) URL or the key is blank
    pub fn new(project_url: &str, anon_key: &str) -> Result<Self, RestError> {
        let parsed = url::Url::parse(project_url.trim())
            .map_err(|e| RestError::InvalidConfig(format!("remote url: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(RestError::InvalidConfig(format!(
                "remote url: unsupported scheme '{}'",
                parsed.scheme()
            )));
        }
        if anon_key.trim().is_empty() {
            return Err(RestError::InvalidConfig("remote key is empty".to_string()));
        }

        let base_url = format!("{}{}", parsed.as_str().trim_end_matches('/'), REST_PREFIX);
        Ok(Self {
            client: Client::new(),
            base_url,
            anon_key: anon_key.trim().to_string(),
        })
    }

    /// Base URL of the REST interface
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Creates an authenticated request builder for a relation
    pub fn request(&self, method: Method, relation: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, relation);
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    /// `GET /<relation>?<filters>`
    pub async fn select<T: DeserializeOwned>(
        &self,
        relation: &str,
        filters: &[(&str, String)],
    ) -> Result<Vec<T>, RestError> {
        debug!(relation, filters = filters.len(), "select");
        let response = self
            .request(Method::GET, relation)
            .query(&[("select", "*")])
            .query(filters)
            .send()
            .await?;
        decode(check_status(response).await?).await
    }

    /// `POST /<relation>` returning the inserted rows
    pub async fn insert<B, T>(&self, relation: &str, body: &B) -> Result<Vec<T>, RestError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(relation, "insert");
        let response = self
            .request(Method::POST, relation)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        decode(check_status(response).await?).await
    }

    /// `POST /<relation>?on_conflict=<columns>` as an upsert
    pub async fn upsert<B>(
        &self,
        relation: &str,
        body: &B,
        on_conflict: &str,
        resolution: Resolution,
    ) -> Result<(), RestError>
    where
        B: Serialize + ?Sized,
    {
        debug!(relation, on_conflict, ?resolution, "upsert");
        let response = self
            .request(Method::POST, relation)
            .query(&[("on_conflict", on_conflict)])
            .header("Prefer", resolution.prefer())
            .json(body)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// `DELETE /<relation>?<filters>`
    pub async fn delete(&self, relation: &str, filters: &[(&str, String)]) -> Result<(), RestError> {
        debug!(relation, "delete");
        let response = self
            .request(Method::DELETE, relation)
            .query(filters)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

/// Maps an error status to [`RestError`], passing successes through
async fn check_status(response: Response) -> Result<Response, RestError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, body))
}

fn status_error(status: StatusCode, body: String) -> RestError {
    let message = error_message(&body).unwrap_or(body);
    match status {
        StatusCode::UNAUTHORIZED => RestError::Unauthorized(message),
        StatusCode::FORBIDDEN => RestError::Forbidden(message),
        StatusCode::NOT_FOUND => RestError::NotFound(message),
        StatusCode::CONFLICT => RestError::Conflict(message),
        s if s.is_server_error() => RestError::ServerError(format!("{}: {}", s.as_u16(), message)),
        s => RestError::Rejected {
            status: s.as_u16(),
            message,
        },
    }
}

/// Pulls `message` out of a PostgREST error body
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<Vec<T>, RestError> {
    let text = response.text().await?;
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&text).map_err(|e| RestError::InvalidResponse(e.to_string()))
}
