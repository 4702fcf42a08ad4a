//! Remote resource fetching.
//!
//! `resources/read` delegates to a [`ResourceFetcher`] for catalog entries
//! with an `http://` or `https://` URI. The fetched body and content type
//! replace the catalog defaults in the response.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use crate::error::FetchError;

/// MIME type assumed when the server sends no usable `Content-Type`.
pub const DEFAULT_MIME_TYPE: &str = "text/plain";

/// Body and content type of a fetched resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedResource {
    /// Response body as text.
    pub content: String,
    /// MIME type essence, without parameters.
    pub mime_type: String,
}

/// Fetches remote resource content.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Retrieves the content at `uri`.
    async fn fetch(&self, uri: &str) -> Result<FetchedResource, FetchError>;
}

/// [`ResourceFetcher`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a per-request timeout and optional user agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(timeout: Duration, user_agent: Option<&str>) -> Result<Self, FetchError> {
        let user_agent = user_agent.map_or_else(
            || format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            str::to_string,
        );

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    async fn fetch(&self, uri: &str) -> Result<FetchedResource, FetchError> {
        tracing::debug!(uri, "Fetching remote resource");

        let response = self.client.get(uri).send().await?.error_for_status()?;

        let mime_type = mime_essence(
            response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
        );
        let content = response.text().await?;

        tracing::debug!(uri, mime_type = %mime_type, bytes = content.len(), "Fetched remote resource");

        Ok(FetchedResource { content, mime_type })
    }
}

/// Strips parameters from a `Content-Type` value.
///
/// `text/html; charset=utf-8` becomes `text/html`; a missing or blank value
/// becomes [`DEFAULT_MIME_TYPE`].
#[must_use]
pub fn mime_essence(content_type: Option<&str>) -> String {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(str::trim)
        .filter(|essence| !essence.is_empty())
        .unwrap_or(DEFAULT_MIME_TYPE)
        .to_string()
}
