//! HTTP client utilities.

use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::sources::SourceError;
use crate::utils::{with_retry, RetryConfig};

/// Shared HTTP client with sensible defaults
///
/// Built once at startup and passed explicitly to every source, so a single
/// connection pool serves all outbound calls for the process lifetime.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Arc<Client>,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Self {
        Self::with_timeouts(Duration::from_secs(30), Duration::from_secs(10))
    }

    /// Create a new HTTP client with custom request/connect timeouts
    pub fn with_timeouts(timeout: Duration, connect_timeout: Duration) -> Self {
        let client = Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client: Arc::new(client),
        }
    }

    /// Create from an existing reqwest Client
    pub fn from_client(client: Arc<Client>) -> Self {
        Self { client }
    }

    /// Get the underlying client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// GET a URL and return the response body as text, retrying transient
    /// failures.
    ///
    /// `what` names the upstream call for error messages and logs
    /// (e.g. "ESearch").
    pub async fn get_text(
        &self,
        url: &str,
        what: &str,
        retry: RetryConfig,
    ) -> Result<String, SourceError> {
        let client = Arc::clone(&self.client);
        let url = url.to_string();
        let what = what.to_string();

        with_retry(retry, || {
            let client = Arc::clone(&client);
            let url = url.clone();
            let what = what.clone();
            async move {
                let response = client
                    .get(&url)
                    .send()
                    .await
                    .map_err(|e| SourceError::Network(format!("{} request failed: {}", what, e)))?;

                if !response.status().is_success() {
                    return Err(SourceError::Api(format!(
                        "{} returned status: {}",
                        what,
                        response.status()
                    )));
                }

                response
                    .text()
                    .await
                    .map_err(|e| SourceError::Network(format!("{} body read failed: {}", what, e)))
            }
        })
        .await
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}
