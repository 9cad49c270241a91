//! HTTP client shared foundation
//!
//! This module provides a shared HTTP client with:
//! - Configurable timeout and User-Agent
//! - JSON POST requests with extra headers
//! - Status classification (any status >= 400 is a failure)
//!
//! Failed deliveries are never retried.

use crate::error::TransportError;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Default timeout for HTTP requests (30 seconds)
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default User-Agent header
const DEFAULT_USER_AGENT: &str = concat!("update-reporter/", env!("CARGO_PKG_VERSION"));

/// HTTP client wrapper
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, TransportError> {
        Self::with_config(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT)
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(timeout: Duration, user_agent: &str) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| TransportError::ClientBuild {
                message: e.to_string(),
            })?;

        Ok(Self { client })
    }

    /// Get the underlying reqwest client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// POST a JSON payload and classify the response status
    ///
    /// `service` is only used for error context.
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        service: &str,
        url: &Url,
        payload: &T,
        headers: &[(&str, String)],
    ) -> Result<StatusCode, TransportError> {
        let mut request = self
            .client
            .post(url.clone())
            .header(ACCEPT, "application/json")
            .json(payload);

        for (name, value) in headers {
            request = request.header(*name, value);
        }

        let response = request.send().await.map_err(|e| {
            warn!(service, error = %e, "HTTP request failed");
            TransportError::request(service, e.to_string())
        })?;

        let status = response.status();
        debug!(service, status = status.as_u16(), "HTTP response received");

        if status.is_client_error() || status.is_server_error() {
            return Err(TransportError::unexpected_status(service, status.as_u16()));
        }

        Ok(status)
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self {
            client: Client::new(),
        })
    }
}
