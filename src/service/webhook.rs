//! Generic JSON webhook
//!
//! Posts a structured document to any endpoint:
//!
//! ```json
//! {
//!   "title": "2 outdated packages",
//!   "project": "foo/baz",
//!   "packages": [
//!     {"name": "foo/foo", "outdated_version": "1.0.0", "new_version": "1.0.5",
//!      "insecure": false, "provider_link": "https://packagist.org/packages/foo/foo#1.0.5"}
//!   ]
//! }
//! ```

use super::{title, validate_url, with_project, NotificationService, ServiceDefinition};
use crate::config::{resolve_string, resolve_string_optional, Configuration, Environment};
use crate::domain::{OutdatedPackage, UpdateCheckResult};
use crate::error::{ServiceError, TransportError};
use crate::options::Options;
use crate::transport::HttpClient;
use async_trait::async_trait;
use reqwest::Url;
use serde::Serialize;
use tracing::instrument;

/// Webhook document
#[derive(Debug, Serialize)]
pub struct WebhookPayload<'a> {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<&'a str>,
    pub packages: Vec<WebhookPackage<'a>>,
}

/// One package entry of a [`WebhookPayload`]
#[derive(Debug, Serialize)]
pub struct WebhookPackage<'a> {
    pub name: &'a str,
    pub outdated_version: &'a str,
    pub new_version: &'a str,
    pub insecure: bool,
    pub provider_link: String,
}

impl<'a> From<&'a OutdatedPackage> for WebhookPackage<'a> {
    fn from(package: &'a OutdatedPackage) -> Self {
        Self {
            name: &package.name,
            outdated_version: &package.outdated_version,
            new_version: &package.new_version,
            insecure: package.insecure,
            provider_link: package.provider_link(),
        }
    }
}

/// Posts reports to a generic webhook
#[derive(Debug, Clone)]
pub struct Webhook {
    url: Url,
    auth_token: Option<String>,
    client: HttpClient,
}

impl Webhook {
    /// Creates a validated webhook service; a blank token is treated as unset
    pub fn new(url: &str, auth_token: Option<String>) -> Result<Self, ServiceError> {
        Ok(Self {
            url: validate_url(Self::NAME, url)?,
            auth_token: auth_token.filter(|t| !t.trim().is_empty()),
            client: HttpClient::default(),
        })
    }

    /// Replaces the HTTP client (builder pattern)
    pub fn with_client(mut self, client: HttpClient) -> Self {
        self.client = client;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    /// Renders the webhook document
    pub fn payload<'a>(
        &self,
        result: &'a UpdateCheckResult,
        options: &'a Options,
    ) -> WebhookPayload<'a> {
        WebhookPayload {
            title: with_project(title(result.len()), options),
            project: options.project_name(),
            packages: result
                .outdated_packages()
                .iter()
                .map(WebhookPackage::from)
                .collect(),
        }
    }
}

#[async_trait]
impl NotificationService for Webhook {
    fn identifier(&self) -> &str {
        Self::IDENTIFIER
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    #[instrument(skip_all, fields(service = "Webhook"))]
    async fn send_report(
        &self,
        result: &UpdateCheckResult,
        options: &Options,
    ) -> Result<(), TransportError> {
        let payload = self.payload(result, options);
        let headers: Vec<(&str, String)> = self
            .auth_token
            .iter()
            .map(|token| ("Authorization", format!("Bearer {}", token)))
            .collect();

        self.client
            .post_json(Self::NAME, &self.url, &payload, &headers)
            .await?;
        Ok(())
    }
}

impl ServiceDefinition for Webhook {
    const IDENTIFIER: &'static str = "webhook";
    const NAME: &'static str = "Webhook";

    fn from_configuration(
        configuration: &Configuration,
        env: &dyn Environment,
    ) -> Result<Self, ServiceError> {
        let url = resolve_string(configuration, env, Self::IDENTIFIER, "url")?;
        let auth_token = resolve_string_optional(configuration, env, Self::IDENTIFIER, "authToken");

        Self::new(&url, auth_token)
    }
}
