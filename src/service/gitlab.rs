//! GitLab alert integration

use super::{
    title, validate_not_blank, validate_url, with_project, NotificationService, ServiceDefinition,
};
use crate::config::{resolve_string, Configuration, Environment};
use crate::domain::UpdateCheckResult;
use crate::error::{ServiceError, TransportError};
use crate::options::Options;
use crate::transport::HttpClient;
use async_trait::async_trait;
use reqwest::Url;
use serde_json::{Map, Value};
use tracing::instrument;

/// Posts reports to a GitLab alert endpoint
#[derive(Debug, Clone)]
pub struct GitLab {
    url: Url,
    auth_key: String,
    client: HttpClient,
}

impl GitLab {
    /// Creates a validated GitLab service
    pub fn new(url: &str, auth_key: impl Into<String>) -> Result<Self, ServiceError> {
        let url = validate_url(Self::NAME, url)?;
        let auth_key = auth_key.into();
        validate_not_blank(Self::NAME, "authorization key", &auth_key)?;

        Ok(Self {
            url,
            auth_key,
            client: HttpClient::default(),
        })
    }

    /// Replaces the HTTP client (builder pattern)
    pub fn with_client(mut self, client: HttpClient) -> Self {
        self.client = client;
        self
    }

    /// Alert endpoint
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Authorization key sent as bearer token
    pub fn auth_key(&self) -> &str {
        &self.auth_key
    }

    /// Renders the alert payload: a title followed by one entry per package
    pub fn payload(&self, result: &UpdateCheckResult, options: &Options) -> Value {
        let mut payload = Map::new();
        payload.insert(
            "title".to_string(),
            Value::String(with_project(title(result.len()), options)),
        );

        for package in result.outdated_packages() {
            let insecure = if package.insecure { " (insecure)" } else { "" };
            payload.insert(
                package.name.clone(),
                Value::String(format!(
                    "Outdated version: {}{}, new version: {}",
                    package.outdated_version, insecure, package.new_version
                )),
            );
        }

        Value::Object(payload)
    }
}

#[async_trait]
impl NotificationService for GitLab {
    fn identifier(&self) -> &str {
        Self::IDENTIFIER
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    #[instrument(skip_all, fields(service = "GitLab"))]
    async fn send_report(
        &self,
        result: &UpdateCheckResult,
        options: &Options,
    ) -> Result<(), TransportError> {
        let payload = self.payload(result, options);
        let headers = [("Authorization", format!("Bearer {}", self.auth_key))];

        self.client
            .post_json(Self::NAME, &self.url, &payload, &headers)
            .await?;
        Ok(())
    }
}

impl ServiceDefinition for GitLab {
    const IDENTIFIER: &'static str = "gitlab";
    const NAME: &'static str = "GitLab";

    fn from_configuration(
        configuration: &Configuration,
        env: &dyn Environment,
    ) -> Result<Self, ServiceError> {
        let url = resolve_string(configuration, env, Self::IDENTIFIER, "url")?;
        let auth_key = resolve_string(configuration, env, Self::IDENTIFIER, "authKey")?;

        Self::new(&url, auth_key)
    }
}
