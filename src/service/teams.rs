//! Microsoft Teams incoming webhook integration

use super::{
    plural_suffix, title, validate_url, with_project, NotificationService, ServiceDefinition,
};
use crate::config::{resolve_string, Configuration, Environment};
use crate::domain::UpdateCheckResult;
use crate::error::{ServiceError, TransportError};
use crate::options::Options;
use crate::output::emoji;
use crate::transport::HttpClient;
use async_trait::async_trait;
use reqwest::Url;
use serde_json::{json, Value};
use tracing::instrument;

/// Posts reports as message cards to an MS Teams webhook
#[derive(Debug, Clone)]
pub struct Teams {
    url: Url,
    client: HttpClient,
}

impl Teams {
    /// Creates a validated MS Teams service
    pub fn new(url: &str) -> Result<Self, ServiceError> {
        Ok(Self {
            url: validate_url(Self::NAME, url)?,
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

    /// Renders the message card: title, summary and one section per package
    pub fn payload(&self, result: &UpdateCheckResult, options: &Options) -> Value {
        let count = result.len();
        let verb = if count == 1 { "is" } else { "are" };

        let sections: Vec<Value> = result
            .outdated_packages()
            .iter()
            .map(|package| {
                let insecure = if package.insecure {
                    format!(" ({} insecure)", emoji::WARNING)
                } else {
                    String::new()
                };
                let text = [
                    format!("# [{}]({})", package.name, package.provider_link()),
                    format!(
                        "Current version: **{}**{}",
                        package.outdated_version, insecure
                    ),
                    format!("New version: **{}**", package.new_version),
                ]
                .join("\n\n");

                json!({ "text": text })
            })
            .collect();

        json!({
            "title": with_project(format!("{} {}", emoji::POLICE_CAR_LIGHT, title(count)), options),
            "summary": format!("{} package{} {} outdated", count, plural_suffix(count), verb),
            "sections": sections,
        })
    }
}

#[async_trait]
impl NotificationService for Teams {
    fn identifier(&self) -> &str {
        Self::IDENTIFIER
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    #[instrument(skip_all, fields(service = "MS Teams"))]
    async fn send_report(
        &self,
        result: &UpdateCheckResult,
        options: &Options,
    ) -> Result<(), TransportError> {
        let payload = self.payload(result, options);
        self.client
            .post_json(Self::NAME, &self.url, &payload, &[])
            .await?;
        Ok(())
    }
}

impl ServiceDefinition for Teams {
    const IDENTIFIER: &'static str = "teams";
    const NAME: &'static str = "MS Teams";

    fn from_configuration(
        configuration: &Configuration,
        env: &dyn Environment,
    ) -> Result<Self, ServiceError> {
        let url = resolve_string(configuration, env, Self::IDENTIFIER, "url")?;
        Self::new(&url)
    }
}
