//! Mattermost incoming webhook integration

use super::{
    title, validate_not_blank, validate_url, with_project, NotificationService, ServiceDefinition,
};
use crate::config::{resolve_string, resolve_string_optional, Configuration, Environment};
use crate::domain::UpdateCheckResult;
use crate::error::{ServiceError, TransportError};
use crate::options::Options;
use crate::transport::HttpClient;
use async_trait::async_trait;
use reqwest::Url;
use serde_json::{json, Value};
use tracing::instrument;

/// Attachment color of every report
const ATTACHMENT_COLOR: &str = "#EE0000";

/// Posts reports to a Mattermost incoming webhook
#[derive(Debug, Clone)]
pub struct Mattermost {
    url: Url,
    channel: String,
    username: Option<String>,
    client: HttpClient,
}

impl Mattermost {
    /// Creates a validated Mattermost service; a blank username is treated as unset
    pub fn new(
        url: &str,
        channel: impl Into<String>,
        username: Option<String>,
    ) -> Result<Self, ServiceError> {
        let url = validate_url(Self::NAME, url)?;
        let channel = channel.into();
        validate_not_blank(Self::NAME, "channel name", &channel)?;

        Ok(Self {
            url,
            channel,
            username: username.filter(|u| !u.trim().is_empty()),
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

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Renders the webhook payload
    pub fn payload(&self, result: &UpdateCheckResult, options: &Options) -> Value {
        let mut payload = json!({
            "channel": self.channel,
            "attachments": [
                {
                    "color": ATTACHMENT_COLOR,
                    "text": Self::render_text(result, options),
                }
            ],
        });

        if let Some(username) = &self.username {
            payload["username"] = Value::String(username.clone());
        }

        payload
    }

    /// Heading plus a markdown table with one row per package
    fn render_text(result: &UpdateCheckResult, options: &Options) -> String {
        let mut lines = vec![
            format!(
                "#### :rotating_light: {}",
                with_project(title(result.len()), options)
            ),
            "| Package | Current version | New version |".to_string(),
            "|:------- |:--------------- |:----------- |".to_string(),
        ];

        for package in result.outdated_packages() {
            let insecure = if package.insecure {
                " :warning: **`insecure`**"
            } else {
                ""
            };
            lines.push(format!(
                "| [{}]({}) | {}{} | **{}** |",
                package.name,
                package.provider_link(),
                package.outdated_version,
                insecure,
                package.new_version
            ));
        }

        lines.join("\n")
    }
}

#[async_trait]
impl NotificationService for Mattermost {
    fn identifier(&self) -> &str {
        Self::IDENTIFIER
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    #[instrument(skip_all, fields(service = "Mattermost"))]
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

impl ServiceDefinition for Mattermost {
    const IDENTIFIER: &'static str = "mattermost";
    const NAME: &'static str = "Mattermost";

    fn from_configuration(
        configuration: &Configuration,
        env: &dyn Environment,
    ) -> Result<Self, ServiceError> {
        let url = resolve_string(configuration, env, Self::IDENTIFIER, "url")?;
        let channel = resolve_string(configuration, env, Self::IDENTIFIER, "channel")?;
        let username = resolve_string_optional(configuration, env, Self::IDENTIFIER, "username");

        Self::new(&url, channel, username)
    }
}
