//! Slack incoming webhook integration
//!
//! Reports are rendered as Block Kit messages. Slack accepts at most
//! [`MAX_BLOCKS`] blocks per message, so long package lists are cut off
//! with a "... and N more" section.

use super::{title, validate_url, NotificationService, ServiceDefinition};
use crate::config::{resolve_string, Configuration, Environment};
use crate::domain::{OutdatedPackage, UpdateCheckResult};
use crate::error::{ServiceError, TransportError};
use crate::options::Options;
use crate::transport::HttpClient;
use async_trait::async_trait;
use reqwest::Url;
use serde_json::{json, Value};
use tracing::{debug, instrument};

/// Maximum number of blocks in a single Slack message
pub const MAX_BLOCKS: usize = 50;

/// Posts reports to a Slack incoming webhook
#[derive(Debug, Clone)]
pub struct Slack {
    url: Url,
    client: HttpClient,
}

impl Slack {
    /// Creates a validated Slack service
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

    /// Renders the webhook payload
    pub fn payload(&self, result: &UpdateCheckResult, options: &Options) -> Value {
        json!({ "blocks": render_blocks(result.outdated_packages(), options) })
    }
}

fn render_blocks(packages: &[OutdatedPackage], options: &Options) -> Vec<Value> {
    let count = packages.len();
    let outdated_width = packages
        .iter()
        .map(|p| p.outdated_version.chars().count())
        .max()
        .unwrap_or(0);
    let new_width = packages
        .iter()
        .map(|p| p.new_version.chars().count())
        .max()
        .unwrap_or(0);

    let mut blocks = vec![json!({
        "type": "header",
        "text": {"type": "plain_text", "text": title(count)},
    })];

    if let Some(project) = options.project_name() {
        blocks.push(json!({
            "type": "section",
            "text": {"type": "mrkdwn", "text": format!("Project: *{}*", project)},
        }));
    }

    let mut has_insecure = false;
    let mut remaining = count;

    for package in packages {
        has_insecure |= package.insecure;
        blocks.push(render_row(package, outdated_width, new_width));
        remaining -= 1;

        // Keep room for the truncation notice and the insecure legend
        if blocks.len() >= MAX_BLOCKS - 2 && remaining > 0 {
            debug!(omitted = remaining, "truncating Slack package list");
            blocks.push(json!({
                "type": "section",
                "text": {"type": "plain_text", "text": format!("... and {} more", remaining)},
            }));
            break;
        }
    }

    if has_insecure {
        blocks.push(json!({
            "type": "context",
            "elements": [{
                "type": "mrkdwn",
                "text": "Package versions with :rotating_light: are marked as insecure",
            }],
        }));
    }

    blocks
}

fn render_row(package: &OutdatedPackage, outdated_width: usize, new_width: usize) -> Value {
    let insecure = if package.insecure {
        " :rotating_light:"
    } else {
        ""
    };

    json!({
        "type": "section",
        "fields": [
            {
                "type": "mrkdwn",
                "text": format!("<{}|{}>", package.provider_link(), package.name),
            },
            {
                "type": "mrkdwn",
                "text": format!(
                    "`{:<ow$}` → *`{:<nw$}`*{}",
                    package.outdated_version,
                    package.new_version,
                    insecure,
                    ow = outdated_width,
                    nw = new_width
                ),
            },
        ],
    })
}

#[async_trait]
impl NotificationService for Slack {
    fn identifier(&self) -> &str {
        Self::IDENTIFIER
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    #[instrument(skip_all, fields(service = "Slack"))]
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

impl ServiceDefinition for Slack {
    const IDENTIFIER: &'static str = "slack";
    const NAME: &'static str = "Slack";

    fn from_configuration(
        configuration: &Configuration,
        env: &dyn Environment,
    ) -> Result<Self, ServiceError> {
        let url = resolve_string(configuration, env, Self::IDENTIFIER, "url")?;
        Self::new(&url)
    }
}
