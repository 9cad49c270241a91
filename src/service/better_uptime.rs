//! Better Uptime incident integration
//!
//! Every report opens an incident through the Better Uptime API. Extra
//! incident attributes are passed through from the `options` setting, which
//! accepts:
//! - a JSON object (`{"urgency": "high"}`)
//! - a JSON array of `key=value` strings
//! - a comma separated `key=value` string (`"urgency=high, call=true"`)
//!
//! The reserved attributes `requester_email`, `summary` and `description` are
//! always rendered from the report and cannot be overridden.

use super::{
    title, validate_email, validate_not_blank, validate_url, with_project, NotificationService,
    ServiceDefinition,
};
use crate::config::{resolve_optional, resolve_string, resolve_string_optional};
use crate::config::{Configuration, Environment};
use crate::domain::UpdateCheckResult;
use crate::error::{ServiceError, TransportError};
use crate::options::Options;
use crate::transport::HttpClient;
use async_trait::async_trait;
use reqwest::Url;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

/// Incident endpoint used when no URL is configured
pub const DEFAULT_API_URL: &str = "https://betteruptime.com/api/v1/incident";

/// Attributes rendered from the report itself
const RESERVED_OPTIONS: [&str; 3] = ["requester_email", "summary", "description"];

/// Opens Better Uptime incidents
#[derive(Debug, Clone)]
pub struct BetterUptime {
    url: Url,
    auth_token: String,
    requester: String,
    options: Map<String, Value>,
    client: HttpClient,
}

impl BetterUptime {
    /// Creates a validated Better Uptime service
    ///
    /// Reserved keys in `options` are dropped. `url` defaults to [`DEFAULT_API_URL`].
    pub fn new(
        auth_token: impl Into<String>,
        requester: impl Into<String>,
        options: Map<String, Value>,
        url: Option<&str>,
    ) -> Result<Self, ServiceError> {
        let auth_token = auth_token.into();
        let requester = requester.into();

        validate_not_blank(Self::NAME, "auth token", &auth_token)?;
        validate_email(Self::NAME, "requester", &requester)?;
        let url = validate_url(Self::NAME, url.unwrap_or(DEFAULT_API_URL))?;

        let options = options
            .into_iter()
            .filter(|(key, _)| !is_reserved(key))
            .collect();

        Ok(Self {
            url,
            auth_token,
            requester,
            options,
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

    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }

    pub fn requester(&self) -> &str {
        &self.requester
    }

    /// Extra incident attributes
    pub fn options(&self) -> &Map<String, Value> {
        &self.options
    }

    /// Renders the incident payload
    pub fn payload(&self, result: &UpdateCheckResult, options: &Options) -> Value {
        let description = result
            .outdated_packages()
            .iter()
            .map(|package| {
                let insecure = if package.insecure { " [insecure]" } else { "" };
                format!(
                    "{} ({}{} => {})",
                    package.name, package.outdated_version, insecure, package.new_version
                )
            })
            .collect::<Vec<_>>()
            .join(", ");

        let mut payload = Map::new();
        payload.insert(
            "requester_email".to_string(),
            Value::String(self.requester.clone()),
        );
        payload.insert(
            "summary".to_string(),
            Value::String(with_project(title(result.len()), options)),
        );
        payload.insert("description".to_string(), Value::String(description));

        for (key, value) in &self.options {
            payload.insert(key.clone(), value.clone());
        }

        Value::Object(payload)
    }
}

/// Parses the `options` setting into incident attributes
pub fn parse_options(value: &Value) -> Result<Map<String, Value>, ServiceError> {
    let mut parsed = Map::new();

    match value {
        Value::String(raw) => {
            let items = raw
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty());
            for item in items {
                let (key, value) = split_option(item)?;
                insert_option(&mut parsed, key, value)?;
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                let item = item.as_str().ok_or_else(|| {
                    ServiceError::validation(
                        BetterUptime::NAME,
                        format!("invalid value provided for option #{}", index),
                    )
                })?;
                let (key, value) = split_option(item)?;
                insert_option(&mut parsed, key, value)?;
            }
        }
        Value::Object(map) => {
            for (key, value) in map {
                let value = (!value.is_null()).then(|| value.clone());
                insert_option(&mut parsed, key, value)?;
            }
        }
        _ => {
            return Err(ServiceError::validation(
                BetterUptime::NAME,
                "unsupported value for options given",
            ))
        }
    }

    Ok(parsed)
}

fn split_option(item: &str) -> Result<(&str, Option<Value>), ServiceError> {
    match item.split_once('=') {
        Some((key, value)) => Ok((key.trim(), Some(Value::String(value.trim().to_string())))),
        None => Ok((item.trim(), None)),
    }
}

fn insert_option(
    parsed: &mut Map<String, Value>,
    key: &str,
    value: Option<Value>,
) -> Result<(), ServiceError> {
    if key.trim().is_empty() {
        return Err(ServiceError::validation(
            BetterUptime::NAME,
            "option must not be empty",
        ));
    }

    let value = value.ok_or_else(|| {
        ServiceError::validation(
            BetterUptime::NAME,
            format!("no value provided for option \"{}\"", key),
        )
    })?;

    if is_reserved(key) {
        debug!(option = key, "ignoring reserved Better Uptime option");
        return Ok(());
    }

    parsed.insert(key.to_string(), value);
    Ok(())
}

fn is_reserved(key: &str) -> bool {
    RESERVED_OPTIONS.contains(&key.to_ascii_lowercase().as_str())
}

#[async_trait]
impl NotificationService for BetterUptime {
    fn identifier(&self) -> &str {
        Self::IDENTIFIER
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    #[instrument(skip_all, fields(service = "BetterUptime"))]
    async fn send_report(
        &self,
        result: &UpdateCheckResult,
        options: &Options,
    ) -> Result<(), TransportError> {
        let payload = self.payload(result, options);
        let headers = [("Authorization", format!("Bearer {}", self.auth_token))];

        self.client
            .post_json(Self::NAME, &self.url, &payload, &headers)
            .await?;
        Ok(())
    }
}

impl ServiceDefinition for BetterUptime {
    const IDENTIFIER: &'static str = "better_uptime";
    const NAME: &'static str = "BetterUptime";

    fn from_configuration(
        configuration: &Configuration,
        env: &dyn Environment,
    ) -> Result<Self, ServiceError> {
        let auth_token = resolve_string(configuration, env, Self::IDENTIFIER, "authToken")?;
        let requester = resolve_string(configuration, env, Self::IDENTIFIER, "requester")?;
        let options = match resolve_optional(configuration, env, Self::IDENTIFIER, "options") {
            Some(value) => parse_options(&value)?,
            None => Map::new(),
        };
        let url = resolve_string_optional(configuration, env, Self::IDENTIFIER, "url");

        Self::new(auth_token, requester, options, url.as_deref())
    }
}
