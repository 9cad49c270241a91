//! E-mail reports via a mail transport DSN

use super::{title, validate_email, with_project, NotificationService, ServiceDefinition};
use crate::config::{resolve_list, resolve_string, Configuration, Environment};
use crate::domain::UpdateCheckResult;
use crate::error::{ServiceError, TransportError};
use crate::options::Options;
use crate::transport::{
    MailDsn, MailMessage, MailTransport, NullMailTransport, SmtpMailTransport,
};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::instrument;

/// Sends reports as multipart e-mails
pub struct Email {
    dsn: MailDsn,
    receivers: Vec<String>,
    sender: String,
    transport: Arc<dyn MailTransport>,
}

impl Email {
    /// Creates a validated e-mail service and its transport
    ///
    /// No connection is opened until the first report is sent.
    pub fn new(
        dsn: &str,
        receivers: Vec<String>,
        sender: impl Into<String>,
    ) -> Result<Self, ServiceError> {
        let dsn = MailDsn::parse(dsn).map_err(|e| ServiceError::validation(Self::NAME, e))?;
        let sender = sender.into();

        if receivers.is_empty() {
            return Err(ServiceError::validation(
                Self::NAME,
                "receivers must not be empty",
            ));
        }
        for receiver in &receivers {
            validate_email(Self::NAME, "receiver", receiver)?;
        }
        validate_email(Self::NAME, "sender", &sender)?;

        let transport: Arc<dyn MailTransport> = if dsn.is_null() {
            Arc::new(NullMailTransport)
        } else {
            Arc::new(
                SmtpMailTransport::from_dsn(&dsn)
                    .map_err(|e| ServiceError::validation(Self::NAME, e))?,
            )
        };

        Ok(Self {
            dsn,
            receivers,
            sender,
            transport,
        })
    }

    /// Replaces the mail transport (builder pattern)
    pub fn with_transport(mut self, transport: Arc<dyn MailTransport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn dsn(&self) -> &MailDsn {
        &self.dsn
    }

    pub fn receivers(&self) -> &[String] {
        &self.receivers
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// Renders the report mail
    pub fn message(&self, result: &UpdateCheckResult, options: &Options) -> MailMessage {
        MailMessage {
            from: self.sender.clone(),
            to: self.receivers.clone(),
            subject: with_project(title(result.len()), options),
            text: render_text(result, options),
            html: render_html(result, options),
        }
    }
}

fn render_text(result: &UpdateCheckResult, options: &Options) -> String {
    let mut lines = Vec::with_capacity(result.len() + 2);

    if let Some(project) = options.project_name() {
        lines.push(format!("Project: {}", project));
        lines.push(String::new());
    }

    for package in result.outdated_packages() {
        let insecure = if package.insecure { " (insecure)" } else { "" };
        lines.push(format!(
            "Package \"{}\" is outdated. Outdated version: \"{}\"{}, new version: \"{}\"",
            package.name, package.outdated_version, insecure, package.new_version
        ));
    }

    lines.join("\n")
}

fn render_html(result: &UpdateCheckResult, options: &Options) -> String {
    let mut html: Vec<String> = Vec::new();

    if let Some(project) = options.project_name() {
        html.push(format!("<p>Project: <strong>{}</strong></p>", project));
        html.push("<hr>".to_string());
    }

    html.extend(
        [
            "<table>",
            "<tr>",
            "<th>Package name</th>",
            "<th>Outdated version</th>",
            "<th>New version</th>",
            "</tr>",
        ]
        .map(String::from),
    );

    for package in result.outdated_packages() {
        let insecure = if package.insecure {
            " <strong style=\"color: red;\">(insecure)</strong>"
        } else {
            ""
        };
        html.push("<tr>".to_string());
        html.push(format!(
            "<td><a href=\"{}\">{}</a></td>",
            package.provider_link(),
            package.name
        ));
        html.push(format!("<td>{}{}</td>", package.outdated_version, insecure));
        html.push(format!("<td><strong>{}</strong></td>", package.new_version));
        html.push("</tr>".to_string());
    }

    html.push("</table>".to_string());
    html.join("\n")
}

impl fmt::Debug for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Email")
            .field("dsn", &self.dsn.to_string())
            .field("receivers", &self.receivers)
            .field("sender", &self.sender)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl NotificationService for Email {
    fn identifier(&self) -> &str {
        Self::IDENTIFIER
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    #[instrument(skip_all, fields(service = "E-mail"))]
    async fn send_report(
        &self,
        result: &UpdateCheckResult,
        options: &Options,
    ) -> Result<(), TransportError> {
        let message = self.message(result, options);
        self.transport.send(&message).await
    }
}

impl ServiceDefinition for Email {
    const IDENTIFIER: &'static str = "email";
    const NAME: &'static str = "E-mail";

    fn from_configuration(
        configuration: &Configuration,
        env: &dyn Environment,
    ) -> Result<Self, ServiceError> {
        let dsn = resolve_string(configuration, env, Self::IDENTIFIER, "dsn")?;
        let receivers = resolve_list(configuration, env, Self::IDENTIFIER, "receivers")?;
        let sender = resolve_string(configuration, env, Self::IDENTIFIER, "sender")?;

        Self::new(&dsn, receivers, sender)
    }
}
