//! Notification services
//!
//! This module provides:
//! - The `NotificationService` trait with the shared report template
//! - Service types (`ServiceFactory`, `ServiceType`) held by the registry
//! - Built-in services: E-mail, GitLab, Mattermost, Slack, MS Teams,
//!   Better Uptime and a generic webhook
//! - Rendering and validation helpers shared by the services

mod better_uptime;
mod email;
mod gitlab;
mod mattermost;
mod slack;
mod teams;
mod webhook;

pub use better_uptime::BetterUptime;
pub use email::Email;
pub use gitlab::GitLab;
pub use mattermost::Mattermost;
pub use slack::Slack;
pub use teams::Teams;
pub use webhook::{Webhook, WebhookPackage, WebhookPayload};

use crate::config::{self, Configuration, Environment};
use crate::domain::UpdateCheckResult;
use crate::error::{ServiceError, TransportError};
use crate::options::Options;
use crate::output::{emoji, OutputBehavior};
use async_trait::async_trait;
use reqwest::Url;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{info, warn};

/// A configured notification backend
#[async_trait]
pub trait NotificationService: Send + Sync {
    /// Lowercase key used for configuration lookup and env-var prefixes
    fn identifier(&self) -> &str;

    /// Human-readable name used in status lines
    fn name(&self) -> &str;

    /// Line written before the report is sent
    fn sending_notice(&self) -> String {
        format!("{} Sending report to {}...", emoji::ROCKET, self.name())
    }

    /// Renders the result into the channel payload and sends it
    async fn send_report(
        &self,
        result: &UpdateCheckResult,
        options: &Options,
    ) -> Result<(), TransportError>;

    /// Reports the result, returning whether the report succeeded
    ///
    /// An empty result is skipped and counts as success. Transport failures
    /// are written to the error channel and returned as `false`.
    async fn report(
        &self,
        result: &UpdateCheckResult,
        behavior: &OutputBehavior,
        options: &Options,
    ) -> bool {
        let name = self.name();

        if result.is_empty() {
            behavior.info(&format!("{} Skipped {} report", emoji::PROHIBITED, name));
            return true;
        }

        behavior.info(&self.sending_notice());
        info!(service = name, packages = result.len(), "sending report");

        match self.send_report(result, options).await {
            Ok(()) => {
                behavior.info(&format!(
                    "{} {} report was successful",
                    emoji::CHECK_MARK,
                    name
                ));
                true
            }
            Err(e) => {
                warn!(service = name, error = %e, "report failed");
                behavior.error(&format!(
                    "{} Error during {} report: {}",
                    emoji::CROSS_MARK,
                    name,
                    e
                ));
                false
            }
        }
    }
}

/// Describes a kind of service and builds instances of it
pub trait ServiceFactory: Send + Sync {
    /// Lowercase service identifier
    fn identifier(&self) -> &str;

    /// Human-readable service name
    fn name(&self) -> &str;

    /// Returns whether the service is enabled
    fn is_enabled(&self, configuration: &Configuration, env: &dyn Environment) -> bool {
        config::is_enabled(configuration, env, self.identifier())
    }

    /// Builds and validates a service instance
    fn from_configuration(
        &self,
        configuration: &Configuration,
        env: &dyn Environment,
    ) -> Result<Box<dyn NotificationService>, ServiceError>;
}

/// Static description of a built-in service
pub trait ServiceDefinition: NotificationService + Sized + 'static {
    /// Lowercase service identifier
    const IDENTIFIER: &'static str;

    /// Human-readable service name
    const NAME: &'static str;

    /// Builds and validates an instance from configuration and environment
    fn from_configuration(
        configuration: &Configuration,
        env: &dyn Environment,
    ) -> Result<Self, ServiceError>;
}

/// Factory for a [`ServiceDefinition`]
struct Definition<S>(PhantomData<fn() -> S>);

impl<S: ServiceDefinition> ServiceFactory for Definition<S> {
    fn identifier(&self) -> &str {
        S::IDENTIFIER
    }

    fn name(&self) -> &str {
        S::NAME
    }

    fn from_configuration(
        &self,
        configuration: &Configuration,
        env: &dyn Environment,
    ) -> Result<Box<dyn NotificationService>, ServiceError> {
        Ok(Box::new(S::from_configuration(configuration, env)?))
    }
}

/// A registrable service type
#[derive(Clone)]
pub struct ServiceType(Arc<dyn ServiceFactory>);

impl ServiceType {
    /// Service type of a built-in service
    pub fn of<S: ServiceDefinition>() -> Self {
        Self(Arc::new(Definition::<S>(PhantomData)))
    }

    /// Service type backed by a custom factory
    pub fn from_factory(factory: impl ServiceFactory + 'static) -> Self {
        Self(Arc::new(factory))
    }

    /// Lowercase service identifier
    pub fn identifier(&self) -> &str {
        self.0.identifier()
    }

    /// Human-readable service name
    pub fn name(&self) -> &str {
        self.0.name()
    }

    /// Returns whether the service is enabled
    pub fn is_enabled(&self, configuration: &Configuration, env: &dyn Environment) -> bool {
        self.0.is_enabled(configuration, env)
    }

    /// Builds a service instance
    pub fn build(
        &self,
        configuration: &Configuration,
        env: &dyn Environment,
    ) -> Result<Box<dyn NotificationService>, ServiceError> {
        self.0.from_configuration(configuration, env)
    }
}

impl fmt::Debug for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceType")
            .field("identifier", &self.identifier())
            .field("name", &self.name())
            .finish()
    }
}

/// All built-in service types in default registration order
pub fn builtin_types() -> Vec<ServiceType> {
    vec![
        ServiceType::of::<Email>(),
        ServiceType::of::<GitLab>(),
        ServiceType::of::<Mattermost>(),
        ServiceType::of::<Slack>(),
        ServiceType::of::<Teams>(),
        ServiceType::of::<BetterUptime>(),
        ServiceType::of::<Webhook>(),
    ]
}

/// Looks up a built-in service type by identifier
pub fn builtin(identifier: &str) -> Option<ServiceType> {
    builtin_types()
        .into_iter()
        .find(|t| t.identifier() == identifier)
}

/// "N outdated package(s)"
pub(crate) fn title(count: usize) -> String {
    format!("{} outdated package{}", count, plural_suffix(count))
}

/// Appends `" @ <project>"` when a project name is set
pub(crate) fn with_project(title: String, options: &Options) -> String {
    match options.project_name() {
        Some(project) => format!("{} @ {}", title, project),
        None => title,
    }
}

pub(crate) fn plural_suffix(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Validates an absolute URL with a host
pub(crate) fn validate_url(service: &'static str, raw: &str) -> Result<Url, ServiceError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::validation(service, "URL must not be empty"));
    }

    match Url::parse(trimmed) {
        Ok(url) if url.has_host() => Ok(url),
        _ => Err(ServiceError::validation(
            service,
            format!("\"{}\" is no valid URL", trimmed),
        )),
    }
}

/// Validates that a value is not blank
pub(crate) fn validate_not_blank(
    service: &'static str,
    what: &str,
    value: &str,
) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::validation(
            service,
            format!("{} must not be empty", what),
        ));
    }
    Ok(())
}

/// Validates a single e-mail address
pub(crate) fn validate_email(
    service: &'static str,
    what: &str,
    value: &str,
) -> Result<(), ServiceError> {
    validate_not_blank(service, what, value)?;
    value.parse::<lettre::Address>().map_err(|_| {
        ServiceError::validation(
            service,
            format!("{} \"{}\" is no valid email address", what, value),
        )
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapEnvironment;
    use crate::domain::OutdatedPackage;
    use crate::output::{BufferOutput, Style, Verbosity};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Dummy {
        successful: bool,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl NotificationService for Dummy {
        fn identifier(&self) -> &str {
            "dummy"
        }

        fn name(&self) -> &str {
            "Dummy"
        }

        async fn send_report(
            &self,
            _result: &UpdateCheckResult,
            _options: &Options,
        ) -> Result<(), TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.successful {
                Ok(())
            } else {
                Err(TransportError::unexpected_status("Dummy", 500))
            }
        }
    }

    fn dummy(successful: bool) -> (Dummy, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Dummy {
                successful,
                calls: calls.clone(),
            },
            calls,
        )
    }

    fn behavior(style: Style) -> (OutputBehavior, Arc<BufferOutput>) {
        let buffer = Arc::new(BufferOutput::new());
        (
            OutputBehavior::new(style, Verbosity::Normal, buffer.clone()),
            buffer,
        )
    }

    fn one_package() -> UpdateCheckResult {
        UpdateCheckResult::new(vec![OutdatedPackage::new("foo/foo", "1.0.0", "1.0.5")])
    }

    #[tokio::test]
    async fn test_report_skips_empty_result() {
        let (service, calls) = dummy(true);
        let (behavior, buffer) = behavior(Style::Normal);

        let ok = service
            .report(&UpdateCheckResult::default(), &behavior, &Options::new())
            .await;

        assert!(ok);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(buffer.output().contains("Skipped Dummy report"));
    }

    #[tokio::test]
    async fn test_report_skip_is_silent_in_json_style() {
        let (service, _) = dummy(true);
        let (behavior, buffer) = behavior(Style::Json);

        assert!(
            service
                .report(&UpdateCheckResult::default(), &behavior, &Options::new())
                .await
        );
        assert!(buffer.lines().is_empty());
    }

    #[tokio::test]
    async fn test_report_success() {
        let (service, calls) = dummy(true);
        let (behavior, buffer) = behavior(Style::Normal);

        assert!(service.report(&one_package(), &behavior, &Options::new()).await);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(buffer.output().contains("Sending report to Dummy..."));
        assert!(buffer.output().contains("Dummy report was successful"));
        assert!(buffer.errors().is_empty());
    }

    #[tokio::test]
    async fn test_report_failure_writes_error() {
        let (service, _) = dummy(false);
        let (behavior, buffer) = behavior(Style::Normal);

        assert!(!service.report(&one_package(), &behavior, &Options::new()).await);
        let errors = buffer.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Error during Dummy report"));
        assert!(errors[0].contains("HTTP 500"));
    }

    #[tokio::test]
    async fn test_report_failure_is_written_in_json_style() {
        let (service, _) = dummy(false);
        let (behavior, buffer) = behavior(Style::Json);

        assert!(!service.report(&one_package(), &behavior, &Options::new()).await);
        assert_eq!(buffer.lines().len(), 1);
        assert!(buffer.errors()[0].contains("Error during Dummy report"));
    }

    #[test]
    fn test_title() {
        assert_eq!(title(0), "0 outdated packages");
        assert_eq!(title(1), "1 outdated package");
        assert_eq!(title(2), "2 outdated packages");
    }

    #[test]
    fn test_with_project() {
        let options = Options::new().with_project_name("foo/baz");
        assert_eq!(with_project(title(1), &options), "1 outdated package @ foo/baz");
        assert_eq!(with_project(title(1), &Options::new()), "1 outdated package");
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("Test", "https://example.org").is_ok());

        let err = validate_url("Test", " ").unwrap_err();
        assert!(err.to_string().contains("must not be empty"));

        let err = validate_url("Test", "foo").unwrap_err();
        assert!(err.to_string().contains("no valid URL"));

        assert!(validate_url("Test", "mailto:foo@example.org").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("Test", "sender", "baz@example.org").is_ok());
        assert!(validate_email("Test", "sender", "").is_err());
        assert!(validate_email("Test", "sender", "baz").is_err());
    }

    #[test]
    fn test_builtin_types_order() {
        let ids: Vec<String> = builtin_types()
            .iter()
            .map(|t| t.identifier().to_string())
            .collect();
        assert_eq!(
            ids,
            vec![
                "email",
                "gitlab",
                "mattermost",
                "slack",
                "teams",
                "better_uptime",
                "webhook"
            ]
        );
    }

    #[test]
    fn test_builtin_lookup() {
        let slack = builtin("slack").unwrap();
        assert_eq!(slack.name(), "Slack");
        assert!(builtin("unknown").is_none());
    }

    #[test]
    fn test_service_type_is_enabled_uses_identifier() {
        let slack = ServiceType::of::<Slack>();
        let env = MapEnvironment::new().with("SLACK_ENABLE", "1");
        assert!(slack.is_enabled(&Configuration::new(), &env));
        assert!(!slack.is_enabled(&Configuration::new(), &MapEnvironment::new()));
    }

    #[test]
    fn test_service_type_build_reports_missing_configuration() {
        let slack = ServiceType::of::<Slack>();
        let err = slack
            .build(&Configuration::new(), &MapEnvironment::new())
            .err()
            .unwrap();
        assert!(err.is_missing_configuration());
    }
}
