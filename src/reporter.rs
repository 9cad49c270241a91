//! Reporter coordinating a single reporting run
//!
//! This module provides:
//! - Workflow coordination: filter enabled → build → inject → report
//! - Per-service outcomes with partial continuation on failures
//! - Shared behavior and options injected into every service

use crate::config::{Environment, ProjectMetadata, SystemEnvironment};
use crate::domain::UpdateCheckResult;
use crate::error::RegistryError;
use crate::options::Options;
use crate::output::{emoji, OutputBehavior};
use crate::registry::Registry;
use crate::service::ServiceType;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of one service within a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceStatus {
    /// The report was delivered or skipped
    Succeeded,
    /// The report could not be delivered
    Failed,
    /// The service could not be built from configuration
    SetupFailed(String),
}

/// Per-service record of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceOutcome {
    /// Service identifier
    pub identifier: String,
    /// Human-readable service name
    pub name: String,
    /// What happened
    pub status: ServiceStatus,
}

impl ServiceOutcome {
    /// Returns true if the service reported successfully
    pub fn is_success(&self) -> bool {
        self.status == ServiceStatus::Succeeded
    }
}

/// Result of running the reporter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportSummary {
    outcomes: Vec<ServiceOutcome>,
}

impl ReportSummary {
    /// Outcomes of all enabled services in dispatch order
    pub fn outcomes(&self) -> &[ServiceOutcome] {
        &self.outcomes
    }

    /// Returns true if every enabled service succeeded (vacuously true when none ran)
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(ServiceOutcome::is_success)
    }

    /// Outcomes of services that failed or could not be built
    pub fn failed(&self) -> impl Iterator<Item = &ServiceOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    /// Returns true if no service was enabled
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Returns the outcome of a service by identifier
    pub fn get(&self, identifier: &str) -> Option<&ServiceOutcome> {
        self.outcomes.iter().find(|o| o.identifier == identifier)
    }

    fn push(&mut self, service: &ServiceType, status: ServiceStatus) {
        self.outcomes.push(ServiceOutcome {
            identifier: service.identifier().to_string(),
            name: service.name().to_string(),
            status,
        });
    }
}

/// Dispatches update check results to all enabled services
pub struct Reporter {
    /// Host project name and configuration, read once
    metadata: ProjectMetadata,
    /// Environment used for configuration fallback
    env: Arc<dyn Environment>,
    /// Service types to dispatch to
    registry: Registry,
    /// Output behavior injected into every service
    behavior: OutputBehavior,
    /// Options injected into every service
    options: Options,
}

impl Reporter {
    /// Create a reporter for the given project with all built-in services
    pub fn new(metadata: ProjectMetadata) -> Self {
        Self {
            metadata,
            env: Arc::new(SystemEnvironment),
            registry: Registry::with_defaults(),
            behavior: OutputBehavior::default(),
            options: Options::default(),
        }
    }

    /// Replaces the environment (builder pattern)
    pub fn with_environment(mut self, env: Arc<dyn Environment>) -> Self {
        self.env = env;
        self
    }

    /// Replaces the registry (builder pattern)
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    /// Replaces the behavior for subsequent runs
    pub fn set_behavior(&mut self, behavior: OutputBehavior) {
        self.behavior = behavior;
    }

    /// Replaces the options for subsequent runs
    pub fn set_options(&mut self, options: Options) {
        self.options = options;
    }

    pub fn behavior(&self) -> &OutputBehavior {
        &self.behavior
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn metadata(&self) -> &ProjectMetadata {
        &self.metadata
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Registers an additional service type
    pub fn register_service(&mut self, service: ServiceType) -> Result<(), RegistryError> {
        self.registry.register(service)
    }

    /// Removes a service type
    pub fn unregister_service(&mut self, identifier: &str) {
        self.registry.unregister(identifier);
    }

    /// Options as injected into services; the host project name takes precedence
    fn effective_options(&self) -> Options {
        match &self.metadata.name {
            Some(name) => self.options.clone().with_project_name(name.clone()),
            None => self.options.clone(),
        }
    }

    /// Reports the result to every enabled service, in registry order
    ///
    /// Failures are recorded per service and never abort the run.
    pub async fn report(&self, result: &UpdateCheckResult) -> ReportSummary {
        let configuration = &self.metadata.configuration;
        let env = self.env.as_ref();
        let options = self.effective_options();
        let mut summary = ReportSummary::default();

        info!(
            packages = result.len(),
            services = self.registry.len(),
            "starting report run"
        );

        for service_type in self.registry.list() {
            if !service_type.is_enabled(configuration, env) {
                debug!(service = service_type.identifier(), "service disabled");
                self.behavior
                    .verbose(&format!("{} is disabled", service_type.name()));
                continue;
            }

            let service = match service_type.build(configuration, env) {
                Ok(service) => service,
                Err(e) => {
                    warn!(service = service_type.identifier(), error = %e, "service setup failed");
                    self.behavior.error(&format!(
                        "{} Error during {} report: {}",
                        emoji::CROSS_MARK,
                        service_type.name(),
                        e
                    ));
                    summary.push(service_type, ServiceStatus::SetupFailed(e.to_string()));
                    continue;
                }
            };

            let status = if service.report(result, &self.behavior, &options).await {
                ServiceStatus::Succeeded
            } else {
                ServiceStatus::Failed
            };
            summary.push(service_type, status);
        }

        summary
    }
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter")
            .field("metadata", &self.metadata)
            .field("registry", &self.registry)
            .field("behavior", &self.behavior)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
