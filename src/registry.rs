//! Service registry
//!
//! Holds the ordered set of service types a reporter dispatches to.
//! Registration is idempotent per identifier and keeps insertion order.

use crate::error::RegistryError;
use crate::service::{self, ServiceType};
use tracing::debug;

/// Ordered, de-duplicated set of service types
#[derive(Debug, Clone, Default)]
pub struct Registry {
    services: Vec<ServiceType>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with all built-in services
    pub fn with_defaults() -> Self {
        Self {
            services: service::builtin_types(),
        }
    }

    /// Registers a service type
    ///
    /// Registering an identifier that is already present is a no-op.
    pub fn register(&mut self, service: ServiceType) -> Result<(), RegistryError> {
        validate(&service)?;

        if self.contains(service.identifier()) {
            debug!(service = service.identifier(), "service already registered");
            return Ok(());
        }

        debug!(service = service.identifier(), "registering service");
        self.services.push(service);
        Ok(())
    }

    /// Registers a built-in service by identifier
    pub fn register_identifier(&mut self, identifier: &str) -> Result<(), RegistryError> {
        let service = service::builtin(identifier).ok_or_else(|| {
            RegistryError::invalid_service(identifier, "no built-in service with this identifier")
        })?;
        self.register(service)
    }

    /// Removes a service type; unknown identifiers are ignored
    pub fn unregister(&mut self, identifier: &str) {
        self.services.retain(|s| s.identifier() != identifier);
    }

    /// Returns whether a service type with this identifier is registered
    pub fn contains(&self, identifier: &str) -> bool {
        self.services.iter().any(|s| s.identifier() == identifier)
    }

    /// Registered service types in insertion order
    pub fn list(&self) -> &[ServiceType] {
        &self.services
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

fn validate(service: &ServiceType) -> Result<(), RegistryError> {
    let identifier = service.identifier();

    if identifier.is_empty() {
        return Err(RegistryError::invalid_service(
            identifier,
            "identifier must not be empty",
        ));
    }
    if !identifier
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(RegistryError::invalid_service(
            identifier,
            "identifier must consist of lowercase letters, digits and underscores",
        ));
    }
    if service.name().trim().is_empty() {
        return Err(RegistryError::invalid_service(
            identifier,
            "name must not be empty",
        ));
    }

    Ok(())
}
