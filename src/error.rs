//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ConfigError: Missing or malformed service configuration, unreadable host manifests
//! - ServiceError: Failures while building a notification service
//! - RegistryError: Service types rejected by the registry
//! - TransportError: Send-time HTTP/SMTP failures

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Service construction errors
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Service registry errors
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Transport errors
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Update check result could not be read
    #[error("failed to read update check result from {source_name}: {message}")]
    InvalidResult {
        source_name: String,
        message: String,
    },
}

/// Errors related to configuration resolution
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required key is absent from both the configuration map and the environment
    #[error("configuration \"{key}\" is missing for service \"{service}\"")]
    MissingConfiguration { service: String, key: String },

    /// A configuration value has an unsupported shape
    #[error("invalid value for configuration \"{key}\" of service \"{service}\": {message}")]
    InvalidValue {
        service: String,
        key: String,
        message: String,
    },

    /// Failed to read the host manifest
    #[error("failed to read manifest {path}: {message}")]
    ManifestRead { path: PathBuf, message: String },

    /// Failed to parse the host manifest
    #[error("failed to parse manifest {path}: {message}")]
    ManifestParse { path: PathBuf, message: String },
}

/// Errors raised while building a notification service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Configuration could not be resolved
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Constructor input failed validation
    #[error("{service}: {message}")]
    Validation {
        service: &'static str,
        message: String,
    },
}

/// Errors related to the service registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The service type does not satisfy the service contract
    #[error("service \"{identifier}\" is not a valid notification service: {reason}")]
    InvalidService { identifier: String, reason: String },
}

/// Errors raised while delivering a report
#[derive(Error, Debug)]
pub enum TransportError {
    /// The HTTP client could not be constructed
    #[error("failed to create HTTP client: {message}")]
    ClientBuild { message: String },

    /// The request could not be sent
    #[error("request to {service} failed: {message}")]
    Request { service: String, message: String },

    /// The remote answered with an error status
    #[error("{service} responded with HTTP {status}")]
    UnexpectedStatus { service: String, status: u16 },

    /// The mail transport rejected the message
    #[error("failed to send mail via {service}: {message}")]
    Mail { service: String, message: String },
}

impl ConfigError {
    /// Creates a new MissingConfiguration error
    pub fn missing(service: impl Into<String>, key: impl Into<String>) -> Self {
        ConfigError::MissingConfiguration {
            service: service.into(),
            key: key.into(),
        }
    }

    /// Creates a new InvalidValue error
    pub fn invalid_value(
        service: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ConfigError::InvalidValue {
            service: service.into(),
            key: key.into(),
            message: message.into(),
        }
    }

    /// Creates a new ManifestRead error
    pub fn manifest_read(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ConfigError::ManifestRead {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new ManifestParse error
    pub fn manifest_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ConfigError::ManifestParse {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl ServiceError {
    /// Creates a new Validation error
    pub fn validation(service: &'static str, message: impl Into<String>) -> Self {
        ServiceError::Validation {
            service,
            message: message.into(),
        }
    }

    /// Returns true if the error stems from a missing configuration key
    pub fn is_missing_configuration(&self) -> bool {
        matches!(
            self,
            ServiceError::Config(ConfigError::MissingConfiguration { .. })
        )
    }
}

impl RegistryError {
    /// Creates a new InvalidService error
    pub fn invalid_service(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        RegistryError::InvalidService {
            identifier: identifier.into(),
            reason: reason.into(),
        }
    }
}

impl TransportError {
    /// Creates a new Request error
    pub fn request(service: impl Into<String>, message: impl Into<String>) -> Self {
        TransportError::Request {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Creates a new UnexpectedStatus error
    pub fn unexpected_status(service: impl Into<String>, status: u16) -> Self {
        TransportError::UnexpectedStatus {
            service: service.into(),
            status,
        }
    }

    /// Creates a new Mail error
    pub fn mail(service: impl Into<String>, message: impl Into<String>) -> Self {
        TransportError::Mail {
            service: service.into(),
            message: message.into(),
        }
    }
}
