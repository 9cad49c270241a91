//! Service configuration
//!
//! This module provides:
//! - The per-service configuration map read from host project metadata
//! - An injectable environment accessor
//! - Key resolution with environment-variable fallback
//! - Host manifest loading (composer.json or TOML)

mod environment;
mod project;
mod resolver;

pub use environment::{Environment, MapEnvironment, SystemEnvironment};
pub use project::{ProjectMetadata, CONFIGURATION_KEY};
pub use resolver::{
    env_name, is_enabled, resolve, resolve_list, resolve_optional, resolve_string,
    resolve_string_optional, underscored,
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Mapping from service identifier to its option map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Configuration(Map<String, Value>);

impl Configuration {
    /// Creates an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a configuration from a JSON value; non-object values yield an empty map
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    /// Returns the raw value stored for a service
    pub fn service(&self, identifier: &str) -> Option<&Value> {
        self.0.get(identifier)
    }

    /// Returns the option map of a service, if the stored value is a map
    pub fn service_options(&self, identifier: &str) -> Option<&Map<String, Value>> {
        self.service(identifier).and_then(Value::as_object)
    }

    /// Sets the value stored for a service (builder pattern)
    pub fn with_service(mut self, identifier: impl Into<String>, options: Value) -> Self {
        self.0.insert(identifier.into(), options);
        self
    }

    /// Returns true if no service is configured
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for Configuration {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Loose boolean coercion of a configuration value
///
/// `false`, `null`, `0`, `""`, `"0"` and empty arrays/objects are false.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => is_truthy_str(s),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Loose boolean coercion of a raw string (environment variables)
pub fn is_truthy_str(value: &str) -> bool {
    !value.is_empty() && value != "0"
}

/// Renders a scalar configuration value as string
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
