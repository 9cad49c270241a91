//! Configuration key resolution
//!
//! Resolution order for a service key:
//! 1. `configuration[service][key]` when the service block is a map
//! 2. Environment variable `SERVICE_SNAKE_KEY`, if set (empty counts as set)
//! 3. Missing configuration error
//!
//! Enablement uses its own order: `SERVICE_ENABLE` decides whenever it is set,
//! otherwise `configuration[service]["enable"]` does.

use super::{is_truthy, is_truthy_str, value_to_string, Configuration, Environment};
use crate::error::ConfigError;
use serde_json::Value;

/// Inserts an underscore before every uppercase letter that is not the first character
pub fn underscored(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        if i > 0 && c.is_ascii_uppercase() {
            out.push('_');
        }
        out.push(c);
    }
    out
}

/// Builds the environment variable name for a service key
pub fn env_name(service: &str, key: &str) -> String {
    format!("{}_{}", service, underscored(key)).to_uppercase()
}

/// Resolves a configuration value, failing if neither source defines it
pub fn resolve(
    configuration: &Configuration,
    env: &dyn Environment,
    service: &str,
    key: &str,
) -> Result<Value, ConfigError> {
    resolve_optional(configuration, env, service, key)
        .ok_or_else(|| ConfigError::missing(service, key))
}

/// Resolves a configuration value, yielding `None` if neither source defines it
pub fn resolve_optional(
    configuration: &Configuration,
    env: &dyn Environment,
    service: &str,
    key: &str,
) -> Option<Value> {
    let configured = configuration
        .service_options(service)
        .and_then(|options| options.get(key))
        .filter(|value| !value.is_null());

    if let Some(value) = configured {
        return Some(value.clone());
    }

    env.var(&env_name(service, key)).map(Value::String)
}

/// Resolves a configuration value as string
pub fn resolve_string(
    configuration: &Configuration,
    env: &dyn Environment,
    service: &str,
    key: &str,
) -> Result<String, ConfigError> {
    resolve(configuration, env, service, key).map(|v| value_to_string(&v))
}

/// Resolves an optional configuration value as string
pub fn resolve_string_optional(
    configuration: &Configuration,
    env: &dyn Environment,
    service: &str,
    key: &str,
) -> Option<String> {
    resolve_optional(configuration, env, service, key).map(|v| value_to_string(&v))
}

/// Resolves a list value given as comma separated string or JSON array
///
/// Items are trimmed and empty items are dropped.
pub fn resolve_list(
    configuration: &Configuration,
    env: &dyn Environment,
    service: &str,
    key: &str,
) -> Result<Vec<String>, ConfigError> {
    let value = resolve(configuration, env, service, key)?;
    let items: Vec<String> = match value {
        Value::Array(items) => items.iter().map(value_to_string).collect(),
        Value::Object(_) => {
            return Err(ConfigError::invalid_value(
                service,
                key,
                "expected a list or a comma separated string",
            ))
        }
        other => value_to_string(&other)
            .split(',')
            .map(str::to_string)
            .collect(),
    };

    Ok(items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect())
}

/// Returns whether a service is enabled
pub fn is_enabled(configuration: &Configuration, env: &dyn Environment, service: &str) -> bool {
    if let Some(value) = env.var(&env_name(service, "enable")) {
        return is_truthy_str(&value);
    }

    configuration
        .service_options(service)
        .and_then(|options| options.get("enable"))
        .is_some_and(is_truthy)
}
