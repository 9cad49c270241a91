//! Host project metadata
//!
//! Reads the project name and the reporter configuration block from the host
//! project's manifest:
//! - `composer.json`: `name` and `extra["update-check"]`
//! - TOML manifests: `name` (or `package.name`) and the `[update-check]` table

use super::Configuration;
use crate::error::ConfigError;
use serde_json::Value;
use std::path::Path;

/// Key of the reporter configuration block in host manifests
pub const CONFIGURATION_KEY: &str = "update-check";

/// Placeholder name used by hosts for unnamed root projects
const ROOT_PLACEHOLDER: &str = "__root__";

/// Project name and reporter configuration of the host project
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectMetadata {
    /// Project name, `None` for unnamed projects
    pub name: Option<String>,
    /// Reporter configuration
    pub configuration: Configuration,
}

impl ProjectMetadata {
    /// Creates metadata from a name and configuration
    ///
    /// Blank names and the root placeholder map to `None`.
    pub fn new(name: Option<String>, configuration: Configuration) -> Self {
        Self {
            name: name.and_then(normalize_name),
            configuration,
        }
    }

    /// Loads metadata from a manifest file, choosing the format by extension
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::manifest_read(path, e.to_string()))?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        if is_toml {
            Self::from_toml_str(&content, path)
        } else {
            Self::from_json_str(&content, path)
        }
    }

    /// Parses metadata from composer.json content
    pub fn from_json_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let manifest: Value = serde_json::from_str(content)
            .map_err(|e| ConfigError::manifest_parse(path, e.to_string()))?;

        let name = manifest.get("name").and_then(Value::as_str).map(String::from);
        let configuration = manifest
            .get("extra")
            .and_then(|extra| extra.get(CONFIGURATION_KEY))
            .cloned()
            .map(Configuration::from_value)
            .unwrap_or_default();

        Ok(Self::new(name, configuration))
    }

    /// Parses metadata from TOML manifest content
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let manifest: Value = toml::from_str(content)
            .map_err(|e| ConfigError::manifest_parse(path, e.to_string()))?;

        let name = manifest
            .get("name")
            .or_else(|| manifest.get("package").and_then(|p| p.get("name")))
            .and_then(Value::as_str)
            .map(String::from);
        let configuration = manifest
            .get(CONFIGURATION_KEY)
            .cloned()
            .map(Configuration::from_value)
            .unwrap_or_default();

        Ok(Self::new(name, configuration))
    }
}

fn normalize_name(name: String) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed == ROOT_PLACEHOLDER {
        None
    } else {
        Some(trimmed.to_string())
    }
}
