//! Outdated package records

use serde::{Deserialize, Serialize};
use std::fmt;

/// Base URL used to derive provider links for packages without one
const PROVIDER_BASE_URL: &str = "https://packagist.org/packages";

/// A dependency whose installed version is behind an available newer version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutdatedPackage {
    /// Package name (e.g. `vendor/package`)
    pub name: String,
    /// Currently installed version
    #[serde(alias = "outdatedVersion")]
    pub outdated_version: String,
    /// Newest available version
    #[serde(alias = "newVersion")]
    pub new_version: String,
    /// Whether the installed version has known security advisories
    #[serde(default)]
    pub insecure: bool,
    /// Link to the package page at its provider
    #[serde(
        default,
        alias = "providerLink",
        skip_serializing_if = "Option::is_none"
    )]
    pub provider_link: Option<String>,
}

impl OutdatedPackage {
    /// Creates a new secure outdated package
    pub fn new(
        name: impl Into<String>,
        outdated_version: impl Into<String>,
        new_version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            outdated_version: outdated_version.into(),
            new_version: new_version.into(),
            insecure: false,
            provider_link: None,
        }
    }

    /// Marks the package as insecure (builder pattern)
    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    /// Sets an explicit provider link (builder pattern)
    pub fn with_provider_link(mut self, link: impl Into<String>) -> Self {
        self.provider_link = Some(link.into());
        self
    }

    /// Returns the provider link, deriving it from name and new version if absent
    pub fn provider_link(&self) -> String {
        match &self.provider_link {
            Some(link) if !link.trim().is_empty() => link.clone(),
            _ => format!("{}/{}#{}", PROVIDER_BASE_URL, self.name, self.new_version),
        }
    }
}

impl fmt::Display for OutdatedPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let insecure = if self.insecure { " (insecure)" } else { "" };
        write!(
            f,
            "{} {}{} -> {}",
            self.name, self.outdated_version, insecure, self.new_version
        )
    }
}
