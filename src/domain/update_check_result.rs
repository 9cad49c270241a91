//! Update check result consumed by the reporter

use super::OutdatedPackage;
use serde::{Deserialize, Deserializer, Serialize};

/// Ordered list of outdated packages produced by an update check
///
/// An empty result is valid and means there is nothing to report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateCheckResult {
    outdated_packages: Vec<OutdatedPackage>,
}

impl UpdateCheckResult {
    /// Creates a new result from the given packages
    pub fn new(outdated_packages: Vec<OutdatedPackage>) -> Self {
        Self { outdated_packages }
    }

    /// Returns the outdated packages in check order
    pub fn outdated_packages(&self) -> &[OutdatedPackage] {
        &self.outdated_packages
    }

    /// Returns the number of outdated packages
    pub fn len(&self) -> usize {
        self.outdated_packages.len()
    }

    /// Returns true if no package is outdated
    pub fn is_empty(&self) -> bool {
        self.outdated_packages.is_empty()
    }

    /// Returns true if at least one package is flagged insecure
    pub fn has_insecure_packages(&self) -> bool {
        self.outdated_packages.iter().any(|p| p.insecure)
    }
}

impl From<Vec<OutdatedPackage>> for UpdateCheckResult {
    fn from(outdated_packages: Vec<OutdatedPackage>) -> Self {
        Self::new(outdated_packages)
    }
}

/// Accepted JSON shapes: a bare package list or a wrapping object
#[derive(Deserialize)]
#[serde(untagged)]
enum ResultRepr {
    List(Vec<OutdatedPackage>),
    Object {
        #[serde(alias = "outdatedPackages")]
        outdated_packages: Vec<OutdatedPackage>,
    },
}

impl<'de> Deserialize<'de> for UpdateCheckResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let packages = match ResultRepr::deserialize(deserializer)? {
            ResultRepr::List(packages) => packages,
            ResultRepr::Object { outdated_packages } => outdated_packages,
        };
        Ok(Self::new(packages))
    }
}
