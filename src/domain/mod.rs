//! Core domain models for update-reporter
//!
//! This module contains the update check data consumed by every service:
//! - Outdated package records
//! - The ordered update check result

mod outdated_package;
mod update_check_result;

pub use outdated_package::OutdatedPackage;
pub use update_check_result::UpdateCheckResult;
