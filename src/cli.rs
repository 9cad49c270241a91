//! CLI argument parsing module for update-reporter

use crate::error::RegistryError;
use crate::output::{ConsoleOutput, OutputBehavior};
use crate::registry::Registry;
use crate::service;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::sync::Arc;

/// Reads results from stdin when given as RESULT
pub const STDIN_MARKER: &str = "-";

/// Manifest read when `--manifest` is not given
pub const DEFAULT_MANIFEST: &str = "composer.json";

/// Reports outdated packages to the configured notification services
#[derive(Parser, Debug, Clone)]
#[command(
    name = "update-reporter",
    version,
    about = "Reports outdated packages to the configured notification services"
)]
pub struct CliArgs {
    /// Update check result JSON file (`-` or omitted: read from stdin)
    pub result: Option<PathBuf>,

    /// Host project manifest providing project name and configuration
    /// (default: composer.json, skipped if absent)
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Override the project name used in reports
    #[arg(long)]
    pub project_name: Option<String>,

    // Output options
    /// Suppress status lines (errors are still written)
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable quiet mode - errors only
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored error output
    #[arg(long)]
    pub no_color: bool,

    // Service filters
    /// Report only to these services (can be specified multiple times)
    #[arg(long, action = ArgAction::Append, value_name = "SERVICE")]
    pub only: Vec<String>,

    /// Skip these services (can be specified multiple times)
    #[arg(long, action = ArgAction::Append, value_name = "SERVICE")]
    pub exclude: Vec<String>,
}

impl CliArgs {
    /// Returns true if the result is read from stdin
    pub fn reads_stdin(&self) -> bool {
        match &self.result {
            None => true,
            Some(path) => path.as_os_str() == STDIN_MARKER,
        }
    }

    /// Manifest path to read
    pub fn manifest_path(&self) -> PathBuf {
        self.manifest
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MANIFEST))
    }

    /// Output behavior for the selected flags, writing to the console
    pub fn behavior(&self) -> OutputBehavior {
        OutputBehavior::from_cli(
            self.json,
            self.verbose,
            self.quiet,
            Arc::new(ConsoleOutput::new(!self.no_color)),
        )
    }

    /// Builds the service registry from `--only` and `--exclude`
    ///
    /// Unknown service identifiers are rejected.
    pub fn registry(&self) -> Result<Registry, RegistryError> {
        let mut registry = if self.only.is_empty() {
            Registry::with_defaults()
        } else {
            let mut registry = Registry::new();
            for identifier in &self.only {
                registry.register_identifier(identifier)?;
            }
            registry
        };

        for identifier in &self.exclude {
            if service::builtin(identifier).is_none() {
                return Err(RegistryError::invalid_service(
                    identifier.as_str(),
                    "no built-in service with this identifier",
                ));
            }
            registry.unregister(identifier);
        }

        Ok(registry)
    }
}
