//! Output behavior shared by all services during a reporting run
//!
//! This module provides:
//! - Output style (normal text or JSON-only)
//! - Verbosity levels
//! - Output sinks for status lines (console, buffer, null)

mod sink;

pub use sink::{BufferOutput, ConsoleOutput, NullOutput, Output};

use std::fmt;
use std::sync::Arc;

/// Emoji prefixes for status lines
pub mod emoji {
    /// Prefix of skipped reports
    pub const PROHIBITED: &str = "🚫";
    /// Prefix of failed reports
    pub const CROSS_MARK: &str = "❌";
    /// Prefix of successful reports
    pub const CHECK_MARK: &str = "✅";
    /// Prefix of send notices
    pub const ROCKET: &str = "🚀";
    /// Alarm light used in report titles
    pub const POLICE_CAR_LIGHT: &str = "🚨";
    /// Warning sign used as insecure marker
    pub const WARNING: &str = "⚠️";
}

/// Output style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
    /// Human-readable status lines
    #[default]
    Normal,
    /// JSON-only output; human-readable status lines are suppressed
    Json,
}

impl Style {
    /// Returns true for JSON-only output
    pub fn is_json(&self) -> bool {
        matches!(self, Style::Json)
    }
}

/// Output verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, PartialOrd, Ord)]
pub enum Verbosity {
    /// Errors only
    Quiet,
    /// Normal output
    #[default]
    Normal,
    /// Detailed output with additional information
    Verbose,
}

/// Style, verbosity and sink injected into every service before reporting
#[derive(Clone)]
pub struct OutputBehavior {
    /// Output style
    pub style: Style,
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Sink for status lines
    pub output: Arc<dyn Output>,
}

impl OutputBehavior {
    /// Create a new output behavior
    pub fn new(style: Style, verbosity: Verbosity, output: Arc<dyn Output>) -> Self {
        Self {
            style,
            verbosity,
            output,
        }
    }

    /// Create a behavior from CLI flags
    pub fn from_cli(json: bool, verbose: bool, quiet: bool, output: Arc<dyn Output>) -> Self {
        let style = if json { Style::Json } else { Style::Normal };

        let verbosity = if quiet {
            Verbosity::Quiet
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };

        Self::new(style, verbosity, output)
    }

    /// Returns true if informational lines are suppressed
    pub fn is_silent(&self) -> bool {
        self.style.is_json() || self.verbosity == Verbosity::Quiet
    }

    /// Returns true if verbose lines should be written
    pub fn is_verbose(&self) -> bool {
        !self.style.is_json() && self.verbosity >= Verbosity::Verbose
    }

    /// Writes an informational line unless silent
    pub fn info(&self, message: &str) {
        if !self.is_silent() {
            self.output.write(message);
        }
    }

    /// Writes a line only in verbose mode
    pub fn verbose(&self, message: &str) {
        if self.is_verbose() {
            self.output.write(message);
        }
    }

    /// Writes an error line, regardless of style
    pub fn error(&self, message: &str) {
        self.output.write_error(message);
    }
}

impl Default for OutputBehavior {
    fn default() -> Self {
        Self::new(Style::default(), Verbosity::default(), Arc::new(NullOutput))
    }
}

impl fmt::Debug for OutputBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputBehavior")
            .field("style", &self.style)
            .field("verbosity", &self.verbosity)
            .finish_non_exhaustive()
    }
}
