//! Per-run options shared by all services

/// Run-scoped parameters injected into every service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Name of the project the report is about
    pub project_name: Option<String>,
}

impl Options {
    /// Create empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the project name (builder pattern); blank names unset it
    pub fn with_project_name(mut self, project_name: impl Into<String>) -> Self {
        let name = project_name.into();
        self.project_name = if name.trim().is_empty() {
            None
        } else {
            Some(name)
        };
        self
    }

    /// Returns the project name, if any
    pub fn project_name(&self) -> Option<&str> {
        self.project_name.as_deref()
    }
}
