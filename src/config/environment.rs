//! Environment variable access
//!
//! Services never read the process environment directly; the reporter hands
//! them an [`Environment`] so tests can supply variables without mutating
//! global state.

use std::collections::HashMap;

/// Read-only key-value view of environment variables
pub trait Environment: Send + Sync {
    /// Returns the value of a variable, `None` if it is unset
    fn var(&self, name: &str) -> Option<String>;

    /// Returns true if the variable is set (even to an empty string)
    fn is_set(&self, name: &str) -> bool {
        self.var(name).is_some()
    }
}

/// Environment backed by the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnvironment;

impl Environment for SystemEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var_os(name).map(|v| v.to_string_lossy().into_owned())
    }
}

/// In-memory environment
#[derive(Debug, Clone, Default)]
pub struct MapEnvironment {
    vars: HashMap<String, String>,
}

impl MapEnvironment {
    /// Creates an empty environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a variable (builder pattern)
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Sets a variable
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Removes a variable
    pub fn remove(&mut self, name: &str) {
        self.vars.remove(name);
    }
}

impl Environment for MapEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnvironment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
