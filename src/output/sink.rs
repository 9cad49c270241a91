//! Output sinks for status lines

use colored::Colorize;
use std::io::Write;
use std::sync::Mutex;

/// Line-oriented output with a separate error channel
pub trait Output: Send + Sync {
    /// Writes a status line
    fn write(&self, message: &str);

    /// Writes a line to the error channel
    fn write_error(&self, message: &str);
}

/// Discards all output
#[derive(Debug, Clone, Copy, Default)]
pub struct NullOutput;

impl Output for NullOutput {
    fn write(&self, _message: &str) {}

    fn write_error(&self, _message: &str) {}
}

/// Writes status lines to stdout and errors to stderr
#[derive(Debug, Clone, Copy)]
pub struct ConsoleOutput {
    color: bool,
}

impl ConsoleOutput {
    /// Create a console output
    pub fn new(color: bool) -> Self {
        Self { color }
    }
}

impl Default for ConsoleOutput {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Output for ConsoleOutput {
    fn write(&self, message: &str) {
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "{}", message);
    }

    fn write_error(&self, message: &str) {
        let mut stderr = std::io::stderr().lock();
        if self.color {
            let _ = writeln!(stderr, "{}", message.red());
        } else {
            let _ = writeln!(stderr, "{}", message);
        }
    }
}

/// A line captured by [`BufferOutput`]
#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Out(String),
    Err(String),
}

/// Captures output in memory
#[derive(Debug, Default)]
pub struct BufferOutput {
    lines: Mutex<Vec<Line>>,
}

impl BufferOutput {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all captured lines, status and error, in write order
    pub fn lines(&self) -> Vec<String> {
        self.lock()
            .iter()
            .map(|line| match line {
                Line::Out(s) | Line::Err(s) => s.clone(),
            })
            .collect()
    }

    /// Returns the lines written to the error channel
    pub fn errors(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|line| match line {
                Line::Err(s) => Some(s.clone()),
                Line::Out(_) => None,
            })
            .collect()
    }

    /// Returns all captured lines joined by newlines
    pub fn output(&self) -> String {
        self.lines().join("\n")
    }

    /// Removes all captured lines
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Line>> {
        self.lines.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Output for BufferOutput {
    fn write(&self, message: &str) {
        self.lock().push(Line::Out(message.to_string()));
    }

    fn write_error(&self, message: &str) {
        self.lock().push(Line::Err(message.to_string()));
    }
}
