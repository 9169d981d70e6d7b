//! Scan diagnostics and the logger collaborator that receives them.
//!
//! The scanner never prints. Everything it has to say (skipped files,
//! unsupported props, per-file failures) is a [`Diagnostic`] handed to a
//! [`ScanLogger`]. The default [`TracingLogger`] forwards to `tracing`.

use std::fmt;
use std::path::{Path, PathBuf};

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Debug => write!(f, "debug"),
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A diagnostic message with structured context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Key/value context, in insertion order
    pub context: Vec<(String, String)>,
    /// Related location (file path)
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity,
            context: Vec::new(),
            location: None,
        }
    }

    pub fn debug(message: impl Into<String>) -> Self {
        Self::new(Severity::Debug, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Add a context field to the diagnostic.
    pub fn with_context(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.context.push((key.into(), value.to_string()));
        self
    }

    /// Add a file location.
    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Look up a context field by key.
    pub fn context_value(&self, key: &str) -> Option<&str> {
        self.context
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref path) = self.location {
            write!(f, " ({})", path.display())?;
        }
        for (key, value) in &self.context {
            write!(f, " {}={}", key, value)?;
        }
        Ok(())
    }
}

/// Receives diagnostics from the scanner.
pub trait ScanLogger: Send + Sync {
    fn log(&self, diagnostic: &Diagnostic);
}

/// Default logger: forwards each diagnostic to `tracing` at its severity.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl ScanLogger for TracingLogger {
    fn log(&self, diagnostic: &Diagnostic) {
        match diagnostic.severity {
            Severity::Debug => tracing::debug!("{}", diagnostic),
            Severity::Info => tracing::info!("{}", diagnostic),
            Severity::Warning => tracing::warn!("{}", diagnostic),
            Severity::Error => tracing::error!("{}", diagnostic),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_formatting() {
        let diag = Diagnostic::warning("Unsupported prop type")
            .with_context("component", "Button")
            .with_context("prop", "theme")
            .with_location("src/Button.tsx");

        assert_eq!(diag.severity, Severity::Warning);
        assert_eq!(
            diag.to_string(),
            "Unsupported prop type (src/Button.tsx) component=Button prop=theme"
        );
    }

    #[test]
    fn test_context_value() {
        let diag = Diagnostic::info("Ignoring file").with_context("pattern", "**/legacy/**");
        assert_eq!(diag.context_value("pattern"), Some("**/legacy/**"));
        assert_eq!(diag.context_value("missing"), None);
    }
}
