//! Error types for the scenario runner
//!
//! Step errors carry enough context (role, name, expected vs actual) for the
//! report to be read without re-running the scenario. Everything else is
//! infrastructure: bad scenario files, unreadable config, IO.

use std::fmt;
use std::io;

use serde::Serialize;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the scenario runner
#[derive(Error, Debug)]
pub enum Error {
    // === Step Errors ===
    #[error("Navigation to '{url}' failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("No {role} named '{name}' appeared within {waited_ms}ms")]
    ElementNotFound {
        role: String,
        name: String,
        waited_ms: u64,
    },

    #[error("Locator {role} '{name}' is ambiguous: {count} elements match")]
    AmbiguousLocator {
        role: String,
        name: String,
        count: usize,
    },

    #[error("Cannot {action} {target}: {reason}")]
    Interaction {
        action: String,
        target: String,
        reason: String,
    },

    #[error("{subject}: expected {expected}, got {actual}")]
    Assertion {
        subject: String,
        expected: String,
        actual: String,
    },

    #[error("Scenario cancelled")]
    Cancelled,

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Invalid scenario '{path}': {reason}")]
    InvalidScenario { path: String, reason: String },

    #[error("{failed} of {total} scenarios failed")]
    ScenariosFailed { failed: usize, total: usize },

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Internal Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Kind of a step failure, as reported in a scenario outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    #[serde(rename = "NavigationError")]
    Navigation,
    #[serde(rename = "LocatorError")]
    Locator,
    #[serde(rename = "InteractionError")]
    Interaction,
    #[serde(rename = "AssertionError")]
    Assertion,
    Cancelled,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Navigation => "NavigationError",
            ErrorKind::Locator => "LocatorError",
            ErrorKind::Interaction => "InteractionError",
            ErrorKind::Assertion => "AssertionError",
            ErrorKind::Cancelled => "Cancelled",
        };
        f.write_str(name)
    }
}

impl Error {
    /// Step failure kind, or `None` for infrastructure errors
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Error::Navigation { .. } => Some(ErrorKind::Navigation),
            Error::ElementNotFound { .. } | Error::AmbiguousLocator { .. } => {
                Some(ErrorKind::Locator)
            }
            Error::Interaction { .. } => Some(ErrorKind::Interaction),
            Error::Assertion { .. } => Some(ErrorKind::Assertion),
            Error::Cancelled => Some(ErrorKind::Cancelled),
            _ => None,
        }
    }

    /// Create a navigation error
    pub fn navigation(url: &str, reason: impl Into<String>) -> Self {
        Self::Navigation {
            url: url.to_string(),
            reason: reason.into(),
        }
    }

    /// Create an interaction error
    pub fn interaction(action: &str, target: impl fmt::Display, reason: impl Into<String>) -> Self {
        Self::Interaction {
            action: action.to_string(),
            target: target.to_string(),
            reason: reason.into(),
        }
    }

    /// Create an assertion error from an expected/actual pair
    pub fn assertion(
        subject: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::Assertion {
            subject: subject.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create an invalid scenario error
    pub fn invalid_scenario(path: impl fmt::Display, reason: impl Into<String>) -> Self {
        Self::InvalidScenario {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_errors_have_kinds() {
        assert_eq!(
            Error::navigation("http://x/", "unreachable").kind(),
            Some(ErrorKind::Navigation)
        );
        let not_found = Error::ElementNotFound {
            role: "textbox".into(),
            name: "Enter email".into(),
            waited_ms: 10,
        };
        assert_eq!(not_found.kind(), Some(ErrorKind::Locator));
        let ambiguous = Error::AmbiguousLocator {
            role: "radio".into(),
            name: "Daily".into(),
            count: 2,
        };
        assert_eq!(ambiguous.kind(), Some(ErrorKind::Locator));
        assert_eq!(Error::Cancelled.kind(), Some(ErrorKind::Cancelled));
    }

    #[test]
    fn test_infrastructure_errors_have_no_kind() {
        assert_eq!(Error::Config("x".into()).kind(), None);
        assert_eq!(Error::Internal("x".into()).kind(), None);
    }

    #[test]
    fn test_assertion_message_shows_both_sides() {
        let e = Error::assertion("value of textbox 'Enter city'", "'kyiv'", "'lviv'");
        assert_eq!(
            e.to_string(),
            "value of textbox 'Enter city': expected 'kyiv', got 'lviv'"
        );
    }

    #[test]
    fn test_kind_display_uses_report_names() {
        assert_eq!(ErrorKind::Assertion.to_string(), "AssertionError");
        assert_eq!(
            serde_json::to_string(&ErrorKind::Locator).unwrap(),
            "\"LocatorError\""
        );
    }

    #[test]
    fn test_output_errors_are_not_step_failures() {
        let err = Error::from(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.kind(), None);
        assert_eq!(err.to_string(), "IO error: closed");
    }
}
