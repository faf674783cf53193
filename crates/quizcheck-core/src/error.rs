//! Checker error types.
//!
//! Two layers of failure exist in this system: malformed answer text handed
//! to a value parser (`ParseError`), and anything that goes wrong while a
//! checker snippet is compiled or evaluated (`CheckError`). Both are defined
//! here so the sandbox and the grading engine can classify failures without
//! string matching.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Malformed answer text handed to a value parser.
///
/// Always recoverable; the message is human-readable and shown to the quiz
/// author verbatim (the distance/angle parsers produce localized messages,
/// matching what this tool's audience expects).
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ParseError {
    /// Human-readable description of what failed to parse.
    pub message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Classification of a sandbox-boundary failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckErrorKind {
    /// A value parser rejected the text it was given.
    ParseError,
    /// The snippet referenced a name outside its allow-list.
    CapabilityViolation,
    /// The step budget or wall-clock budget was exceeded.
    Timeout,
    /// Anything else: syntax errors, type misuse, arithmetic faults.
    Internal,
}

impl fmt::Display for CheckErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckErrorKind::ParseError => write!(f, "parse_error"),
            CheckErrorKind::CapabilityViolation => write!(f, "capability_violation"),
            CheckErrorKind::Timeout => write!(f, "timeout"),
            CheckErrorKind::Internal => write!(f, "internal"),
        }
    }
}

/// A failure produced while evaluating a checker snippet.
///
/// Surfaced to the orchestrator as part of the verdict, never as a panic or
/// an unhandled fault; one faulty snippet must not affect any other
/// submission.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct CheckError {
    pub kind: CheckErrorKind,
    pub message: String,
}

impl CheckError {
    pub fn new(kind: CheckErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn capability(message: impl Into<String>) -> Self {
        Self::new(CheckErrorKind::CapabilityViolation, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(CheckErrorKind::Timeout, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(CheckErrorKind::Internal, message)
    }
}

impl From<ParseError> for CheckError {
    fn from(e: ParseError) -> Self {
        Self::new(CheckErrorKind::ParseError, e.message)
    }
}

/// A checker snippet that could not be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnippetError {
    /// The snippet text does not match the checker grammar.
    #[error("syntax error at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },

    /// The snippet references a name that is not a builtin, a binding, or a
    /// variable assigned earlier in the snippet.
    #[error("name '{name}' is not available to checker code")]
    UnknownName { name: String },
}

impl From<SnippetError> for CheckError {
    fn from(e: SnippetError) -> Self {
        match e {
            SnippetError::UnknownName { .. } => Self::capability(e.to_string()),
            SnippetError::Syntax { .. } => Self::internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_display_matches_wire_names() {
        assert_eq!(CheckErrorKind::ParseError.to_string(), "parse_error");
        assert_eq!(
            CheckErrorKind::CapabilityViolation.to_string(),
            "capability_violation"
        );
        assert_eq!(CheckErrorKind::Timeout.to_string(), "timeout");
        assert_eq!(CheckErrorKind::Internal.to_string(), "internal");
    }

    #[test]
    fn parse_error_converts_with_original_message() {
        let parse = ParseError::new("Неверный формат расстояния: 'abc'");
        let check: CheckError = parse.into();
        assert_eq!(check.kind, CheckErrorKind::ParseError);
        assert!(check.message.contains("Неверный формат"));
    }

    #[test]
    fn unknown_name_is_capability_violation() {
        let err = SnippetError::UnknownName {
            name: "open".into(),
        };
        let check: CheckError = err.into();
        assert_eq!(check.kind, CheckErrorKind::CapabilityViolation);
        assert!(check.message.contains("open"));
    }

    #[test]
    fn kind_serde_roundtrip() {
        let json = serde_json::to_string(&CheckErrorKind::Timeout).unwrap();
        assert_eq!(json, "\"timeout\"");
        let back: CheckErrorKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, CheckErrorKind::Timeout);
    }
}
