//! Error types for profile parsing and validation.

use std::fmt;

use thiserror::Error;

/// Where in the input a validation problem was found.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationContext {
    /// Position in the candidate list
    Candidate { index: usize },
}

impl fmt::Display for ValidationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Candidate { index } => write!(f, "candidate #{}", index),
        }
    }
}

/// Validation diagnostic with optional context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDiagnostic {
    pub message: String,
    pub context: Option<ValidationContext>,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation error")?;
        if let Some(ctx) = &self.context {
            write!(f, " [{}]", ctx)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Errors that can occur while turning external records into profiles.
///
/// Missing or empty optional fields are never errors; they normalize to
/// empty category lists.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ProfileError {
    /// Input is not JSON, or a profile is not a JSON object.
    #[error("parse error: {0}")]
    ParseError(String),

    /// Semantic problem across profiles (e.g. duplicate candidate ids).
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Validation problem with context.
    #[error("{0}")]
    ValidationDiagnostic(ValidationDiagnostic),
}

impl ProfileError {
    /// Build a context-aware validation diagnostic.
    pub fn validation(message: impl Into<String>, context: Option<ValidationContext>) -> Self {
        Self::ValidationDiagnostic(ValidationDiagnostic {
            message: message.into(),
            context,
        })
    }

    /// Returns the validation diagnostic if present.
    pub fn validation_diagnostic(&self) -> Option<&ValidationDiagnostic> {
        match self {
            Self::ValidationDiagnostic(diag) => Some(diag),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ProfileError {
    fn from(err: serde_json::Error) -> Self {
        ProfileError::ParseError(err.to_string())
    }
}
