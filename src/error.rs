//! Error Handling Module
//!
//! This module provides the error taxonomy shared across the goforge engine.
//! Every fatal failure of a generation run is one of these variants; the
//! orchestrator maps each to a rollback decision and the front-end renders
//! them by kind.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for all engine operations
#[derive(Debug, Error)]
pub enum GoforgeError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Blueprint '{id}' not found. Available blueprints: {}", known.join(", "))]
    TemplateNotFound { id: String, known: Vec<String> },

    #[error("Template error in '{file}': {message}")]
    Template { file: String, message: String },

    #[error("Filesystem error at '{}': {source}", path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to add dependency '{module}': {message}")]
    Dependency { module: String, message: String },

    // Hook and VCS failures exist in the taxonomy for callers that probe
    // them directly; the engine itself downgrades both to warnings.
    #[error("Hook '{name}' failed: {message}")]
    Hook { name: String, message: String },

    #[error("VCS operation failed: {0}")]
    Vcs(String),

    #[error("Invalid blueprint descriptor '{file}': {message}")]
    Descriptor { file: String, message: String },
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, GoforgeError>;

/// Coarse error categories, mirroring the variants without their payloads.
///
/// The front-end renders errors by category; tests assert on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    TemplateNotFound,
    Template,
    FileSystem,
    Dependency,
    Hook,
    Vcs,
    Descriptor,
}

impl GoforgeError {
    /// The category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GoforgeError::Validation(_) => ErrorKind::Validation,
            GoforgeError::TemplateNotFound { .. } => ErrorKind::TemplateNotFound,
            GoforgeError::Template { .. } => ErrorKind::Template,
            GoforgeError::FileSystem { .. } => ErrorKind::FileSystem,
            GoforgeError::Dependency { .. } => ErrorKind::Dependency,
            GoforgeError::Hook { .. } => ErrorKind::Hook,
            GoforgeError::Vcs(_) => ErrorKind::Vcs,
            GoforgeError::Descriptor { .. } => ErrorKind::Descriptor,
        }
    }

    /// Create a validation error from any displayable reason.
    pub fn validation(message: impl Into<String>) -> Self {
        GoforgeError::Validation(message.into())
    }

    /// Create a template error tied to the file being expanded.
    pub fn template(file: impl Into<String>, message: impl Into<String>) -> Self {
        GoforgeError::Template {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create a filesystem error tied to the path that failed.
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GoforgeError::FileSystem {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            GoforgeError::validation("name is empty").kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            GoforgeError::template("go.mod.tmpl", "unclosed block").kind(),
            ErrorKind::Template
        );
        assert_eq!(
            GoforgeError::Dependency {
                module: "github.com/gin-gonic/gin".to_string(),
                message: "exit status 1".to_string(),
            }
            .kind(),
            ErrorKind::Dependency
        );
    }

    #[test]
    fn test_not_found_lists_known_ids() {
        let err = GoforgeError::TemplateNotFound {
            id: "web-apo".to_string(),
            known: vec!["cli".to_string(), "web-api".to_string()],
        };
        let rendered = err.to_string();
        assert!(rendered.contains("web-apo"));
        assert!(rendered.contains("cli, web-api"));
    }
}
