//! Error types for layout resolution and rendering.
//!
//! [`RenderError`] abstracts over the underlying template engine's errors so
//! the public API stays stable regardless of backend details.

use thiserror::Error;

/// Error type for rendering operations.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Template not found under any registered namespace.
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    /// Template syntax error or evaluation failure.
    #[error("template error: {0}")]
    Template(String),

    /// Context or data serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error (e.g., reading a template from disk).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Other operational error.
    #[error("{0}")]
    Operation(String),
}

impl From<minijinja::Error> for RenderError {
    fn from(err: minijinja::Error) -> Self {
        use minijinja::ErrorKind;

        match err.kind() {
            ErrorKind::TemplateNotFound => RenderError::TemplateNotFound(err.to_string()),
            ErrorKind::SyntaxError
            | ErrorKind::BadEscape
            | ErrorKind::UndefinedError
            | ErrorKind::UnknownTest
            | ErrorKind::UnknownFunction
            | ErrorKind::UnknownFilter
            | ErrorKind::UnknownMethod => RenderError::Template(err.to_string()),
            ErrorKind::BadSerialization => RenderError::Serialization(err.to_string()),
            _ => RenderError::Operation(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for RenderError {
    fn from(err: serde_json::Error) -> Self {
        RenderError::Serialization(err.to_string())
    }
}
