//! Error types for the CLI

use engine_shim::BindingError;
use thiserror::Error;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Binding or JavaScript execution error
    #[error("{0}")]
    JsError(#[from] BindingError),

    /// File I/O error
    #[error("File error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON output error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// REPL error
    #[error("REPL error: {0}")]
    ReplError(String),
}

impl CliError {
    /// Engine stack text, when the error came from a thrown exception
    pub fn stack(&self) -> Option<&str> {
        match self {
            CliError::JsError(e) => e.exception().and_then(|ex| ex.stack.as_deref()),
            _ => None,
        }
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
