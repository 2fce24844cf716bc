//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Run finished but some checks failed
    #[error("{failed} of {total} checks failed")]
    ChecksFailed {
        /// Failed checks
        failed: usize,
        /// All checks
        total: usize,
    },

    /// Feature not compiled in
    #[error("{feature} support not enabled. Rebuild with --features {feature}")]
    FeatureDisabled {
        /// Cargo feature name
        feature: &'static str,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Library error
    #[error("Form error: {0}")]
    Form(#[from] formprobe::FormError),

    /// Report serialisation error
    #[error("Report generation failed: {0}")]
    Report(#[from] serde_json::Error),

    /// Config serialisation error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Process exit code for this error
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::ChecksFailed { .. } => 1,
            _ => 2,
        }
    }
}
