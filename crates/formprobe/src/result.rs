//! Result and error types for formprobe.

use thiserror::Error;

/// Result type for form interaction operations
pub type FormResult<T> = Result<T, FormError>;

/// Kind of fixed-set choice control that rejected a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceKind {
    /// Gender radio group
    Gender,
    /// Hobby checkbox group
    Hobby,
}

impl std::fmt::Display for ChoiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gender => write!(f, "gender"),
            Self::Hobby => write!(f, "hobby"),
        }
    }
}

/// Errors that can occur while driving the practice form
#[derive(Debug, Error)]
pub enum FormError {
    /// Value outside a fixed choice set; raised before anything is clicked
    #[error("Invalid {kind}: {value}")]
    InvalidChoice {
        /// Which control rejected the value
        kind: ChoiceKind,
        /// The rejected value
        value: String,
    },

    /// A record field failed precondition validation
    #[error("Validation failed for {field}: {reason}")]
    ValidationFailure {
        /// Field name
        field: String,
        /// Why it was rejected
        reason: String,
    },

    /// A required element or state did not appear in time
    #[error("Timed out after {ms}ms waiting for {waited_for}")]
    AssertionTimeout {
        /// What was being waited for
        waited_for: String,
        /// Budget in milliseconds
        ms: u64,
    },

    /// The confirmation surface echoed a different value
    #[error("{field} mismatch - expected {expected:?}, confirmation shows {actual:?}")]
    MismatchFailure {
        /// Field name
        field: String,
        /// Value derived from the record or the form
        expected: String,
        /// Value read from the confirmation table
        actual: String,
    },

    /// A field still held the wrong value after every fill attempt
    #[error("{field} still reads {actual:?} after {attempts} fill attempts (wanted {expected:?})")]
    RetryExhausted {
        /// Field name
        field: String,
        /// Intended value
        expected: String,
        /// Last readback
        actual: String,
        /// Number of fill attempts made
        attempts: u32,
    },

    /// Layout table has no selector for a control
    #[error("No selector configured for control {control}")]
    UnknownControl {
        /// Control name
        control: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunchError {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    NavigationError {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Element could not be found or acted upon
    #[error("Element {selector} unavailable: {message}")]
    ElementError {
        /// Selector that failed
        selector: String,
        /// Error message
        message: String,
    },

    /// Script evaluation error
    #[error("Script evaluation failed: {message}")]
    ScriptError {
        /// Error message
        message: String,
    },

    /// Input simulation error
    #[error("Input simulation failed: {message}")]
    InputError {
        /// Error message
        message: String,
    },

    /// Screenshot error
    #[error("Screenshot failed: {message}")]
    ScreenshotError {
        /// Error message
        message: String,
    },

    /// Configuration could not be loaded
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl FormError {
    /// Create a validation failure
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ValidationFailure {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an element error
    #[must_use]
    pub fn element(selector: impl std::fmt::Display, message: impl Into<String>) -> Self {
        Self::ElementError {
            selector: selector.to_string(),
            message: message.into(),
        }
    }

    /// Precondition failures are raised before the page is touched
    #[must_use]
    pub const fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::InvalidChoice { .. } | Self::ValidationFailure { .. }
        )
    }
}
