//! REST contract checks against the reqres user API.
//!
//! - [`models`]: typed request and response bodies
//! - [`client`]: reqwest-backed client (feature `api`)
//! - [`checks`]: pure assertions over captured responses
//! - [`suite`]: the five contract checks run end to end (feature `api`)

pub mod checks;
#[cfg(feature = "api")]
pub mod client;
pub mod models;
#[cfg(feature = "api")]
pub mod suite;

pub use checks::{ApiCheckError, CheckResult, CreateOutcome};
#[cfg(feature = "api")]
pub use client::ReqresClient;
pub use models::{
    ApiResponse, CreatedUser, NewUser, ResourceId, SingleUser, Support, User, UserPage,
};

/// Errors from issuing a request
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Transport failure
    #[cfg(feature = "api")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with an unexpected status
    #[error("{endpoint} answered {status}: {body}")]
    Status {
        /// Request path
        endpoint: String,
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// Body did not parse into the expected shape
    #[error("{endpoint} returned an unexpected body ({status}): {message}")]
    Decode {
        /// Request path
        endpoint: String,
        /// HTTP status code
        status: u16,
        /// Parser message
        message: String,
    },
}
