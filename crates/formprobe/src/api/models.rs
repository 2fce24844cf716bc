//! Request and response bodies of the user API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A user as listed by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Identifier
    pub id: u64,
    /// Email address
    pub email: String,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Avatar URL
    pub avatar: String,
}

/// Support banner attached to GET responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Support {
    /// Link
    pub url: String,
    /// Banner text
    pub text: String,
}

/// `GET /users?page=N`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPage {
    /// Page number echoed back
    pub page: u32,
    /// Page size
    pub per_page: u32,
    /// Total users
    pub total: u32,
    /// Total pages
    pub total_pages: u32,
    /// Users on this page
    pub data: Vec<User>,
    /// Support banner
    #[serde(default)]
    pub support: Option<Support>,
}

/// `GET /users/:id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleUser {
    /// The user
    pub data: User,
    /// Support banner
    pub support: Support,
}

/// `POST /users` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    /// Full name
    pub name: String,
    /// Job title
    pub job: String,
}

impl NewUser {
    /// Create a payload
    #[must_use]
    pub fn new(name: impl Into<String>, job: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            job: job.into(),
        }
    }
}

/// Server-assigned identifier; the sandbox returns strings, other hosts numbers
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    /// Numeric id
    Number(u64),
    /// String id
    Text(String),
}

impl ResourceId {
    /// Blank ids count as missing
    #[must_use]
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(s) if s.trim().is_empty())
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// `POST /users` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedUser {
    /// Assigned identifier
    pub id: ResourceId,
    /// Echoed name
    #[serde(default)]
    pub name: Option<String>,
    /// Echoed job
    #[serde(default)]
    pub job: Option<String>,
    /// Creation timestamp, RFC 3339
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

/// A captured response
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    /// Request path, relative to the base URL
    pub endpoint: String,
    /// HTTP status code
    pub status: u16,
    /// Headers with lower-cased names
    pub headers: BTreeMap<String, String>,
    /// When the response arrived
    pub received_at: DateTime<Utc>,
    /// Parsed body
    pub body: T,
}

impl<T> ApiResponse<T> {
    /// Header value by name, case-insensitive
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Swap the body, keeping the envelope
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            endpoint: self.endpoint,
            status: self.status,
            headers: self.headers,
            received_at: self.received_at,
            body: f(self.body),
        }
    }
}
