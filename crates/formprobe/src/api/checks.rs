//! Contract assertions over captured API responses.
//!
//! Every check is a pure function of a response so it can run against the
//! live sandbox or a stub alike.

use super::models::{ApiResponse, CreatedUser, NewUser, ResourceId, SingleUser, UserPage};
use super::ApiError;
use crate::validators::validate_email;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

/// Statuses a create request may answer with; 401 means rate limited
pub const ACCEPTED_CREATE_STATUSES: [u16; 3] = [200, 201, 401];

/// Status the sandbox uses when it rate limits
pub const RATE_LIMITED_STATUS: u16 = 401;

/// Largest accepted gap between `createdAt` and receipt of the response
pub const MAX_CREATED_AGE_MS: i64 = 60_000;

/// Result type for contract checks
pub type CheckResult<T> = Result<T, ApiCheckError>;

/// A violated API contract
#[derive(Debug, thiserror::Error)]
pub enum ApiCheckError {
    /// The request itself failed
    #[error(transparent)]
    Request(#[from] ApiError),

    /// Status outside the accepted set
    #[error("{endpoint} answered {actual}, expected one of {expected:?}")]
    UnexpectedStatus {
        /// Request path
        endpoint: String,
        /// Accepted statuses
        expected: Vec<u16>,
        /// Received status
        actual: u16,
    },

    /// Body is missing something the contract requires
    #[error("{endpoint}: {message}")]
    Shape {
        /// Request path
        endpoint: String,
        /// What is wrong
        message: String,
    },

    /// Body echoes a different value
    #[error("{field} mismatch - sent {expected:?}, got {actual:?}")]
    Mismatch {
        /// Field name
        field: String,
        /// Value sent or expected
        expected: String,
        /// Value received
        actual: String,
    },

    /// `createdAt` is too old or unparseable
    #[error("createdAt {created_at:?} is not recent: {reason}")]
    Stale {
        /// Raw timestamp
        created_at: String,
        /// Why it was rejected
        reason: String,
    },

    /// Two creations returned the same id
    #[error("duplicate id {id}")]
    DuplicateId {
        /// The repeated id
        id: String,
    },

    /// Content type is not JSON
    #[error("content-type {actual:?} does not contain application/json")]
    ContentType {
        /// Received header value, empty if absent
        actual: String,
    },
}

/// Outcome of a create request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// Created and echoed correctly
    Created(CreatedUser),
    /// Rate limited; nothing further checked
    RateLimited,
}

impl CreateOutcome {
    /// Id of a created user
    #[must_use]
    pub const fn id(&self) -> Option<&ResourceId> {
        match self {
            Self::Created(user) => Some(&user.id),
            Self::RateLimited => None,
        }
    }
}

fn expect_status<T>(response: &ApiResponse<T>, expected: &[u16]) -> CheckResult<()> {
    if expected.contains(&response.status) {
        Ok(())
    } else {
        Err(ApiCheckError::UnexpectedStatus {
            endpoint: response.endpoint.clone(),
            expected: expected.to_vec(),
            actual: response.status,
        })
    }
}

fn shape<T>(response: &ApiResponse<T>, message: impl Into<String>) -> ApiCheckError {
    ApiCheckError::Shape {
        endpoint: response.endpoint.clone(),
        message: message.into(),
    }
}

/// `GET /users?page=N`: 200, page echoed, non-empty data, well-formed emails
pub fn verify_user_page(response: &ApiResponse<UserPage>, expected_page: u32) -> CheckResult<()> {
    expect_status(response, &[200])?;
    let page = &response.body;
    if page.page != expected_page {
        return Err(ApiCheckError::Mismatch {
            field: "page".to_string(),
            expected: expected_page.to_string(),
            actual: page.page.to_string(),
        });
    }
    if page.data.is_empty() {
        return Err(shape(response, "data is empty"));
    }
    if let Some(user) = page.data.iter().find(|u| !validate_email(&u.email)) {
        return Err(shape(
            response,
            format!("user {} has malformed email {:?}", user.id, user.email),
        ));
    }
    tracing::info!(total = page.total, first_email = %page.data[0].email, "user page verified");
    Ok(())
}

/// `GET /users/:id`: 200, id echoed, support banner present
pub fn verify_single_user(response: &ApiResponse<SingleUser>, expected_id: u64) -> CheckResult<()> {
    expect_status(response, &[200])?;
    let body = &response.body;
    if body.data.id != expected_id {
        return Err(ApiCheckError::Mismatch {
            field: "id".to_string(),
            expected: expected_id.to_string(),
            actual: body.data.id.to_string(),
        });
    }
    if body.support.url.is_empty() || body.support.text.is_empty() {
        return Err(shape(response, "support url or text is empty"));
    }
    Ok(())
}

/// `POST /users`: status accepted, 401 short-circuits; otherwise id present,
/// name and job echoed, `createdAt` within a minute of receipt
pub fn verify_created_user(
    sent: &NewUser,
    response: &ApiResponse<Option<CreatedUser>>,
) -> CheckResult<CreateOutcome> {
    expect_status(response, &ACCEPTED_CREATE_STATUSES)?;
    if response.status == RATE_LIMITED_STATUS {
        tracing::warn!(endpoint = %response.endpoint, "rate limited, skipping body checks");
        return Ok(CreateOutcome::RateLimited);
    }
    let created = response
        .body
        .clone()
        .ok_or_else(|| shape(response, "missing body"))?;
    if created.id.is_blank() {
        return Err(shape(response, "id is blank"));
    }
    for (field, want, got) in [
        ("name", &sent.name, &created.name),
        ("job", &sent.job, &created.job),
    ] {
        if got.as_deref() != Some(want.as_str()) {
            return Err(ApiCheckError::Mismatch {
                field: field.to_string(),
                expected: want.clone(),
                actual: got.clone().unwrap_or_default(),
            });
        }
    }

    let created_at = DateTime::parse_from_rfc3339(&created.created_at).map_err(|e| {
        ApiCheckError::Stale {
            created_at: created.created_at.clone(),
            reason: e.to_string(),
        }
    })?;
    let age_ms = (response.received_at - created_at.with_timezone(&Utc)).num_milliseconds();
    if age_ms >= MAX_CREATED_AGE_MS {
        return Err(ApiCheckError::Stale {
            created_at: created.created_at.clone(),
            reason: format!("{age_ms}ms old"),
        });
    }
    tracing::info!(id = %created.id, name = %sent.name, "user created");
    Ok(CreateOutcome::Created(created))
}

/// Ids of the created users are pairwise distinct; returns how many were created
pub fn verify_unique_ids(outcomes: &[CreateOutcome]) -> CheckResult<usize> {
    let mut seen = BTreeSet::new();
    for id in outcomes.iter().filter_map(CreateOutcome::id) {
        if !seen.insert(id) {
            return Err(ApiCheckError::DuplicateId { id: id.to_string() });
        }
    }
    Ok(seen.len())
}

/// `content-type` contains `application/json`
pub fn verify_json_content_type<T>(response: &ApiResponse<T>) -> CheckResult<()> {
    let actual = response.header("content-type").unwrap_or_default();
    if actual.contains("application/json") {
        Ok(())
    } else {
        Err(ApiCheckError::ContentType {
            actual: actual.to_string(),
        })
    }
}
