//! The user API contract suite, run end to end against a [`ReqresClient`].

use super::checks::{
    verify_created_user, verify_json_content_type, verify_single_user, verify_unique_ids,
    verify_user_page, ApiCheckError, CheckResult, CreateOutcome,
};
use super::client::ReqresClient;
use crate::fixtures::generate_new_user;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Number of users the batch check creates
pub const BATCH_SIZE: usize = 3;

/// Outcome of one contract check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractCheck {
    /// Check name
    pub name: String,
    /// Whether the contract held
    pub passed: bool,
    /// Summary or failure message
    pub detail: String,
    /// Wall time in milliseconds
    pub duration_ms: u64,
}

async fn timed<F>(name: &str, check: F) -> ContractCheck
where
    F: std::future::Future<Output = CheckResult<String>>,
{
    let start = Instant::now();
    let result = check.await;
    let duration_ms = start.elapsed().as_millis() as u64;
    match result {
        Ok(detail) => {
            tracing::info!(check = name, duration_ms, "contract held");
            ContractCheck {
                name: name.to_string(),
                passed: true,
                detail,
                duration_ms,
            }
        }
        Err(e) => {
            tracing::error!(check = name, error = %e, "contract violated");
            ContractCheck {
                name: name.to_string(),
                passed: false,
                detail: e.to_string(),
                duration_ms,
            }
        }
    }
}

/// `GET /users?page=2` shape
pub async fn check_list_users(client: &ReqresClient) -> CheckResult<String> {
    let response = client.list_users(2).await?;
    verify_user_page(&response, 2)?;
    Ok(format!(
        "{} users in total, first {}",
        response.body.total, response.body.data[0].email
    ))
}

/// `POST /users` echo and freshness
pub async fn check_create_user<R: Rng + ?Sized>(
    client: &ReqresClient,
    rng: &mut R,
) -> CheckResult<String> {
    let user = generate_new_user(rng);
    let response = client.create_user(&user).await?;
    Ok(match verify_created_user(&user, &response)? {
        CreateOutcome::Created(created) => format!("created {} as {}", user.name, created.id),
        CreateOutcome::RateLimited => "rate limited; body not checked".to_string(),
    })
}

/// `GET /users/2` structure
pub async fn check_single_user(client: &ReqresClient) -> CheckResult<String> {
    let response = client.get_user(2).await?;
    verify_single_user(&response, 2)?;
    Ok(format!("user 2 is {}", response.body.data.email))
}

/// Several creations yield distinct ids
pub async fn check_batch_create<R: Rng + ?Sized>(
    client: &ReqresClient,
    rng: &mut R,
) -> CheckResult<String> {
    let mut outcomes = Vec::with_capacity(BATCH_SIZE);
    for _ in 0..BATCH_SIZE {
        let user = generate_new_user(rng);
        let response = client.create_user(&user).await?;
        outcomes.push(verify_created_user(&user, &response)?);
    }
    let created = verify_unique_ids(&outcomes)?;
    Ok(format!("{created} of {BATCH_SIZE} created with unique ids"))
}

/// `GET /users?page=1` content type
pub async fn check_content_type(client: &ReqresClient) -> CheckResult<String> {
    let response = client.list_users(1).await?;
    if response.status != 200 {
        return Err(ApiCheckError::UnexpectedStatus {
            endpoint: response.endpoint,
            expected: vec![200],
            actual: response.status,
        });
    }
    verify_json_content_type(&response)?;
    Ok(response
        .header("content-type")
        .unwrap_or_default()
        .to_string())
}

/// Run every contract check in order; a failure does not stop the rest
pub async fn run_contract_suite<R: Rng + ?Sized>(
    client: &ReqresClient,
    rng: &mut R,
) -> Vec<ContractCheck> {
    vec![
        timed("list_users", check_list_users(client)).await,
        timed("create_user", check_create_user(client, rng)).await,
        timed("single_user", check_single_user(client)).await,
        timed("batch_create", check_batch_create(client, rng)).await,
        timed("content_type", check_content_type(client)).await,
    ]
}
