//! HTTP client for the user API.

use super::models::{ApiResponse, CreatedUser, NewUser, SingleUser, UserPage};
use super::ApiError;
use crate::config::SuiteConfig;
use chrono::Utc;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::time::Duration;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the reqres user API
#[derive(Debug, Clone)]
pub struct ReqresClient {
    base_url: String,
    client: reqwest::Client,
    api_key: Option<String>,
}

impl ReqresClient {
    /// Create a client pointing at `base_url` (e.g. `https://reqres.in/api`)
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self::with_client(base_url, client)
    }

    /// Create a client with a custom reqwest client
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            api_key: None,
        }
    }

    /// Create a client from suite configuration
    pub fn from_config(config: &SuiteConfig) -> Self {
        let client = Self::new(&config.api_base_url);
        match &config.api_key {
            Some(key) => client.with_api_key(key),
            None => client,
        }
    }

    /// Send `x-api-key` with every request
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Returns the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{path}", self.base_url));
        match &self.api_key {
            Some(key) => builder.header("x-api-key", key),
            None => builder,
        }
    }

    async fn capture(
        path: &str,
        response: reqwest::Response,
    ) -> Result<ApiResponse<String>, ApiError> {
        let status = response.status().as_u16();
        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_ascii_lowercase(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        let body = response.text().await?;
        tracing::debug!(endpoint = path, status, bytes = body.len(), "response received");
        Ok(ApiResponse {
            endpoint: path.to_string(),
            status,
            headers,
            received_at: Utc::now(),
            body,
        })
    }

    fn decode<T: DeserializeOwned>(raw: ApiResponse<String>) -> Result<ApiResponse<T>, ApiError> {
        if !(200..300).contains(&raw.status) {
            return Err(ApiError::Status {
                endpoint: raw.endpoint,
                status: raw.status,
                body: raw.body,
            });
        }
        let parsed = serde_json::from_str::<T>(&raw.body).map_err(|e| ApiError::Decode {
            endpoint: raw.endpoint.clone(),
            status: raw.status,
            message: e.to_string(),
        })?;
        Ok(raw.map(|_| parsed))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>, ApiError> {
        tracing::info!(endpoint = path, "GET");
        let response = self.request(reqwest::Method::GET, path).send().await?;
        Self::decode(Self::capture(path, response).await?)
    }

    /// `GET /users?page=N`
    pub async fn list_users(&self, page: u32) -> Result<ApiResponse<UserPage>, ApiError> {
        self.get(&format!("/users?page={page}")).await
    }

    /// `GET /users/:id`
    pub async fn get_user(&self, id: u64) -> Result<ApiResponse<SingleUser>, ApiError> {
        self.get(&format!("/users/{id}")).await
    }

    /// `POST /users`.
    ///
    /// Any status is captured; the body is parsed only for 2xx answers so a
    /// rate-limited response can be told apart from a broken one.
    pub async fn create_user(
        &self,
        user: &NewUser,
    ) -> Result<ApiResponse<Option<CreatedUser>>, ApiError> {
        let path = "/users";
        tracing::info!(endpoint = path, name = %user.name, "POST");
        let response = self
            .request(reqwest::Method::POST, path)
            .json(user)
            .send()
            .await?;
        let raw = Self::capture(path, response).await?;
        if (200..300).contains(&raw.status) {
            Ok(Self::decode::<CreatedUser>(raw)?.map(Some))
        } else {
            Ok(raw.map(|_| None))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, Query};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    async fn list(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
        let page: u32 = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
        Json(json!({
            "page": page, "per_page": 6, "total": 12, "total_pages": 2,
            "data": [{"id": 7, "email": "michael.lawson@reqres.in", "first_name": "Michael",
                      "last_name": "Lawson", "avatar": "https://reqres.in/img/faces/7-image.jpg"}]
        }))
    }

    async fn single(Path(id): Path<u64>) -> (StatusCode, Json<Value>) {
        if id == 23 {
            return (StatusCode::NOT_FOUND, Json(json!({})));
        }
        (
            StatusCode::OK,
            Json(json!({
                "data": {"id": id, "email": "janet.weaver@reqres.in", "first_name": "Janet",
                         "last_name": "Weaver", "avatar": "https://reqres.in/img/faces/2-image.jpg"},
                "support": {"url": "https://contentcaddy.io", "text": "support text"}
            })),
        )
    }

    async fn create(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        if headers.get("x-api-key").is_none() {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "Missing API key"})),
            );
        }
        let mut created = body;
        created["id"] = json!("321");
        created["createdAt"] = json!(Utc::now().to_rfc3339());
        (StatusCode::CREATED, Json(created))
    }

    async fn spawn_stub() -> String {
        let app = Router::new()
            .route("/api/users", get(list).post(create))
            .route("/api/users/{id}", get(single));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/api/")
    }

    #[test]
    fn test_base_url_trimmed() {
        let client = ReqresClient::new("https://reqres.in/api/");
        assert_eq!(client.base_url(), "https://reqres.in/api");
    }

    #[test]
    fn test_from_config_carries_key() {
        let mut config = SuiteConfig::default();
        config.api_key = Some("k".to_string());
        let client = ReqresClient::from_config(&config);
        assert_eq!(client.api_key.as_deref(), Some("k"));
    }

    #[tokio::test]
    async fn test_list_users() {
        let client = ReqresClient::new(spawn_stub().await);
        let response = client.list_users(2).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body.page, 2);
        assert!(response
            .header("content-type")
            .is_some_and(|v| v.contains("application/json")));
    }

    #[tokio::test]
    async fn test_get_user_and_not_found() {
        let client = ReqresClient::new(spawn_stub().await);
        let response = client.get_user(2).await.unwrap();
        assert_eq!(response.body.data.id, 2);
        match client.get_user(23).await.unwrap_err() {
            ApiError::Status { status, .. } => assert_eq!(status, 404),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_user_with_and_without_key() {
        let base = spawn_stub().await;
        let user = NewUser::new("Ava Turner", "engineer");

        let limited = ReqresClient::new(&base).create_user(&user).await.unwrap();
        assert_eq!(limited.status, 401);
        assert!(limited.body.is_none());

        let created = ReqresClient::new(&base)
            .with_api_key("reqres-free-v1")
            .create_user(&user)
            .await
            .unwrap();
        assert_eq!(created.status, 201);
        let body = created.body.unwrap();
        assert_eq!(body.name.as_deref(), Some("Ava Turner"));
        assert_eq!(body.id.to_string(), "321");
    }
}
