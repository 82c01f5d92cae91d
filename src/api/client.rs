//! HTTP client for the micro-blogging backend REST API.
//!
//! Every piece of application state lives server-side; this client is the
//! only path to it. Requests carry an optional bearer token, bodies are
//! JSON, and list endpoints wrap their rows in an `{items, count?}`
//! envelope.

use std::time::Duration;

use reqwest::{header, Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::models::{Comment, CountResponse, Like, Page, Post, User, UserUpdate};

use super::ApiError;

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Response to POST /auth/login. Either a full session (`token` + `user`)
/// or a short-lived `temp_token` when the account has TOTP enabled.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub requires_otp: bool,
    #[serde(default)]
    pub temp_token: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

/// Response to POST /auth/verify-otp: the full session credential.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSuccess {
    pub token: String,
    pub user: User,
}

/// Response to POST /auth/register. The caller derives an `otpauth://` URI
/// from `otp_secret` so the user can enroll an authenticator app.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    pub user: User,
    pub otp_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
struct MeResponse {
    user: User,
}

/// Response to GET /auth/otp/status.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct OtpStatus {
    #[serde(default, alias = "otp_enabled")]
    pub enabled: bool,
}

/// API client for the backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new unauthenticated client for the given base URL
    /// (e.g. `http://localhost:4000/api`).
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Create a client with the given token, sharing the connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn auth_headers(&self) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = self.token {
            let mut value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ApiError::InvalidResponse(format!("invalid token header: {e}")))?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<serde_json::Value>,
    ) -> Result<reqwest::Response, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, path, "API request");

        let mut req = self
            .client
            .request(method, &url)
            .headers(self.auth_headers()?)
            .query(query);
        if let Some(body) = body {
            req = req.json(&body);
        }

        let response = req.send().await?;
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<serde_json::Value>,
    ) -> Result<T, ApiError> {
        let response = self.send(method, path, query, body).await?;

        // 204/205 carry no body
        if response.status() == StatusCode::NO_CONTENT
            || response.status() == StatusCode::RESET_CONTENT
        {
            return serde_json::from_value(json!({}))
                .map_err(|e| ApiError::InvalidResponse(e.to_string()));
        }

        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("{path}: {e}")))
    }

    /// Issue a request whose response body the caller does not care about.
    async fn request_empty(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<(), ApiError> {
        self.send(method, path, &[], body).await?;
        Ok(())
    }

    // ===== Auth =====

    /// Login step 1: submit username + password. The caller inspects the
    /// response to see whether a second factor is required.
    pub async fn login_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LoginResponse, ApiError> {
        self.request(
            Method::POST,
            "/auth/login",
            &[],
            Some(json!({ "username": username, "password": password })),
        )
        .await
    }

    /// Login step 2: exchange the temp token and a TOTP code for a full
    /// session credential.
    pub async fn verify_otp(&self, temp_token: &str, code: &str) -> Result<AuthSuccess, ApiError> {
        self.request(
            Method::POST,
            "/auth/verify-otp",
            &[],
            Some(json!({ "temp_token": temp_token, "otp_token": code })),
        )
        .await
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<RegisterResponse, ApiError> {
        self.request(
            Method::POST,
            "/auth/register",
            &[],
            Some(json!({ "username": username, "email": email, "password": password })),
        )
        .await
    }

    /// Fetch the user owning the current token.
    pub async fn fetch_me(&self) -> Result<User, ApiError> {
        let me: MeResponse = self.request(Method::GET, "/auth/me", &[], None).await?;
        Ok(me.user)
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        self.request_empty(Method::POST, "/auth/logout", None).await
    }

    pub async fn fetch_otp_status(&self) -> Result<OtpStatus, ApiError> {
        self.request(Method::GET, "/auth/otp/status", &[], None).await
    }

    // ===== Posts =====

    /// Fetch the feed, optionally filtered to one author.
    pub async fn fetch_posts(&self, user_id: Option<&str>) -> Result<Vec<Post>, ApiError> {
        let mut query = Vec::new();
        if let Some(user_id) = user_id {
            query.push(("user_id", user_id.to_string()));
        }
        let page: Page<Post> = self.request(Method::GET, "/posts", &query, None).await?;
        Ok(page.items)
    }

    pub async fn fetch_post(&self, id: &str) -> Result<Post, ApiError> {
        self.request(Method::GET, &format!("/posts/{id}"), &[], None)
            .await
    }

    pub async fn fetch_user_post_count(&self, user_id: &str) -> Result<u64, ApiError> {
        let count: CountResponse = self
            .request(
                Method::GET,
                "/posts",
                &[("user_id", user_id.to_string()), ("count", "true".to_string())],
                None,
            )
            .await?;
        Ok(count.count)
    }

    pub async fn create_post(&self, content: &str) -> Result<(), ApiError> {
        self.request_empty(Method::POST, "/posts", Some(json!({ "content": content })))
            .await
    }

    pub async fn update_post(&self, id: &str, content: &str) -> Result<(), ApiError> {
        self.request_empty(
            Method::PATCH,
            &format!("/posts/{id}"),
            Some(json!({ "content": content })),
        )
        .await
    }

    pub async fn delete_post(&self, id: &str) -> Result<(), ApiError> {
        self.request_empty(Method::DELETE, &format!("/posts/{id}"), None)
            .await
    }

    // ===== Comments =====

    /// Fetch comments, optionally filtered to one post. `limit` raises the
    /// server's page size (used by the fetch-all fallback in `crate::feed`).
    pub async fn fetch_comments(
        &self,
        post_id: Option<&str>,
        limit: Option<u64>,
    ) -> Result<Page<Comment>, ApiError> {
        let mut query = Vec::new();
        if let Some(post_id) = post_id {
            query.push(("post_id", post_id.to_string()));
        }
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }
        self.request(Method::GET, "/comments", &query, None).await
    }

    pub async fn fetch_comment_count(&self, post_id: &str) -> Result<u64, ApiError> {
        let count: CountResponse = self
            .request(
                Method::GET,
                "/comments",
                &[("post_id", post_id.to_string()), ("count", "true".to_string())],
                None,
            )
            .await?;
        Ok(count.count)
    }

    pub async fn create_comment(&self, post_id: &str, content: &str) -> Result<(), ApiError> {
        self.request_empty(
            Method::POST,
            "/comments",
            Some(json!({ "post_id": post_id, "content": content })),
        )
        .await
    }

    pub async fn update_comment(&self, id: &str, content: &str) -> Result<(), ApiError> {
        self.request_empty(
            Method::PATCH,
            &format!("/comments/{id}"),
            Some(json!({ "content": content })),
        )
        .await
    }

    pub async fn delete_comment(&self, id: &str) -> Result<(), ApiError> {
        self.request_empty(Method::DELETE, &format!("/comments/{id}"), None)
            .await
    }

    // ===== Likes =====

    pub async fn fetch_like_count(&self, post_id: &str) -> Result<u64, ApiError> {
        let count: CountResponse = self
            .request(
                Method::GET,
                "/likes",
                &[("post_id", post_id.to_string()), ("count", "true".to_string())],
                None,
            )
            .await?;
        Ok(count.count)
    }

    pub async fn fetch_user_like_count(&self, user_id: &str) -> Result<u64, ApiError> {
        let count: CountResponse = self
            .request(
                Method::GET,
                "/likes",
                &[("user_id", user_id.to_string()), ("count", "true".to_string())],
                None,
            )
            .await?;
        Ok(count.count)
    }

    /// Count of likes on one post by one user: 0 or 1. The backend has no
    /// dedicated "did I like this" endpoint, so viewer state is derived
    /// from this filtered count.
    pub async fn fetch_viewer_like_count(
        &self,
        post_id: &str,
        user_id: &str,
    ) -> Result<u64, ApiError> {
        let count: CountResponse = self
            .request(
                Method::GET,
                "/likes",
                &[
                    ("post_id", post_id.to_string()),
                    ("user_id", user_id.to_string()),
                    ("count", "true".to_string()),
                ],
                None,
            )
            .await?;
        Ok(count.count)
    }

    pub async fn fetch_user_likes(&self, user_id: &str) -> Result<Vec<Like>, ApiError> {
        let page: Page<Like> = self
            .request(
                Method::GET,
                "/likes",
                &[("user_id", user_id.to_string())],
                None,
            )
            .await?;
        Ok(page.items)
    }

    /// Like a post. Idempotent per the backend contract.
    pub async fn like_post(&self, post_id: &str) -> Result<(), ApiError> {
        self.request_empty(Method::POST, "/likes", Some(json!({ "post_id": post_id })))
            .await
    }

    /// Remove the authenticated user's like from a post.
    pub async fn unlike_post(&self, post_id: &str) -> Result<(), ApiError> {
        self.request_empty(Method::DELETE, "/likes", Some(json!({ "post_id": post_id })))
            .await
    }

    // ===== Users =====

    pub async fn fetch_users(&self, limit: u64, offset: u64) -> Result<Page<User>, ApiError> {
        self.request(
            Method::GET,
            "/users",
            &[("limit", limit.to_string()), ("offset", offset.to_string())],
            None,
        )
        .await
    }

    pub async fn fetch_user(&self, id: &str) -> Result<User, ApiError> {
        self.request(Method::GET, &format!("/users/{id}"), &[], None)
            .await
    }

    /// Look up a user by exact username. Returns None when no user matches.
    pub async fn fetch_user_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        let page: Page<User> = self
            .request(
                Method::GET,
                "/users",
                &[("q", username.to_string())],
                None,
            )
            .await?;
        Ok(page.items.into_iter().next())
    }

    pub async fn update_user(&self, id: &str, update: &UserUpdate) -> Result<User, ApiError> {
        let body = serde_json::to_value(update)
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        self.request(Method::PATCH, &format!("/users/{id}"), &[], Some(body))
            .await
    }

    pub async fn delete_user(&self, id: &str) -> Result<(), ApiError> {
        self.request_empty(Method::DELETE, &format!("/users/{id}"), None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client(server: &MockServer) -> ApiClient {
        ApiClient::new(&server.uri()).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_posts_unwraps_items() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/posts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {"id": 1, "user_id": 2, "content": "first",
                     "users": {"id": 2, "username": "ana"}}
                ]
            })))
            .mount(&server)
            .await;

        let posts = client(&server).await.fetch_posts(None).await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, "1");
        assert_eq!(posts[0].author_name(), "ana");
    }

    #[tokio::test]
    async fn test_fetch_posts_filters_by_user() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/posts"))
            .and(query_param("user_id", "9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
            .mount(&server)
            .await;

        let posts = client(&server).await.fetch_posts(Some("9")).await.unwrap();
        assert!(posts.is_empty());
    }

    #[tokio::test]
    async fn test_bearer_token_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user": {"id": 7, "username": "ana", "email": "a@b.c"}
            })))
            .mount(&server)
            .await;

        let api = client(&server).await.with_token("tok-1".to_string());
        let user = api.fetch_me().await.unwrap();
        assert_eq!(user.id, "7");
    }

    #[tokio::test]
    async fn test_backend_error_message_is_extracted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"error": "wrong password"})),
            )
            .mount(&server)
            .await;

        let err = client(&server)
            .await
            .login_password("ana", "nope")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "wrong password");
    }

    #[tokio::test]
    async fn test_unlike_sends_body_on_delete() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/likes"))
            .and(body_json(json!({"post_id": "3"})))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        client(&server).await.unlike_post("3").await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_user_by_username_takes_first_match() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .and(query_param("q", "ana"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"id": 7, "username": "ana", "email": "a@b.c"}]
            })))
            .mount(&server)
            .await;

        let api = client(&server).await;
        let user = api.fetch_user_by_username("ana").await.unwrap();
        assert_eq!(user.unwrap().id, "7");
    }
}
