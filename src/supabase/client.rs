use crate::error::{AppError, Result};
use crate::supabase::types::{
    ErrorBody, PasswordCredentials, RefreshTokenRequest, Session, SignUpResponse, User,
};
use reqwest::{RequestBuilder, Response, StatusCode};

/// Client for the hosted backend's row API (`/rest/v1`) and auth API (`/auth/v1`)
#[derive(Clone)]
pub struct SupabaseClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl SupabaseClient {
    /// Create a new backend client
    ///
    /// # Arguments
    ///
    /// * `base_url` - Backend URL without trailing slash
    /// * `api_key` - Anon or service-role key, sent on every request
    /// * `timeout_seconds` - HTTP request timeout in seconds (use -1 for no timeout)
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client creation fails
    pub fn new(base_url: &str, api_key: &str, timeout_seconds: i64) -> Result<Self> {
        let mut client_builder = reqwest::Client::builder();
        if timeout_seconds > 0 {
            client_builder =
                client_builder.timeout(std::time::Duration::from_secs(timeout_seconds as u64));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client: client_builder.build().map_err(|e| {
                AppError::Internal(anyhow::anyhow!("Failed to build HTTP client: {}", e))
            })?,
        })
    }

    /// Read up to `limit` row ids from a table
    ///
    /// # Errors
    ///
    /// Returns error if the table is unreadable or a network error occurs
    pub async fn select_ids(&self, table: &str, limit: usize) -> Result<Vec<serde_json::Value>> {
        let response = self
            .rest(self.client.get(self.table_url(table)))
            .query(&[("select", "id".to_string()), ("limit", limit.to_string())])
            .send()
            .await?;

        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    /// Count the rows of a table exactly
    ///
    /// # Errors
    ///
    /// Returns error if the table is unreadable, the count header is missing,
    /// or a network error occurs
    pub async fn count_exact(&self, table: &str) -> Result<u64> {
        let response = self
            .rest(self.client.get(self.table_url(table)))
            .query(&[("select", "*"), ("limit", "0")])
            .header("Prefer", "count=exact")
            .send()
            .await?;

        let response = Self::check(response).await?;
        let content_range = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        parse_content_range_total(content_range).ok_or_else(|| AppError::Backend {
            status: StatusCode::BAD_GATEWAY,
            message: format!("Missing row count for table {}", table),
        })
    }

    /// Sign in with email and password
    ///
    /// # Errors
    ///
    /// Returns `AuthenticationFailed` on bad credentials
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        let response = self
            .auth(self.client.post(self.auth_url("token")))
            .query(&[("grant_type", "password")])
            .json(&PasswordCredentials { email, password })
            .send()
            .await?;

        let response = Self::check(response)
            .await
            .map_err(Self::as_authentication_failure)?;
        Ok(response.json().await?)
    }

    /// Register a new user
    ///
    /// # Errors
    ///
    /// Returns error if the backend rejects the sign-up (e.g. user exists, weak password)
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpResponse> {
        let response = self
            .auth(self.client.post(self.auth_url("signup")))
            .json(&PasswordCredentials { email, password })
            .send()
            .await?;

        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    /// Exchange a refresh token for a new session
    ///
    /// # Errors
    ///
    /// Returns `AuthenticationFailed` if the refresh token is invalid or revoked
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<Session> {
        let response = self
            .auth(self.client.post(self.auth_url("token")))
            .query(&[("grant_type", "refresh_token")])
            .json(&RefreshTokenRequest { refresh_token })
            .send()
            .await?;

        let response = Self::check(response)
            .await
            .map_err(Self::as_authentication_failure)?;
        Ok(response.json().await?)
    }

    /// Resolve the user owning an access token
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` if the token is invalid or expired
    pub async fn get_user(&self, access_token: &str) -> Result<User> {
        let response = self
            .client
            .get(self.auth_url("user"))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Err(AppError::Unauthorized);
        }

        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    /// Revoke the session behind an access token
    ///
    /// # Errors
    ///
    /// Returns error if the backend rejects the request or a network error occurs
    pub async fn sign_out(&self, access_token: &str) -> Result<()> {
        let response = self
            .client
            .post(self.auth_url("logout"))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, urlencoding::encode(table))
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn rest(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    fn auth(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("apikey", &self.api_key)
    }

    /// Turn a non-success response into a `Backend` error carrying the backend's message
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or_else(|| {
                if body.is_empty() {
                    format!("Request failed with status {}", status)
                } else {
                    body
                }
            });

        tracing::debug!("Backend responded with {}: {}", status, message);
        Err(AppError::Backend { status, message })
    }

    fn as_authentication_failure(error: AppError) -> AppError {
        match error {
            AppError::Backend { status, message } if status.is_client_error() => {
                AppError::AuthenticationFailed(message)
            }
            other => other,
        }
    }
}

/// Total from a `Content-Range` header such as `0-24/573` or `*/0`
fn parse_content_range_total(header: &str) -> Option<u64> {
    header.rsplit_once('/')?.1.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(server: &MockServer) -> SupabaseClient {
        SupabaseClient::new(&server.base_url(), "test-key", -1).unwrap()
    }

    #[test]
    fn test_parse_content_range_total() {
        assert_eq!(parse_content_range_total("0-24/573"), Some(573));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total("0-0/*"), None);
        assert_eq!(parse_content_range_total(""), None);
    }

    #[tokio::test]
    async fn test_select_ids_sends_keys_and_limit() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/rest/v1/User")
                    .query_param("select", "id")
                    .query_param("limit", "1")
                    .header("apikey", "test-key")
                    .header("authorization", "Bearer test-key");
                then.status(200).json_body(json!([{ "id": "u1" }]));
            })
            .await;

        let rows = client(&server).select_ids("User", 1).await.unwrap();
        mock.assert_async().await;
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_select_ids_surfaces_backend_message() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/rest/v1/Missing");
                then.status(404).json_body(json!({
                    "code": "42P01",
                    "message": "relation \"public.Missing\" does not exist"
                }));
            })
            .await;

        let err = client(&server).select_ids("Missing", 1).await.unwrap_err();
        match err {
            AppError::Backend { status, message } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(message, "relation \"public.Missing\" does not exist");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_count_exact_reads_content_range() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/rest/v1/Role")
                    .header("prefer", "count=exact");
                then.status(200)
                    .header("content-range", "*/7")
                    .json_body(json!([]));
            })
            .await;

        let count = client(&server).count_exact("Role").await.unwrap();
        mock.assert_async().await;
        assert_eq!(count, 7);
    }

    #[tokio::test]
    async fn test_count_exact_without_header_fails() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/rest/v1/Role");
                then.status(200).json_body(json!([]));
            })
            .await;

        let err = client(&server).count_exact("Role").await.unwrap_err();
        assert_eq!(err.to_string(), "Missing row count for table Role");
    }

    #[tokio::test]
    async fn test_sign_in_with_bad_credentials() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/auth/v1/token")
                    .query_param("grant_type", "password")
                    .json_body(json!({ "email": "a@example.com", "password": "wrong" }));
                then.status(400).json_body(json!({
                    "error": "invalid_grant",
                    "error_description": "Invalid login credentials"
                }));
            })
            .await;

        let err = client(&server)
            .sign_in_with_password("a@example.com", "wrong")
            .await
            .unwrap_err();
        assert!(
            matches!(err, AppError::AuthenticationFailed(ref msg) if msg == "Invalid login credentials")
        );
    }

    #[tokio::test]
    async fn test_sign_in_returns_session() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/auth/v1/token");
                then.status(200).json_body(json!({
                    "access_token": "access",
                    "refresh_token": "refresh",
                    "expires_in": 3600,
                    "token_type": "bearer",
                    "user": { "id": "u1", "email": "a@example.com" }
                }));
            })
            .await;

        let session = client(&server)
            .sign_in_with_password("a@example.com", "secret")
            .await
            .unwrap();
        assert_eq!(session.access_token, "access");
        assert_eq!(session.user.email.as_deref(), Some("a@example.com"));
    }

    #[tokio::test]
    async fn test_get_user_with_expired_token() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/auth/v1/user")
                    .header("authorization", "Bearer expired");
                then.status(401).json_body(json!({ "msg": "JWT expired" }));
            })
            .await;

        let err = client(&server).get_user("expired").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }
}
