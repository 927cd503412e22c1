use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Supabase is not configured: set SUPABASE_URL and SUPABASE_ANON_KEY")]
    NotConfigured,

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(String),

    #[error("{message}")]
    Backend { status: StatusCode, message: String },

    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::AuthenticationFailed(_) | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Backend { status, .. } if status.is_client_error() => *status,
            AppError::Backend { .. } | AppError::RequestFailed(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match self {
            AppError::AuthenticationFailed(msg) | AppError::BadRequest(msg) => msg,
            other => other.to_string(),
        };

        if status.is_server_error() {
            tracing::error!("Request failed with {}: {}", status, message);
        }

        let body = Json(json!({
            "success": false,
            "error": message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn render(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_error_envelope() {
        let (status, body) = render(AppError::BadRequest("Passwords do not match".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Passwords do not match");
    }

    #[tokio::test]
    async fn test_backend_status_mapping() {
        let (status, _) = render(AppError::Backend {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: "User already registered".into(),
        })
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, body) = render(AppError::Backend {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "boom".into(),
        })
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "boom");

        let (status, _) = render(AppError::NotConfigured).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
