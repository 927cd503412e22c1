use crate::AppState;
use crate::auth::{clear_session_cookies, set_session_cookies};
use crate::error::{AppError, Result};
use crate::supabase::{SupabaseClient, types::SignUpResponse};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, header},
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_cookies::Cookies;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub repeat_password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpResult {
    pub success: bool,
    pub email: Option<String>,
    pub confirmation_required: bool,
}

fn client(state: &AppState) -> Result<&SupabaseClient> {
    state.supabase.as_ref().ok_or(AppError::NotConfigured)
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let session = client(&state)?
        .sign_in_with_password(&req.email, &req.password)
        .await?;

    set_session_cookies(&cookies, &state.config.security, &session);
    tracing::info!("User signed in: {}", session.user.display_name());

    Ok(Json(LoginResponse {
        success: true,
        email: session.user.email,
    }))
}

pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(req): Json<SignUpRequest>,
) -> Result<Json<SignUpResult>> {
    if req.password != req.repeat_password {
        return Err(AppError::BadRequest("Passwords do not match".to_string()));
    }

    let client = client(&state)?;
    let response = client.sign_up(&req.email, &req.password).await?;
    let email = response.user().email.clone();

    let confirmation_required = match response {
        SignUpResponse::Session(session) => {
            set_session_cookies(&cookies, &state.config.security, &session);
            false
        }
        SignUpResponse::User(_) => true,
    };

    tracing::info!(
        "User signed up: {} (confirmation required: {})",
        email.as_deref().unwrap_or("<no email>"),
        confirmation_required
    );

    Ok(Json(SignUpResult {
        success: true,
        email,
        confirmation_required,
    }))
}

pub async fn refresh(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
) -> Result<Json<LoginResponse>> {
    // Get refresh token from cookie
    let refresh_token = cookies
        .get(&state.config.security.refresh_cookie_name)
        .ok_or(AppError::Unauthorized)?
        .value()
        .to_string();

    let session = client(&state)?.refresh_session(&refresh_token).await?;
    set_session_cookies(&cookies, &state.config.security, &session);

    Ok(Json(LoginResponse {
        success: true,
        email: session.user.email,
    }))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    headers: HeaderMap,
) -> Result<Response> {
    let client = client(&state)?;

    // Revoke the session upstream; the cookies go regardless
    if let Some(cookie) = cookies.get(&state.config.security.cookie_name)
        && let Err(e) = client.sign_out(cookie.value()).await
    {
        tracing::warn!("Backend sign-out failed: {}", e);
    }

    clear_session_cookies(&cookies, &state.config.security);

    let wants_json = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("application/json"))
        .unwrap_or(false);

    if wants_json {
        Ok(Json(serde_json::json!({ "success": true })).into_response())
    } else {
        Ok(Redirect::to("/auth/login").into_response())
    }
}
