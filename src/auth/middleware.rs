use crate::AppState;
use crate::auth::session::{clear_session_cookies, set_session_cookies};
use crate::error::{AppError, Result};
use crate::supabase::User;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tower_cookies::Cookies;

pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    tracing::debug!("Auth middleware: checking session for {}", req.uri());

    // Check if this is a browser request (wants HTML)
    let is_browser = req
        .headers()
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("text/html"))
        .unwrap_or(false);

    let resolved = current_user(&state, &cookies, req.headers()).await;
    match resolved {
        Ok(user) => {
            tracing::debug!("Session valid for user: {}", user.display_name());
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!("No valid session for {}: {}", req.uri().path(), e);
            if is_browser {
                let redirect_url = format!(
                    "/auth/login?redirect={}",
                    urlencoding::encode(req.uri().path())
                );
                return Redirect::to(&redirect_url).into_response();
            }
            match e {
                AppError::NotConfigured => e.into_response(),
                _ => AppError::Unauthorized.into_response(),
            }
        }
    }
}

/// Resolve the signed-in user from the session cookies or a bearer token.
///
/// An expired access token is renewed with the refresh cookie when one is present.
pub async fn current_user(state: &AppState, cookies: &Cookies, headers: &HeaderMap) -> Result<User> {
    let client = state.supabase.as_ref().ok_or(AppError::NotConfigured)?;
    let security = &state.config.security;

    let token = extract_token(cookies, headers, &security.cookie_name);
    if let Some(token) = &token {
        match client.get_user(token).await {
            Err(AppError::Unauthorized) => {
                tracing::debug!("Access token rejected, trying refresh token");
            }
            result => return result,
        }
    }

    let refresh_token = cookies
        .get(&security.refresh_cookie_name)
        .map(|cookie| cookie.value().to_string())
        .ok_or(AppError::Unauthorized)?;

    let session = match client.refresh_session(&refresh_token).await {
        Ok(session) => session,
        Err(e @ AppError::AuthenticationFailed(_)) => {
            // Stale session
            tracing::debug!("Refresh token rejected, clearing session cookies");
            clear_session_cookies(cookies, security);
            return Err(e);
        }
        Err(e) => return Err(e),
    };
    set_session_cookies(cookies, security, &session);
    Ok(session.user)
}

/// Like [`current_user`], but any failure means "signed out"
pub async fn optional_user(state: &AppState, cookies: &Cookies, headers: &HeaderMap) -> Option<User> {
    if !state.config.has_env_vars() {
        return None;
    }

    match current_user(state, cookies, headers).await {
        Ok(user) => Some(user),
        Err(AppError::Unauthorized) | Err(AppError::AuthenticationFailed(_)) => None,
        Err(e) => {
            tracing::warn!("Failed to resolve session: {}", e);
            None
        }
    }
}

fn extract_token(cookies: &Cookies, headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    // Try to get token from cookie first
    if let Some(cookie) = cookies.get(cookie_name) {
        // Note: Logging cookie NAME only (not the value/token itself)
        tracing::debug!("Found token in cookie: {}", cookie_name);
        return Some(cookie.value().to_string());
    }

    // Try to get token from Authorization header
    if let Some(auth_header) = headers.get(header::AUTHORIZATION)
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        tracing::debug!("Found token in Authorization header");
        return Some(token.to_string());
    }

    None
}
