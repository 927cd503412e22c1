use crate::AppState;
use crate::error::{AppError, Result};
use crate::ui::Theme;
use axum::{
    Form,
    extract::State,
    http::{HeaderMap, header},
    response::Redirect,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_cookies::cookie::{SameSite, time::Duration};
use tower_cookies::{Cookie, Cookies};

#[derive(Debug, Deserialize)]
pub struct ThemeForm {
    pub theme: String,
}

pub async fn set_theme(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    headers: HeaderMap,
    Form(form): Form<ThemeForm>,
) -> Result<Redirect> {
    let theme: Theme = form.theme.parse().map_err(AppError::BadRequest)?;

    let mut cookie = Cookie::new(
        state.config.security.theme_cookie_name.clone(),
        theme.as_str(),
    );
    cookie.set_path("/");
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(Duration::days(365));
    cookies.add(cookie);

    tracing::debug!("Theme set to {}", theme.as_str());
    Ok(Redirect::to(&back_path(&headers)))
}

/// Path (and query) of the referring page, or `/`
fn back_path(headers: &HeaderMap) -> String {
    headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .and_then(|referer| url::Url::parse(referer).ok())
        .map(|referer| match referer.query() {
            Some(query) => format!("{}?{}", referer.path(), query),
            None => referer.path().to_string(),
        })
        // Never hand out a protocol-relative target
        .filter(|path| !path.starts_with("//"))
        .unwrap_or_else(|| "/".to_string())
}
