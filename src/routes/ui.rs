use crate::AppState;
use crate::auth::optional_user;
use crate::supabase::User;
use crate::ui::{PageContext, Theme, pages};
use axum::{
    Extension,
    extract::{Query, State},
    http::HeaderMap,
};
use chrono::Datelike;
use maud::Markup;
use serde::Deserialize;
use std::sync::Arc;
use tower_cookies::Cookies;

#[derive(Debug, Deserialize)]
pub struct ErrorParams {
    pub error: Option<String>,
}

fn context<'a>(state: &'a AppState, cookies: &Cookies, user: Option<&'a User>) -> PageContext<'a> {
    PageContext {
        site_name: &state.config.site.name,
        theme: Theme::from_cookies(cookies, &state.config.security.theme_cookie_name),
        has_env_vars: state.config.has_env_vars(),
        user,
        year: chrono::Utc::now().year(),
    }
}

pub async fn home(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    headers: HeaderMap,
) -> Markup {
    let user = optional_user(&state, &cookies, &headers).await;
    pages::home(&context(&state, &cookies, user.as_ref()))
}

pub async fn login_page(State(state): State<Arc<AppState>>, cookies: Cookies) -> Markup {
    pages::login(&context(&state, &cookies, None))
}

pub async fn sign_up_page(State(state): State<Arc<AppState>>, cookies: Cookies) -> Markup {
    pages::sign_up(&context(&state, &cookies, None))
}

pub async fn sign_up_success_page(State(state): State<Arc<AppState>>, cookies: Cookies) -> Markup {
    pages::sign_up_success(&context(&state, &cookies, None))
}

pub async fn auth_error_page(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Query(params): Query<ErrorParams>,
) -> Markup {
    pages::auth_error(&context(&state, &cookies, None), params.error.as_deref())
}

pub async fn protected_page(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Extension(user): Extension<User>,
) -> Markup {
    pages::protected(&context(&state, &cookies, Some(&user)), &user)
}
