use crate::config::SecurityConfig;
use crate::supabase::Session;
use tower_cookies::cookie::{SameSite, time::Duration};
use tower_cookies::{Cookie, Cookies};

/// Refresh tokens outlive access tokens; the backend revokes them on sign-out
const REFRESH_COOKIE_MAX_AGE_DAYS: i64 = 30;

/// Store a backend session in HTTP-only cookies
pub fn set_session_cookies(cookies: &Cookies, security: &SecurityConfig, session: &Session) {
    let mut access_cookie = session_cookie(
        security,
        security.cookie_name.clone(),
        session.access_token.clone(),
    );
    if session.expires_in > 0 {
        access_cookie.set_max_age(Duration::seconds(session.expires_in));
    }
    cookies.add(access_cookie);

    let mut refresh_cookie = session_cookie(
        security,
        security.refresh_cookie_name.clone(),
        session.refresh_token.clone(),
    );
    refresh_cookie.set_max_age(Duration::days(REFRESH_COOKIE_MAX_AGE_DAYS));
    cookies.add(refresh_cookie);
}

pub fn clear_session_cookies(cookies: &Cookies, security: &SecurityConfig) {
    for name in [&security.cookie_name, &security.refresh_cookie_name] {
        let mut cookie = Cookie::from(name.clone());
        cookie.set_path("/");
        cookies.remove(cookie);
    }
}

fn session_cookie(security: &SecurityConfig, name: String, value: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, value);
    cookie.set_http_only(true);
    cookie.set_secure(security.secure_cookies);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie
}
