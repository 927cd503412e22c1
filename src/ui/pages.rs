use crate::cn;
use crate::supabase::User;
use crate::ui::components::{
    ButtonSize, ButtonVariant, button_class, connect_supabase_steps, hero, logout_button,
    sign_up_user_steps,
};
use crate::ui::layout::{PageContext, footer, nav, page};
use maud::{Markup, PreEscaped, html};

const INPUT: &str = "flex h-9 w-full rounded-md border border-slate-300 bg-transparent px-3 py-1 \
    text-sm shadow-sm dark:border-slate-700 focus:outline-none focus:ring-1 focus:ring-slate-400";

const CARD: &str = "rounded-xl border border-slate-200 dark:border-slate-800 shadow p-6";

const LOGIN_SCRIPT: &str = r#"
const form = document.getElementById('authForm');
const errorDiv = document.getElementById('error');
const submitBtn = document.getElementById('submitBtn');

form.addEventListener('submit', async (e) => {
    e.preventDefault();

    errorDiv.classList.add('hidden');
    submitBtn.disabled = true;
    submitBtn.textContent = 'Logging in...';

    try {
        const response = await fetch('/api/auth/login', {
            method: 'POST',
            headers: { 'Content-Type': 'application/json' },
            body: JSON.stringify({
                email: document.getElementById('email').value,
                password: document.getElementById('password').value,
            }),
        });

        const data = await response.json();

        if (response.ok && data.success) {
            const redirect = new URLSearchParams(window.location.search).get('redirect');
            const safe = redirect && redirect.startsWith('/') && !redirect.startsWith('//');
            window.location.href = safe ? redirect : '/protected';
        } else {
            throw new Error(data.error || 'Login failed');
        }
    } catch (error) {
        errorDiv.textContent = error.message || 'An error occurred. Please try again.';
        errorDiv.classList.remove('hidden');
    } finally {
        submitBtn.disabled = false;
        submitBtn.textContent = 'Login';
    }
});
"#;

const SIGN_UP_SCRIPT: &str = r#"
const form = document.getElementById('authForm');
const errorDiv = document.getElementById('error');
const submitBtn = document.getElementById('submitBtn');

form.addEventListener('submit', async (e) => {
    e.preventDefault();

    errorDiv.classList.add('hidden');
    submitBtn.disabled = true;
    submitBtn.textContent = 'Creating an account...';

    try {
        const response = await fetch('/api/auth/sign-up', {
            method: 'POST',
            headers: { 'Content-Type': 'application/json' },
            body: JSON.stringify({
                email: document.getElementById('email').value,
                password: document.getElementById('password').value,
                repeatPassword: document.getElementById('repeat-password').value,
            }),
        });

        const data = await response.json();

        if (response.ok && data.success) {
            window.location.href = data.confirmationRequired ? '/auth/sign-up-success' : '/protected';
        } else {
            throw new Error(data.error || 'Sign up failed');
        }
    } catch (error) {
        errorDiv.textContent = error.message || 'An error occurred. Please try again.';
        errorDiv.classList.remove('hidden');
    } finally {
        submitBtn.disabled = false;
        submitBtn.textContent = 'Sign up';
    }
});
"#;

pub fn home(ctx: &PageContext) -> Markup {
    let content = html! {
        main class="min-h-screen flex flex-col items-center" {
            div class="flex-1 w-full flex flex-col gap-20 items-center" {
                (nav(ctx))
                div class="flex-1 flex flex-col gap-20 max-w-5xl p-5" {
                    (hero(ctx.site_name))
                    main class="flex-1 flex flex-col gap-6 px-4" {
                        h2 class="font-medium text-xl mb-4" { "Next steps" }
                        @if ctx.has_env_vars {
                            (sign_up_user_steps())
                        } @else {
                            (connect_supabase_steps())
                        }
                    }
                }
                (footer(ctx))
            }
        }
    };

    page(ctx, "Home", content)
}

/// Centered single-card layout shared by the auth pages
fn auth_shell(ctx: &PageContext, title: &str, card: Markup) -> Markup {
    let content = html! {
        div class="flex min-h-screen w-full items-center justify-center p-6 md:p-10" {
            div class="w-full max-w-sm" {
                div class=(CARD) {
                    h1 class="text-2xl font-semibold mb-2" { (title) }
                    (card)
                }
            }
        }
    };

    page(ctx, title, content)
}

fn field(id: &str, label: &str, input_type: &str, autocomplete: &str) -> Markup {
    html! {
        div class="grid gap-2" {
            label for=(id) class="text-sm font-medium" { (label) }
            input type=(input_type) id=(id) name=(id) required autocomplete=(autocomplete)
                class=(INPUT);
        }
    }
}

fn error_banner() -> Markup {
    html! {
        div id="error" class="hidden rounded-md bg-red-50 text-red-700 dark:bg-red-950 dark:text-red-300 p-3 text-sm" {}
    }
}

pub fn login(ctx: &PageContext) -> Markup {
    let card = html! {
        p class="text-sm text-slate-500 mb-6" { "Enter your email below to login to your account" }
        @if !ctx.has_env_vars {
            (not_configured_notice())
        }
        form id="authForm" class="flex flex-col gap-6" {
            (error_banner())
            (field("email", "Email", "email", "email"))
            (field("password", "Password", "password", "current-password"))
            button type="submit" id="submitBtn"
                class=(button_class(ButtonVariant::Default, ButtonSize::Default, Some("w-full")))
                disabled[!ctx.has_env_vars] { "Login" }
            div class="text-center text-sm" {
                "Don't have an account? "
                a href="/auth/sign-up" class="underline underline-offset-4" { "Sign up" }
            }
        }
        script { (PreEscaped(LOGIN_SCRIPT)) }
    };

    auth_shell(ctx, "Login", card)
}

pub fn sign_up(ctx: &PageContext) -> Markup {
    let card = html! {
        p class="text-sm text-slate-500 mb-6" { "Create a new account" }
        @if !ctx.has_env_vars {
            (not_configured_notice())
        }
        form id="authForm" class="flex flex-col gap-6" {
            (error_banner())
            (field("email", "Email", "email", "email"))
            (field("password", "Password", "password", "new-password"))
            (field("repeat-password", "Repeat Password", "password", "new-password"))
            button type="submit" id="submitBtn"
                class=(button_class(ButtonVariant::Default, ButtonSize::Default, Some("w-full")))
                disabled[!ctx.has_env_vars] { "Sign up" }
            div class="text-center text-sm" {
                "Already have an account? "
                a href="/auth/login" class="underline underline-offset-4" { "Login" }
            }
        }
        script { (PreEscaped(SIGN_UP_SCRIPT)) }
    };

    auth_shell(ctx, "Sign up", card)
}

pub fn sign_up_success(ctx: &PageContext) -> Markup {
    let card = html! {
        p class="text-sm text-slate-500 mb-4" { "Check your email to confirm" }
        p class="text-sm" {
            "You've successfully signed up. Please check your email to confirm your account before signing in."
        }
    };

    auth_shell(ctx, "Thank you for signing up!", card)
}

pub fn auth_error(ctx: &PageContext, message: Option<&str>) -> Markup {
    let card = html! {
        @match message {
            Some(message) => {
                p class="text-sm text-slate-500" { "Code error: " (message) }
            }
            None => {
                p class="text-sm text-slate-500" { "An unspecified error occurred." }
            }
        }
    };

    auth_shell(ctx, "Sorry, something went wrong.", card)
}

pub fn protected(ctx: &PageContext, user: &User) -> Markup {
    let details = serde_json::to_string_pretty(user).unwrap_or_default();

    let content = html! {
        main class="min-h-screen flex flex-col items-center" {
            div class="flex-1 w-full flex flex-col gap-20 items-center" {
                (nav(ctx))
                div class="flex-1 w-full max-w-5xl flex flex-col gap-12 p-5" {
                    div class="w-full" {
                        div class=(cn!(CARD, "bg-slate-100 dark:bg-slate-900 text-sm p-3 px-5 shadow-none")) {
                            "This is a protected page that you can only see as an authenticated user"
                        }
                    }
                    div class="flex flex-col gap-2 items-start" {
                        h2 class="font-bold text-2xl mb-4" { "Your user details" }
                        pre class="text-xs font-mono p-3 rounded border max-h-32 overflow-auto w-full" {
                            (details)
                        }
                    }
                    (logout_button())
                }
                (footer(ctx))
            }
        }
    };

    page(ctx, "Protected", content)
}

fn not_configured_notice() -> Markup {
    html! {
        p class="rounded-md bg-amber-50 text-amber-800 dark:bg-amber-950 dark:text-amber-200 p-3 text-sm mb-4" {
            "Set SUPABASE_URL and SUPABASE_ANON_KEY to enable authentication."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::Theme;

    fn ctx(has_env_vars: bool) -> PageContext<'static> {
        PageContext {
            site_name: "Quickstarter",
            theme: Theme::System,
            has_env_vars,
            user: None,
            year: 2026,
        }
    }

    #[test]
    fn test_home_without_env_vars_shows_connect_steps() {
        let html = home(&ctx(false)).into_string();
        assert!(html.contains("Declare environment variables"));
        assert!(html.contains("Please set the Supabase anon key and url"));
        assert!(!html.contains("Sign up your first user"));
    }

    #[test]
    fn test_home_with_env_vars_shows_sign_up_steps() {
        let html = home(&ctx(true)).into_string();
        assert!(html.contains("Sign up your first user"));
        assert!(!html.contains("Declare environment variables"));
        assert!(!html.contains("Please set the Supabase"));
        assert!(html.contains(r#"href="/auth/sign-up""#));
    }

    #[test]
    fn test_footer_has_year_and_name() {
        let html = home(&ctx(true)).into_string();
        assert!(html.contains("© 2026 Quickstarter. All rights reserved."));
    }

    #[test]
    fn test_theme_class_on_html() {
        let mut dark = ctx(true);
        dark.theme = Theme::Dark;
        assert!(home(&dark).into_string().contains(r#"<html lang="en" class="dark">"#));
        assert!(home(&ctx(true)).into_string().contains(r#"<html lang="en">"#));
    }

    #[test]
    fn test_login_disabled_without_env_vars() {
        let html = login(&ctx(false)).into_string();
        assert!(html.contains("Set SUPABASE_URL and SUPABASE_ANON_KEY"));
        assert!(html.contains(" disabled>Login</button>"));
    }

    #[test]
    fn test_auth_error_escapes_message() {
        let html = auth_error(&ctx(true), Some("<b>bad</b>")).into_string();
        assert!(html.contains("Code error: &lt;b&gt;bad&lt;/b&gt;"));
    }
}
