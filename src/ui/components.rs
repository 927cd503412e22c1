use crate::cn;
use crate::supabase::User;
use crate::ui::Theme;
use maud::{Markup, html};

const BUTTON_BASE: &str = "inline-flex items-center justify-center gap-2 whitespace-nowrap \
    rounded-md text-sm font-medium transition-colors \
    disabled:pointer-events-none disabled:opacity-50";

const BADGE: &str = "inline-flex items-center rounded-md border px-2.5 py-0.5 text-xs \
    font-semibold border-transparent bg-slate-100 text-slate-900 \
    dark:bg-slate-800 dark:text-slate-100";

#[derive(Debug, Clone, Copy)]
pub enum ButtonVariant {
    Default,
    Outline,
    Ghost,
}

impl ButtonVariant {
    fn classes(self) -> &'static str {
        match self {
            ButtonVariant::Default => {
                "bg-slate-900 text-white hover:bg-slate-800 dark:bg-slate-100 dark:text-slate-900"
            }
            ButtonVariant::Outline => {
                "border border-slate-300 bg-transparent hover:bg-slate-100 \
                 dark:border-slate-700 dark:hover:bg-slate-800"
            }
            ButtonVariant::Ghost => "hover:bg-slate-100 dark:hover:bg-slate-800",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum ButtonSize {
    Default,
    Sm,
}

impl ButtonSize {
    fn classes(self) -> &'static str {
        match self {
            ButtonSize::Default => "h-9 px-4 py-2",
            ButtonSize::Sm => "h-8 rounded-md px-3 text-xs",
        }
    }
}

pub fn button_class(variant: ButtonVariant, size: ButtonSize, extra: Option<&str>) -> String {
    cn!(BUTTON_BASE, variant.classes(), size.classes(), extra)
}

pub fn hero(site_name: &str) -> Markup {
    html! {
        div class="flex flex-col gap-16 items-center" {
            div class="flex gap-8 justify-center items-center" {
                img src="/public/logo-rectangle.svg" alt=(format!("{} logo", site_name))
                    class="h-12 w-auto";
            }
            h1 class="sr-only" { (site_name) " starter" }
            p class="text-3xl lg:text-4xl !leading-tight mx-auto max-w-xl text-center" {
                "The fastest way to build apps with "
                a href="https://supabase.com" target="_blank" class="font-bold hover:underline"
                    rel="noreferrer" { "Supabase" }
                " and "
                a href="https://github.com/tokio-rs/axum" target="_blank"
                    class="font-bold hover:underline" rel="noreferrer" { "Axum" }
            }
            div class="w-full p-[1px] bg-gradient-to-r from-transparent via-slate-300 to-transparent my-8" {}
        }
    }
}

/// Shown in place of the auth button until the backend credentials are set
pub fn env_var_warning() -> Markup {
    html! {
        div class="flex gap-4 items-center" {
            span class=(cn!(BADGE, "font-normal")) {
                "Please set the Supabase anon key and url"
            }
            div class="flex gap-2" {
                button class=(button_class(ButtonVariant::Outline, ButtonSize::Sm, Some("opacity-75 cursor-none")))
                    disabled { "Sign in" }
                button class=(button_class(ButtonVariant::Default, ButtonSize::Sm, Some("opacity-75 cursor-none")))
                    disabled { "Sign up" }
            }
        }
    }
}

pub fn auth_button(user: Option<&User>) -> Markup {
    html! {
        @if let Some(user) = user {
            div class="flex items-center gap-4" {
                "Hey, " (user.display_name()) "!"
                (logout_button())
            }
        } @else {
            div class="flex gap-2" {
                a href="/auth/login" class=(button_class(ButtonVariant::Outline, ButtonSize::Sm, None)) {
                    "Sign in"
                }
                a href="/auth/sign-up" class=(button_class(ButtonVariant::Default, ButtonSize::Sm, None)) {
                    "Sign up"
                }
            }
        }
    }
}

pub fn logout_button() -> Markup {
    html! {
        form method="post" action="/api/auth/logout" {
            button type="submit" class=(button_class(ButtonVariant::Default, ButtonSize::Sm, None)) {
                "Logout"
            }
        }
    }
}

pub fn theme_switcher(current: Theme) -> Markup {
    html! {
        form method="post" action="/api/theme" class="flex items-center gap-1" aria-label="Theme" {
            @for theme in Theme::ALL {
                @let selected = theme == current;
                button type="submit" name="theme" value=(theme.as_str())
                    aria-pressed=(if selected { "true" } else { "false" })
                    class=(cn!(
                        button_class(ButtonVariant::Ghost, ButtonSize::Sm, None),
                        ("bg-slate-100 dark:bg-slate-800", selected)
                    )) {
                    (theme.label())
                }
            }
        }
    }
}

fn tutorial_step(title: &str, body: Markup) -> Markup {
    html! {
        li class="relative" {
            input type="checkbox" id=(title) name=(title)
                class="absolute top-[3px] mr-2 peer cursor-pointer";
            label for=(title) class="relative text-base font-medium ml-8 cursor-pointer" {
                (title)
                div class="ml-8 text-sm font-normal text-slate-500 dark:text-slate-400" {
                    (body)
                }
            }
        }
    }
}

fn code_block(code: &str) -> Markup {
    html! {
        pre class="rounded-md bg-slate-100 dark:bg-slate-900 p-4 my-4 text-xs overflow-x-auto" {
            code { (code) }
        }
    }
}

pub fn connect_supabase_steps() -> Markup {
    html! {
        ol class="flex flex-col gap-6" {
            (tutorial_step("Create Supabase project", html! {
                p {
                    "Head over to "
                    a href="https://app.supabase.com/project/_/settings/api" target="_blank"
                        class="font-bold hover:underline" rel="noreferrer" { "database.new" }
                    " and create a new Supabase project."
                }
            }))
            (tutorial_step("Declare environment variables", html! {
                p { "Export your project's URL and anon key before starting the server:" }
                (code_block("SUPABASE_URL=https://<project>.supabase.co\nSUPABASE_ANON_KEY=<anon key>"))
                p { "Optionally add the service role key to enable the data client check:" }
                (code_block("SUPABASE_SERVICE_ROLE_KEY=<service role key>"))
            }))
            (tutorial_step("Restart the server", html! {
                p { "Stop the running server and start it again so the new variables are picked up." }
                (code_block("cargo run --release"))
            }))
            (tutorial_step("Refresh the page", html! {
                p { "You may need to use incognito mode if the page keeps showing these steps." }
            }))
        }
    }
}

pub fn sign_up_user_steps() -> Markup {
    html! {
        ol class="flex flex-col gap-6" {
            (tutorial_step("Set up redirect urls", html! {
                p {
                    "Add this server's address to the Site URL and Redirect URLs of your project's "
                    a href="https://app.supabase.com/project/_/auth/url-configuration" target="_blank"
                        class="font-bold hover:underline" rel="noreferrer" { "auth settings" }
                    " so confirmation emails link back here."
                }
            }))
            (tutorial_step("Sign up your first user", html! {
                p {
                    "Head over to the "
                    a href="/auth/sign-up" class="font-bold hover:underline" { "Sign up" }
                    " page and sign up your first user. It's okay if this is just you for now."
                }
            }))
            (tutorial_step("Check the connection", html! {
                p {
                    "Open "
                    a href="/api/test-prisma" class="font-bold hover:underline" { "/api/test-prisma" }
                    " to verify that the backend and the data client respond."
                }
            }))
        }
    }
}
