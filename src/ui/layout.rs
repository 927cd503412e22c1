use crate::supabase::User;
use crate::ui::Theme;
use crate::ui::components::{auth_button, env_var_warning, theme_switcher};
use maud::{DOCTYPE, Markup, PreEscaped, html};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

const TAILWIND_CONFIG: &str = "tailwind.config = { darkMode: 'class' };";

// Runs before first paint so the "system" theme does not flash
const SYSTEM_THEME_SCRIPT: &str = r#"
if (window.matchMedia('(prefers-color-scheme: dark)').matches) {
    document.documentElement.classList.add('dark');
}
"#;

/// Per-request data shared by every page
pub struct PageContext<'a> {
    pub site_name: &'a str,
    pub theme: Theme,
    pub has_env_vars: bool,
    pub user: Option<&'a User>,
    pub year: i32,
}

pub fn page(ctx: &PageContext, title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" class=[ctx.theme.html_class()] {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " | " (ctx.site_name) }
                link rel="icon" href="/public/logo-square.svg";
                script src=(TAILWIND_CDN) {}
                script { (PreEscaped(TAILWIND_CONFIG)) }
                @if ctx.theme == Theme::System {
                    script { (PreEscaped(SYSTEM_THEME_SCRIPT)) }
                }
            }
            body class="bg-white text-slate-900 dark:bg-slate-950 dark:text-slate-100 antialiased" {
                (content)
            }
        }
    }
}

pub fn nav(ctx: &PageContext) -> Markup {
    html! {
        nav class="w-full flex justify-center border-b border-b-slate-200 dark:border-b-slate-800 h-16" {
            div class="w-full max-w-5xl flex justify-between items-center p-3 px-5 text-sm" {
                div class="flex gap-5 items-center font-semibold" {
                    a href="/" class="flex items-center" {
                        img src="/public/logo-rectangle.svg" alt=(format!("{} Logo", ctx.site_name))
                            width="150" height="40" class="h-8 w-auto";
                    }
                }
                @if ctx.has_env_vars {
                    (auth_button(ctx.user))
                } @else {
                    (env_var_warning())
                }
            }
        }
    }
}

pub fn footer(ctx: &PageContext) -> Markup {
    html! {
        footer class="w-full border-t border-slate-200 dark:border-slate-800 bg-white/80 dark:bg-slate-950/80 backdrop-blur-sm" {
            div class="max-w-5xl mx-auto px-8 py-16" {
                div class="flex flex-col gap-8" {
                    div class="flex flex-col md:flex-row items-center justify-between" {
                        div class="flex items-center gap-4" {
                            img src="/public/logo-square.svg" alt=(format!("{} Logo", ctx.site_name))
                                width="64" height="64" class="h-16 w-auto";
                        }
                        div class="flex items-center gap-6 text-xs" {
                            p {
                                "Powered by "
                                a href="https://supabase.com/?utm_source=quickstarter&utm_medium=template"
                                    target="_blank" class="font-bold hover:underline" rel="noreferrer" {
                                    "Supabase"
                                }
                            }
                            (theme_switcher(ctx.theme))
                        }
                    }
                    div class="text-center text-sm text-slate-500 border-t border-slate-200 dark:border-slate-800 pt-8" {
                        "© " (ctx.year) " " (ctx.site_name) ". All rights reserved."
                    }
                }
            }
        }
    }
}
