//! Server-rendered pages.
//!
//! The landing page's only dynamic decision is which onboarding steps to
//! show, driven by [`crate::config::Config::has_env_vars`].

pub mod components;
pub mod layout;
pub mod pages;
pub mod theme;

pub use layout::PageContext;
pub use theme::Theme;
