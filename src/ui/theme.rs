use crate::utils::capitalize;
use std::str::FromStr;
use tower_cookies::Cookies;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Light, Theme::Dark, Theme::System];

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }

    pub fn label(self) -> String {
        capitalize(self.as_str())
    }

    /// Class set on `<html>`; `System` is resolved client-side
    pub fn html_class(self) -> Option<&'static str> {
        match self {
            Theme::Light => Some("light"),
            Theme::Dark => Some("dark"),
            Theme::System => None,
        }
    }

    /// Theme stored in the cookie, falling back to `System` for missing or stale values
    pub fn from_cookies(cookies: &Cookies, cookie_name: &str) -> Self {
        cookies
            .get(cookie_name)
            .and_then(|cookie| cookie.value().parse().ok())
            .unwrap_or_default()
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            other => Err(format!("Unknown theme: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_theme() {
        assert_eq!("dark".parse::<Theme>(), Ok(Theme::Dark));
        assert_eq!("light".parse::<Theme>(), Ok(Theme::Light));
        assert_eq!("system".parse::<Theme>(), Ok(Theme::System));
        assert_eq!(
            "DARK".parse::<Theme>(),
            Err("Unknown theme: DARK".to_string())
        );
    }

    #[test]
    fn test_labels() {
        let labels: Vec<String> = Theme::ALL.iter().map(|t| t.label()).collect();
        assert_eq!(labels, ["Light", "Dark", "System"]);
    }
}
