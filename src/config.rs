use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable holding the hosted backend URL
pub const ENV_SUPABASE_URL: &str = "SUPABASE_URL";
/// Environment variable holding the public (anon) API key
pub const ENV_SUPABASE_ANON_KEY: &str = "SUPABASE_ANON_KEY";
/// Environment variable holding the privileged service-role key
pub const ENV_SUPABASE_SERVICE_ROLE_KEY: &str = "SUPABASE_SERVICE_ROLE_KEY";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Site branding and static assets
    pub site: SiteConfig,
    /// Tables used by the connectivity probe
    pub probe: ProbeConfig,
    /// Cookie settings
    pub security: SecurityConfig,
    /// Backend credentials, read from the environment only
    #[serde(skip)]
    pub supabase: SupabaseConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to (e.g., "0.0.0.0")
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// HTTP request timeout in seconds for backend calls. Set to -1 to disable timeout.
    pub request_timeout_seconds: i64,
}

/// Site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Name shown in the hero and the footer
    pub name: String,
    /// Directory served under `/public`
    pub public_dir: String,
}

/// Connectivity probe configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Table read (limit 1) through the anon-key client
    pub table: String,
    /// Table counted through the service-role client
    pub user_table: String,
    /// Second table counted through the service-role client
    pub role_table: String,
}

/// Cookie configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Cookie name for the access token
    pub cookie_name: String,
    /// Cookie name for the refresh token
    pub refresh_cookie_name: String,
    /// Cookie name for the selected theme
    pub theme_cookie_name: String,
    /// Whether to set Secure flag on cookies (requires HTTPS)
    pub secure_cookies: bool,
}

/// Hosted backend credentials
#[derive(Debug, Clone, Default)]
pub struct SupabaseConfig {
    pub url: Option<String>,
    pub anon_key: Option<String>,
    pub service_role_key: Option<String>,
}

impl SupabaseConfig {
    /// Build from an environment lookup. Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.is_empty());

        Self {
            url: non_empty(ENV_SUPABASE_URL).map(|url| url.trim_end_matches('/').to_string()),
            anon_key: non_empty(ENV_SUPABASE_ANON_KEY),
            service_role_key: non_empty(ENV_SUPABASE_SERVICE_ROLE_KEY),
        }
    }

    /// URL and anon key, when both are set
    pub fn public_credentials(&self) -> Option<(&str, &str)> {
        match (&self.url, &self.anon_key) {
            (Some(url), Some(key)) => Some((url, key)),
            _ => None,
        }
    }

    /// URL and service-role key, when both are set
    pub fn service_credentials(&self) -> Option<(&str, &str)> {
        match (&self.url, &self.service_role_key) {
            (Some(url), Some(key)) => Some((url, key)),
            _ => None,
        }
    }
}

impl Config {
    /// Load configuration from defaults, an optional config.yaml and the process environment
    ///
    /// Backend credentials come from the environment only:
    /// - `SUPABASE_URL` - Backend URL
    /// - `SUPABASE_ANON_KEY` - Public API key
    /// - `SUPABASE_SERVICE_ROLE_KEY` - Privileged key for the secondary probe check
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Configuration is invalid (malformed YAML, wrong field types)
    /// - URL validation fails
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(Some(Path::new("config.yaml")), |name| {
            std::env::var(name).ok()
        })
    }

    /// Load configuration from an optional file and an explicit environment lookup
    pub fn load_from<F>(file: Option<&Path>, lookup: F) -> Result<Self, config::ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = config::Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.request_timeout_seconds", -1)?
            .set_default("site.name", "Quickstarter")?
            .set_default("site.public_dir", "public")?
            .set_default("probe.table", "User")?
            .set_default("probe.user_table", "User")?
            .set_default("probe.role_table", "Role")?
            .set_default("security.cookie_name", "sb_access_token")?
            .set_default("security.refresh_cookie_name", "sb_refresh_token")?
            .set_default("security.theme_cookie_name", "theme")?
            .set_default("security.secure_cookies", false)?;

        // Load from config.yaml (optional)
        if let Some(path) = file {
            builder = builder.add_source(
                config::File::from(path)
                    .required(false)
                    .format(config::FileFormat::Yaml),
            );
        }

        // Override with environment variables (optional)
        let port = lookup("PORT").map(|port| {
            port.parse::<u16>()
                .map_err(|e| config::ConfigError::Message(format!("PORT is invalid: {}", e)))
        });
        let builder = builder
            .set_override_option("server.host", lookup("HOST"))?
            .set_override_option("server.port", port.transpose()?.map(i64::from))?;

        let mut cfg: Config = builder.build()?.try_deserialize()?;
        cfg.supabase = SupabaseConfig::from_lookup(&lookup);

        cfg.warn_on_suspicious_values();

        Ok(cfg)
    }

    /// Whether both `SUPABASE_URL` and `SUPABASE_ANON_KEY` are set.
    ///
    /// Decides which onboarding steps the landing page shows.
    pub fn has_env_vars(&self) -> bool {
        self.supabase.public_credentials().is_some()
    }

    /// A malformed backend URL still counts as configured; requests to it fail later.
    fn warn_on_suspicious_values(&self) {
        if let Some(url) = &self.supabase.url
            && let Err(e) = Self::validate_url(url, "Supabase")
        {
            tracing::warn!("{}; backend requests will fail", e);
        }
    }

    fn validate_url(url: &str, context: &str) -> Result<(), String> {
        if url.is_empty() {
            return Err(format!("{} URL cannot be empty", context));
        }

        // Check if URL is valid
        match url.parse::<url::Url>() {
            Ok(parsed_url) => {
                // Ensure scheme is http or https
                if parsed_url.scheme() != "http" && parsed_url.scheme() != "https" {
                    return Err(format!(
                        "{} URL must use http:// or https:// scheme",
                        context
                    ));
                }

                // Ensure URL has a host
                if parsed_url.host_str().is_none() {
                    return Err(format!("{} URL must have a valid host", context));
                }

                Ok(())
            }
            Err(e) => Err(format!("{} URL is invalid: {}", context, e)),
        }
    }
}

#[cfg(test)]
pub(crate) fn test_config<F>(lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    Config::load_from(None, lookup).expect("default configuration is valid")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_has_env_vars_requires_both_variables() {
        let both = env(&[
            (ENV_SUPABASE_URL, "https://project.supabase.co"),
            (ENV_SUPABASE_ANON_KEY, "anon"),
        ]);
        assert!(test_config(both).has_env_vars());

        let url_only = env(&[(ENV_SUPABASE_URL, "https://project.supabase.co")]);
        assert!(!test_config(url_only).has_env_vars());

        let key_only = env(&[(ENV_SUPABASE_ANON_KEY, "anon")]);
        assert!(!test_config(key_only).has_env_vars());

        assert!(!test_config(env(&[])).has_env_vars());
    }

    #[test]
    fn test_has_env_vars_treats_empty_as_missing() {
        let empty_key = env(&[
            (ENV_SUPABASE_URL, "https://project.supabase.co"),
            (ENV_SUPABASE_ANON_KEY, ""),
        ]);
        assert!(!test_config(empty_key).has_env_vars());
    }

    #[test]
    fn test_defaults() {
        let cfg = test_config(env(&[]));
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.server.request_timeout_seconds, -1);
        assert_eq!(cfg.site.name, "Quickstarter");
        assert_eq!(cfg.probe.table, "User");
        assert_eq!(cfg.probe.role_table, "Role");
        assert!(cfg.supabase.service_credentials().is_none());
    }

    #[test]
    fn test_port_override() {
        let cfg = test_config(env(&[("PORT", "8080"), ("HOST", "127.0.0.1")]));
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.host, "127.0.0.1");

        assert!(Config::load_from(None, env(&[("PORT", "not-a-port")])).is_err());
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let cfg = test_config(env(&[
            (ENV_SUPABASE_URL, "https://project.supabase.co/"),
            (ENV_SUPABASE_ANON_KEY, "anon"),
            (ENV_SUPABASE_SERVICE_ROLE_KEY, "service"),
        ]));
        assert_eq!(
            cfg.supabase.public_credentials(),
            Some(("https://project.supabase.co", "anon"))
        );
        assert_eq!(
            cfg.supabase.service_credentials(),
            Some(("https://project.supabase.co", "service"))
        );
    }

    #[test]
    fn test_malformed_supabase_url_still_counts_as_set() {
        let cfg = Config::load_from(
            None,
            env(&[(ENV_SUPABASE_URL, "localhost:54321"), (ENV_SUPABASE_ANON_KEY, "anon")]),
        )
        .unwrap();
        assert!(cfg.has_env_vars());
        assert_eq!(
            cfg.supabase.public_credentials(),
            Some(("localhost:54321", "anon"))
        );

        let cfg = test_config(env(&[
            (ENV_SUPABASE_URL, "ftp://project"),
            (ENV_SUPABASE_ANON_KEY, "anon"),
        ]));
        assert!(cfg.has_env_vars());
    }

    #[test]
    fn test_validate_url_valid() {
        assert!(Config::validate_url("http://example.com", "Test").is_ok());
        assert!(Config::validate_url("https://project.supabase.co", "Test").is_ok());
        assert!(Config::validate_url("http://localhost:54321", "Test").is_ok());
        assert!(Config::validate_url("http://192.168.1.1:8000", "Test").is_ok());
    }

    #[test]
    fn test_validate_url_invalid() {
        // Empty URL
        assert!(Config::validate_url("", "Test").is_err());

        // Missing scheme
        assert!(Config::validate_url("example.com", "Test").is_err());

        // Invalid scheme
        assert!(Config::validate_url("ftp://example.com", "Test").is_err());

        // Missing host
        assert!(Config::validate_url("http://", "Test").is_err());
    }
}
