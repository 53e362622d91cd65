//! Environment configuration.

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_ORIGIN: &str = "http://localhost:5173";

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// The SPA origin allowed by CORS; cookies require an exact origin,
    /// wildcards are not an option with credentials.
    pub allowed_origin: String,
    pub cookie_secure: bool,
    /// Development mode passes internal-error detail through to responses.
    pub dev_mode: bool,
    /// Where the federated callback sends the browser once the session is
    /// established.
    pub spa_callback_url: String,
}

impl Config {
    /// Load from the environment, falling back to local-dev defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let allowed_origin =
            std::env::var("ALLOWED_ORIGIN").unwrap_or_else(|_| DEFAULT_ORIGIN.to_owned());
        let cookie_secure =
            env_bool("COOKIE_SECURE").unwrap_or_else(|| allowed_origin.starts_with("https://"));
        let dev_mode = std::env::var("APP_ENV")
            .map(|v| v.eq_ignore_ascii_case("development"))
            .unwrap_or(false);
        let spa_callback_url = std::env::var("SPA_CALLBACK_URL")
            .unwrap_or_else(|_| format!("{allowed_origin}/oauth/callback"));

        Self { port, allowed_origin, cookie_secure, dev_mode, spa_callback_url }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
