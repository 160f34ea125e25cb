//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `APP_URL` (optional): public base URL used when computing page links
/// - `ELEVENLABS_WEBHOOK_SECRET` (optional): shared secret for inbound
///   webhook signature verification. When unset, signatures are NOT checked
///   and every accepted webhook is logged with a warning.
/// - `ANTHROPIC_API_KEY` (optional): key for the hosted LLM API; required
///   only when content generation endpoints are used
/// - `BOOTSTRAP_TOKEN` (optional): operator token guarding organization
///   onboarding; onboarding is unavailable until it is set
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default)]
    pub app_url: Option<String>,

    #[serde(default)]
    pub elevenlabs_webhook_secret: Option<String>,

    #[serde(default)]
    pub anthropic_api_key: Option<String>,

    #[serde(default)]
    pub bootstrap_token: Option<String>,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., DATABASE_URL)
    /// - Environment variable values cannot be parsed into expected types
    pub fn from_env() -> Result<Self, envy::Error> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        // Parse environment variables into Config struct
        // Field names are automatically converted: database_url -> DATABASE_URL
        envy::from_env::<Config>()
    }

    /// Public URL for a page slug, e.g. `https://pages.example.com/acme-q3`.
    ///
    /// Falls back to a bare `/slug` path when APP_URL is not configured,
    /// matching how links render behind a reverse proxy.
    pub fn page_url(&self, slug: &str) -> String {
        match &self.app_url {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), slug),
            None => format!("/{}", slug),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_app_url(app_url: Option<&str>) -> Config {
        Config {
            database_url: "postgres://localhost/test".to_string(),
            server_port: 3000,
            app_url: app_url.map(String::from),
            elevenlabs_webhook_secret: None,
            anthropic_api_key: None,
            bootstrap_token: None,
        }
    }

    #[test]
    fn test_page_url_with_base() {
        let config = config_with_app_url(Some("https://pages.example.com/"));
        assert_eq!(
            config.page_url("acme-q3"),
            "https://pages.example.com/acme-q3"
        );
    }

    #[test]
    fn test_page_url_without_base() {
        let config = config_with_app_url(None);
        assert_eq!(config.page_url("acme-q3"), "/acme-q3");
    }
}
