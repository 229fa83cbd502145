//! Process configuration loaded once at startup from environment variables.
//!
//! All credentials and endpoint bases live here. The struct is built a
//! single time in `main` and passed by reference to each stage; nothing is
//! read from the environment after startup and nothing is ever mutated.
//!
//! # Required variables (startup fails without them)
//!
//! | Variable | Purpose |
//! |----------|---------|
//! | `WP_URL` | WordPress site base URL |
//! | `WP_USERNAME` | WordPress user for basic auth |
//! | `WP_APP_PASSWORD` | WordPress application password |
//! | `OPENAI_API_KEY` | Primary text-generation provider |
//!
//! # Optional variables
//!
//! `GOOGLE_GEMINI_API_KEY` enables the fallback text provider;
//! `UNSPLASH_ACCESS_KEY`, `PEXELS_API_KEY`, and `PIXABAY_API_KEY` each
//! enable one image provider; `TRENDS_API_URL` overrides the trends
//! endpoint base. A stage whose optional provider has no key simply skips
//! that provider.

use std::env;
use std::error::Error;
use tracing::{info, warn};

/// Default base for the OpenAI-compatible chat completions endpoint.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com";
/// Default base for the Gemini generateContent endpoint.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Default base for the trends-discovery endpoint.
pub const TRENDS_BASE_URL: &str = "https://trends.google.com/trends/api";

/// Application configuration. Secrets and endpoint bases only; behavior
/// knobs (run count, interval) come from the CLI.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // WordPress
    pub wp_url: String,
    pub wp_username: String,
    pub wp_app_password: String,

    // Text generation
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,

    // Image search
    pub unsplash_access_key: Option<String>,
    pub pexels_api_key: Option<String>,
    pub pixabay_api_key: Option<String>,

    // Trends discovery
    pub trends_base_url: String,
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// A missing required variable is a fatal startup error; the returned
    /// error names the variable so the operator knows what to set.
    pub fn from_env() -> Result<Self, Box<dyn Error + Send + Sync>> {
        dotenvy::dotenv().ok();

        let config = Self {
            wp_url: required("WP_URL")?,
            wp_username: required("WP_USERNAME")?,
            wp_app_password: required("WP_APP_PASSWORD")?,
            openai_api_key: required("OPENAI_API_KEY")?,
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| OPENAI_BASE_URL.to_string()),
            gemini_api_key: env::var("GOOGLE_GEMINI_API_KEY").ok(),
            gemini_base_url: env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| GEMINI_BASE_URL.to_string()),
            unsplash_access_key: env::var("UNSPLASH_ACCESS_KEY").ok(),
            pexels_api_key: env::var("PEXELS_API_KEY").ok(),
            pixabay_api_key: env::var("PIXABAY_API_KEY").ok(),
            trends_base_url: env::var("TRENDS_API_URL")
                .unwrap_or_else(|_| TRENDS_BASE_URL.to_string()),
        };

        if config.gemini_api_key.is_none() {
            warn!("GOOGLE_GEMINI_API_KEY is not set; no fallback text provider");
        }

        config.log_keys();
        Ok(config)
    }

    fn log_keys(&self) {
        fn preview(val: &str) -> String {
            let n = val.len().min(5);
            format!("{}...({} chars)", &val[..n], val.len())
        }
        fn preview_opt(val: &Option<String>) -> String {
            match val {
                Some(v) if !v.is_empty() => preview(v),
                _ => "<not set>".to_string(),
            }
        }

        info!(wp_url = %self.wp_url, wp_username = %self.wp_username, "Config loaded");
        info!(openai_api_key = %preview(&self.openai_api_key), "  primary text provider");
        info!(gemini_api_key = %preview_opt(&self.gemini_api_key), "  fallback text provider");
        info!(
            unsplash = %preview_opt(&self.unsplash_access_key),
            pexels = %preview_opt(&self.pexels_api_key),
            pixabay = %preview_opt(&self.pixabay_api_key),
            "  image providers"
        );
        info!(trends_base_url = %self.trends_base_url, "  trends endpoint");
    }
}

/// Read a required environment variable, erroring with its name if unset.
fn required(name: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    env::var(name).map_err(|_| format!("required environment variable {name} is not set").into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_missing_names_variable() {
        let err = required("TRENDPRESS_TEST_DEFINITELY_UNSET").unwrap_err();
        assert!(err.to_string().contains("TRENDPRESS_TEST_DEFINITELY_UNSET"));
    }

    #[test]
    fn test_required_present() {
        // set_var is process-global; use a name no other test reads.
        unsafe { env::set_var("TRENDPRESS_TEST_PRESENT", "value") };
        assert_eq!(required("TRENDPRESS_TEST_PRESENT").unwrap(), "value");
        unsafe { env::remove_var("TRENDPRESS_TEST_PRESENT") };
    }
}
