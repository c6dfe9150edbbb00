//! Supabase client configuration.
//!
//! The project URL and anon key are public values that identify the backend;
//! the auth and REST endpoints are derived from the project URL.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::{is_http_url, normalize_text_option};

/// Environment variable holding the Supabase project URL.
pub const SUPABASE_URL_ENV: &str = "SUPABASE_URL";
/// Environment variable holding the Supabase anon key.
pub const SUPABASE_ANON_KEY_ENV: &str = "SUPABASE_ANON_KEY";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Supabase URL and anon key must be configured together")]
    Incomplete,
    #[error("Invalid Supabase configuration: {0}")]
    Invalid(&'static str),
}

/// Validated Supabase project settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupabaseConfig {
    url: String,
    anon_key: String,
}

impl SupabaseConfig {
    pub fn new(url: impl AsRef<str>, anon_key: impl AsRef<str>) -> Result<Self, ConfigError> {
        let url = url.as_ref().trim().trim_end_matches('/');
        if url.is_empty() {
            return Err(ConfigError::Invalid("Supabase URL must not be empty"));
        }
        if !is_http_url(url) {
            return Err(ConfigError::Invalid(
                "Supabase URL must include http:// or https://",
            ));
        }
        let url = url
            .strip_suffix("/auth/v1")
            .or_else(|| url.strip_suffix("/rest/v1"))
            .unwrap_or(url);

        let anon_key = anon_key.as_ref().trim();
        if anon_key.is_empty() {
            return Err(ConfigError::Invalid("Supabase anon key must not be empty"));
        }

        Ok(Self {
            url: url.to_string(),
            anon_key: anon_key.to_string(),
        })
    }

    /// Build a config from optional parts.
    ///
    /// Both missing means "not configured" (`Ok(None)`); exactly one missing is
    /// an error.
    pub fn resolve(
        url: Option<String>,
        anon_key: Option<String>,
    ) -> Result<Option<Self>, ConfigError> {
        match (normalize_text_option(url), normalize_text_option(anon_key)) {
            (None, None) => Ok(None),
            (Some(url), Some(anon_key)) => Self::new(url, anon_key).map(Some),
            _ => Err(ConfigError::Incomplete),
        }
    }

    /// Project base URL without a trailing slash.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn anon_key(&self) -> &str {
        &self.anon_key
    }

    /// GoTrue endpoint, e.g. `https://demo.supabase.co/auth/v1`.
    #[must_use]
    pub fn auth_url(&self) -> String {
        format!("{}/auth/v1", self.url)
    }

    /// PostgREST endpoint, e.g. `https://demo.supabase.co/rest/v1`.
    #[must_use]
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_service_urls() {
        let config = SupabaseConfig::new("https://demo.supabase.co/", "anon").unwrap();
        assert_eq!(config.auth_url(), "https://demo.supabase.co/auth/v1");
        assert_eq!(config.rest_url(), "https://demo.supabase.co/rest/v1");
    }

    #[test]
    fn strips_service_suffixes() {
        let config = SupabaseConfig::new("https://demo.supabase.co/auth/v1", "anon").unwrap();
        assert_eq!(config.url(), "https://demo.supabase.co");
        let config = SupabaseConfig::new("https://demo.supabase.co/rest/v1/", "anon").unwrap();
        assert_eq!(config.url(), "https://demo.supabase.co");
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(SupabaseConfig::new("demo.supabase.co", "anon").is_err());
        assert!(SupabaseConfig::new("https://demo.supabase.co", "  ").is_err());
        assert!(SupabaseConfig::new("", "anon").is_err());
    }

    #[test]
    fn resolve_requires_both_or_neither() {
        assert_eq!(SupabaseConfig::resolve(None, Some(" ".to_string())), Ok(None));
        assert_eq!(
            SupabaseConfig::resolve(Some("https://demo.supabase.co".to_string()), None),
            Err(ConfigError::Incomplete)
        );
        let resolved = SupabaseConfig::resolve(
            Some(" https://demo.supabase.co ".to_string()),
            Some(" anon ".to_string()),
        )
        .unwrap()
        .unwrap();
        assert_eq!(resolved.anon_key(), "anon");
    }
}
