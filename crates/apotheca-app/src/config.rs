//! Configuration for apotheca app services

use crate::error::{AppError, Result};

/// Network-related configuration
pub mod network {
    /// User agent for HTTP requests
    pub const USER_AGENT: &str = concat!("Apotheca/", env!("CARGO_PKG_VERSION"));

    /// Connection timeout in seconds
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;

    /// Read timeout in seconds
    pub const READ_TIMEOUT_SECS: u64 = 30;

    /// REST path prefix on the hosted backend
    pub const REST_PATH: &str = "/rest/v1";
}

/// Query cache configuration
pub mod cache {
    /// Seconds a cached query result is served before it is refetched
    pub const STALE_TIME_SECS: u64 = 60;
}

/// Prescription statistics
pub mod stats {
    /// Window for the "recent" prescription count, in hours
    pub const RECENT_WINDOW_HOURS: i64 = 24;
}

/// Remote table names
pub mod tables {
    pub const PRESCRIPTIONS: &str = "prescriptions";
    pub const CMS_PAGES: &str = "cms_pages";
    pub const BLOG_POSTS: &str = "blog_posts";
}

/// Environment variables read by [`RemoteConfig::from_env`]
pub mod env {
    /// Base URL of the hosted backend (e.g. `https://xyz.example.co`)
    pub const API_URL: &str = "APOTHECA_API_URL";

    /// Public (anon) API key sent with every request
    pub const API_KEY: &str = "APOTHECA_API_KEY";
}

/// Connection settings for the hosted backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Base URL without trailing slash
    pub base_url: String,
    /// API key for the `apikey` and bearer headers
    pub api_key: String,
}

impl RemoteConfig {
    /// Create a config, normalizing the base URL
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(AppError::Config(format!(
                "Backend URL must start with http:// or https://, got {base_url:?}"
            )));
        }

        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(AppError::Config("Backend API key is empty".to_string()));
        }

        Ok(Self { base_url, api_key })
    }

    /// Read the config from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the config through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = lookup(env::API_URL)
            .ok_or_else(|| AppError::Config(format!("{} is not set", env::API_URL)))?;
        let api_key = lookup(env::API_KEY)
            .ok_or_else(|| AppError::Config(format!("{} is not set", env::API_KEY)))?;
        Self::new(base_url, api_key)
    }

    /// URL of a table endpoint
    pub fn table_url(&self, table: &str) -> String {
        format!("{}{}/{}", self.base_url, network::REST_PATH, table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let config = RemoteConfig::new("https://db.example.co/", "key").unwrap();
        assert_eq!(config.base_url, "https://db.example.co");
        assert_eq!(
            config.table_url("cms_pages"),
            "https://db.example.co/rest/v1/cms_pages"
        );
    }

    #[test]
    fn test_new_rejects_bad_scheme() {
        assert!(RemoteConfig::new("db.example.co", "key").is_err());
    }

    #[test]
    fn test_new_rejects_empty_key() {
        assert!(RemoteConfig::new("https://db.example.co", "  ").is_err());
    }

    #[test]
    fn test_from_lookup() {
        let config = RemoteConfig::from_lookup(lookup_from(&[
            (env::API_URL, "https://db.example.co"),
            (env::API_KEY, "anon"),
        ]))
        .unwrap();
        assert_eq!(config.api_key, "anon");
    }

    #[test]
    fn test_from_lookup_missing_var() {
        let err = RemoteConfig::from_lookup(lookup_from(&[(env::API_URL, "https://x.co")]))
            .unwrap_err();
        assert!(err.to_string().contains(env::API_KEY));
    }
}
