//! Client configuration loaded from environment variables.
//!
//! Every setting has a default so the client runs against the public API
//! with zero configuration.

use std::path::PathBuf;
use std::time::Duration;

use momentz_shared::constants::{
    DEFAULT_API_URL, DEFAULT_FEED_PAGE_SIZE, DEFAULT_SUGGESTION_LIMIT, TOAST_DURATION_SECS,
};
use url::Url;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST API, without a trailing slash.
    /// Env: `MOMENTZ_API_URL`
    /// Default: `https://momentzz.onrender.com/api`
    pub api_url: String,

    /// Directory holding the local database.
    /// Env: `MOMENTZ_DATA_DIR`
    /// Default: the platform data directory.
    pub data_dir: Option<PathBuf>,

    /// Posts requested per feed page.
    /// Env: `MOMENTZ_FEED_PAGE_SIZE`
    pub feed_page_size: u32,

    /// Follow suggestions requested.
    /// Env: `MOMENTZ_SUGGESTION_LIMIT`
    pub suggestion_limit: u32,

    /// How long a toast stays visible.
    /// Env: `MOMENTZ_TOAST_SECS`
    pub toast_duration: Duration,

    /// Optional whole-request timeout. Unset means the transport default.
    /// Env: `MOMENTZ_REQUEST_TIMEOUT_SECS`
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            data_dir: None,
            feed_page_size: DEFAULT_FEED_PAGE_SIZE,
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
            toast_duration: Duration::from_secs(TOAST_DURATION_SECS),
            request_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reading from an arbitrary
    /// source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup("MOMENTZ_API_URL") {
            match normalize_base_url(&raw) {
                Some(url) => config.api_url = url,
                None => tracing::warn!(value = %raw, "Invalid MOMENTZ_API_URL, using default"),
            }
        }

        if let Some(dir) = lookup("MOMENTZ_DATA_DIR") {
            if !dir.trim().is_empty() {
                config.data_dir = Some(PathBuf::from(dir));
            }
        }

        if let Some(size) = parse_positive(&lookup, "MOMENTZ_FEED_PAGE_SIZE") {
            config.feed_page_size = size;
        }

        if let Some(limit) = parse_positive(&lookup, "MOMENTZ_SUGGESTION_LIMIT") {
            config.suggestion_limit = limit;
        }

        if let Some(secs) = parse_positive(&lookup, "MOMENTZ_TOAST_SECS") {
            config.toast_duration = Duration::from_secs(u64::from(secs));
        }

        if let Some(secs) = parse_positive(&lookup, "MOMENTZ_REQUEST_TIMEOUT_SECS") {
            config.request_timeout = Some(Duration::from_secs(u64::from(secs)));
        }

        config
    }
}

/// Accept only absolute http(s) URLs and drop any trailing slash.
pub fn normalize_base_url(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw.trim()).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }
    Some(parsed.as_str().trim_end_matches('/').to_string())
}

fn parse_positive(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u32> {
    let raw = lookup(key)?;
    match raw.trim().parse::<u32>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            tracing::warn!(key, value = %raw, "Invalid value, using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> ClientConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClientConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.feed_page_size, 20);
        assert_eq!(config.suggestion_limit, 5);
        assert_eq!(config.toast_duration, Duration::from_secs(3));
        assert!(config.request_timeout.is_none());
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_overrides_and_invalid_values() {
        let config = config_from(&[
            ("MOMENTZ_API_URL", "http://localhost:8080/api/"),
            ("MOMENTZ_FEED_PAGE_SIZE", "50"),
            ("MOMENTZ_SUGGESTION_LIMIT", "zero"),
            ("MOMENTZ_TOAST_SECS", "0"),
            ("MOMENTZ_REQUEST_TIMEOUT_SECS", "15"),
            ("MOMENTZ_DATA_DIR", "/tmp/momentz"),
        ]);
        assert_eq!(config.api_url, "http://localhost:8080/api");
        assert_eq!(config.feed_page_size, 50);
        assert_eq!(config.suggestion_limit, 5);
        assert_eq!(config.toast_duration, Duration::from_secs(3));
        assert_eq!(config.request_timeout, Some(Duration::from_secs(15)));
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/momentz")));
    }

    #[test]
    fn test_rejects_non_http_url() {
        let config = config_from(&[("MOMENTZ_API_URL", "ftp://example.com")]);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(normalize_base_url("not a url"), None);
    }
}
