//! Client configuration from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use crate::adapters::http::endpoints::{EndpointRegistry, DEFAULT_PREFIX};
use crate::GlucotrackError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Fixed per-request timeout unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Scheme, host and port; no trailing slash.
    pub base_url: String,
    pub endpoints: EndpointRegistry,
    pub timeout: Duration,
    /// Where exported result files are written.
    pub export_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            endpoints: EndpointRegistry::default(),
            timeout: DEFAULT_TIMEOUT,
            export_dir: PathBuf::from("."),
        }
    }
}

impl ClientConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    /// Returns `GlucotrackError::Config` for malformed values.
    pub fn from_env() -> Result<Self, GlucotrackError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns `GlucotrackError::Config` for malformed values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, GlucotrackError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("GLUCOTRACK_API_BASE_URL")
            .or_else(|| lookup("API_BASE_URL"))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(GlucotrackError::Config(format!(
                "API base URL must start with http:// or https://, got {base_url:?}"
            )));
        }

        let endpoints = match lookup("GLUCOTRACK_API_PREFIX") {
            Some(p) if p.trim().eq_ignore_ascii_case("none") => EndpointRegistry::bare(),
            Some(p) => EndpointRegistry::with_prefix(&p),
            None => EndpointRegistry::with_prefix(DEFAULT_PREFIX),
        };

        let timeout = match lookup("GLUCOTRACK_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    GlucotrackError::Config(format!("Invalid GLUCOTRACK_TIMEOUT_SECS: {raw:?}"))
                })?;
                if secs == 0 {
                    return Err(GlucotrackError::Config(
                        "GLUCOTRACK_TIMEOUT_SECS must be greater than 0".to_string(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => DEFAULT_TIMEOUT,
        };

        let export_dir = lookup("GLUCOTRACK_EXPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            base_url,
            endpoints,
            timeout,
            export_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[])).expect("Should load");
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("API_BASE_URL", "https://glucotrack.example.org/"),
            ("GLUCOTRACK_API_PREFIX", "none"),
            ("GLUCOTRACK_TIMEOUT_SECS", "3"),
            ("GLUCOTRACK_EXPORT_DIR", "/tmp/exports"),
        ]))
        .expect("Should load");
        assert_eq!(config.base_url, "https://glucotrack.example.org");
        assert_eq!(config.endpoints, EndpointRegistry::bare());
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.export_dir, PathBuf::from("/tmp/exports"));
    }

    #[test]
    fn test_primary_variable_wins() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("GLUCOTRACK_API_BASE_URL", "http://primary:8000"),
            ("API_BASE_URL", "http://fallback:8000"),
        ]))
        .expect("Should load");
        assert_eq!(config.base_url, "http://primary:8000");
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[("GLUCOTRACK_TIMEOUT_SECS", "0")])),
            Err(GlucotrackError::Config(_))
        ));
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[("GLUCOTRACK_TIMEOUT_SECS", "ten")])),
            Err(GlucotrackError::Config(_))
        ));
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[("GLUCOTRACK_API_BASE_URL", "localhost:8000")])),
            Err(GlucotrackError::Config(_))
        ));
    }
}
