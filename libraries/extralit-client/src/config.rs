//! Client configuration.

use crate::error::{ClientError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Header carrying the API key on every request.
pub const API_KEY_HEADER: &str = "X-Argilla-Api-Key";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for connecting to an Extralit server.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Base URL of the server (e.g., "https://extralit.example.com")
    pub api_url: String,
    pub api_key: String,
    /// Workspace used when a command does not name one
    #[serde(default)]
    pub workspace: Option<String>,
    /// Sent with every request, after the API key header
    #[serde(default)]
    pub extra_headers: BTreeMap<String, String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            workspace: None,
            extra_headers: BTreeMap::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_workspace(mut self, workspace: impl Into<String>) -> Self {
        self.workspace = Some(workspace.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(name.into(), value.into());
        self
    }

    /// Load configuration from `EXTRALIT_*` environment variables.
    ///
    /// Reads `EXTRALIT_API_URL`, `EXTRALIT_API_KEY`, `EXTRALIT_WORKSPACE`
    /// and `EXTRALIT_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        Self::load(config::Environment::with_prefix("EXTRALIT").try_parsing(true))
    }

    pub(crate) fn load(env: config::Environment) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(env)
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        let config: Self = settings
            .try_deserialize()
            .map_err(|e| ClientError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration and strip trailing slashes from the URL.
    pub fn validate(&self) -> Result<()> {
        if self.api_url.is_empty() {
            return Err(ClientError::Config("API URL cannot be empty".into()));
        }

        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(ClientError::Config(
                "API URL must start with http:// or https://".into(),
            ));
        }

        if self.api_key.trim().is_empty() {
            return Err(ClientError::Config("API key cannot be empty".into()));
        }

        Ok(())
    }

    /// The URL without trailing slashes.
    pub fn normalized_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        config::Environment::with_prefix("EXTRALIT")
            .try_parsing(true)
            .source(Some(source))
    }

    #[test]
    fn test_validation() {
        assert!(ClientConfig::new("https://example.com", "key").validate().is_ok());
        assert!(ClientConfig::new("http://localhost:6900", "key").validate().is_ok());

        assert!(ClientConfig::new("", "key").validate().is_err());
        assert!(ClientConfig::new("localhost:6900", "key").validate().is_err());
        assert!(ClientConfig::new("ftp://example.com", "key").validate().is_err());
        assert!(ClientConfig::new("https://example.com", "  ").validate().is_err());
    }

    #[test]
    fn test_normalized_url() {
        let config = ClientConfig::new("https://example.com///", "key");
        assert_eq!(config.normalized_url(), "https://example.com");
    }

    #[test]
    fn test_load_from_environment() {
        let config = ClientConfig::load(env(&[
            ("EXTRALIT_API_URL", "http://localhost:6900"),
            ("EXTRALIT_API_KEY", "owner.apikey"),
            ("EXTRALIT_WORKSPACE", "team"),
            ("EXTRALIT_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "http://localhost:6900");
        assert_eq!(config.api_key, "owner.apikey");
        assert_eq!(config.workspace.as_deref(), Some("team"));
        assert_eq!(config.timeout_secs, 5);
        assert!(config.extra_headers.is_empty());
    }

    #[test]
    fn test_load_defaults_timeout() {
        let config = ClientConfig::load(env(&[
            ("EXTRALIT_API_URL", "http://localhost:6900"),
            ("EXTRALIT_API_KEY", "key"),
        ]))
        .unwrap();
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(config.workspace.is_none());
    }

    #[test]
    fn test_load_missing_key_fails() {
        let result = ClientConfig::load(env(&[("EXTRALIT_API_URL", "http://localhost:6900")]));
        assert!(matches!(result, Err(ClientError::Config(_))));
    }

    #[test]
    fn test_builder_methods() {
        let config = ClientConfig::new("https://example.com", "key")
            .with_workspace("ws")
            .with_header("X-Team", "a");
        assert_eq!(config.workspace.as_deref(), Some("ws"));
        assert_eq!(config.extra_headers.get("X-Team").map(String::as_str), Some("a"));
    }
}
