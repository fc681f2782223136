//! Credential storage shared by the CLI and library users.
//!
//! Reads/writes `<cache dir>/extralit/credentials.json` (0600 on Unix).

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Credentials saved by `extralit login`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub api_url: String,
    pub api_key: String,
    #[serde(default)]
    pub workspace: Option<String>,
    #[serde(default)]
    pub extra_headers: BTreeMap<String, String>,
}

impl Credentials {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            workspace: None,
            extra_headers: BTreeMap::new(),
        }
    }

    /// Path of the credentials file, if a cache directory can be determined.
    pub fn default_path() -> Option<PathBuf> {
        dirs::cache_dir().map(|c| c.join("extralit").join("credentials.json"))
    }

    /// Whether credentials have been saved.
    pub fn exists() -> bool {
        Self::default_path().is_some_and(|p| Self::exists_at(&p))
    }

    pub fn exists_at(path: &Path) -> bool {
        path.is_file()
    }

    pub fn load() -> Result<Self> {
        let path = Self::default_path().ok_or_else(|| {
            ClientError::Credentials("Could not determine cache directory".into())
        })?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ClientError::Credentials(format!(
                "You are not logged in, no credentials found at {}",
                path.display()
            )));
        }

        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|e| {
            ClientError::Credentials(format!(
                "Invalid credentials file {}: {}",
                path.display(),
                e
            ))
        })
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::default_path().ok_or_else(|| {
            ClientError::Credentials("Could not determine cache directory".into())
        })?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save credentials, creating the parent directory if needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            ClientError::Credentials(format!("Failed to serialize credentials: {}", e))
        })?;

        std::fs::write(path, contents)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        debug!(path = %path.display(), "Saved credentials");
        Ok(())
    }

    pub fn remove() -> Result<()> {
        match Self::default_path() {
            Some(path) => Self::remove_at(&path),
            None => Ok(()),
        }
    }

    /// Delete the credentials file. A missing file is not an error.
    pub fn remove_at(path: &Path) -> Result<()> {
        if path.exists() {
            std::fs::remove_file(path)?;
            debug!(path = %path.display(), "Removed credentials");
        }
        Ok(())
    }

    pub fn to_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(&self.api_url, &self.api_key);
        config.workspace = self.workspace.clone();
        config.extra_headers = self.extra_headers.clone();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_optional_fields() {
        let json = r#"{"api_url":"http://localhost:6900","api_key":"key"}"#;
        let parsed: Credentials = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.api_key, "key");
        assert!(parsed.workspace.is_none());
        assert!(parsed.extra_headers.is_empty());
    }

    #[test]
    fn test_default_path() {
        if let Some(path) = Credentials::default_path() {
            assert!(path.ends_with("extralit/credentials.json"));
        }
    }

    #[test]
    fn test_save_load_remove() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("credentials.json");

        assert!(!Credentials::exists_at(&path));

        let mut creds = Credentials::new("http://localhost:6900", "owner.apikey");
        creds.workspace = Some("team".into());
        creds.extra_headers.insert("X-Proxy".into(), "1".into());
        creds.save_to(&path).unwrap();

        assert!(Credentials::exists_at(&path));
        let loaded = Credentials::load_from(&path).unwrap();
        assert_eq!(loaded, creds);

        Credentials::remove_at(&path).unwrap();
        assert!(!Credentials::exists_at(&path));
        // Removing twice is fine
        Credentials::remove_at(&path).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        Credentials::new("http://localhost:6900", "key")
            .save_to(&path)
            .unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Credentials::load_from(&dir.path().join("nope.json"));
        match result {
            Err(ClientError::Credentials(msg)) => assert!(msg.contains("not logged in")),
            other => panic!("Expected Credentials error, got: {:?}", other),
        }
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            Credentials::load_from(&path),
            Err(ClientError::Credentials(_))
        ));
    }

    #[test]
    fn test_to_config() {
        let mut creds = Credentials::new("http://localhost:6900/", "key");
        creds.workspace = Some("ws".into());
        let config = creds.to_config();
        assert_eq!(config.api_key, "key");
        assert_eq!(config.workspace.as_deref(), Some("ws"));
        assert_eq!(config.normalized_url(), "http://localhost:6900");
    }
}
