//! Configuration management for MOLA

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::client::DEFAULT_API_BASE_URL;
use crate::error::{ConfigError, Result};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend API base URL, e.g. `https://shop.example.com/api/v1`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,

    /// Session file location (defaults to ~/.mola/session.yaml)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_path: Option<String>,

    /// User preferences
    #[serde(default)]
    pub preferences: Preferences,
}

/// User preferences
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Preferences {
    /// Default output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".mola").join("config.yaml"))
    }

    /// Resolve an optional override to a concrete path.
    pub fn resolve_path(path: Option<&str>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(PathBuf::from(p)),
            None => Self::default_path(),
        }
    }

    /// Load configuration from `path` (or the default location)
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        Self::load_from(Self::resolve_path(path)?)
    }

    /// Load configuration, falling back to defaults when no file exists
    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        match Self::load_at(path) {
            Err(crate::error::Error::Config(ConfigError::NotFound)) => Ok(Self::default()),
            other => other,
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound.into());
        }

        let contents = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Save configuration to `path` (or the default location)
    pub fn save_at(&self, path: Option<&str>) -> Result<()> {
        self.save_to(Self::resolve_path(path)?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(&path, contents)?;

        // Set file permissions to 600 on Unix systems
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(&path, perms)?;
        }

        Ok(())
    }

    /// Base URL to dispatch against.
    ///
    /// Precedence: explicit override (flag or `MOLA_API_BASE_URL`) > config
    /// file > compiled-in default.
    pub fn api_base_url(&self, override_url: Option<&str>) -> Result<String> {
        let url = self.configured_base_url(override_url);
        validate_base_url(url)?;
        Ok(url.to_string())
    }

    /// Base URL by the same precedence, without validation.
    pub fn configured_base_url<'a>(&'a self, override_url: Option<&'a str>) -> &'a str {
        override_url
            .or(self.api_base_url.as_deref())
            .unwrap_or(DEFAULT_API_BASE_URL)
    }
}

/// Check that a base URL is an absolute http(s) URL.
pub fn validate_base_url(url: &str) -> Result<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "API base URL must start with http:// or https://: {url}"
        ))
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.api_base_url.is_none());
        assert!(config.session_path.is_none());
        assert!(config.preferences.format.is_none());
    }

    #[test]
    fn test_base_url_precedence() {
        let mut config = Config::default();
        assert_eq!(config.api_base_url(None).unwrap(), DEFAULT_API_BASE_URL);

        config.api_base_url = Some("https://shop.example.com/api/v1".to_string());
        assert_eq!(
            config.api_base_url(None).unwrap(),
            "https://shop.example.com/api/v1"
        );
        assert_eq!(
            config.api_base_url(Some("http://localhost:9000")).unwrap(),
            "http://localhost:9000"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = Config::default()
            .api_base_url(Some("shop.example.com"))
            .unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_configured_base_url_skips_validation() {
        let config = Config {
            api_base_url: Some("localhost:8080".to_string()),
            ..Default::default()
        };

        assert_eq!(config.configured_base_url(None), "localhost:8080");
        assert!(config.api_base_url(None).is_err());
        assert_eq!(
            config.configured_base_url(Some("http://localhost:9000")),
            "http://localhost:9000"
        );
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mola").join("config.yaml");

        let config = Config {
            api_base_url: Some("https://shop.example.com/api/v1".to_string()),
            session_path: None,
            preferences: Preferences {
                format: Some("json".to_string()),
            },
        };
        config.save_to(path.clone()).unwrap();

        let loaded = Config::load_from(path).unwrap();
        assert_eq!(
            loaded.api_base_url.as_deref(),
            Some("https://shop.example.com/api/v1")
        );
        assert_eq!(loaded.preferences.format.as_deref(), Some("json"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.yaml");
        let path_str = path.to_str().unwrap();

        let err = Config::load_at(Some(path_str)).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::NotFound)));

        let config = Config::load_or_default(Some(path_str)).unwrap();
        assert!(config.api_base_url.is_none());
    }

    #[test]
    fn test_unparseable_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "api_base_url: [oops").unwrap();

        let err = Config::load_from(path).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::ParseError(_))));
    }
}
