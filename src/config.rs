/// YAML configuration with environment and command-line overrides.
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const ENV_BASE_URL: &str = "TIMECLOCK_BASE_URL";
pub const ENV_TOKEN: &str = "TIMECLOCK_TOKEN";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub token: Option<String>,
    pub company_id: Option<u32>,
    pub request_timeout_secs: u64,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            token: None,
            company_id: None,
            request_timeout_secs: 30,
            log_level: "info".to_string(),
        }
    }
}

/// Returns `<config_dir>/timeclock/config.yaml`, or `./timeclock.yaml` when
/// the platform has no config directory.
pub fn default_path() -> PathBuf {
    match dirs::config_dir() {
        Some(dir) => dir.join("timeclock").join("config.yaml"),
        None => PathBuf::from("timeclock.yaml"),
    }
}

impl Config {
    /// Reads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content, path)
    }

    fn from_yaml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies `TIMECLOCK_BASE_URL` and `TIMECLOCK_TOKEN`.
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_BASE_URL).filter(|value| !value.trim().is_empty()) {
            self.base_url = url;
        }
        if let Some(token) = lookup(ENV_TOKEN).filter(|value| !value.trim().is_empty()) {
            self.token = Some(token);
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "base_url must start with http:// or https://, got '{url}'"
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Writes a default config to `path` unless one exists. Returns whether a file was written.
    pub fn init(path: &Path) -> Result<bool, ConfigError> {
        if path.exists() {
            return Ok(false);
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let yaml = serde_yaml::to_string(&Self::default()).map_err(ConfigError::Encode)?;
        fs::write(path, yaml).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = Config::from_yaml(
            "base_url: https://api.example.test\ncompany_id: 7\n",
            Path::new("config.yaml"),
        )
        .unwrap();
        assert_eq!(config.base_url, "https://api.example.test");
        assert_eq!(config.company_id, Some(7));
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.token, None);
    }

    #[test]
    fn empty_file_is_default() {
        let config = Config::from_yaml("\n", Path::new("config.yaml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn malformed_file_reports_path() {
        let err = Config::from_yaml("base_url: [", Path::new("broken.yaml")).unwrap_err();
        assert!(err.to_string().contains("broken.yaml"));
    }

    #[test]
    fn environment_overrides_file_values() {
        let config = Config {
            token: Some("from-file".to_string()),
            ..Config::default()
        }
        .with_overrides(|key| match key {
            ENV_BASE_URL => Some("https://env.example.test".to_string()),
            ENV_TOKEN => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.base_url, "https://env.example.test");
        assert_eq!(config.token.as_deref(), Some("from-file"));
    }

    #[test]
    fn validate_rejects_bad_url_and_timeout() {
        let config = Config {
            base_url: "api.example.test".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            request_timeout_secs: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn init_writes_once() {
        let dir = std::env::temp_dir().join(format!("timeclock-config-{}", std::process::id()));
        let path = dir.join("config.yaml");
        let _ = fs::remove_dir_all(&dir);

        assert!(Config::init(&path).unwrap());
        assert!(!Config::init(&path).unwrap());
        assert_eq!(Config::load(&path).unwrap(), Config::default());

        let _ = fs::remove_dir_all(&dir);
    }
}
