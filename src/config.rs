//! # Configuration
//!
//! Credentials are resolved once per invocation, in priority order:
//! 1. **CLI flags**: `--api-key`, `--api-secret`, `--base-url`, `--branch`.
//! 2. **Environment variables**: `STREAMPAY_API_KEY`, `STREAMPAY_API_SECRET`,
//!    `STREAMPAY_BASE_URL`, `STREAMPAY_BRANCH`.
//! 3. **Config file**: `~/.streampay/config.json` (or `$STREAMPAY_CONFIG`).
//!
//! Flags and environment are merged by clap before they reach [`resolve`];
//! this module only layers the result over the persisted file.

use crate::models::credential::Credential;
use crate::utils::output::OutputFormat;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Overrides the location of the config file.
pub const CONFIG_PATH_ENV: &str = "STREAMPAY_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine the home directory; set STREAMPAY_CONFIG to a config file path")]
    NoHomeDir,
    #[error("failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode configuration: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("{0} contains characters that cannot be sent in an HTTP header")]
    InvalidCredential(&'static str),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error(
        "API key not configured. Run one of:\n\n  \
         streampay login                              Set up credentials interactively\n  \
         streampay config set --api-key <key>         Set API key directly\n  \
         export STREAMPAY_API_KEY=<key>               Use environment variable"
    )]
    MissingApiKey,
}

/// The persisted config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_format: Option<OutputFormat>,
    /// Keys written by other tools are kept as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StoredConfig {
    /// Values present in `updates` win.
    pub fn merged_with(&self, updates: &StoredConfig) -> StoredConfig {
        let mut extra = self.extra.clone();
        extra.extend(updates.extra.clone());
        StoredConfig {
            api_key: updates.api_key.clone().or_else(|| self.api_key.clone()),
            api_secret: updates.api_secret.clone().or_else(|| self.api_secret.clone()),
            base_url: updates.base_url.clone().or_else(|| self.base_url.clone()),
            branch: updates.branch.clone().or_else(|| self.branch.clone()),
            default_format: updates.default_format.or(self.default_format),
            extra,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == StoredConfig::default()
    }
}

/// Credential values supplied by flags or the environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub base_url: Option<String>,
    pub branch: Option<String>,
}

impl From<&Overrides> for StoredConfig {
    fn from(overrides: &Overrides) -> Self {
        StoredConfig {
            api_key: non_empty(&overrides.api_key),
            api_secret: non_empty(&overrides.api_secret),
            base_url: non_empty(&overrides.base_url),
            branch: non_empty(&overrides.branch),
            ..StoredConfig::default()
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.trim().is_empty())
}

/// Layer `overrides` over `stored` and require an API key.
pub fn resolve(overrides: &Overrides, stored: &StoredConfig) -> Result<Credential, ConfigError> {
    let merged = StoredConfig {
        api_key: non_empty(&stored.api_key),
        api_secret: non_empty(&stored.api_secret),
        base_url: non_empty(&stored.base_url),
        branch: non_empty(&stored.branch),
        ..StoredConfig::default()
    }
    .merged_with(&StoredConfig::from(overrides));

    let api_key = merged.api_key.ok_or(ConfigError::MissingApiKey)?;
    Ok(Credential {
        api_key,
        api_secret: merged.api_secret,
        branch: merged.branch,
        base_url: merged.base_url,
    })
}

/// `***` followed by the last four characters.
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 4 {
        return format!("***{value}");
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("***{tail}")
}

/// Reads and writes the JSON config file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$STREAMPAY_CONFIG`, falling back to `~/.streampay/config.json`.
    pub fn locate() -> Result<Self, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
            return Ok(Self::at(path));
        }
        let dirs = BaseDirs::new().ok_or(ConfigError::NoHomeDir)?;
        Ok(Self::at(dirs.home_dir().join(".streampay").join("config.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unreadable files yield an empty config.
    pub fn load(&self) -> StoredConfig {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return StoredConfig::default(),
            Err(e) => {
                warn!(path = ?self.path, error = %e, "ignoring unreadable config file");
                return StoredConfig::default();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(path = ?self.path, error = %e, "ignoring corrupt config file");
            StoredConfig::default()
        })
    }

    /// Merge `updates` into the file and return what was written.
    pub fn save(&self, updates: &StoredConfig) -> Result<StoredConfig, ConfigError> {
        let merged = self.load().merged_with(updates);
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|source| self.io_error(source))?;
        }
        let raw = serde_json::to_string_pretty(&merged)?;
        fs::write(&self.path, raw).map_err(|source| self.io_error(source))?;
        debug!(path = ?self.path, "config saved");
        Ok(merged)
    }

    /// Remove the file. Returns whether anything was deleted.
    pub fn clear(&self) -> Result<bool, ConfigError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(self.io_error(source)),
        }
    }

    fn io_error(&self, source: io::Error) -> ConfigError {
        ConfigError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> ConfigStore {
        ConfigStore::at(dir.path().join(".streampay").join("config.json"))
    }

    fn with_key(key: &str) -> StoredConfig {
        StoredConfig {
            api_key: Some(key.to_string()),
            ..StoredConfig::default()
        }
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        assert!(store(&dir).load().is_empty());
    }

    #[test]
    fn save_merges_into_existing_file() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        store.save(&with_key("key_1")).unwrap();
        store
            .save(&StoredConfig {
                branch: Some("jeddah".to_string()),
                default_format: Some(OutputFormat::Json),
                ..StoredConfig::default()
            })
            .unwrap();

        let loaded = store.load();
        assert_eq!(loaded.api_key.as_deref(), Some("key_1"));
        assert_eq!(loaded.branch.as_deref(), Some("jeddah"));
        assert_eq!(loaded.default_format, Some(OutputFormat::Json));

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"apiKey\""));
        assert!(raw.contains("\"defaultFormat\": \"json\""));
        assert!(!raw.contains("apiSecret"));
    }

    #[test]
    fn corrupt_file_is_ignored_then_replaced() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{not json").unwrap();

        assert!(store.load().is_empty());
        store.save(&with_key("fresh")).unwrap();
        assert_eq!(store.load().api_key.as_deref(), Some("fresh"));
    }

    #[test]
    fn unknown_keys_survive_a_save() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), r#"{"apiKey":"k","telemetry":false}"#).unwrap();

        store.save(&StoredConfig {
            branch: Some("b".to_string()),
            ..StoredConfig::default()
        })
        .unwrap();

        let raw: Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["telemetry"], Value::Bool(false));
        assert_eq!(raw["branch"], "b");
    }

    #[test]
    fn clear_reports_whether_a_file_existed() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        assert!(!store.clear().unwrap());
        store.save(&with_key("k")).unwrap();
        assert!(store.clear().unwrap());
        assert!(!store.path().exists());
    }

    #[test]
    fn overrides_win_over_the_file() {
        let stored = StoredConfig {
            api_key: Some("file_key".to_string()),
            api_secret: Some("file_secret".to_string()),
            branch: Some("file_branch".to_string()),
            ..StoredConfig::default()
        };
        let overrides = Overrides {
            api_key: Some("flag_key".to_string()),
            branch: Some(String::new()),
            ..Overrides::default()
        };

        let credential = resolve(&overrides, &stored).unwrap();
        assert_eq!(credential.api_key, "flag_key");
        assert_eq!(credential.api_secret.as_deref(), Some("file_secret"));
        // An empty override does not blank out the stored value.
        assert_eq!(credential.branch.as_deref(), Some("file_branch"));
        assert_eq!(credential.base_url, None);
    }

    #[test]
    fn missing_api_key_is_reported() {
        let err = resolve(&Overrides::default(), &StoredConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
        assert!(err.to_string().contains("streampay login"));
        assert!(err.to_string().contains("STREAMPAY_API_KEY"));
    }

    #[test]
    fn secrets_are_masked_to_last_four() {
        assert_eq!(mask_secret("sk_live_abcdef1234"), "***1234");
        assert_eq!(mask_secret("abc"), "***abc");
        assert_eq!(mask_secret("abcd"), "***abcd");
    }
}
