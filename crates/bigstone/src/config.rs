use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::draft::DEFAULT_DRAFT;
use crate::store::{Session, SessionUser};

const FILENAME: &str = "config.yaml";
const APP_DIR: &str = "bigstone";

pub const URL_ENV: &str = "BIGSTONE_URL";
pub const ANON_KEY_ENV: &str = "BIGSTONE_ANON_KEY";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Project URL, e.g. `https://abcd.supabase.co`. Falls back to BIGSTONE_URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Public anon key. Falls back to BIGSTONE_ANON_KEY.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anon_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub user_id: String,
    pub access_token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft: Option<String>,
}

/// Resolved connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backend {
    pub url: String,
    pub anon_key: String,
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join(FILENAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!("No config found. Run `bigstone config show` to see defaults.")
            } else {
                anyhow::anyhow!("Failed to read config: {e}")
            }
        })?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// For read-only use. Any load failure falls back to defaults.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Load before modifying and saving. Only a missing file yields defaults;
    /// an unreadable or malformed file is an error and is left alone.
    pub fn load_for_update_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to read config {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to read config {}", path.display()))
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let contents = format!("# bigstone configuration\n{yaml}");
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Backend settings from config, then environment.
    pub fn backend(&self) -> Result<Backend> {
        self.backend_with(|name| std::env::var(name).ok())
    }

    fn backend_with(&self, env: impl Fn(&str) -> Option<String>) -> Result<Backend> {
        let configured = self.backend.clone().unwrap_or_default();
        let pick = |value: Option<String>, var: &str| {
            value.filter(|v| !v.is_empty()).or_else(|| env(var))
        };

        let url = pick(configured.url, URL_ENV).ok_or_else(|| {
            anyhow::anyhow!(
                "No backend URL configured.\n\
                 \n\
                 Run `bigstone config set backend.url https://<project>.supabase.co`\n\
                 or set the {URL_ENV} environment variable."
            )
        })?;
        let anon_key = pick(configured.anon_key, ANON_KEY_ENV).ok_or_else(|| {
            anyhow::anyhow!(
                "No anon key configured. Run `bigstone config set backend.anon_key <key>` or set {ANON_KEY_ENV}."
            )
        })?;

        Ok(Backend { url, anon_key })
    }

    pub fn session(&self) -> Session {
        match &self.session {
            Some(s) => Session::authenticated(SessionUser {
                id: s.user_id.clone(),
                access_token: s.access_token.clone(),
            }),
            None => Session::anonymous(),
        }
    }

    pub fn default_bucket(&self) -> Option<&str> {
        self.defaults.as_ref().and_then(|d| d.bucket.as_deref())
    }

    pub fn draft_path(&self) -> PathBuf {
        self.defaults
            .as_ref()
            .and_then(|d| d.draft.as_deref())
            .unwrap_or(DEFAULT_DRAFT)
            .into()
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "backend.url" => {
                if !(value.starts_with("https://") || value.starts_with("http://")) {
                    anyhow::bail!("Invalid backend URL: {value}. Must start with http:// or https://.");
                }
                self.backend
                    .get_or_insert_with(BackendConfig::default)
                    .url = Some(value.trim_end_matches('/').to_string());
            }
            "backend.anon_key" => {
                if value.trim().is_empty() {
                    anyhow::bail!("Anon key must not be empty.");
                }
                self.backend
                    .get_or_insert_with(BackendConfig::default)
                    .anon_key = Some(value.trim().to_string());
            }
            "defaults.bucket" => {
                let valid = !value.is_empty()
                    && value
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
                if !valid {
                    anyhow::bail!(
                        "Invalid bucket: {value}. Use letters, digits, '-' or '_'."
                    );
                }
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .bucket = Some(value.to_string());
            }
            "defaults.draft" => {
                if !value.ends_with(".yaml") && !value.ends_with(".yml") {
                    anyhow::bail!("Invalid draft path: {value}. Must be a .yaml or .yml file.");
                }
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .draft = Some(value.to_string());
            }
            _ => anyhow::bail!(
                "Unknown config key: {key}. Valid keys: backend.url, backend.anon_key, defaults.bucket, defaults.draft"
            ),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bigstone").join(FILENAME);

        let mut config = Config::default();
        config.set("backend.url", "https://abcd.supabase.co/").unwrap();
        config.set("backend.anon_key", "anon-key").unwrap();
        config.set("defaults.bucket", "schematics").unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(
            loaded.backend.unwrap().url.as_deref(),
            Some("https://abcd.supabase.co")
        );
    }

    #[test]
    fn test_set_rejects_invalid_values() {
        let mut config = Config::default();
        assert!(config.set("backend.url", "abcd.supabase.co").is_err());
        assert!(config.set("backend.anon_key", "  ").is_err());
        assert!(config.set("defaults.bucket", "my bucket").is_err());
        assert!(config.set("defaults.draft", "draft.json").is_err());
        let err = config.set("defaults.theme", "dark").unwrap_err();
        assert!(err.to_string().contains("Unknown config key"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_for_update_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_for_update_from(&dir.path().join(FILENAME)).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_for_update_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FILENAME);
        std::fs::write(&path, "backend:\n\turl: https://abcd.supabase.co\n").unwrap();

        let err = Config::load_for_update_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }

    #[test]
    fn test_load_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from(&dir.path().join(FILENAME)).unwrap_err();
        assert!(err.to_string().contains("No config found"));
    }

    #[test]
    fn test_backend_env_fallback() {
        let config = Config::default();
        let backend = config
            .backend_with(|name| match name {
                URL_ENV => Some("https://env.supabase.co".to_string()),
                ANON_KEY_ENV => Some("env-key".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(backend.url, "https://env.supabase.co");
        assert_eq!(backend.anon_key, "env-key");
    }

    #[test]
    fn test_backend_prefers_config() {
        let mut config = Config::default();
        config.set("backend.url", "https://cfg.supabase.co").unwrap();
        config.set("backend.anon_key", "cfg-key").unwrap();
        let backend = config
            .backend_with(|_| Some("from-env".to_string()))
            .unwrap();
        assert_eq!(backend.url, "https://cfg.supabase.co");
        assert_eq!(backend.anon_key, "cfg-key");
    }

    #[test]
    fn test_backend_missing() {
        let err = Config::default().backend_with(|_| None).unwrap_err();
        assert!(err.to_string().contains("backend.url"));
    }

    #[test]
    fn test_session_from_config() {
        let mut config = Config::default();
        assert!(config.session().user().is_none());

        config.session = Some(SessionConfig {
            user_id: "u1".to_string(),
            access_token: "tok".to_string(),
        });
        assert_eq!(config.session().user_id(), Some("u1"));
    }

    #[test]
    fn test_draft_path_default() {
        let mut config = Config::default();
        assert_eq!(config.draft_path(), PathBuf::from(DEFAULT_DRAFT));
        config.set("defaults.draft", "ports/next.yaml").unwrap();
        assert_eq!(config.draft_path(), PathBuf::from("ports/next.yaml"));
    }
}
