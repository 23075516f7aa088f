use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use crate::cli::ConfigCommands;
use crate::config::Config;

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            let path = Config::path()?;
            println!("{} {}", "Config file:".bold(), path.display());
            if !path.exists() {
                println!("{}", "(not created yet, using defaults)".dimmed());
                return Ok(());
            }
            let config = Config::load()?;
            let yaml = serde_yaml::to_string(&masked(config))
                .context("Failed to serialize config")?;
            print!("{yaml}");
        }
        ConfigCommands::Set { key, value } => {
            let path = Config::path()?;
            set_value(&path, &key, &value)?;
            println!("Set {} in {}", key.bold(), path.display());
        }
    }
    Ok(())
}

fn set_value(path: &Path, key: &str, value: &str) -> Result<()> {
    let mut config = Config::load_for_update_from(path)?;
    config.set(key, value)?;
    config.save_to(path)
}

/// Hide secrets before printing.
fn masked(mut config: Config) -> Config {
    if let Some(key) = config.backend.as_mut().and_then(|b| b.anon_key.as_mut()) {
        *key = mask(key);
    }
    if let Some(session) = config.session.as_mut() {
        session.access_token = mask(&session.access_token);
    }
    config
}

fn mask(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("{visible}****")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BackendConfig, SessionConfig};

    #[test]
    fn test_mask() {
        assert_eq!(mask("short"), "****");
        assert_eq!(mask("eyJhbGciOiJIUzI1NiJ9"), "eyJh****");
    }

    #[test]
    fn test_masked_hides_secrets() {
        let config = Config {
            backend: Some(BackendConfig {
                url: Some("https://abcd.supabase.co".to_string()),
                anon_key: Some("anon-key-0123456789".to_string()),
            }),
            session: Some(SessionConfig {
                user_id: "user-1".to_string(),
                access_token: "token-0123456789".to_string(),
            }),
            defaults: None,
        };
        let shown = masked(config);
        let backend = shown.backend.unwrap();
        assert_eq!(backend.url.as_deref(), Some("https://abcd.supabase.co"));
        assert_eq!(backend.anon_key.as_deref(), Some("anon****"));
        let session = shown.session.unwrap();
        assert_eq!(session.user_id, "user-1");
        assert_eq!(session.access_token, "toke****");
    }

    #[test]
    fn test_set_value_creates_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bigstone").join("config.yaml");

        set_value(&path, "defaults.bucket", "images").unwrap();

        assert_eq!(Config::load_from(&path).unwrap().default_bucket(), Some("images"));
    }

    #[test]
    fn test_set_value_leaves_malformed_config_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let contents = "backend:\n\turl: https://abcd.supabase.co\n";
        std::fs::write(&path, contents).unwrap();

        let err = set_value(&path, "defaults.bucket", "images").unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), contents);
    }
}
