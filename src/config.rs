use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::gateway::DEFAULT_RECENT_LIMIT;

pub const DEFAULT_CONFIG_PATH: &str = "config/guestbook.json";
pub const ADMIN_KEY_VAR: &str = "GUESTBOOK_ADMIN_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where `guestbook serve` listens.
    pub bind_address: String,
    /// Gateway the desktop client talks to.
    pub server_url: String,
    pub database_path: String,
    pub recent_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            server_url: "http://127.0.0.1:8080".to_string(),
            database_path: "data/guestbook.db".to_string(),
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }
}

impl AppConfig {
    /// Recent window actually used: never zero, never past the fixed window.
    pub fn recent_limit(&self) -> usize {
        self.recent_limit.clamp(1, DEFAULT_RECENT_LIMIT)
    }
}

pub fn load_config(path: &str) -> AppConfig {
    let path = Path::new(path);
    match fs::read_to_string(path) {
        Ok(content) => parse_config(&content).unwrap_or_else(|err| {
            log::warn!("Failed to parse config file {}: {err}", path.display());
            AppConfig::default()
        }),
        Err(err) => {
            log::info!(
                "Config file {} not found ({err}); using defaults",
                path.display()
            );
            AppConfig::default()
        }
    }
}

fn parse_config(content: &str) -> serde_json::Result<AppConfig> {
    serde_json::from_str::<AppConfig>(content)
}

/// Reads the admin key from the environment (after `.env` has been loaded).
/// The value is handed to the gateway at construction; nothing else reads it.
pub fn admin_secret_from_env() -> Option<String> {
    match env::var(ADMIN_KEY_VAR) {
        Ok(secret) if !secret.is_empty() => Some(secret),
        _ => {
            log::warn!("{ADMIN_KEY_VAR} not set; deletion will be refused");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = parse_config(r#"{ "server_url": "http://guestbook.local" }"#).unwrap();
        assert_eq!(config.server_url, "http://guestbook.local");
        assert_eq!(config.recent_limit, DEFAULT_RECENT_LIMIT);
        assert_eq!(config.database_path, "data/guestbook.db");
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert_eq!(load_config(path.to_str().unwrap()), AppConfig::default());
    }

    #[test]
    fn unparsable_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_config(path.to_str().unwrap()), AppConfig::default());
    }

    #[test]
    fn recent_limit_is_clamped_to_window() {
        let mut config = AppConfig::default();
        config.recent_limit = 500;
        assert_eq!(config.recent_limit(), DEFAULT_RECENT_LIMIT);
        config.recent_limit = 0;
        assert_eq!(config.recent_limit(), 1);
    }
}
