//! Server Configuration
//!
//! Loaded from a TOML file. Every section and field has a default, so a
//! missing file or a partial file still yields a usable configuration.
//!
//! ```toml
//! [database]
//! url = "sqlite:world.db?mode=rwc"
//!
//! [content]
//! auto_clean = false
//! reload_trigger = "reload-quests"
//!
//! [logging]
//! filter = "info,sqlx=warn"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::ContentError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub database: DatabaseConfig,
    pub content: ContentConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:world.db?mode=rwc".to_string(),
            max_connections: 5,
        }
    }
}

/// Content loading policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Delete invalid rows at the source instead of only logging them
    pub auto_clean: bool,
    /// Touching this file requests a quest reload
    pub reload_trigger: Option<PathBuf>,
    /// Largest reputation reward a quest may grant
    pub max_reward_faction_value: i32,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            auto_clean: false,
            reload_trigger: None,
            max_reward_faction_value: 42_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl WorldConfig {
    /// Load configuration from a TOML file, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: &Path) -> Result<Self, ContentError> {
        if !path.exists() {
            warn!("Config file {:?} does not exist, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|source| ContentError::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = WorldConfig::load(&temp_dir.path().join("absent.toml")).unwrap();

        assert!(!config.content.auto_clean);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.content.max_reward_faction_value, 42_000);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[content]
auto_clean = true
reload_trigger = "reload-quests"
"#,
        )
        .unwrap();

        let config = WorldConfig::load(&path).unwrap();
        assert!(config.content.auto_clean);
        assert_eq!(config.content.reload_trigger, Some(PathBuf::from("reload-quests")));
        assert_eq!(config.database.url, "sqlite:world.db?mode=rwc");
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[content\nauto_clean = ").unwrap();

        let err = WorldConfig::load(&path).unwrap_err();
        assert!(matches!(err, ContentError::Config { .. }));
    }
}
