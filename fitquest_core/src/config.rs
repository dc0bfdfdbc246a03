//! Configuration file support for FitQuest.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/fitquest/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub user: UserConfig,

    #[serde(default)]
    pub xp: XpConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Local user identity
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default = "default_user_id")]
    pub id: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            id: default_user_id(),
        }
    }
}

/// XP reward rates and level curve
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct XpConfig {
    /// Base XP granted per action type; entries in the file override the
    /// built-in rates one by one
    #[serde(default = "default_rewards", deserialize_with = "merge_rewards")]
    pub rewards: HashMap<String, u64>,

    /// XP to go from level 1 to level 2; later levels scale by `level^1.5`
    #[serde(default = "default_base_threshold")]
    pub base_threshold: u64,
}

impl Default for XpConfig {
    fn default() -> Self {
        Self {
            rewards: default_rewards(),
            base_threshold: default_base_threshold(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        std::env::var("HOME")
            .map(|home| PathBuf::from(home).join(".local/share"))
            .unwrap_or_else(|_| PathBuf::from("."))
    });
    base.join("fitquest")
}

fn default_user_id() -> String {
    "local".into()
}

fn default_rewards() -> HashMap<String, u64> {
    [
        ("workout_complete", 50),
        ("exercise_complete", 10),
        ("program_complete", 200),
        ("daily_login", 5),
    ]
    .into_iter()
    .map(|(action, xp)| (action.to_string(), xp))
    .collect()
}

fn merge_rewards<'de, D>(deserializer: D) -> std::result::Result<HashMap<String, u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let overrides = HashMap::<String, u64>::deserialize(deserializer)?;
    let mut rewards = default_rewards();
    rewards.extend(overrides);
    Ok(rewards)
}

fn default_base_threshold() -> u64 {
    100
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Reject settings the XP authority cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.xp.base_threshold == 0 {
            return Err(Error::Config("xp.base_threshold must be positive".into()));
        }
        if self.user.id.trim().is_empty() {
            return Err(Error::Config("user.id must not be empty".into()));
        }
        Ok(())
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|_| PathBuf::from("."))
        });
        base.join("fitquest").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.user.id, "local");
        assert_eq!(config.xp.base_threshold, 100);
        assert_eq!(config.xp.rewards["workout_complete"], 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip_through_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.user.id = "athlete".into();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.user.id, "athlete");
        assert_eq!(loaded.xp.rewards, config.xp.rewards);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[xp]
base_threshold = 250
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.xp.base_threshold, 250);
        assert_eq!(config.xp.rewards["program_complete"], 200); // default
        assert_eq!(config.user.id, "local");
    }

    #[test]
    fn test_custom_rewards_merge_over_defaults() {
        let toml_str = r#"
[xp.rewards]
yoga_session = 30
daily_login = 7
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.xp.rewards["yoga_session"], 30);
        assert_eq!(config.xp.rewards["daily_login"], 7);
        // Actions the CLI awards on its own keep their rates
        assert_eq!(config.xp.rewards["workout_complete"], 50);
        assert_eq!(config.xp.rewards["exercise_complete"], 10);
        assert_eq!(config.xp.rewards["program_complete"], 200);
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[xp]\nbase_threshold = 0\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }
}
