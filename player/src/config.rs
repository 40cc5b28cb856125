//! Shell configuration handed in by the hosting page.

use serde::Deserialize;

use crate::error::ConfigError;
use crate::log::LogLevel;

pub const DEFAULT_GAME_URL: &str = "built-to-scale.gba";
pub const DEFAULT_LAYOUT_KEY: &str = "built-to-scale.controller-layout";

/// Static settings for one page load. Every field is optional in the JSON.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShellConfig {
    /// ROM the emulator component loads when it mounts.
    pub game_url: String,
    /// Storage key of the controller layout preference.
    pub layout_key: String,
    pub log_level: LogLevel,
}

impl Default for ShellConfig {
    fn default() -> Self {
        ShellConfig {
            game_url: DEFAULT_GAME_URL.to_string(),
            layout_key: DEFAULT_LAYOUT_KEY.to_string(),
            log_level: LogLevel::default(),
        }
    }
}

impl ShellConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ShellConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.game_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "gameUrl",
                reason: "must not be empty".to_string(),
            });
        }
        if self.layout_key.is_empty() {
            return Err(ConfigError::Invalid {
                field: "layoutKey",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = ShellConfig::from_json("{}").unwrap();
        assert_eq!(config, ShellConfig::default());
        assert_eq!(config.game_url, "built-to-scale.gba");
    }

    #[test]
    fn test_partial_config() {
        let config =
            ShellConfig::from_json(r#"{"gameUrl": "roms/other.gba", "logLevel": "warn"}"#).unwrap();
        assert_eq!(config.game_url, "roms/other.gba");
        assert_eq!(config.layout_key, DEFAULT_LAYOUT_KEY);
        assert_eq!(config.log_level, LogLevel::Warn);
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(matches!(
            ShellConfig::from_json("{gameUrl:"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let config =
            ShellConfig::from_json(r#"{"gameUrl": "other.gba", "theme": "dark"}"#).unwrap();
        assert_eq!(config.game_url, "other.gba");
        assert_eq!(config.layout_key, DEFAULT_LAYOUT_KEY);
    }

    #[test]
    fn test_empty_game_url_rejected() {
        assert!(matches!(
            ShellConfig::from_json(r#"{"gameUrl": "  "}"#),
            Err(ConfigError::Invalid { field: "gameUrl", .. })
        ));
    }
}
