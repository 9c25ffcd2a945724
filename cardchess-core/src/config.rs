//! GameConfig - options for starting a new game

use crate::board::Side;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// New-game options, stored inside the game state
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameConfig {
    /// Deck shuffle seed; a random seed is drawn when absent
    pub seed: Option<u64>,
    /// Place both knights next to the king in the same setup intent
    pub auto_place_knights: bool,
    /// Side driven by the computer opponent, if any
    pub ai_side: Option<Side>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: None,
            auto_place_knights: true,
            ai_side: None,
        }
    }
}

impl GameConfig {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Load from a JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        Ok(config)
    }

    /// Save to a JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: GameConfig = serde_json::from_str(r#"{"seed": 7}"#).unwrap();
        assert_eq!(config.seed, Some(7));
        assert!(config.auto_place_knights);
        assert_eq!(config.ai_side, None);
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("cardchess-config-{}.json", std::process::id()));
        let config = GameConfig {
            seed: Some(99),
            auto_place_knights: false,
            ai_side: Some(Side::Black),
        };
        config.save(&path).unwrap();
        let loaded = GameConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_errors_name_the_file() {
        let path = std::env::temp_dir()
            .join(format!("cardchess-missing-dir-{}", std::process::id()))
            .join("config.json");

        let err = GameConfig::default().save(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to write config"));
        assert!(err.to_string().contains("config.json"));

        let err = GameConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }
}
