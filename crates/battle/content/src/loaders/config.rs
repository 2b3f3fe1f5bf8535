//! Battle configuration loader.

use std::path::Path;

use battle_core::BattleConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for [`BattleConfig`] from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Missing keys fall back to [`BattleConfig::default`].
    pub fn load(path: &Path) -> LoadResult<BattleConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<BattleConfig> {
        let config: BattleConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        if config.ranged_limit <= 0 {
            anyhow::bail!("ranged_limit must be positive, got {}", config.ranged_limit);
        }
        if config.dice_cap <= 0 {
            anyhow::bail!("dice_cap must be positive, got {}", config.dice_cap);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = ConfigLoader::parse("max_actions = 50\n").unwrap();
        assert_eq!(config.max_actions, 50);
        assert_eq!(config.ranged_limit, BattleConfig::DEFAULT_RANGED_LIMIT);
    }

    #[test]
    fn rejects_non_positive_limits() {
        assert!(ConfigLoader::parse("dice_cap = 0\n").is_err());
    }
}
