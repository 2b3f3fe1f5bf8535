//! Unit catalog loader.

use std::path::Path;

use battle_core::UnitTemplate;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Unit catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitCatalog {
    pub units: Vec<UnitTemplate>,
}

/// Loader for unit catalogs from RON files.
///
/// Records are returned as parsed; cross references to spells are checked by
/// [`LibraryBuilder`](crate::loaders::LibraryBuilder).
pub struct UnitLoader;

impl UnitLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<UnitTemplate>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Vec<UnitTemplate>> {
        let catalog: UnitCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse unit catalog RON: {}", e))?;

        for unit in &catalog.units {
            let primary = &unit.primary;
            if primary.max_health <= 0 {
                anyhow::bail!("unit '{}' has non-positive max_health", unit.id);
            }
            if primary.min_damage > primary.max_damage {
                anyhow::bail!(
                    "unit '{}' has min_damage {} above max_damage {}",
                    unit.id,
                    primary.min_damage,
                    primary.max_damage
                );
            }
        }
        Ok(catalog.units)
    }
}
