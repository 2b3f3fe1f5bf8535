//! Spell catalog loader.

use std::path::Path;

use battle_core::Spell;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Spell catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpellCatalog {
    pub spells: Vec<Spell>,
}

/// Loader for spell catalogs from RON files.
pub struct SpellLoader;

impl SpellLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<Spell>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Vec<Spell>> {
        let catalog: SpellCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse spell catalog RON: {}", e))?;

        for spell in &catalog.spells {
            if spell.range_by_level.is_empty() {
                anyhow::bail!("spell '{}' has no range", spell.id);
            }
            if spell.mana_cost < 0 {
                anyhow::bail!("spell '{}' has a negative mana cost", spell.id);
            }
        }
        Ok(catalog.spells)
    }
}
