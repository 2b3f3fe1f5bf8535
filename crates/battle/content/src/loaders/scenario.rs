//! Scenario loader.
//!
//! A scenario is a [`BattleSetup`] in RON: two armies referring to library
//! entries by id, an optional field preset and a seed.

use std::collections::BTreeSet;
use std::path::Path;

use battle_core::{ArmySetup, BattleSetup, LibraryOracle, Side, SpellId};

use crate::loaders::library::check_filter;
use crate::loaders::{LoadResult, read_file};

/// Loader for scenarios from RON files.
pub struct ScenarioLoader;

impl ScenarioLoader {
    /// Load a scenario and check its ids against `library`.
    pub fn load(path: &Path, library: &dyn LibraryOracle) -> LoadResult<BattleSetup> {
        let content = read_file(path)?;
        Self::parse(&content, library)
            .map_err(|e| anyhow::anyhow!("scenario {}: {}", path.display(), e))
    }

    pub fn parse(content: &str, library: &dyn LibraryOracle) -> LoadResult<BattleSetup> {
        let setup: BattleSetup = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse scenario RON: {}", e))?;

        let field = setup.preset.field;
        if field.width < 2 || field.height < 1 {
            anyhow::bail!("field {}x{} is too small", field.width, field.height);
        }
        for side in Side::BOTH {
            check_army(side, setup.army(side), library)?;
        }
        Ok(setup)
    }
}

fn check_army(side: Side, army: &ArmySetup, library: &dyn LibraryOracle) -> LoadResult<()> {
    for stack in &army.stacks {
        if library.unit(&stack.unit).is_none() {
            anyhow::bail!("{} army uses unknown unit '{}'", side, stack.unit);
        }
        if stack.count <= 0 {
            anyhow::bail!("{} stack of '{}' has count {}", side, stack.unit, stack.count);
        }
    }

    let Some(hero) = &army.hero else {
        return Ok(());
    };
    let named = hero
        .spells
        .iter()
        .chain(&hero.specialty)
        .chain(hero.casts_before_start.iter().map(|cast| &cast.spell));
    for spell in named {
        if library.spell(spell).is_none() {
            anyhow::bail!("hero '{}' refers to unknown spell '{}'", hero.name, spell);
        }
    }
    let known: Vec<SpellId> = library.spell_ids();
    check_filter(&known.iter().collect::<BTreeSet<_>>(), &hero.forbid_spells)
        .map_err(|e| anyhow::anyhow!("hero '{}' forbidden spells: {}", hero.name, e))
}
