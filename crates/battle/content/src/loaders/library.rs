//! Second loading pass: cross-reference checks and library assembly.

use std::collections::BTreeSet;

use battle_core::{MemoryLibrary, Spell, SpellFilter, SpellId, UnitId, UnitTemplate};

use crate::loaders::LoadResult;

/// Assembles a [`MemoryLibrary`] from raw catalog records.
///
/// Every id a record mentions must name a record of the right kind: counter
/// spells, immunity lists and innate casts are all checked before any
/// template is shared.
#[derive(Debug, Default)]
pub struct LibraryBuilder {
    units: Vec<UnitTemplate>,
    spells: Vec<Spell>,
}

impl LibraryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_units(mut self, units: impl IntoIterator<Item = UnitTemplate>) -> Self {
        self.units.extend(units);
        self
    }

    #[must_use]
    pub fn with_spells(mut self, spells: impl IntoIterator<Item = Spell>) -> Self {
        self.spells.extend(spells);
        self
    }

    pub fn build(self) -> LoadResult<MemoryLibrary> {
        let mut spell_ids: BTreeSet<&SpellId> = BTreeSet::new();
        for spell in &self.spells {
            if !spell_ids.insert(&spell.id) {
                anyhow::bail!("duplicate spell id '{}'", spell.id);
            }
        }
        let mut unit_ids: BTreeSet<&UnitId> = BTreeSet::new();
        for unit in &self.units {
            if !unit_ids.insert(&unit.id) {
                anyhow::bail!("duplicate unit id '{}'", unit.id);
            }
        }

        for spell in &self.spells {
            for counter in &spell.counter_spells {
                if !spell_ids.contains(counter) {
                    anyhow::bail!("spell '{}' counters unknown spell '{}'", spell.id, counter);
                }
            }
        }
        for unit in &self.units {
            check_filter(&spell_ids, &unit.abilities.immunes)
                .map_err(|e| anyhow::anyhow!("unit '{}' immunities: {}", unit.id, e))?;
            if let Some(fixed) = &unit.abilities.fixed_cast {
                if !spell_ids.contains(&fixed.params.spell) {
                    anyhow::bail!("unit '{}' casts unknown spell '{}'", unit.id, fixed.params.spell);
                }
            }
        }

        let mut library = MemoryLibrary::new();
        for spell in self.spells {
            library.insert_spell(spell);
        }
        for unit in self.units {
            library.insert_unit(unit);
        }
        tracing::debug!(
            units = library.unit_count(),
            spells = library.spell_count(),
            "library assembled"
        );
        Ok(library)
    }
}

/// Checks that every spell a filter names exists.
pub(crate) fn check_filter(known: &BTreeSet<&SpellId>, filter: &SpellFilter) -> LoadResult<()> {
    for id in filter.only_spells.iter().chain(&filter.not_spells) {
        if !known.contains(id) {
            anyhow::bail!("unknown spell '{}'", id);
        }
    }
    Ok(())
}
