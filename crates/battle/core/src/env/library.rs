//! Read-only game database access.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::spells::{Spell, SpellId, SpellRef};
use super::units::{UnitId, UnitRef, UnitTemplate};

/// Oracle for unit and spell definitions keyed by id.
///
/// Runtime systems implement this to hand resolved templates to the engine.
/// Returned references are shared; the engine never mutates them.
pub trait LibraryOracle: Send + Sync {
    fn unit(&self, id: &UnitId) -> Option<UnitRef>;

    fn spell(&self, id: &SpellId) -> Option<SpellRef>;

    /// All unit ids, in a stable order.
    fn unit_ids(&self) -> Vec<UnitId> {
        Vec::new()
    }

    /// All spell ids, in a stable order.
    fn spell_ids(&self) -> Vec<SpellId> {
        Vec::new()
    }
}

/// In-memory library, filled by a loader or by tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryLibrary {
    units: BTreeMap<UnitId, UnitRef>,
    spells: BTreeMap<SpellId, SpellRef>,
}

impl MemoryLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a unit, replacing any previous entry with the same id.
    pub fn insert_unit(&mut self, unit: UnitTemplate) -> UnitRef {
        let unit = Arc::new(unit);
        self.units.insert(unit.id.clone(), Arc::clone(&unit));
        unit
    }

    /// Adds a spell, replacing any previous entry with the same id.
    pub fn insert_spell(&mut self, spell: Spell) -> SpellRef {
        let spell = Arc::new(spell);
        self.spells.insert(spell.id.clone(), Arc::clone(&spell));
        spell
    }

    #[must_use]
    pub fn with_unit(mut self, unit: UnitTemplate) -> Self {
        self.insert_unit(unit);
        self
    }

    #[must_use]
    pub fn with_spell(mut self, spell: Spell) -> Self {
        self.insert_spell(spell);
        self
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn spell_count(&self) -> usize {
        self.spells.len()
    }
}

impl LibraryOracle for MemoryLibrary {
    fn unit(&self, id: &UnitId) -> Option<UnitRef> {
        self.units.get(id).cloned()
    }

    fn spell(&self, id: &SpellId) -> Option<SpellRef> {
        self.spells.get(id).cloned()
    }

    fn unit_ids(&self) -> Vec<UnitId> {
        self.units.keys().cloned().collect()
    }

    fn spell_ids(&self) -> Vec<SpellId> {
        self.spells.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{MagicSchool, SpellQualify, SpellType, UnitPrimaryParams};

    #[test]
    fn lookups_share_the_same_allocation() {
        let mut library = MemoryLibrary::new();
        let inserted = library.insert_unit(UnitTemplate::new("imp", 10, UnitPrimaryParams::default()));
        let found = library.unit(&UnitId::new("imp")).unwrap();
        assert!(Arc::ptr_eq(&inserted, &found));
        assert!(library.unit(&UnitId::new("devil")).is_none());
    }

    #[test]
    fn ids_are_sorted() {
        let library = MemoryLibrary::new()
            .with_spell(Spell::new("slow", MagicSchool::Earth, SpellType::Temp, SpellQualify::Bad))
            .with_spell(Spell::new("bless", MagicSchool::Water, SpellType::Temp, SpellQualify::Good));
        assert_eq!(
            library.spell_ids(),
            vec![SpellId::new("bless"), SpellId::new("slow")]
        );
    }
}
