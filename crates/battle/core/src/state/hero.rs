//! Hero leading one army.

use super::Side;
use crate::env::{SpellCastParams, SpellId, SpellRef};
use crate::state::HeroSetup;
use crate::stats::HeroStats;

/// Spell a hero can cast in this battle, with its adjusted cost.
#[derive(Clone, Debug)]
pub struct HeroSpell {
    pub spell: SpellRef,
    pub mana_cost: i32,
}

#[derive(Clone, Debug)]
pub struct BattleHero {
    pub(crate) side: Side,
    pub(crate) setup: HeroSetup,
    pub(crate) mana: i32,
    pub(crate) cast_this_round: bool,
    pub(crate) casts_before_start: Vec<(SpellRef, SpellCastParams)>,
    pub(crate) estimated: HeroStats,
}

impl BattleHero {
    pub(crate) fn new(side: Side, setup: HeroSetup) -> Self {
        Self {
            side,
            mana: setup.mana,
            setup,
            cast_this_round: false,
            casts_before_start: Vec::new(),
            estimated: HeroStats::default(),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn name(&self) -> &str {
        &self.setup.name
    }

    pub fn level(&self) -> i32 {
        self.setup.level
    }

    pub fn mana(&self) -> i32 {
        self.mana
    }

    pub fn has_spellbook(&self) -> bool {
        self.setup.has_spellbook
    }

    pub fn cast_this_round(&self) -> bool {
        self.cast_this_round
    }

    pub fn setup(&self) -> &HeroSetup {
        &self.setup
    }

    pub fn estimated(&self) -> &HeroStats {
        &self.estimated
    }

    /// Adjusted mana cost, or `None` when the hero cannot cast the spell here.
    pub fn mana_cost(&self, spell: &SpellId) -> Option<i32> {
        self.estimated
            .available_spells
            .iter()
            .find(|available| &available.spell.id == spell)
            .map(|available| available.mana_cost)
    }

    pub fn available_spell(&self, spell: &SpellId) -> Option<&HeroSpell> {
        self.estimated
            .available_spells
            .iter()
            .find(|available| &available.spell.id == spell)
    }

    /// Whether the hero may cast now: has a spellbook and has not cast this round.
    pub fn can_cast(&self) -> bool {
        self.setup.has_spellbook && !self.cast_this_round
    }
}
