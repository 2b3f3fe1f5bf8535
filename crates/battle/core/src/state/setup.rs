//! Serializable description of a battle before it starts.
//!
//! Setup records refer to library entries by id. The engine resolves them
//! against a [`LibraryOracle`](crate::env::LibraryOracle) when it is built,
//! so a setup can be stored in a replay and rebuilt later.

use crate::env::{MagicIncrease, MagicSchoolLevels, SpellCastParams, SpellFilter, SpellId, UnitId};
use crate::field::FieldPreset;
use crate::stats::BonusRatio;

/// Adventure-layer deltas applied to every stack of an army.
///
/// Computed upstream (hero skills, artifacts, terrain); the battle treats
/// them as opaque numbers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AdventureBonus {
    pub attack: i32,
    pub defense: i32,
    pub speed: i32,
    pub max_health: i32,
    pub shots: i32,
    pub luck: i32,
    pub morale: i32,
    /// Attack delta used only for melee strikes.
    pub melee_attack: i32,
    /// Attack delta used only for shots.
    pub ranged_attack: i32,
    /// Added to the damage base factor in melee.
    pub melee_damage: BonusRatio,
    /// Added to the damage base factor for shots.
    pub ranged_damage: BonusRatio,
    /// Share of incoming melee damage absorbed.
    pub melee_defense: BonusRatio,
    /// Share of incoming ranged damage absorbed.
    pub ranged_defense: BonusRatio,
    /// Share of all incoming physical damage absorbed by the leading hero.
    pub damage_reduction: BonusRatio,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StackSetup {
    pub unit: UnitId,
    pub count: i32,
}

impl StackSetup {
    pub fn new(unit: impl Into<String>, count: i32) -> Self {
        Self {
            unit: UnitId::new(unit),
            count,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeroSetup {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default = "HeroSetup::default_level"))]
    pub level: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub mana: i32,
    #[cfg_attr(feature = "serde", serde(default = "HeroSetup::default_level"))]
    pub spell_power: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub has_spellbook: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub schools: MagicSchoolLevels,
    #[cfg_attr(feature = "serde", serde(default))]
    pub magic_increase: MagicIncrease,
    #[cfg_attr(feature = "serde", serde(default))]
    pub spells: Vec<SpellId>,
    /// Spell the hero specializes in.
    #[cfg_attr(feature = "serde", serde(default))]
    pub specialty: Option<SpellId>,
    /// Rounds added to every timed spell.
    #[cfg_attr(feature = "serde", serde(default))]
    pub extra_rounds: i32,
    /// Reduces the opposing hero's spell power.
    #[cfg_attr(feature = "serde", serde(default))]
    pub sp_reduce_opp: BonusRatio,
    /// Added to the opposing hero's mana costs.
    #[cfg_attr(feature = "serde", serde(default))]
    pub mana_cost_opp: i32,
    /// Spells nobody may use in this battle.
    #[cfg_attr(feature = "serde", serde(default))]
    pub forbid_spells: SpellFilter,
    /// Applied once, when the hero's side first becomes active.
    #[cfg_attr(feature = "serde", serde(default))]
    pub casts_before_start: Vec<SpellCastParams>,
}

impl HeroSetup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: Self::default_level(),
            mana: 0,
            spell_power: Self::default_level(),
            has_spellbook: false,
            schools: MagicSchoolLevels::default(),
            magic_increase: MagicIncrease::default(),
            spells: Vec::new(),
            specialty: None,
            extra_rounds: 0,
            sp_reduce_opp: BonusRatio::ZERO,
            mana_cost_opp: 0,
            forbid_spells: SpellFilter::default(),
            casts_before_start: Vec::new(),
        }
    }

    const fn default_level() -> i32 {
        1
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ArmySetup {
    pub stacks: Vec<StackSetup>,
    pub hero: Option<HeroSetup>,
    pub compact_formation: bool,
    pub bonus: AdventureBonus,
}

impl ArmySetup {
    pub fn new(stacks: impl IntoIterator<Item = StackSetup>) -> Self {
        Self {
            stacks: stacks.into_iter().collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_hero(mut self, hero: HeroSetup) -> Self {
        self.hero = Some(hero);
        self
    }

    #[must_use]
    pub fn with_bonus(mut self, bonus: AdventureBonus) -> Self {
        self.bonus = bonus;
        self
    }
}

/// Everything needed to rebuild a battle from scratch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleSetup {
    pub attacker: ArmySetup,
    pub defender: ArmySetup,
    #[cfg_attr(feature = "serde", serde(default))]
    pub preset: FieldPreset,
    #[cfg_attr(feature = "serde", serde(default))]
    pub seed: u64,
}

impl BattleSetup {
    pub fn new(attacker: ArmySetup, defender: ArmySetup) -> Self {
        Self {
            attacker,
            defender,
            preset: FieldPreset::default(),
            seed: 0,
        }
    }

    #[must_use]
    pub fn with_preset(mut self, preset: FieldPreset) -> Self {
        self.preset = preset;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn army(&self, side: crate::state::Side) -> &ArmySetup {
        match side {
            crate::state::Side::Attacker => &self.attacker,
            crate::state::Side::Defender => &self.defender,
        }
    }
}
