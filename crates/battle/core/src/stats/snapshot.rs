//! Stat snapshots consumed by combat math.
//!
//! A snapshot is computed by the pipeline and stays valid until the next
//! recalculation. Combat code reads snapshots only; it never looks at the
//! template or the effect list directly.

use crate::env::{FixedCast, MagicReduce, SpellFilter};
use crate::state::HeroSpell;
use crate::stats::BonusRatio;

/// Live combat parameters of one stack.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StackStats {
    pub attack: i32,
    pub defense: i32,
    pub min_damage: i32,
    pub max_damage: i32,
    pub max_health: i32,
    pub speed: i32,
    pub shots: i32,

    /// Attack delta used only for melee strikes.
    pub melee_attack: i32,
    /// Attack delta used only for shots.
    pub ranged_attack: i32,
    pub melee_damage: BonusRatio,
    pub ranged_damage: BonusRatio,
    pub melee_defense: BonusRatio,
    pub ranged_defense: BonusRatio,
    /// Share of incoming physical damage absorbed by the leading hero.
    pub damage_reduction: BonusRatio,

    pub luck: i32,
    pub morale: i32,
    pub has_morale: bool,
    pub luck_chance: BonusRatio,
    pub morale_chance: BonusRatio,

    /// `None` retaliates without limit.
    pub max_retaliations: Option<u32>,
    pub max_attacks_melee: u32,
    pub max_attacks_ranged: u32,

    pub magic_opp_success_chance: BonusRatio,
    pub magic_reduce: MagicReduce,
    pub immunes: SpellFilter,
    pub fixed_cast: Option<FixedCast>,
    pub fixed_casts_left: u32,

    pub can_move: bool,
    pub can_attack_melee: bool,
    pub can_attack_ranged: bool,
    pub can_cast: bool,
    pub can_attack_free_splash: bool,
    pub can_do_anything: bool,
    pub has_buff: bool,
    pub has_debuff: bool,
    /// An adjacent enemy prevents shooting.
    pub range_attack_blocked: bool,
}

impl StackStats {
    /// Damage spread of one individual.
    pub fn damage_spread(&self) -> i32 {
        (self.max_damage - self.min_damage).max(0)
    }

    pub fn can_shoot(&self) -> bool {
        self.can_attack_ranged && !self.range_attack_blocked
    }
}

/// Battle-start parameters of a hero.
#[derive(Clone, Debug, Default)]
pub struct HeroStats {
    /// Spell power after the opposing hero's reduction.
    pub spell_power: i32,
    /// Spells left after forbidden filtering, with adjusted costs.
    pub available_spells: Vec<HeroSpell>,
}
