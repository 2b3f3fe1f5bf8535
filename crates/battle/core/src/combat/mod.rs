//! Combat math: physical damage, losses, retaliation, splash and spell areas.
//!
//! Everything here is a pure function over stack snapshots. Random draws go
//! through the [`BattleRng`](crate::env::BattleRng) handed in by the caller;
//! estimate modes never draw.

mod damage;
mod magic;
mod splash;

pub use damage::{
    CombatParams, attack_power, calculate_physical_base, can_retaliate, check_resist,
    check_rng_effect, damage_loss, damage_roll, estimate_damage, estimate_retaliation,
    ranged_denominator,
};
pub use magic::{is_spell_target, spell_area, spell_damage};
pub use splash::{ranged_splash_cells, splash_extra_cells};

/// How the physical spread roll is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DamageRollMode {
    Min,
    Avg,
    Max,
    /// Draws from the battle RNG.
    Random,
}

/// Outcome of a luck check for one attack.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LuckRoll {
    #[default]
    None,
    /// Doubles the damage.
    Luck,
    /// Halves the damage.
    Unluck,
}

/// Casualties caused by a given amount of damage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LossInfo {
    pub remain_count: i32,
    pub remain_top_health: i32,
    pub deaths: i32,
    pub damage_total: i64,
}

impl LossInfo {
    pub fn is_killed(&self) -> bool {
        self.remain_count == 0
    }
}

/// One resolved (or estimated) physical hit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageResult {
    pub loss: LossInfo,
    /// Base roll before any factor; stored for repeated hits.
    pub damage_base_roll: i64,
    /// Final damage as a percentage of the base roll.
    pub damage_percent: i64,
}

impl DamageResult {
    pub fn is_killed(&self) -> bool {
        self.loss.is_killed()
    }
}

/// Low, average and high damage of an attack, computed without RNG.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageEstimate {
    pub low: DamageResult,
    pub avg: DamageResult,
    pub max: DamageResult,
}
