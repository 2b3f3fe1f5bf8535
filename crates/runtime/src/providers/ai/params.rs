//! Tunable weights of the attack valuation.

use serde::{Deserialize, Serialize};

/// Weights used to turn an estimated attack into a single score.
///
/// Losses are scored by unit value: enemy losses add to the score, own
/// losses (retaliation, friendly splash) subtract from it. A kill estimate
/// takes precedence; the damage estimate only decides between attacks that
/// kill nobody.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiParams {
    /// Per killed enemy creature, times its value.
    pub main_kills_weight: i64,
    /// Applied on top of the kill weight when a whole stack dies.
    pub full_kills_multiply: i64,
    /// Per enemy health point lost, times value, divided by max health.
    pub main_damage_weight: i64,
    /// Per own creature lost to retaliation.
    pub retaliation_kills_weight: i64,
    /// Per own health point lost to retaliation.
    pub retaliation_damage_weight: i64,
    /// Scale of both main weights for stacks caught in a splash.
    pub extra_kills_multiply: i64,
}

impl AiParams {
    pub const DEFAULT_MAIN_KILLS_WEIGHT: i64 = 10;
    pub const DEFAULT_FULL_KILLS_MULTIPLY: i64 = 2;
    pub const DEFAULT_MAIN_DAMAGE_WEIGHT: i64 = 10;
    pub const DEFAULT_RETALIATION_KILLS_WEIGHT: i64 = 10;
    pub const DEFAULT_RETALIATION_DAMAGE_WEIGHT: i64 = 10;
    pub const DEFAULT_EXTRA_KILLS_MULTIPLY: i64 = 1;
}

impl Default for AiParams {
    fn default() -> Self {
        Self {
            main_kills_weight: Self::DEFAULT_MAIN_KILLS_WEIGHT,
            full_kills_multiply: Self::DEFAULT_FULL_KILLS_MULTIPLY,
            main_damage_weight: Self::DEFAULT_MAIN_DAMAGE_WEIGHT,
            retaliation_kills_weight: Self::DEFAULT_RETALIATION_KILLS_WEIGHT,
            retaliation_damage_weight: Self::DEFAULT_RETALIATION_DAMAGE_WEIGHT,
            extra_kills_multiply: Self::DEFAULT_EXTRA_KILLS_MULTIPLY,
        }
    }
}
