//! Game-balance tables: luck and morale chances, attack power, limits.

use crate::stats::BonusRatio;

/// Chance table of one random effect (luck or morale).
///
/// `positive[i]` is the chance of the effect firing at level `i + 1`,
/// `negative[i]` at level `-(i + 1)`. Levels beyond the effective range are
/// clamped before lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RngRules {
    pub positive: Vec<BonusRatio>,
    pub negative: Vec<BonusRatio>,
    pub max_effective: i32,
    pub min_effective: i32,
}

impl RngRules {
    /// Clamps a level into the effective range.
    pub fn effective(&self, value: i32) -> i32 {
        value.clamp(self.min_effective, self.max_effective)
    }

    /// Chance of the effect firing at `value`; zero for a neutral level.
    pub fn chance(&self, value: i32) -> BonusRatio {
        let value = self.effective(value);
        let table = if value > 0 { &self.positive } else { &self.negative };
        if value == 0 || table.is_empty() {
            return BonusRatio::ZERO;
        }
        let index = (value.unsigned_abs() as usize - 1).min(table.len() - 1);
        table[index]
    }
}

impl Default for RngRules {
    fn default() -> Self {
        Self {
            positive: vec![
                BonusRatio::new(1, 24),
                BonusRatio::new(2, 24),
                BonusRatio::new(3, 24),
            ],
            negative: vec![
                BonusRatio::new(2, 24),
                BonusRatio::new(4, 24),
                BonusRatio::new(6, 24),
            ],
            max_effective: 3,
            min_effective: -3,
        }
    }
}

/// Attack-versus-defense constants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PhysicalRules {
    pub max_effective_attack: i32,
    pub max_effective_defense: i32,
    /// Damage bonus per point of attack above defense.
    pub attack_value: BonusRatio,
    /// Damage reduction per point of defense above attack.
    pub defense_value: BonusRatio,
}

impl Default for PhysicalRules {
    fn default() -> Self {
        Self {
            max_effective_attack: 60,
            max_effective_defense: 28,
            attack_value: BonusRatio::new(1, 20),
            defense_value: BonusRatio::new(1, 40),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LimitRules {
    pub stacks: usize,
    pub max_hero_level: i32,
    pub max_unit_attack: i32,
    pub max_unit_defense: i32,
}

impl Default for LimitRules {
    fn default() -> Self {
        Self {
            stacks: crate::config::BattleConfig::MAX_STACKS,
            max_hero_level: 75,
            max_unit_attack: 99,
            max_unit_defense: 99,
        }
    }
}

/// Balance tables read by the stat pipeline and the damage formulas.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BattleRules {
    pub luck: RngRules,
    pub morale: RngRules,
    pub physical: PhysicalRules,
    pub limits: LimitRules,
}
