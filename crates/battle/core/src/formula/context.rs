//! Binding tables for the three formula contexts.

use super::{Bindings, Var};
use crate::env::{NonLivingType, UnitType};

/// Offensive spell damage: caster power against one target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpellDamageBindings {
    pub spell_power: i64,
    pub skill_level: i64,
    /// Caster level when the caster specializes in the spell.
    pub hero_spec_level: Option<i64>,
    pub unit_level: i64,
    pub target_index: i64,
}

impl Bindings for SpellDamageBindings {
    fn var(&self, var: Var) -> Option<i64> {
        match var {
            Var::SpellPower => Some(self.spell_power),
            Var::SkillLevel => Some(self.skill_level),
            Var::IsSpec => Some(i64::from(self.hero_spec_level.is_some())),
            Var::HeroLevel => Some(self.hero_spec_level.unwrap_or(-1)),
            Var::UnitLevel => Some(self.unit_level),
            Var::TargetIndex => Some(self.target_index),
            Var::Value | Var::Count => None,
        }
    }
}

/// Stat modifier of an active spell effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EffectBindings {
    pub spell_power: i64,
    pub skill_level: i64,
    pub hero_spec_level: Option<i64>,
    pub unit_level: i64,
    /// Value of the modified stat before this effect.
    pub value: i64,
}

impl Bindings for EffectBindings {
    fn var(&self, var: Var) -> Option<i64> {
        match var {
            Var::SpellPower => Some(self.spell_power),
            Var::SkillLevel => Some(self.skill_level),
            Var::IsSpec => Some(i64::from(self.hero_spec_level.is_some())),
            Var::HeroLevel => Some(self.hero_spec_level.unwrap_or(-1)),
            Var::UnitLevel => Some(self.unit_level),
            Var::Value => Some(self.value),
            Var::TargetIndex | Var::Count => None,
        }
    }
}

/// Spell target eligibility.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterBindings {
    pub unit_type: UnitType,
    pub non_living: NonLivingType,
    pub unit_level: i64,
    pub count: i64,
}

impl Bindings for FilterBindings {
    fn var(&self, var: Var) -> Option<i64> {
        match var {
            Var::UnitLevel => Some(self.unit_level),
            Var::Count => Some(self.count),
            _ => None,
        }
    }

    fn unit_kind(&self) -> Option<(UnitType, NonLivingType)> {
        Some((self.unit_type, self.non_living))
    }
}
