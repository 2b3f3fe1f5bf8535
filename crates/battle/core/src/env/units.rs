//! Unit templates: the read-only library description of a creature.

use std::sync::Arc;

use bitflags::bitflags;

use crate::env::spells::{MagicReduce, SpellCastParams, SpellFilter};
use crate::stats::BonusRatio;

/// Library identifier of a unit template.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct UnitId(pub String);

impl UnitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for UnitId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

pub type UnitRef = Arc<UnitTemplate>;

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum UnitType {
    #[default]
    Living,
    NonLiving,
    SiegeMachine,
    ArrowTower,
    Wall,
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum NonLivingType {
    #[default]
    None,
    Undead,
    Golem,
    Gargoyle,
    Elemental,
    BattleMachine,
}

/// Shape of the extra area hit by an attack.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SplashAttack {
    #[default]
    None,
    /// Breath: the cell behind the target.
    Dragon,
    /// Every cell around the attacker.
    Neighbours,
    /// The two cells flanking the strike direction.
    Sides,
    /// Every cell around the aimed tile of a shot.
    Ranged,
}

impl SplashAttack {
    pub const fn is_melee(&self) -> bool {
        matches!(self, Self::Dragon | Self::Neighbours | Self::Sides)
    }
}

/// Element carried by a splash; some targets are immune to it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttackElement {
    #[default]
    None,
    Fire,
    Earth,
    Air,
    Ice,
    Mind,
    Magic,
    Undead,
}

bitflags! {
    /// Intrinsic unit traits.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct UnitTraits: u16 {
        /// Occupies two cells.
        const LARGE = 1 << 0;
        const RANGE_ATTACK = 1 << 1;
        const FLY = 1 << 2;
        const TELEPORT = 1 << 3;
        /// Strikes twice per attack.
        const DOUBLE_ATTACK = 1 << 4;
        /// Targets never retaliate.
        const FREE_ATTACK = 1 << 5;
    }
}

bitflags! {
    /// Ranged penalties a unit ignores.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct RangePenalties: u8 {
        /// Halved damage beyond the ranged limit.
        const DISTANCE = 1 << 0;
        /// Halved damage through walls.
        const OBSTACLES = 1 << 1;
        /// Halved damage when a shooter fights in melee.
        const MELEE = 1 << 2;
        /// Cannot shoot while an enemy stands adjacent.
        const BLOCKED = 1 << 3;
    }
}

/// Base combat parameters of a single individual.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct UnitPrimaryParams {
    pub attack: i32,
    pub defense: i32,
    pub min_damage: i32,
    pub max_damage: i32,
    pub max_health: i32,
    pub speed: i32,
    pub shots: i32,
}

/// Morale, luck and mana-cost deltas a unit grants to a whole army.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StatBonus {
    pub morale: i32,
    pub luck: i32,
    pub mana_cost: i32,
}

/// Innate spell a unit can cast a limited number of times per battle.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FixedCast {
    pub params: SpellCastParams,
    pub count: u32,
}

/// Special rules of a unit.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct UnitAbilities {
    pub unit_type: UnitType,
    pub non_living: NonLivingType,
    pub disabled_penalties: RangePenalties,
    pub splash: SplashAttack,
    pub splash_friendly_fire: bool,
    pub splash_element: AttackElement,
    /// `None` retaliates without limit.
    pub max_retaliations: Option<u32>,
    pub squad_bonus: StatBonus,
    pub opponent_bonus: StatBonus,
    pub minimal_morale: i32,
    pub minimal_luck: i32,
    /// Multiplier applied to the target's defense when this unit attacks.
    pub reduce_target_defense: BonusRatio,
    /// Multiplier applied to the attacker's attack when this unit is attacked.
    pub reduce_attacker_attack: BonusRatio,
    pub immunes: SpellFilter,
    pub magic_reduce: MagicReduce,
    /// Chance that an enemy spell takes hold on this unit.
    pub magic_opp_success_chance: BonusRatio,
    /// Restores the top individual's health on every activation.
    pub regenerate: bool,
    pub fixed_cast: Option<FixedCast>,
}

impl Default for UnitAbilities {
    fn default() -> Self {
        Self {
            unit_type: UnitType::Living,
            non_living: NonLivingType::None,
            disabled_penalties: RangePenalties::empty(),
            splash: SplashAttack::None,
            splash_friendly_fire: false,
            splash_element: AttackElement::None,
            max_retaliations: Some(1),
            squad_bonus: StatBonus::default(),
            opponent_bonus: StatBonus::default(),
            minimal_morale: -99,
            minimal_luck: -99,
            reduce_target_defense: BonusRatio::ONE,
            reduce_attacker_attack: BonusRatio::ONE,
            immunes: SpellFilter::default(),
            magic_reduce: MagicReduce::default(),
            magic_opp_success_chance: BonusRatio::ONE,
            regenerate: false,
            fixed_cast: None,
        }
    }
}

/// Library entry describing one kind of creature.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitTemplate {
    pub id: UnitId,
    /// Tier times ten (a tier-3 unit has level 30).
    pub level: i32,
    /// Strategic worth of one individual; drives AI valuations.
    pub value: i64,
    pub primary: UnitPrimaryParams,
    #[cfg_attr(feature = "serde", serde(default))]
    pub traits: UnitTraits,
    #[cfg_attr(feature = "serde", serde(default))]
    pub abilities: UnitAbilities,
}

impl UnitTemplate {
    pub fn new(id: impl Into<String>, level: i32, primary: UnitPrimaryParams) -> Self {
        Self {
            id: UnitId::new(id),
            level,
            value: i64::from(primary.max_health.max(1)),
            primary,
            traits: UnitTraits::empty(),
            abilities: UnitAbilities::default(),
        }
    }

    #[must_use]
    pub fn with_traits(mut self, traits: UnitTraits) -> Self {
        self.traits = traits;
        self
    }

    #[must_use]
    pub fn with_abilities(mut self, abilities: UnitAbilities) -> Self {
        self.abilities = abilities;
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: i64) -> Self {
        self.value = value;
        self
    }

    pub fn is_large(&self) -> bool {
        self.traits.contains(UnitTraits::LARGE)
    }

    pub fn is_shooter(&self) -> bool {
        self.traits.contains(UnitTraits::RANGE_ATTACK)
    }

    /// Morale applies only to living creatures and gargoyles.
    pub fn has_morale(&self) -> bool {
        self.abilities.unit_type == UnitType::Living
            || self.abilities.non_living == NonLivingType::Gargoyle
    }

    /// Whether a ranged splash of `element` may touch this unit.
    pub fn accepts_element(&self, element: AttackElement, fire_immune: bool) -> bool {
        match element {
            AttackElement::Fire => !fire_immune,
            AttackElement::Undead => self.abilities.unit_type == UnitType::Living,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn primary() -> UnitPrimaryParams {
        UnitPrimaryParams {
            attack: 5,
            defense: 5,
            min_damage: 2,
            max_damage: 3,
            max_health: 10,
            speed: 4,
            shots: 0,
        }
    }

    #[test]
    fn morale_only_for_living_and_gargoyles() {
        let living = UnitTemplate::new("pikeman", 10, primary());
        assert!(living.has_morale());

        let mut abilities = UnitAbilities {
            unit_type: UnitType::NonLiving,
            non_living: NonLivingType::Undead,
            ..UnitAbilities::default()
        };
        let undead = UnitTemplate::new("skeleton", 10, primary()).with_abilities(abilities.clone());
        assert!(!undead.has_morale());

        abilities.non_living = NonLivingType::Gargoyle;
        let gargoyle = UnitTemplate::new("gargoyle", 20, primary()).with_abilities(abilities);
        assert!(gargoyle.has_morale());
    }

    #[test]
    fn element_acceptance() {
        let undead = UnitTemplate::new("skeleton", 10, primary()).with_abilities(UnitAbilities {
            unit_type: UnitType::NonLiving,
            non_living: NonLivingType::Undead,
            ..UnitAbilities::default()
        });
        assert!(!undead.accepts_element(AttackElement::Undead, false));
        assert!(undead.accepts_element(AttackElement::Fire, false));
        assert!(!undead.accepts_element(AttackElement::Fire, true));
    }

    #[test]
    fn default_retaliates_once() {
        assert_eq!(UnitAbilities::default().max_retaliations, Some(1));
    }
}
