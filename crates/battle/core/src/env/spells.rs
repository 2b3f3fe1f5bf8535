//! Spell definitions and the magic-related value types shared by units and heroes.

use std::sync::Arc;

use bitflags::bitflags;

use crate::formula::{Formula, Predicate};
use crate::stats::{BonusKind, BonusRatio};

/// Library identifier of a spell.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SpellId(pub String);

impl SpellId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for SpellId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

pub type SpellRef = Arc<Spell>;

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display, strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum MagicSchool {
    #[default]
    Any,
    Air,
    Earth,
    Fire,
    Water,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SpellType {
    /// Pushes a timed effect onto each target.
    #[default]
    Temp,
    /// Deals damage once.
    Offensive,
    Special,
    Summon,
    Rising,
    Adventure,
}

/// Which side a spell is meant for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpellQualify {
    #[default]
    None,
    Good,
    Bad,
}

/// Area covered by a spell at a given school level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SpellRange {
    #[default]
    Single,
    R1,
    R1NoCenter,
    R2,
    R3,
    Obstacle2,
    Obstacle3,
    Chain4,
    Chain5,
    All,
}

impl SpellRange {
    /// Flood-fill radius of an area range.
    pub const fn radius(&self) -> u32 {
        match self {
            Self::R1 | Self::R1NoCenter => 1,
            Self::R2 => 2,
            Self::R3 => 3,
            _ => 0,
        }
    }

    /// Number of stacks a chain range jumps through.
    pub const fn chain_limit(&self) -> Option<usize> {
        match self {
            Self::Chain4 => Some(4),
            Self::Chain5 => Some(5),
            _ => None,
        }
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct SpellTags: u8 {
        const MIND = 1 << 0;
        const VISION = 1 << 1;
        const ICE = 1 << 2;
        const LIGHTNING = 1 << 3;
    }
}

bitflags! {
    /// Capabilities an active effect takes away from its target.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct ActionLocks: u8 {
        const MOVE = 1 << 0;
        const MELEE = 1 << 1;
        const RANGED = 1 << 2;
        const CAST = 1 << 3;
    }
}

/// When an applied effect expires.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EndCondition {
    /// After its rounds run out.
    #[default]
    Time,
    /// As soon as the stack takes damage, or after its rounds run out.
    GetHit,
}

/// Stat a spell effect can modify.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display, strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ModifiedStat {
    Attack,
    Defense,
    MinDamage,
    MaxDamage,
    Speed,
    Luck,
    Morale,
    /// Percent added to melee damage.
    MeleeDamage,
    /// Percent added to ranged damage.
    RangedDamage,
    /// Percent taken off incoming melee damage.
    MeleeDefense,
    /// Percent taken off incoming ranged damage.
    RangedDefense,
}

/// One layered stat change of a spell effect.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatModifier {
    pub stat: ModifiedStat,
    pub kind: BonusKind,
    pub value: Formula,
}

/// Library entry describing one spell.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Spell {
    pub id: SpellId,
    pub school: MagicSchool,
    pub level: i32,
    pub mana_cost: i32,
    pub kind: SpellType,
    pub qualify: SpellQualify,
    /// Indexed by school skill level; the last entry covers higher levels.
    pub range_by_level: Vec<SpellRange>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tags: SpellTags,
    /// Offensive spells flagged indistinctive hit both sides.
    #[cfg_attr(feature = "serde", serde(default))]
    pub indistinctive: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub counter_spells: Vec<SpellId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub end_condition: EndCondition,
    #[cfg_attr(feature = "serde", serde(default))]
    pub damage: Option<Formula>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub modifiers: Vec<StatModifier>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub locks: ActionLocks,
    #[cfg_attr(feature = "serde", serde(default))]
    pub filter: Predicate,
}

impl Spell {
    pub fn new(id: impl Into<String>, school: MagicSchool, kind: SpellType, qualify: SpellQualify) -> Self {
        Self {
            id: SpellId::new(id),
            school,
            level: 1,
            mana_cost: 0,
            kind,
            qualify,
            range_by_level: vec![SpellRange::Single],
            tags: SpellTags::empty(),
            indistinctive: false,
            counter_spells: Vec::new(),
            end_condition: EndCondition::Time,
            damage: None,
            modifiers: Vec::new(),
            locks: ActionLocks::empty(),
            filter: Predicate::Always,
        }
    }

    pub fn range_for(&self, skill_level: u8) -> SpellRange {
        let index = usize::from(skill_level);
        self.range_by_level
            .get(index)
            .or_else(|| self.range_by_level.last())
            .copied()
            .unwrap_or_default()
    }

    pub fn counters(&self, other: &SpellId) -> bool {
        self.counter_spells.iter().any(|id| id == other)
    }
}

// ============================================================================
// Cast Parameters
// ============================================================================

/// Power of one concrete cast.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpellCastParams {
    pub spell: SpellId,
    #[cfg_attr(feature = "serde", serde(default = "SpellCastParams::default_power"))]
    pub spell_power: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub skill_level: u8,
    #[cfg_attr(feature = "serde", serde(default))]
    pub duration_bonus: i32,
    /// Caster level when the caster specializes in the spell.
    #[cfg_attr(feature = "serde", serde(default))]
    pub hero_spec_level: Option<i32>,
}

impl SpellCastParams {
    pub fn new(spell: SpellId) -> Self {
        Self {
            spell,
            spell_power: Self::default_power(),
            skill_level: 0,
            duration_bonus: 0,
            hero_spec_level: None,
        }
    }

    const fn default_power() -> i32 {
        1
    }
}

// ============================================================================
// Spell Filter
// ============================================================================

/// Set of spells described by criteria (immunities, forbidden spells).
///
/// A spell belongs to the filter when every non-empty criterion matches it.
/// A filter with no criteria contains nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpellFilter {
    pub only_spells: Vec<SpellId>,
    pub not_spells: Vec<SpellId>,
    pub levels: Vec<i32>,
    pub schools: Vec<MagicSchool>,
    pub tags: SpellTags,
}

impl SpellFilter {
    pub fn is_empty(&self) -> bool {
        self.only_spells.is_empty()
            && self.not_spells.is_empty()
            && self.levels.is_empty()
            && self.schools.is_empty()
            && self.tags.is_empty()
    }

    pub fn contains(&self, spell: &Spell) -> bool {
        if self.is_empty() {
            return false;
        }
        if !self.only_spells.is_empty() && !self.only_spells.contains(&spell.id) {
            return false;
        }
        if self.not_spells.contains(&spell.id) {
            return false;
        }
        if !self.levels.is_empty() && !self.levels.contains(&spell.level) {
            return false;
        }
        if !self.schools.is_empty() && !self.schools.contains(&spell.school) {
            return false;
        }
        if !self.tags.is_empty() && !self.tags.intersects(spell.tags) {
            return false;
        }
        true
    }

    /// Whether the filter covers a whole school (fire immunity and the like).
    pub fn covers_school(&self, school: MagicSchool) -> bool {
        self.schools.contains(&school)
            && self.only_spells.is_empty()
            && self.levels.is_empty()
            && self.tags.is_empty()
    }

    pub fn union(&mut self, other: &SpellFilter) {
        for id in &other.only_spells {
            if !self.only_spells.contains(id) {
                self.only_spells.push(id.clone());
            }
        }
        for school in &other.schools {
            if !self.schools.contains(school) {
                self.schools.push(*school);
            }
        }
        for level in &other.levels {
            if !self.levels.contains(level) {
                self.levels.push(*level);
            }
        }
        self.tags |= other.tags;
    }
}

// ============================================================================
// School Tables
// ============================================================================

/// Damage multipliers taken by a target, per school.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MagicReduce {
    pub all: BonusRatio,
    pub air: BonusRatio,
    pub earth: BonusRatio,
    pub fire: BonusRatio,
    pub water: BonusRatio,
}

impl MagicReduce {
    pub fn for_school(&self, school: MagicSchool) -> BonusRatio {
        let specific = match school {
            MagicSchool::Any => BonusRatio::ONE,
            MagicSchool::Air => self.air,
            MagicSchool::Earth => self.earth,
            MagicSchool::Fire => self.fire,
            MagicSchool::Water => self.water,
        };
        self.all * specific
    }
}

impl Default for MagicReduce {
    fn default() -> Self {
        Self {
            all: BonusRatio::ONE,
            air: BonusRatio::ONE,
            earth: BonusRatio::ONE,
            fire: BonusRatio::ONE,
            water: BonusRatio::ONE,
        }
    }
}

/// Extra damage dealt by a caster, per school.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MagicIncrease {
    pub all: BonusRatio,
    pub air: BonusRatio,
    pub earth: BonusRatio,
    pub fire: BonusRatio,
    pub water: BonusRatio,
}

impl MagicIncrease {
    pub fn for_school(&self, school: MagicSchool) -> BonusRatio {
        let specific = match school {
            MagicSchool::Any => BonusRatio::ZERO,
            MagicSchool::Air => self.air,
            MagicSchool::Earth => self.earth,
            MagicSchool::Fire => self.fire,
            MagicSchool::Water => self.water,
        };
        self.all + specific
    }
}

/// Caster skill level in each school (0..=3).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MagicSchoolLevels {
    pub air: u8,
    pub earth: u8,
    pub fire: u8,
    pub water: u8,
}

impl MagicSchoolLevels {
    /// Spells of `Any` school use the best level the caster has.
    pub fn level_for(&self, school: MagicSchool) -> u8 {
        match school {
            MagicSchool::Any => self.air.max(self.earth).max(self.fire).max(self.water),
            MagicSchool::Air => self.air,
            MagicSchool::Earth => self.earth,
            MagicSchool::Fire => self.fire,
            MagicSchool::Water => self.water,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spell(id: &str, school: MagicSchool, level: i32) -> Spell {
        let mut spell = Spell::new(id, school, SpellType::Offensive, SpellQualify::Bad);
        spell.level = level;
        spell
    }

    #[test]
    fn empty_filter_contains_nothing() {
        let filter = SpellFilter::default();
        assert!(!filter.contains(&spell("fire_bolt", MagicSchool::Fire, 1)));
    }

    #[test]
    fn filter_criteria_are_conjunctive() {
        let filter = SpellFilter {
            schools: vec![MagicSchool::Fire],
            levels: vec![1, 2],
            ..SpellFilter::default()
        };
        assert!(filter.contains(&spell("fire_bolt", MagicSchool::Fire, 1)));
        assert!(!filter.contains(&spell("inferno", MagicSchool::Fire, 4)));
        assert!(!filter.contains(&spell("ice_bolt", MagicSchool::Water, 1)));
    }

    #[test]
    fn not_spells_exclude() {
        let filter = SpellFilter {
            schools: vec![MagicSchool::Fire],
            not_spells: vec![SpellId::new("fire_shield")],
            ..SpellFilter::default()
        };
        assert!(!filter.contains(&spell("fire_shield", MagicSchool::Fire, 1)));
        assert!(filter.contains(&spell("fire_bolt", MagicSchool::Fire, 1)));
        assert!(filter.covers_school(MagicSchool::Fire));
    }

    #[test]
    fn range_falls_back_to_last_entry() {
        let mut s = spell("chain", MagicSchool::Air, 4);
        s.range_by_level = vec![SpellRange::Chain4, SpellRange::Chain5];
        assert_eq!(s.range_for(0), SpellRange::Chain4);
        assert_eq!(s.range_for(3), SpellRange::Chain5);
    }

    #[test]
    fn school_tables() {
        let reduce = MagicReduce {
            all: BonusRatio::HALF,
            fire: BonusRatio::HALF,
            ..MagicReduce::default()
        };
        assert_eq!(reduce.for_school(MagicSchool::Fire), BonusRatio::new(1, 4));
        assert_eq!(reduce.for_school(MagicSchool::Air), BonusRatio::HALF);

        let levels = MagicSchoolLevels { air: 1, fire: 3, ..MagicSchoolLevels::default() };
        assert_eq!(levels.level_for(MagicSchool::Any), 3);
        assert_eq!(levels.level_for(MagicSchool::Water), 0);
    }
}
