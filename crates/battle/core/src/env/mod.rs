//! Read-only battle environment: unit and spell templates, balance rules,
//! the library oracle and the random source.
//!
//! Everything in here is data the engine consults but never mutates, except
//! the RNG, which the engine owns exclusively.
mod library;
mod rng;
mod rules;
mod spells;
mod units;

pub use library::{LibraryOracle, MemoryLibrary};
pub use rng::{BattleRng, PcgRng, ScriptedRng, mix_seed};
pub use rules::{BattleRules, LimitRules, PhysicalRules, RngRules};
pub use spells::{
    ActionLocks, EndCondition, MagicIncrease, MagicReduce, MagicSchool, MagicSchoolLevels,
    ModifiedStat, Spell, SpellCastParams, SpellFilter, SpellId, SpellQualify, SpellRange,
    SpellRef, SpellTags, SpellType, StatModifier,
};
pub use units::{
    AttackElement, FixedCast, NonLivingType, RangePenalties, SplashAttack, StatBonus, UnitAbilities,
    UnitId, UnitPrimaryParams, UnitRef, UnitTemplate, UnitTraits, UnitType,
};
