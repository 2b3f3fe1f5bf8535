//! Deterministic hex-grid battle logic.
//!
//! `battle-core` defines the canonical rules of a turn-based tactical battle:
//! unit and spell templates, the stat pipeline, combat math and the battle
//! state machine. It performs no I/O. All state mutation flows through
//! [`engine::BattleEngine`]; AI providers, replay players and front ends read
//! it through [`BattleView`] and drive it through [`BattleControl`].
pub mod action;
pub mod combat;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod field;
pub mod formula;
pub mod state;
pub mod stats;

#[cfg(feature = "serde")]
pub use action::compute_actions_root;
pub use action::{
    AttackAlteration, AttackAlternatives, AttackMode, AvailableActions, BattleAction, CastParams,
    CastPlan, CastTarget, LossTotal, MovePlan, PlanAttackParams, PlanMoveParams, PlannedAttack,
    PlannedTarget,
};
pub use combat::{CombatParams, DamageEstimate, DamageResult, DamageRollMode, LossInfo, LuckRoll};
pub use config::BattleConfig;
pub use engine::{
    AffectedMagic, AffectedPhysical, BattleControl, BattleEngine, BattleError, BattleEvent,
    BattleObserver, BattleView, Caster, MagicHit, ObserverHandle, ObserverSet, PhysicalHit,
    StackEffect,
};
pub use env::{
    ActionLocks, AttackElement, BattleRng, BattleRules, EndCondition, FixedCast, LibraryOracle,
    MagicIncrease, MagicReduce, MagicSchool, MagicSchoolLevels, MemoryLibrary, ModifiedStat,
    PcgRng, RangePenalties, ScriptedRng, Spell, SpellCastParams, SpellFilter, SpellId,
    SpellQualify, SpellRange, SpellRef, SpellTags, SpellType, SplashAttack, StatBonus,
    StatModifier, UnitAbilities, UnitId, UnitPrimaryParams, UnitRef, UnitTemplate, UnitTraits,
    UnitType,
};
pub use error::{CoreError, ErrorContext, ErrorSeverity};
pub use field::{
    AttackDirection, BattleDirection, BattleField, BattlePosition, BattlePositionExtended,
    FieldLayout, FieldPreset, HexFloodFinder, PathFinder, PathQuery, PositionSet, ReachMap, Sight,
    TargetCell,
};
pub use formula::{Comparison, Formula, FormulaError, Predicate, Var};
pub use state::{
    AdventureBonus, ArmySetup, BattleHero, BattlePhase, BattleResult, BattleSetup, BattleStack,
    BattleState, HeroSetup, Side, StackId, StackSetup,
};
pub use stats::{BonusKind, BonusRatio, HeroStats, StackStats};
