//! Sandboxed formulas for data-driven spell and effect numbers.
//!
//! Spells describe their damage, their stat modifiers and their target
//! filter as small expression trees instead of scripts. Every evaluation
//! runs against an explicit [`Bindings`] table, so a formula can only read
//! the variables its context provides.
//!
//! ## Examples
//!
//! ```ignore
//! // Fire bolt: 10 * spell power + [15, 30, 60, 90] by skill level
//! Formula::Sum(vec![
//!     Formula::Product(vec![Formula::Var(Var::SpellPower), Formula::Constant(10)]),
//!     Formula::Table { index: Box::new(Formula::Var(Var::SkillLevel)), values: vec![15, 30, 60, 90] },
//! ])
//!
//! // Chain lightning falloff: halve the damage for every jump
//! Formula::Div(Box::new(base), Box::new(Formula::Pow2(Box::new(Formula::Var(Var::TargetIndex)))))
//! ```

pub mod context;
pub mod evaluate;

pub use context::{EffectBindings, FilterBindings, SpellDamageBindings};
pub use evaluate::{FormulaError, check, evaluate};

use crate::env::{NonLivingType, UnitType};

// ============================================================================
// Variables
// ============================================================================

/// Names a formula may read. Each context binds a subset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Var {
    /// Caster's spell power.
    SpellPower,
    /// Caster's skill level in the spell's school (0..=3).
    SkillLevel,
    /// 1 when the caster specializes in the spell, 0 otherwise.
    IsSpec,
    /// Caster's level when specialized, -1 otherwise.
    HeroLevel,
    /// Target unit tier.
    UnitLevel,
    /// Position of the target in a chain (0 for the first).
    TargetIndex,
    /// Current value of the stat being modified.
    Value,
    /// Alive individuals in the target stack.
    Count,
}

/// Comparison operator of a [`Predicate::Compare`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

// ============================================================================
// Formula Definition
// ============================================================================

/// Integer expression tree.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Formula {
    /// Fixed constant value.
    Constant(i64),

    /// Bound variable.
    Var(Var),

    /// Sum of sub-formulas (0 when empty).
    Sum(Vec<Formula>),

    /// Product of sub-formulas (1 when empty).
    Product(Vec<Formula>),

    /// `lhs - rhs`.
    Sub(Box<Formula>, Box<Formula>),

    /// Integer division truncating toward zero.
    Div(Box<Formula>, Box<Formula>),

    /// `2^n` for `n` in `0..=62`.
    Pow2(Box<Formula>),

    /// Minimum of sub-formulas; at least one operand.
    Min(Vec<Formula>),

    /// Maximum of sub-formulas; at least one operand.
    Max(Vec<Formula>),

    /// `values[index]`.
    Table { index: Box<Formula>, values: Vec<i64> },

    /// Conditional expression.
    If {
        condition: Box<Predicate>,
        then: Box<Formula>,
        otherwise: Box<Formula>,
    },
}

impl Formula {
    pub fn var(var: Var) -> Self {
        Formula::Var(var)
    }

    pub fn table(index: Formula, values: impl Into<Vec<i64>>) -> Self {
        Formula::Table {
            index: Box::new(index),
            values: values.into(),
        }
    }
}

impl From<i64> for Formula {
    fn from(value: i64) -> Self {
        Formula::Constant(value)
    }
}

// ============================================================================
// Predicate Definition
// ============================================================================

/// Boolean filter over a target, used for spell eligibility.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Predicate {
    #[default]
    Always,
    Never,
    /// Target unit type equals the given one.
    UnitType(UnitType),
    /// Target non-living kind equals the given one.
    NonLiving(NonLivingType),
    Compare {
        lhs: Formula,
        op: Comparison,
        rhs: Formula,
    },
    Not(Box<Predicate>),
    All(Vec<Predicate>),
    Any(Vec<Predicate>),
}

impl Predicate {
    #[must_use]
    pub fn negate(self) -> Self {
        Predicate::Not(Box::new(self))
    }
}

// ============================================================================
// Bindings
// ============================================================================

/// Variable table for one evaluation context.
pub trait Bindings {
    /// Value of `var`, or `None` when the context does not bind it.
    fn var(&self, var: Var) -> Option<i64>;

    /// Kind of the evaluated target, for predicates that inspect it.
    fn unit_kind(&self) -> Option<(UnitType, NonLivingType)> {
        None
    }
}
