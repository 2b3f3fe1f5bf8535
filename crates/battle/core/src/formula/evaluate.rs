//! Formula and predicate evaluation.

use crate::error::{CoreError, ErrorSeverity};
use crate::formula::{Bindings, Comparison, Formula, Predicate, Var};

/// Hard failure of a single formula evaluation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FormulaError {
    #[error("variable `{0}` is not bound in this context")]
    UnboundVariable(Var),

    #[error("target kind is not bound in this context")]
    UnboundUnitKind,

    #[error("division by zero")]
    DivisionByZero,

    #[error("table index {index} out of range (len {len})")]
    TableIndexOutOfRange { index: i64, len: usize },

    #[error("{0} requires at least one operand")]
    EmptyOperands(&'static str),

    #[error("arithmetic overflow")]
    Overflow,
}

impl CoreError for FormulaError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnboundVariable(_) => "FORMULA_UNBOUND_VARIABLE",
            Self::UnboundUnitKind => "FORMULA_UNBOUND_UNIT_KIND",
            Self::DivisionByZero => "FORMULA_DIVISION_BY_ZERO",
            Self::TableIndexOutOfRange { .. } => "FORMULA_TABLE_INDEX_OUT_OF_RANGE",
            Self::EmptyOperands(_) => "FORMULA_EMPTY_OPERANDS",
            Self::Overflow => "FORMULA_OVERFLOW",
        }
    }
}

// ============================================================================
// Formula Evaluation
// ============================================================================

/// Evaluate a formula against a binding table.
///
/// ## Error Handling
/// - `UnboundVariable` when the context does not provide a variable
/// - `DivisionByZero`, `Overflow` for arithmetic failures
/// - `TableIndexOutOfRange` when a lookup misses
/// - `EmptyOperands` for `Min`/`Max` without operands
pub fn evaluate(formula: &Formula, ctx: &dyn Bindings) -> Result<i64, FormulaError> {
    match formula {
        Formula::Constant(value) => Ok(*value),

        Formula::Var(var) => ctx.var(*var).ok_or(FormulaError::UnboundVariable(*var)),

        Formula::Sum(parts) => parts.iter().try_fold(0i64, |acc, part| {
            acc.checked_add(evaluate(part, ctx)?).ok_or(FormulaError::Overflow)
        }),

        Formula::Product(parts) => parts.iter().try_fold(1i64, |acc, part| {
            acc.checked_mul(evaluate(part, ctx)?).ok_or(FormulaError::Overflow)
        }),

        Formula::Sub(lhs, rhs) => evaluate(lhs, ctx)?
            .checked_sub(evaluate(rhs, ctx)?)
            .ok_or(FormulaError::Overflow),

        Formula::Div(lhs, rhs) => {
            let numerator = evaluate(lhs, ctx)?;
            let denominator = evaluate(rhs, ctx)?;
            if denominator == 0 {
                return Err(FormulaError::DivisionByZero);
            }
            numerator.checked_div(denominator).ok_or(FormulaError::Overflow)
        }

        Formula::Pow2(exponent) => {
            let exponent = evaluate(exponent, ctx)?;
            if !(0..=62).contains(&exponent) {
                return Err(FormulaError::Overflow);
            }
            Ok(1i64 << exponent)
        }

        Formula::Min(parts) => {
            let mut values = parts.iter().map(|part| evaluate(part, ctx));
            let first = values.next().ok_or(FormulaError::EmptyOperands("min"))??;
            values.try_fold(first, |acc, value: Result<i64, FormulaError>| {
                Ok::<_, FormulaError>(acc.min(value?))
            })
        }

        Formula::Max(parts) => {
            let mut values = parts.iter().map(|part| evaluate(part, ctx));
            let first = values.next().ok_or(FormulaError::EmptyOperands("max"))??;
            values.try_fold(first, |acc, value: Result<i64, FormulaError>| {
                Ok::<_, FormulaError>(acc.max(value?))
            })
        }

        Formula::Table { index, values } => {
            let index = evaluate(index, ctx)?;
            usize::try_from(index)
                .ok()
                .and_then(|i| values.get(i).copied())
                .ok_or(FormulaError::TableIndexOutOfRange {
                    index,
                    len: values.len(),
                })
        }

        Formula::If {
            condition,
            then,
            otherwise,
        } => {
            if check(condition, ctx)? {
                evaluate(then, ctx)
            } else {
                evaluate(otherwise, ctx)
            }
        }
    }
}

// ============================================================================
// Predicate Evaluation
// ============================================================================

/// Evaluate a predicate against a binding table.
pub fn check(predicate: &Predicate, ctx: &dyn Bindings) -> Result<bool, FormulaError> {
    match predicate {
        Predicate::Always => Ok(true),
        Predicate::Never => Ok(false),
        Predicate::UnitType(expected) => {
            let (unit_type, _) = ctx.unit_kind().ok_or(FormulaError::UnboundUnitKind)?;
            Ok(unit_type == *expected)
        }
        Predicate::NonLiving(expected) => {
            let (_, non_living) = ctx.unit_kind().ok_or(FormulaError::UnboundUnitKind)?;
            Ok(non_living == *expected)
        }
        Predicate::Compare { lhs, op, rhs } => {
            let lhs = evaluate(lhs, ctx)?;
            let rhs = evaluate(rhs, ctx)?;
            Ok(match op {
                Comparison::Eq => lhs == rhs,
                Comparison::Ne => lhs != rhs,
                Comparison::Lt => lhs < rhs,
                Comparison::Le => lhs <= rhs,
                Comparison::Gt => lhs > rhs,
                Comparison::Ge => lhs >= rhs,
            })
        }
        Predicate::Not(inner) => Ok(!check(inner, ctx)?),
        Predicate::All(parts) => {
            for part in parts {
                if !check(part, ctx)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Predicate::Any(parts) => {
            for part in parts {
                if check(part, ctx)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
    }
}
