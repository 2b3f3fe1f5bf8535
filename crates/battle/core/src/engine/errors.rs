//! Error types for battle construction and control commands.

use crate::env::{SpellId, UnitId};
use crate::error::{CoreError, ErrorContext, ErrorSeverity};
use crate::formula::FormulaError;

/// Errors surfaced while building a battle or executing a command.
///
/// A command that fails leaves the battle untouched.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BattleError {
    #[error("invalid plan for the active stack (round {}): {}", .context.round, .context.message.unwrap_or("rejected"))]
    InvalidPlan { context: ErrorContext },

    #[error("control is not available right now")]
    ControlUnavailable,

    #[error("stack {} already waited this round", .context.stack.map(|id| id.to_string()).unwrap_or_default())]
    AlreadyWaited { context: ErrorContext },

    #[error("battle is already finished")]
    BattleFinished,

    #[error("no stack is active")]
    NoActiveStack,

    #[error("unknown unit `{0}`")]
    UnknownUnit(UnitId),

    #[error("unknown spell `{0}`")]
    UnknownSpell(SpellId),

    #[error("formula evaluation failed: {0}")]
    Formula(#[from] FormulaError),
}

impl BattleError {
    pub(crate) fn invalid_plan(context: ErrorContext) -> Self {
        Self::InvalidPlan { context }
    }
}

impl CoreError for BattleError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ControlUnavailable | Self::AlreadyWaited { .. } => ErrorSeverity::Recoverable,
            Self::InvalidPlan { .. } | Self::UnknownUnit(_) | Self::UnknownSpell(_) => {
                ErrorSeverity::Validation
            }
            Self::NoActiveStack => ErrorSeverity::Internal,
            Self::BattleFinished | Self::Formula(_) => ErrorSeverity::Fatal,
        }
    }

    fn context(&self) -> Option<&ErrorContext> {
        match self {
            Self::InvalidPlan { context } | Self::AlreadyWaited { context } => Some(context),
            _ => None,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidPlan { .. } => "BATTLE_INVALID_PLAN",
            Self::ControlUnavailable => "BATTLE_CONTROL_UNAVAILABLE",
            Self::AlreadyWaited { .. } => "BATTLE_ALREADY_WAITED",
            Self::BattleFinished => "BATTLE_FINISHED",
            Self::NoActiveStack => "BATTLE_NO_ACTIVE_STACK",
            Self::UnknownUnit(_) => "BATTLE_UNKNOWN_UNIT",
            Self::UnknownSpell(_) => "BATTLE_UNKNOWN_SPELL",
            Self::Formula(_) => "BATTLE_FORMULA",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StackId;

    #[test]
    fn codes_and_severity() {
        let err = BattleError::invalid_plan(ErrorContext::new(2).with_stack(StackId(1)).with_message("target is dead"));
        assert_eq!(err.error_code(), "BATTLE_INVALID_PLAN");
        assert_eq!(err.severity(), ErrorSeverity::Validation);
        assert_eq!(err.context().map(|ctx| ctx.round), Some(2));
        assert!(err.to_string().contains("target is dead"));

        let err: BattleError = FormulaError::DivisionByZero.into();
        assert_eq!(err.error_code(), "BATTLE_FORMULA");
        assert!(err.severity().is_internal());
        assert!(BattleError::ControlUnavailable.severity().is_recoverable());
    }
}
