//! Common error infrastructure for battle-core.
//!
//! Domain-specific errors (`BattleError`, `FormulaError`) live next to the
//! code that raises them and implement [`CoreError`], which gives callers a
//! uniform way to classify, log and test failures.
//!
//! # Design Principles
//!
//! - **Typed**: each failure mode is its own variant, never a string
//! - **No mutation on failure**: a rejected command leaves the battle untouched
//! - **Severity classification**: callers decide whether to re-plan or abort

use crate::field::BattlePosition;
use crate::state::StackId;

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the caller may re-plan and submit another command
/// - **Validation**: the command was malformed or stale and must not be retried as is
/// - **Internal**: unexpected inconsistency, indicates a bug
/// - **Fatal**: the battle cannot continue
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - retry with another command.
    ///
    /// Examples: control temporarily unavailable, wait already used
    Recoverable,

    /// Validation error - invalid input, should not retry without changes.
    ///
    /// Examples: stale plan, target on the same side
    Validation,

    /// Internal error - unexpected state inconsistency.
    Internal,

    /// Fatal error - battle state corrupted or evaluation impossible.
    ///
    /// Examples: broken damage formula, battle already finished
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Contextual information attached to errors for debugging and diagnostics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorContext {
    /// Stack that issued the failing command (if any).
    pub stack: Option<StackId>,

    /// Cell the command referred to (if any).
    pub position: Option<BattlePosition>,

    /// Battle round at the time of error.
    pub round: u32,

    /// Optional static message providing additional context.
    pub message: Option<&'static str>,
}

impl ErrorContext {
    #[must_use]
    pub const fn new(round: u32) -> Self {
        Self {
            stack: None,
            position: None,
            round,
            message: None,
        }
    }

    #[must_use]
    pub const fn with_stack(mut self, stack: StackId) -> Self {
        self.stack = Some(stack);
        self
    }

    #[must_use]
    pub const fn with_position(mut self, position: BattlePosition) -> Self {
        self.position = Some(position);
        self
    }

    #[must_use]
    pub const fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Common trait for all battle-core errors.
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Include `ErrorContext` in variants raised by battle commands
/// - Classify severity based on recoverability, not impact
pub trait CoreError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    fn context(&self) -> Option<&ErrorContext> {
        None
    }

    /// Stable identifier of the variant, for logs, metrics and tests.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_builder_accumulates_fields() {
        let ctx = ErrorContext::new(3)
            .with_stack(StackId(2))
            .with_position(BattlePosition::new(4, 5))
            .with_message("stale plan");
        assert_eq!(ctx.round, 3);
        assert_eq!(ctx.stack, Some(StackId(2)));
        assert_eq!(ctx.position, Some(BattlePosition::new(4, 5)));
        assert_eq!(ctx.message, Some("stale plan"));
    }

    #[test]
    fn severity_classification() {
        assert!(ErrorSeverity::Recoverable.is_recoverable());
        assert!(!ErrorSeverity::Validation.is_recoverable());
        assert!(ErrorSeverity::Fatal.is_internal());
        assert_eq!(ErrorSeverity::Validation.as_str(), "validation");
    }
}
