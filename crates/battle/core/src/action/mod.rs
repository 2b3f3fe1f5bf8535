//! Battle commands and the plans the engine derives from them.
//!
//! A [`BattleAction`] is what a caller (human, AI or replay) submits. The
//! engine turns it into a [`MovePlan`] or [`CastPlan`], validates it and
//! executes it. Plans can also be requested from the view without mutating
//! anything, which is how the AI values its options.
mod available;
mod plan;
mod root;

pub use available::{AttackAlternatives, AvailableActions};
pub use plan::{
    AttackAlteration, AttackMode, CastParams, CastPlan, CastTarget, LossTotal, MovePlan,
    PlanAttackParams, PlanMoveParams, PlannedAttack, PlannedTarget,
};
#[cfg(feature = "serde")]
pub use root::compute_actions_root;

/// One command of the active stack.
///
/// Recorded actions carry fully resolved parameters, so resubmitting them to
/// an engine built from the same setup reproduces the battle.
#[derive(Clone, Debug, PartialEq, Eq, Hash, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum BattleAction {
    Guard,
    Wait,
    MoveAttack {
        movement: PlanMoveParams,
        attack: PlanAttackParams,
    },
    Cast(CastParams),
}

impl BattleAction {
    pub fn move_attack(movement: PlanMoveParams, attack: PlanAttackParams) -> Self {
        Self::MoveAttack { movement, attack }
    }

    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

impl core::fmt::Display for BattleAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BattleAction::Guard | BattleAction::Wait => f.write_str(self.as_str()),
            BattleAction::MoveAttack { movement, attack } => {
                write!(f, "move_attack {}", movement.move_to.main())?;
                if let Some(target) = attack.target {
                    write!(f, " -> {target}")?;
                }
                Ok(())
            }
            BattleAction::Cast(params) => write!(f, "cast {} at {}", params.spell, params.target),
        }
    }
}
