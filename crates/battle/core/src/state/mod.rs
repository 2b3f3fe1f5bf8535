//! Mutable battle state: stacks, heroes, round bookkeeping.
//!
//! Stacks live in an arena owned by [`BattleState`] and are addressed by
//! [`StackId`]. Readers get shared references through the engine view;
//! only the engine's control paths mutate them.
mod battle;
mod hero;
mod setup;
mod stack;

pub use battle::BattleState;
pub use hero::{BattleHero, HeroSpell};
pub use setup::{AdventureBonus, ArmySetup, BattleSetup, HeroSetup, StackSetup};
pub use stack::{ActiveEffect, BattleStack, RoundState, SharedRoll, SpellEffect, TurnOrder};

/// Owning side of a stack or hero.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display, strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Side {
    Attacker,
    Defender,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Attacker, Side::Defender];

    pub const fn opponent(self) -> Self {
        match self {
            Side::Attacker => Side::Defender,
            Side::Defender => Side::Attacker,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Side::Attacker => 0,
            Side::Defender => 1,
        }
    }
}

/// Stable arena index of a stack within one battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StackId(pub u32);

impl StackId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl core::fmt::Display for StackId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Outcome of a finished battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum BattleResult {
    Tie,
    AttackerWon,
    DefenderWon,
}

impl BattleResult {
    pub const fn winner(self) -> Option<Side> {
        match self {
            BattleResult::Tie => None,
            BattleResult::AttackerWon => Some(Side::Attacker),
            BattleResult::DefenderWon => Some(Side::Defender),
        }
    }
}

/// Top-level state of the battle state machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattlePhase {
    #[default]
    AwaitingFirstRound,
    RoundInProgress,
    Finished(BattleResult),
}

impl BattlePhase {
    pub const fn is_finished(&self) -> bool {
        matches!(self, BattlePhase::Finished(_))
    }

    pub const fn result(&self) -> Option<BattleResult> {
        match self {
            BattlePhase::Finished(result) => Some(*result),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sides_are_opposed() {
        assert_eq!(Side::Attacker.opponent(), Side::Defender);
        assert_eq!(Side::Defender.opponent().opponent(), Side::Defender);
        assert_eq!("defender".parse::<Side>().unwrap(), Side::Defender);
    }

    #[test]
    fn phase_exposes_result() {
        assert!(!BattlePhase::RoundInProgress.is_finished());
        let finished = BattlePhase::Finished(BattleResult::DefenderWon);
        assert_eq!(finished.result().and_then(BattleResult::winner), Some(Side::Defender));
    }
}
