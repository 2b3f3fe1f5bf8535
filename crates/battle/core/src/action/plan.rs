//! Plan parameters submitted by callers and the plans derived from them.

use crate::combat::{DamageEstimate, LossInfo};
use crate::env::{SpellCastParams, SpellId, SpellRef};
use crate::field::{AttackDirection, BattlePosition, BattlePositionExtended, PositionSet};
use crate::state::StackId;
use crate::stats::BonusRatio;

// ============================================================================
// Move / Attack
// ============================================================================

/// Where the active stack wants to stand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlanMoveParams {
    pub move_from: BattlePositionExtended,
    pub move_to: BattlePositionExtended,
    /// Ignore the speed budget when searching the path (AI lookahead only).
    #[cfg_attr(feature = "serde", serde(default))]
    pub calculate_unlimited_path: bool,
    /// Skip the path search entirely (AI valuation only).
    #[cfg_attr(feature = "serde", serde(default))]
    pub no_move_calculation: bool,
}

impl PlanMoveParams {
    pub fn new(move_from: BattlePositionExtended, move_to: BattlePositionExtended) -> Self {
        Self {
            move_from,
            move_to,
            calculate_unlimited_path: false,
            no_move_calculation: false,
        }
    }

    /// Stay in place.
    pub fn stay(pos: BattlePositionExtended) -> Self {
        Self::new(pos, pos)
    }

    /// Only planning helpers may be set; such params are never executable.
    pub fn is_lookahead(&self) -> bool {
        self.calculate_unlimited_path || self.no_move_calculation
    }
}

/// Variation of the default attack for units that have a choice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum AttackAlteration {
    #[default]
    None,
    /// A shooter strikes in melee although it could shoot.
    ForceMelee,
    /// A ranged splash aimed at a cell without a main target.
    FreeAttack,
}

/// What the active stack wants to hit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlanAttackParams {
    /// Aimed cell; `None` means a pure move.
    pub target: Option<BattlePosition>,
    /// Strike direction; required for melee.
    pub direction: Option<AttackDirection>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub alteration: AttackAlteration,
}

impl PlanAttackParams {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn melee(target: BattlePosition, direction: AttackDirection) -> Self {
        Self {
            target: Some(target),
            direction: Some(direction),
            alteration: AttackAlteration::None,
        }
    }

    pub fn ranged(target: BattlePosition) -> Self {
        Self {
            target: Some(target),
            direction: None,
            alteration: AttackAlteration::None,
        }
    }

    #[must_use]
    pub fn with_alteration(mut self, alteration: AttackAlteration) -> Self {
        self.alteration = alteration;
        self
    }

    pub fn is_active(&self) -> bool {
        self.target.is_some()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum AttackMode {
    Melee,
    Ranged,
}

/// Estimated damage to one stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlannedTarget {
    pub stack: StackId,
    pub damage: DamageEstimate,
}

/// Attack half of a [`MovePlan`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedAttack {
    pub mode: AttackMode,
    pub target_cell: BattlePosition,
    pub direction: Option<AttackDirection>,
    pub defender: Option<StackId>,
    pub free_attack: bool,
    pub ranged_denom: i64,
    pub main_damage: Option<DamageEstimate>,
    pub retaliation_damage: Option<DamageEstimate>,
    pub splash_cells: PositionSet,
    pub extra_targets: Vec<PlannedTarget>,
    pub retaliation_splash_cells: PositionSet,
    pub retaliation_extra_targets: Vec<PlannedTarget>,
}

impl PlannedAttack {
    pub fn is_melee(&self) -> bool {
        self.mode == AttackMode::Melee
    }
}

/// Validated move (and optional attack) of the active stack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MovePlan {
    pub valid: bool,
    pub move_from: BattlePositionExtended,
    pub move_to: BattlePositionExtended,
    /// Cells walked, excluding the start; empty when standing still.
    pub walk_path: Vec<BattlePosition>,
    pub attack: Option<PlannedAttack>,
}

impl MovePlan {
    pub(crate) fn invalid(move_from: BattlePositionExtended, move_to: BattlePositionExtended) -> Self {
        Self {
            valid: false,
            move_from,
            move_to,
            walk_path: Vec::new(),
            attack: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

// ============================================================================
// Cast
// ============================================================================

/// Spell cast request.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CastParams {
    pub spell: SpellId,
    pub target: BattlePosition,
    /// Cast by the side's hero rather than the active stack's innate cast.
    pub hero_cast: bool,
}

impl CastParams {
    pub fn hero(spell: SpellId, target: BattlePosition) -> Self {
        Self {
            spell,
            target,
            hero_cast: true,
        }
    }

    pub fn unit(spell: SpellId, target: BattlePosition) -> Self {
        Self {
            spell,
            target,
            hero_cast: false,
        }
    }
}

/// One stack affected by a planned cast.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CastTarget {
    pub stack: StackId,
    /// Chance that the spell takes hold.
    pub success_chance: BonusRatio,
    /// Losses of an offensive spell.
    pub loss: Option<LossInfo>,
}

/// Summed losses of every target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LossTotal {
    pub damage_total: i64,
    pub deaths: i32,
}

/// Validated spell cast.
#[derive(Clone, Debug)]
pub struct CastPlan {
    pub valid: bool,
    pub spell: Option<SpellRef>,
    pub power: Option<SpellCastParams>,
    pub cast_position: BattlePosition,
    pub hero_cast: bool,
    pub affected_area: PositionSet,
    pub targets: Vec<CastTarget>,
    pub loss_total: LossTotal,
}

impl CastPlan {
    pub(crate) fn invalid(cast_position: BattlePosition, hero_cast: bool) -> Self {
        Self {
            valid: false,
            spell: None,
            power: None,
            cast_position,
            hero_cast,
            affected_area: PositionSet::new(),
            targets: Vec::new(),
            loss_total: LossTotal::default(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }
}
