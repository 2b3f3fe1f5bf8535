//! A stack: one battlefield instance of a unit template.

use super::{Side, StackId};
use crate::combat::LossInfo;
use crate::env::{EndCondition, SpellCastParams, SpellRef, UnitRef};
use crate::field::BattlePositionExtended;
use crate::stats::StackStats;

/// Base roll kept for the rest of the round, so repeated hits by the same
/// attacker share one roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SharedRoll {
    pub roll: i64,
    /// Attacker count at the time of the roll.
    pub count: i32,
}

/// Flags reset at every round start.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RoundState {
    pub finished_turn: bool,
    pub waited: bool,
    pub retaliations_done: u32,
    pub had_high_morale: bool,
    pub had_low_morale: bool,
    pub base_roll: Option<SharedRoll>,
}

/// Timed effect of a spell on a stack.
#[derive(Clone, Debug)]
pub struct SpellEffect {
    pub spell: SpellRef,
    pub params: SpellCastParams,
    pub rounds_remaining: i32,
}

#[derive(Clone, Debug)]
pub enum ActiveEffect {
    /// Defense bonus from guarding; removed at the next round start.
    Guard { bonus: i32 },
    Spell(SpellEffect),
}

impl ActiveEffect {
    pub fn as_spell(&self) -> Option<&SpellEffect> {
        match self {
            ActiveEffect::Spell(effect) => Some(effect),
            ActiveEffect::Guard { .. } => None,
        }
    }
}

/// Queue sort key: `(waited, -speed, same-speed order, side)`.
///
/// `false < true`, so a stack that waited sorts after every stack that has
/// not, whatever its speed: waiting hands the turn to everyone else still
/// due this round. Within each group the fastest goes first, then the
/// stack that became eligible earlier among equal speeds, and the attacker
/// breaks any remaining tie.
pub type TurnOrder = (bool, i32, u32, Side);

#[derive(Clone, Debug)]
pub struct BattleStack {
    pub(crate) id: StackId,
    pub(crate) side: Side,
    pub(crate) slot: usize,
    pub(crate) unit: UnitRef,
    pub(crate) count: i32,
    pub(crate) health: i32,
    pub(crate) pos: BattlePositionExtended,
    pub(crate) remaining_shots: i32,
    pub(crate) casts_done: u32,
    pub(crate) round: RoundState,
    pub(crate) effects: Vec<ActiveEffect>,
    pub(crate) speed_order: i32,
    pub(crate) same_speed_order: u32,
    pub(crate) current: StackStats,
    pub(crate) estimated_on_start: StackStats,
}

impl BattleStack {
    pub(crate) fn new(id: StackId, side: Side, slot: usize, unit: UnitRef, count: i32) -> Self {
        Self {
            id,
            side,
            slot,
            unit,
            count: count.max(0),
            health: 0,
            pos: BattlePositionExtended::default(),
            remaining_shots: 0,
            casts_done: 0,
            round: RoundState::default(),
            effects: Vec::new(),
            speed_order: 0,
            same_speed_order: 0,
            current: StackStats::default(),
            estimated_on_start: StackStats::default(),
        }
    }

    pub fn id(&self) -> StackId {
        self.id
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Index of the stack within its army.
    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn unit(&self) -> &UnitRef {
        &self.unit
    }

    pub fn count(&self) -> i32 {
        self.count
    }

    /// Health of the top individual.
    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn position(&self) -> &BattlePositionExtended {
        &self.pos
    }

    pub fn remaining_shots(&self) -> i32 {
        self.remaining_shots
    }

    pub fn casts_done(&self) -> u32 {
        self.casts_done
    }

    pub fn round_state(&self) -> &RoundState {
        &self.round
    }

    pub fn effects(&self) -> &[ActiveEffect] {
        &self.effects
    }

    pub fn current(&self) -> &StackStats {
        &self.current
    }

    pub fn estimated_on_start(&self) -> &StackStats {
        &self.estimated_on_start
    }

    pub fn is_alive(&self) -> bool {
        self.count > 0
    }

    pub fn turn_order(&self) -> TurnOrder {
        (self.round.waited, self.speed_order, self.same_speed_order, self.side)
    }

    /// Total hit points left in the stack.
    pub fn effective_health(&self) -> i64 {
        if self.count <= 0 {
            return 0;
        }
        i64::from(self.count - 1) * i64::from(self.current.max_health) + i64::from(self.health)
    }

    /// Applies a computed loss and ends effects that expire on hit.
    pub(crate) fn apply_loss(&mut self, loss: &LossInfo) {
        self.count = loss.remain_count;
        self.health = loss.remain_top_health;
        if loss.damage_total > 0 {
            self.effects.retain(|effect| match effect {
                ActiveEffect::Spell(spell) => spell.spell.end_condition != EndCondition::GetHit,
                ActiveEffect::Guard { .. } => true,
            });
        }
    }
}
