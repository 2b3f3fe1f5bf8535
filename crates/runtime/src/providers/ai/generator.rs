//! Generates melee attack candidates for the active stack.

use std::collections::BTreeMap;

use battle_core::{
    BattlePosition, BattlePositionExtended, BattleStack, BattleView, PlanAttackParams,
    PlanMoveParams, StackId,
};

use super::{AiParams, scoring};

/// One way to strike one opponent in melee.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttackCandidate {
    pub target: StackId,
    /// Speed of the target, for the wait heuristic.
    pub target_speed: i32,
    pub movement: PlanMoveParams,
    pub attack: PlanAttackParams,
    /// Steps to the attack position; zero when already standing there.
    pub distance_cells: u32,
    /// Whole turns of walking needed before the strike.
    pub distance_turns: u32,
    pub value: i64,
}

impl AttackCandidate {
    /// Attacks without moving first.
    pub fn stays_in_place(&self) -> bool {
        self.movement.move_from == self.movement.move_to
    }
}

/// Melee candidates split by whether they can be executed this turn.
#[derive(Clone, Debug, Default)]
pub struct MeleeCandidates {
    /// Attack positions within the current speed.
    pub now: Vec<AttackCandidate>,
    /// Every attack position reachable at all, ignoring speed.
    pub later: Vec<AttackCandidate>,
}

/// Collects candidates against every opponent of `current`.
///
/// Each (direction, target cell) suggestion is valued with a plan that skips
/// the path search; reachability comes from the distance maps.
pub fn melee_candidates(params: &AiParams, view: &dyn BattleView, current: &BattleStack) -> MeleeCandidates {
    let speed = u32::try_from(current.current().speed).unwrap_or(0);
    let can_move = view.available_actions().move_;
    let reach_now = if can_move {
        view.distances(current.id(), Some(speed))
    } else {
        BTreeMap::new()
    };
    let reach_all = if can_move {
        view.distances(current.id(), None)
    } else {
        BTreeMap::new()
    };
    let from = *current.position();

    let mut candidates = MeleeCandidates::default();
    for opponent in view.alive_stacks() {
        if opponent.side() == current.side() {
            continue;
        }
        let suggestions =
            BattlePositionExtended::attack_suggestions(from.is_large(), opponent.position().is_large());
        for (direction, cell) in suggestions {
            let target_cell = opponent.position().cell(cell);
            let attack = PlanAttackParams::melee(target_cell, direction);
            let stand = from.suggest_for_attack(target_cell, direction);

            let (now, any) = if stand == from {
                (Some(0), Some(0))
            } else {
                (lookup(&reach_now, stand.main()), lookup(&reach_all, stand.main()))
            };
            let Some(any) = any else {
                continue;
            };

            let mut lookahead = PlanMoveParams::new(from, stand);
            lookahead.no_move_calculation = true;
            let plan = view.find_plan_move(&lookahead, &attack);
            if !plan.is_valid() {
                continue;
            }

            let mut candidate = AttackCandidate {
                target: opponent.id(),
                target_speed: opponent.current().speed,
                movement: PlanMoveParams::new(from, stand),
                attack,
                distance_cells: any,
                distance_turns: turns_for(any, speed),
                value: scoring::attack_value(params, view, current.side(), &plan),
            };
            candidates.later.push(candidate.clone());

            if let Some(now) = now {
                candidate.distance_cells = now;
                candidate.distance_turns = 0;
                candidates.now.push(candidate);
            }
        }
    }
    candidates
}

fn lookup(reach: &BTreeMap<BattlePosition, u32>, pos: BattlePosition) -> Option<u32> {
    reach.get(&pos).copied()
}

/// Turns of full-speed walking before a stack `cells` away can strike.
pub fn turns_for(cells: u32, speed: u32) -> u32 {
    match (cells, speed) {
        (0, _) => 0,
        (_, 0) => u32::MAX,
        _ => (cells - 1) / speed,
    }
}
