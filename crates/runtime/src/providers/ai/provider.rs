//! Greedy battle AI provider.

use battle_core::{BattleAction, BattleStack, BattleView, PlanAttackParams, PlanMoveParams};

use super::generator::{AttackCandidate, melee_candidates};
use super::{AiParams, scoring};
use crate::api::{ActionProvider, Result};

/// One-step lookahead AI for either side.
///
/// The decision for the active stack is taken in this order:
///
/// 1. No opponent left: guard.
/// 2. Ranged attack available: shoot the opponent with the best value.
/// 3. Some melee attack reachable this turn: take the best one, preferring
///    higher value, then striking without moving, then a shorter walk.
/// 4. Not waited yet and a slower opponent comes within reach next turn:
///    wait and let it walk into range.
/// 5. Walk towards the best attack position that is reachable at all,
///    as far along the path as the speed allows.
/// 6. Otherwise guard.
///
/// The AI never casts. Planning goes through [`BattleView`] only, so the same
/// provider drives a live engine or a recording wrapper.
#[derive(Debug, Clone, Default)]
pub struct GreedyAi {
    params: AiParams,
}

impl GreedyAi {
    pub fn new(params: AiParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &AiParams {
        &self.params
    }

    /// Picks the command of the active stack.
    pub fn decide(&self, view: &dyn BattleView) -> BattleAction {
        let Some(current) = view.active_stack() else {
            return BattleAction::Guard;
        };
        let has_opponent = view
            .alive_stacks()
            .iter()
            .any(|stack| stack.side() != current.side());
        if !has_opponent {
            return BattleAction::Guard;
        }

        if view.available_actions().ranged
            && let Some(action) = self.ranged_attack(view, current)
        {
            return action;
        }

        let candidates = melee_candidates(&self.params, view, current);

        let best_now = best_by_key(&candidates.now, |c| {
            (c.value, c.stays_in_place(), std::cmp::Reverse(c.distance_cells))
        });
        if let Some(best) = best_now {
            tracing::debug!(
                stack = %current.id(),
                target = %best.target,
                from = %best.movement.move_to.main(),
                value = best.value,
                "melee attack"
            );
            return BattleAction::move_attack(best.movement, best.attack);
        }

        if !current.round_state().waited && view.available_actions().wait {
            let speed = current.current().speed;
            let slower_next_turn = candidates
                .later
                .iter()
                .any(|c| c.distance_turns == 1 && speed > c.target_speed);
            if slower_next_turn {
                tracing::debug!(stack = %current.id(), "waiting for a slower opponent");
                return BattleAction::Wait;
            }
        }

        if let Some(action) = self.move_to_closest(view, current, &candidates.later) {
            return action;
        }

        tracing::debug!(stack = %current.id(), "nothing to do, guarding");
        BattleAction::Guard
    }

    fn ranged_attack(&self, view: &dyn BattleView, current: &BattleStack) -> Option<BattleAction> {
        let stay = PlanMoveParams::stay(*current.position());
        let options: Vec<(i64, PlanAttackParams)> = view
            .alive_stacks()
            .into_iter()
            .filter(|stack| stack.side() != current.side())
            .filter_map(|opponent| {
                let attack = PlanAttackParams::ranged(opponent.position().main());
                let plan = view.find_plan_move(&stay, &attack);
                plan.is_valid()
                    .then(|| (scoring::attack_value(&self.params, view, current.side(), &plan), attack))
            })
            .collect();

        let (value, attack) = best_by_key(&options, |(value, _)| *value)?;
        tracing::debug!(
            stack = %current.id(),
            target = ?attack.target,
            value,
            "ranged attack"
        );
        Some(BattleAction::move_attack(stay, *attack))
    }

    /// Steps towards the closest attack position, as far as a valid move goes.
    fn move_to_closest(
        &self,
        view: &dyn BattleView,
        current: &BattleStack,
        later: &[AttackCandidate],
    ) -> Option<BattleAction> {
        let best = best_by_key(later, |c| {
            (std::cmp::Reverse(c.distance_turns), c.value, std::cmp::Reverse(c.distance_cells))
        })?;

        let mut unlimited = best.movement;
        unlimited.calculate_unlimited_path = true;
        let path = view.find_plan_move(&unlimited, &PlanAttackParams::none()).walk_path;
        if path.is_empty() {
            return None;
        }

        let from = *current.position();
        let budget = usize::try_from(current.current().speed).unwrap_or(0).min(path.len());
        for steps in (1..=budget).rev() {
            let movement = PlanMoveParams::new(from, from.moved_to(path[steps - 1]));
            if view.find_plan_move(&movement, &PlanAttackParams::none()).is_valid() {
                tracing::debug!(
                    stack = %current.id(),
                    towards = %best.target,
                    to = %movement.move_to.main(),
                    steps,
                    "moving closer"
                );
                return Some(BattleAction::move_attack(movement, PlanAttackParams::none()));
            }
        }
        None
    }
}

impl ActionProvider for GreedyAi {
    fn provide_action(&mut self, view: &dyn BattleView) -> Result<BattleAction> {
        Ok(self.decide(view))
    }
}

/// First element with the greatest key.
fn best_by_key<T, K: Ord>(items: &[T], key: impl Fn(&T) -> K) -> Option<&T> {
    let mut best: Option<(&T, K)> = None;
    for item in items {
        let k = key(item);
        if best.as_ref().is_none_or(|(_, top)| k > *top) {
            best = Some((item, k));
        }
    }
    best.map(|(item, _)| item)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_keeps_the_first_of_equals() {
        let items = [(1, 'a'), (3, 'b'), (3, 'c'), (2, 'd')];
        assert_eq!(best_by_key(&items, |item| item.0), Some(&(3, 'b')));
        assert_eq!(best_by_key(&[] as &[(i32, char)], |item| item.0), None);
    }
}
