//! Scores a planned attack from its average damage estimates.

use battle_core::{BattleView, LossInfo, MovePlan, PlannedTarget, Side};

use super::AiParams;

/// Kill and damage estimates accumulated over every stack an attack touches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Estimate {
    by_kills: i64,
    by_damage: i64,
}

impl Estimate {
    fn add(&mut self, value: i64, loss: &LossInfo, max_health: i32, kills_weight: i64, damage_weight: i64) {
        self.by_kills += value * i64::from(loss.deaths) * kills_weight;
        if max_health > 0 {
            self.by_damage += value * loss.damage_total * damage_weight / i64::from(max_health);
        }
    }

    fn finish(self) -> i64 {
        if self.by_kills != 0 { self.by_kills } else { self.by_damage }
    }
}

/// Value of `plan` for the stack of `side`; higher is better.
///
/// Plans without an attack score zero.
pub fn attack_value(params: &AiParams, view: &dyn BattleView, side: Side, plan: &MovePlan) -> i64 {
    let Some(attack) = &plan.attack else {
        return 0;
    };
    let mut estimate = Estimate::default();

    if let (Some(defender), Some(main)) = (attack.defender.and_then(|id| view.stack(id)), &attack.main_damage) {
        let loss = &main.avg.loss;
        let mut kills_weight = params.main_kills_weight;
        if loss.is_killed() {
            kills_weight *= params.full_kills_multiply;
        }
        estimate.add(
            defender.unit().value,
            loss,
            defender.current().max_health,
            kills_weight,
            params.main_damage_weight,
        );
    }

    if let (Some(attacker), Some(retaliation)) = (view.active_stack(), &attack.retaliation_damage) {
        estimate.add(
            attacker.unit().value,
            &retaliation.avg.loss,
            attacker.current().max_health,
            -params.retaliation_kills_weight,
            -params.retaliation_damage_weight,
        );
    }

    for target in attack.extra_targets.iter().chain(&attack.retaliation_extra_targets) {
        add_extra(&mut estimate, params, view, side, target);
    }

    estimate.finish()
}

/// Splash victims: enemies count like a scaled main target, own stacks like
/// retaliation losses.
fn add_extra(estimate: &mut Estimate, params: &AiParams, view: &dyn BattleView, side: Side, target: &PlannedTarget) {
    let Some(stack) = view.stack(target.stack) else {
        return;
    };
    let loss = &target.damage.avg.loss;
    let (kills_weight, damage_weight) = if stack.side() == side {
        (-params.retaliation_kills_weight, -params.retaliation_damage_weight)
    } else {
        let mut kills = params.main_kills_weight * params.extra_kills_multiply;
        if loss.is_killed() {
            kills *= params.full_kills_multiply;
        }
        (kills, params.main_damage_weight * params.extra_kills_multiply)
    };
    estimate.add(stack.unit().value, loss, stack.current().max_health, kills_weight, damage_weight);
}
