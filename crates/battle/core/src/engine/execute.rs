//! Command execution: move, strike, shoot, wait, guard and cast.
//!
//! Every command is validated and re-planned first; nothing is mutated until
//! validation passes. Execution then runs with control unavailable and ends
//! with a queue update.

use super::{
    AffectedMagic, AffectedPhysical, BattleEngine, BattleError, BattleEvent, Caster, MagicHit,
    PhysicalHit, StackEffect,
};
use crate::action::{AttackMode, CastParams, CastPlan, MovePlan, PlanAttackParams, PlanMoveParams};
use crate::combat::{
    DamageResult, DamageRollMode, LuckRoll, can_retaliate, check_resist, check_rng_effect, damage_roll,
};
use crate::env::SpellType;
use crate::error::ErrorContext;
use crate::field::BattlePosition;
use crate::state::{ActiveEffect, SharedRoll, SpellEffect, StackId};
use crate::stats::{BonusRatio, recalc_stack};

impl BattleEngine {
    // ========================================================================
    // Commands
    // ========================================================================

    pub fn do_move_attack(&mut self, movement: PlanMoveParams, attack: PlanAttackParams) -> Result<(), BattleError> {
        let id = self.ensure_control()?;
        let context = self.error_context(id).with_position(movement.move_to.main());
        if movement.is_lookahead() {
            return Err(BattleError::invalid_plan(context.with_message("lookahead parameters")));
        }
        if self.state.stack(id).is_some_and(|stack| stack.pos != movement.move_from) {
            return Err(BattleError::invalid_plan(context.with_message("stale start position")));
        }
        let plan = self.find_plan_move(&movement, &attack);
        if !plan.is_valid() {
            return Err(BattleError::invalid_plan(context.with_message("plan rejected")));
        }

        tracing::debug!(stack = %id, to = %plan.move_to.main(), attack = plan.attack.is_some(), "move/attack");
        self.begin_control();
        let outcome = self.run_move_attack(id, plan);
        self.end_control();
        outcome
    }

    pub fn do_wait(&mut self) -> Result<(), BattleError> {
        let id = self.ensure_control()?;
        if self.state.stack(id).is_some_and(|stack| stack.round.waited) {
            return Err(BattleError::AlreadyWaited {
                context: self.error_context(id).with_message("wait already used this round"),
            });
        }

        tracing::debug!(stack = %id, "wait");
        self.begin_control();
        self.notify(BattleEvent::BeforeWait { stack: id });
        if let Some(stack) = self.state.stack_mut(id) {
            stack.round.waited = true;
        }
        self.clear_current();
        let outcome = self.update_state();
        self.end_control();
        outcome
    }

    pub fn do_guard(&mut self) -> Result<(), BattleError> {
        let id = self.ensure_control()?;
        let defense = self.state.stack(id).map_or(0, |stack| stack.current.defense);
        let bonus = if defense >= 5 { defense / 5 } else { 1 };

        tracing::debug!(stack = %id, bonus, "guard");
        self.begin_control();
        self.notify(BattleEvent::BeforeGuard { stack: id, bonus });
        if let Some(stack) = self.state.stack_mut(id) {
            stack.round.finished_turn = true;
            stack.effects.push(ActiveEffect::Guard { bonus });
        }
        let outcome = recalc_stack(&mut self.state, id, &self.rules)
            .map_err(BattleError::from)
            .and_then(|()| {
                self.clear_current();
                self.update_state()
            });
        self.end_control();
        outcome
    }

    pub fn do_cast(&mut self, params: CastParams) -> Result<(), BattleError> {
        let id = self.ensure_control()?;
        let plan = self.find_plan_cast(&params)?;
        if !plan.is_valid() {
            return Err(BattleError::invalid_plan(
                self.error_context(id)
                    .with_position(params.target)
                    .with_message("cast rejected"),
            ));
        }

        tracing::debug!(stack = %id, spell = %params.spell, hero = params.hero_cast, "cast");
        self.begin_control();
        let outcome = self.run_cast(id, &params, plan);
        self.end_control();
        outcome
    }

    // ========================================================================
    // Control guard
    // ========================================================================

    /// Active stack, when a command may be issued now.
    fn ensure_control(&self) -> Result<StackId, BattleError> {
        if self.state.phase.is_finished() {
            return Err(BattleError::BattleFinished);
        }
        if !self.control_available {
            return Err(BattleError::ControlUnavailable);
        }
        self.state.current.ok_or(BattleError::NoActiveStack)
    }

    fn begin_control(&mut self) {
        self.control_available = false;
        self.notify(BattleEvent::ControlAvailabilityChanged { available: false });
    }

    fn end_control(&mut self) {
        let available = !self.state.phase.is_finished();
        self.control_available = available;
        self.notify(BattleEvent::ControlAvailabilityChanged { available });
    }

    fn error_context(&self, id: StackId) -> ErrorContext {
        ErrorContext::new(self.state.round).with_stack(id)
    }

    pub(super) fn clear_current(&mut self) {
        self.state.current = None;
        self.activated = None;
    }

    // ========================================================================
    // Move / Attack
    // ========================================================================

    fn run_move_attack(&mut self, id: StackId, plan: MovePlan) -> Result<(), BattleError> {
        if !plan.walk_path.is_empty() {
            self.notify(BattleEvent::BeforeMove {
                stack: id,
                path: plan.walk_path.clone(),
            });
        }
        if let Some(stack) = self.state.stack_mut(id) {
            stack.pos = plan.move_to;
            stack.round.finished_turn = true;
        }

        if let Some(attack) = &plan.attack {
            let extras: Vec<StackId> = attack.extra_targets.iter().map(|target| target.stack).collect();
            match (attack.mode, attack.defender) {
                (AttackMode::Ranged, defender) => {
                    self.strike_ranged(id, defender, attack.target_cell, &extras, attack.ranged_denom)?;
                    let again = self.state.stack(id).is_some_and(|stack| {
                        stack.is_alive() && stack.current.max_attacks_ranged > 1 && stack.current.can_attack_ranged
                    }) && defender.is_none_or(|defender| self.is_alive(defender));
                    if again {
                        self.strike_ranged(id, defender, attack.target_cell, &extras, attack.ranged_denom)?;
                    }
                }
                (AttackMode::Melee, Some(defender)) => {
                    let retaliation_extras: Vec<StackId> = attack
                        .retaliation_extra_targets
                        .iter()
                        .map(|target| target.stack)
                        .collect();
                    self.strike_melee(id, defender, attack.target_cell, &extras)?;
                    self.retaliate(id, defender, &retaliation_extras)?;

                    let again = self.state.stack(id).is_some_and(|stack| {
                        stack.is_alive() && stack.current.max_attacks_melee > 1 && stack.current.can_attack_melee
                    }) && self.is_alive(defender);
                    if again {
                        self.strike_melee(id, defender, attack.target_cell, &extras)?;
                        self.retaliate(id, defender, &retaliation_extras)?;
                    }
                }
                (AttackMode::Melee, None) => {}
            }
            if let Some(defender) = attack.defender {
                self.reset_position(defender);
            }
        }
        self.reset_position(id);

        self.roll_high_morale(id);
        self.clear_current();
        self.update_state()
    }

    fn is_alive(&self, id: StackId) -> bool {
        self.state.stack(id).is_some_and(|stack| stack.is_alive())
    }

    fn reset_position(&mut self, id: StackId) {
        if let Some(position) = self.state.stack(id).map(|stack| stack.pos) {
            self.notify(BattleEvent::PositionReset { stack: id, position });
        }
    }

    /// Grants one extra turn per round on a successful morale check.
    fn roll_high_morale(&mut self, id: StackId) {
        let Some(stack) = self.state.stack(id) else {
            return;
        };
        let morale = stack.current.morale;
        if !stack.is_alive() || stack.round.had_high_morale || morale <= 0 {
            return;
        }
        if !check_rng_effect(morale, &self.rules.morale, self.rng.as_mut()) {
            return;
        }
        if let Some(stack) = self.state.stack_mut(id) {
            stack.round.had_high_morale = true;
            stack.round.finished_turn = false;
        }
        tracing::debug!(stack = %id, "good morale");
        self.notify(BattleEvent::StackUnderEffect {
            stack: id,
            effect: StackEffect::GoodMorale,
        });
    }

    fn roll_luck(&mut self, id: StackId) -> LuckRoll {
        let Some(luck) = self.state.stack(id).map(|stack| stack.current.luck) else {
            return LuckRoll::None;
        };
        if luck == 0 || !check_rng_effect(luck, &self.rules.luck, self.rng.as_mut()) {
            return LuckRoll::None;
        }
        let (roll, effect) = if luck > 0 {
            (LuckRoll::Luck, StackEffect::GoodLuck)
        } else {
            (LuckRoll::Unluck, StackEffect::BadLuck)
        };
        self.notify(BattleEvent::StackUnderEffect { stack: id, effect });
        roll
    }

    /// Rolls one hit of `attacker` on `target` and, on the first hit of this
    /// strike, stores the base roll for the rest of the round.
    fn roll_hit(
        &mut self,
        attacker: StackId,
        target: StackId,
        melee: bool,
        ranged_denom: i64,
        luck: LuckRoll,
        store_roll: bool,
    ) -> Option<DamageResult> {
        let result = {
            let striker = self.state.stack(attacker)?;
            let victim = self.state.stack(target)?;
            if !victim.is_alive() {
                return None;
            }
            damage_roll(
                striker,
                striker.count,
                victim,
                DamageRollMode::Random,
                melee,
                ranged_denom,
                luck,
                &self.params,
                self.rng.as_mut(),
            )
        };
        tracing::trace!(attacker = %attacker, target = %target, damage = result.loss.damage_total, "hit");
        if store_roll {
            if let Some(striker) = self.state.stack_mut(attacker) {
                striker.round.base_roll = Some(SharedRoll {
                    roll: result.damage_base_roll,
                    count: striker.count,
                });
            }
        }
        Some(result)
    }

    /// Rolls every extra target after the main one, sharing its luck.
    fn roll_extras(
        &mut self,
        attacker: StackId,
        extras: &[StackId],
        melee: bool,
        ranged_denom: i64,
        luck: LuckRoll,
        mut store_roll: bool,
    ) -> Vec<PhysicalHit> {
        let mut hits = Vec::with_capacity(extras.len());
        for &target in extras {
            if let Some(damage) = self.roll_hit(attacker, target, melee, ranged_denom, luck, store_roll) {
                store_roll = false;
                hits.push(PhysicalHit { target, damage });
            }
        }
        hits
    }

    fn apply_hits(&mut self, main: Option<PhysicalHit>, extra: &[PhysicalHit]) -> Result<(), BattleError> {
        if let Some(hit) = main {
            if let Some(stack) = self.state.stack_mut(hit.target) {
                stack.apply_loss(&hit.damage.loss);
            }
        }
        for hit in extra {
            if let Some(stack) = self.state.stack_mut(hit.target) {
                stack.apply_loss(&hit.damage.loss);
            }
            recalc_stack(&mut self.state, hit.target, &self.rules)?;
        }
        Ok(())
    }

    fn strike_melee(
        &mut self,
        attacker: StackId,
        defender: StackId,
        target_position: BattlePosition,
        extras: &[StackId],
    ) -> Result<(), BattleError> {
        self.strike_melee_as(attacker, defender, target_position, extras, false)
    }

    fn strike_melee_as(
        &mut self,
        attacker: StackId,
        defender: StackId,
        target_position: BattlePosition,
        extras: &[StackId],
        is_retaliation: bool,
    ) -> Result<(), BattleError> {
        let luck = self.roll_luck(attacker);
        let main = self
            .roll_hit(attacker, defender, true, 1, luck, true)
            .map(|damage| PhysicalHit { target: defender, damage });
        let extra = self.roll_extras(attacker, extras, true, 1, luck, main.is_none());

        self.notify(BattleEvent::BeforeAttackMelee {
            affected: AffectedPhysical {
                attacker,
                main,
                target_position,
                extra: extra.clone(),
            },
            is_retaliation,
        });
        self.apply_hits(main, &extra)?;
        recalc_stack(&mut self.state, defender, &self.rules)?;
        recalc_stack(&mut self.state, attacker, &self.rules)?;
        Ok(())
    }

    /// Strikes back at `attacker` when `defender` is allowed to.
    fn retaliate(&mut self, attacker: StackId, defender: StackId, extras: &[StackId]) -> Result<(), BattleError> {
        let allowed = match (self.state.stack(attacker), self.state.stack(defender)) {
            (Some(att), Some(def)) => can_retaliate(att, def),
            _ => false,
        };
        if !allowed {
            return Ok(());
        }
        let Some(target_position) = self.state.stack(attacker).map(|att| att.pos.main()) else {
            return Ok(());
        };
        if let Some(def) = self.state.stack_mut(defender) {
            def.round.retaliations_done += 1;
        }
        tracing::debug!(stack = %defender, target = %attacker, "retaliation");
        self.strike_melee_as(defender, attacker, target_position, extras, true)
    }

    fn strike_ranged(
        &mut self,
        attacker: StackId,
        defender: Option<StackId>,
        target_position: BattlePosition,
        extras: &[StackId],
        ranged_denom: i64,
    ) -> Result<(), BattleError> {
        let luck = self.roll_luck(attacker);
        let main = defender.and_then(|defender| {
            self.roll_hit(attacker, defender, false, ranged_denom, luck, true)
                .map(|damage| PhysicalHit { target: defender, damage })
        });
        let extra = self.roll_extras(attacker, extras, false, ranged_denom, luck, main.is_none());

        self.notify(BattleEvent::BeforeAttackRanged {
            affected: AffectedPhysical {
                attacker,
                main,
                target_position,
                extra: extra.clone(),
            },
        });
        self.apply_hits(main, &extra)?;
        if let Some(stack) = self.state.stack_mut(attacker) {
            stack.remaining_shots = (stack.remaining_shots - 1).max(0);
        }
        if let Some(defender) = defender {
            recalc_stack(&mut self.state, defender, &self.rules)?;
        }
        recalc_stack(&mut self.state, attacker, &self.rules)?;
        Ok(())
    }

    // ========================================================================
    // Cast
    // ========================================================================

    fn run_cast(&mut self, id: StackId, params: &CastParams, plan: CastPlan) -> Result<(), BattleError> {
        let (Some(spell), Some(power)) = (plan.spell.clone(), plan.power.clone()) else {
            return Err(BattleError::invalid_plan(
                self.error_context(id).with_message("cast plan without spell"),
            ));
        };
        let Some(side) = self.state.stack(id).map(|stack| stack.side) else {
            return Err(BattleError::NoActiveStack);
        };

        let caster = if plan.hero_cast {
            if let Some(hero) = self.state.hero_mut(side) {
                let cost = hero.mana_cost(&spell.id).unwrap_or(0);
                hero.mana -= cost;
                hero.cast_this_round = true;
            }
            Caster::Hero(side)
        } else {
            if let Some(stack) = self.state.stack_mut(id) {
                stack.round.finished_turn = true;
                stack.casts_done += 1;
            }
            Caster::Unit(id)
        };

        let mut hits = Vec::with_capacity(plan.targets.len());
        for target in &plan.targets {
            if target.success_chance != BonusRatio::ONE && check_resist(target.success_chance, self.rng.as_mut()) {
                tracing::debug!(stack = %target.stack, spell = %spell.id, "resisted");
                self.notify(BattleEvent::StackUnderEffect {
                    stack: target.stack,
                    effect: StackEffect::Resist,
                });
                continue;
            }
            match spell.kind {
                SpellType::Temp => {
                    if let Some(stack) = self.state.stack_mut(target.stack) {
                        stack.effects.push(ActiveEffect::Spell(SpellEffect {
                            spell: spell.clone(),
                            params: power.clone(),
                            rounds_remaining: power.spell_power + power.duration_bonus,
                        }));
                    }
                    recalc_stack(&mut self.state, target.stack, &self.rules)?;
                }
                SpellType::Offensive => {
                    if let (Some(loss), Some(stack)) = (target.loss, self.state.stack_mut(target.stack)) {
                        stack.apply_loss(&loss);
                    }
                }
                _ => {}
            }
            hits.push(MagicHit {
                target: target.stack,
                loss: target.loss,
            });
        }

        if !hits.is_empty() {
            self.notify(BattleEvent::Cast(AffectedMagic {
                caster,
                spell: spell.id.clone(),
                main_position: Some(params.target),
                area: plan.affected_area.iter().copied().collect(),
                targets: hits,
            }));
        }

        if plan.hero_cast {
            recalc_stack(&mut self.state, id, &self.rules)?;
            if !self.is_alive(id) {
                self.clear_current();
            }
        } else {
            self.clear_current();
        }
        self.update_state()
    }
}
