//! Round scheduling: queue building, round starts, before-active checks and
//! end-of-battle detection.

use std::collections::BTreeMap;

use super::{AffectedMagic, BattleEngine, BattleError, BattleEvent, Caster, MagicHit, StackEffect};
use crate::combat::{check_rng_effect, is_spell_target};
use crate::env::SpellQualify;
use crate::state::{ActiveEffect, BattlePhase, BattleResult, RoundState, Side, SpellEffect, StackId};
use crate::stats::recalc_stack;

/// Outcome of the checks run when a stack becomes active.
enum Activation {
    Ready,
    /// Bad morale took the turn.
    Skipped,
}

impl BattleEngine {
    /// Brings the battle to the next decision point.
    ///
    /// Checks for the end of the battle, rebuilds the queue, starts new
    /// rounds while nobody can act and runs the before-active checks of the
    /// next stack. Rounds that pass without any stack becoming active are
    /// counted; after `max_empty_rounds` of them the battle is a tie.
    pub(super) fn update_state(&mut self) -> Result<(), BattleError> {
        let mut idle_rounds = 0;
        loop {
            if self.detect_finish() {
                return Ok(());
            }
            self.rebuild_queue()?;

            if self.state.queue.is_empty() {
                idle_rounds += 1;
                if idle_rounds > self.config.max_empty_rounds {
                    tracing::warn!(rounds = idle_rounds, "no stack could act, ending in a tie");
                    self.finish(BattleResult::Tie);
                    return Ok(());
                }
                self.start_new_round();
                continue;
            }

            let keep = self
                .state
                .current
                .is_some_and(|current| self.state.queue.contains(&current));
            if !keep {
                self.state.current = self.state.queue.first().copied();
                self.activated = None;
            }

            match self.before_current_active()? {
                Activation::Ready => {
                    self.notify(BattleEvent::StateChanged);
                    return Ok(());
                }
                Activation::Skipped => self.clear_current(),
            }
        }
    }

    /// Recalculates every living stack and sorts those that can still act.
    fn rebuild_queue(&mut self) -> Result<(), BattleError> {
        let alive: Vec<StackId> = self.state.alive().map(|stack| stack.id).collect();
        for id in &alive {
            recalc_stack(&mut self.state, *id, &self.rules)?;
        }

        let mut same_speed: BTreeMap<(Side, i32), u32> = BTreeMap::new();
        for id in &alive {
            if let Some(stack) = self.state.stack_mut(*id) {
                let speed = stack.current.speed;
                let order = same_speed.entry((stack.side, speed)).or_default();
                stack.speed_order = -speed;
                stack.same_speed_order = *order;
                *order += 1;
            }
        }

        let mut queue: Vec<(crate::state::TurnOrder, StackId)> = self
            .state
            .alive()
            .filter(|stack| !stack.round.finished_turn && stack.current.can_do_anything)
            .map(|stack| (stack.turn_order(), stack.id))
            .collect();
        queue.sort();
        self.state.queue = queue.into_iter().map(|(_, id)| id).collect();
        Ok(())
    }

    /// Resets round state, expires effects and advances the round counter.
    pub(super) fn start_new_round(&mut self) {
        for side in [Side::Defender, Side::Attacker] {
            for stack in self.state.stacks.iter_mut().filter(|stack| stack.side == side && stack.is_alive()) {
                stack.round = RoundState::default();
                stack.effects.retain(|effect| !matches!(effect, ActiveEffect::Guard { .. }));
                for effect in &mut stack.effects {
                    if let ActiveEffect::Spell(spell) = effect {
                        spell.rounds_remaining -= 1;
                    }
                }
            }
        }
        for hero in self.state.heroes.iter_mut().flatten() {
            hero.cast_this_round = false;
        }
        self.state.round += 1;
        self.state.phase = BattlePhase::RoundInProgress;
        self.clear_current();

        tracing::debug!(round = self.state.round, "round started");
        self.notify(BattleEvent::RoundStarted {
            round: self.state.round,
        });
    }

    /// Regeneration, bad morale and first-turn hero casts, once per activation.
    fn before_current_active(&mut self) -> Result<Activation, BattleError> {
        let Some(id) = self.state.current else {
            return Ok(Activation::Ready);
        };
        if self.activated == Some(id) {
            return Ok(Activation::Ready);
        }
        self.activated = Some(id);

        let Some(stack) = self.state.stack_mut(id) else {
            return Ok(Activation::Ready);
        };
        let side = stack.side;
        if stack.unit.abilities.regenerate && stack.health < stack.current.max_health {
            stack.health = stack.current.max_health;
            self.notify(BattleEvent::StackUnderEffect {
                stack: id,
                effect: StackEffect::Regenerate,
            });
        }

        let (morale, had_low_morale) = self
            .state
            .stack(id)
            .map_or((0, true), |stack| (stack.current.morale, stack.round.had_low_morale));
        if morale < 0 && !had_low_morale && check_rng_effect(morale, &self.rules.morale, self.rng.as_mut()) {
            if let Some(stack) = self.state.stack_mut(id) {
                stack.round.finished_turn = true;
                stack.round.had_low_morale = true;
            }
            tracing::debug!(stack = %id, "bad morale");
            self.notify(BattleEvent::StackUnderEffect {
                stack: id,
                effect: StackEffect::BadMorale,
            });
            return Ok(Activation::Skipped);
        }

        if !self.state.first_turn_done[side.index()] {
            self.state.first_turn_done[side.index()] = true;
            self.cast_before_start(side)?;
        }
        Ok(Activation::Ready)
    }

    /// Applies the hero's pre-battle spells of `side`.
    ///
    /// Good spells land on the hero's own stacks and bad ones on the
    /// opponent's; each spell lasts `spell_power` rounds.
    fn cast_before_start(&mut self, side: Side) -> Result<(), BattleError> {
        let casts = match self.state.hero(side) {
            Some(hero) => hero.casts_before_start.clone(),
            None => return Ok(()),
        };

        for (spell, params) in casts {
            let mut targets: Vec<StackId> = Vec::new();
            for stack in self.state.alive() {
                let eligible = match spell.qualify {
                    SpellQualify::Good => stack.side == side,
                    SpellQualify::Bad => stack.side != side,
                    SpellQualify::None => true,
                };
                if eligible && is_spell_target(&spell, stack)? {
                    targets.push(stack.id);
                }
            }

            for id in &targets {
                if let Some(stack) = self.state.stack_mut(*id) {
                    stack.effects.push(ActiveEffect::Spell(SpellEffect {
                        spell: spell.clone(),
                        params: params.clone(),
                        rounds_remaining: params.spell_power,
                    }));
                }
                recalc_stack(&mut self.state, *id, &self.rules)?;
            }

            if !targets.is_empty() {
                tracing::debug!(%side, spell = %spell.id, targets = targets.len(), "pre-battle cast");
                self.notify(BattleEvent::Cast(AffectedMagic {
                    caster: Caster::BeforeStart(side),
                    spell: spell.id.clone(),
                    main_position: None,
                    area: Vec::new(),
                    targets: targets
                        .into_iter()
                        .map(|target| MagicHit { target, loss: None })
                        .collect(),
                }));
            }
        }
        Ok(())
    }

    /// Finishes the battle when a side has no living stack left.
    pub(super) fn detect_finish(&mut self) -> bool {
        if self.state.phase.is_finished() {
            return true;
        }
        let attackers = self.state.alive_count(Side::Attacker);
        let defenders = self.state.alive_count(Side::Defender);
        let result = match (attackers, defenders) {
            (0, 0) => BattleResult::Tie,
            (0, _) => BattleResult::DefenderWon,
            (_, 0) => BattleResult::AttackerWon,
            _ => return false,
        };
        self.finish(result);
        true
    }

    fn finish(&mut self, result: BattleResult) {
        self.state.phase = BattlePhase::Finished(result);
        self.state.queue.clear();
        self.clear_current();
        tracing::info!(%result, round = self.state.round, "battle finished");
        self.notify(BattleEvent::BattleFinished { result });
    }
}
