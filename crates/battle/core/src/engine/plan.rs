//! Plan derivation for the active stack.
//!
//! Planning never mutates the battle and never draws from the RNG. Anything
//! that makes a request impossible (cells off the field, an unreachable
//! destination, a stale target) yields a plan with `valid == false`; only
//! formula failures surface as errors.

use super::BattleEngine;
use crate::action::{
    AttackAlteration, AttackMode, AvailableActions, CastParams, CastPlan, CastTarget, LossTotal,
    MovePlan, PlanAttackParams, PlanMoveParams, PlannedAttack, PlannedTarget,
};
use crate::combat::{
    damage_loss, estimate_damage, estimate_retaliation, is_spell_target, ranged_denominator,
    ranged_splash_cells, spell_area, spell_damage, splash_extra_cells,
};
use crate::env::{MagicSchool, Spell, SpellCastParams, SpellQualify, SpellType, SplashAttack};
use crate::field::{BattlePosition, BattlePositionExtended, PositionSet};
use crate::formula::FormulaError;
use crate::state::{BattleStack, Side, StackId};
use crate::stats::BonusRatio;

impl BattleEngine {
    /// Capabilities of the active stack.
    pub fn available_actions(&self) -> AvailableActions {
        match self.active_stack() {
            Some(stack) => AvailableActions::for_stack(stack, self.state.hero(stack.side)),
            None => AvailableActions::default(),
        }
    }

    // ========================================================================
    // Move / Attack
    // ========================================================================

    /// Derives the move and attack plan of the active stack.
    pub fn find_plan_move(&self, movement: &PlanMoveParams, attack: &PlanAttackParams) -> MovePlan {
        let Some(stack) = self.active_stack() else {
            return MovePlan::invalid(movement.move_from, movement.move_to);
        };
        let mut plan = MovePlan::invalid(stack.pos, movement.move_to);

        if attack.is_active() {
            let Some((planned, move_to)) = self.plan_attack(stack, movement, attack) else {
                return plan;
            };
            plan.move_to = move_to;
            plan.attack = Some(planned);
        } else if movement.move_to == stack.pos {
            return plan;
        }

        let move_to = plan.move_to;
        let field = &self.state.field;
        if !field.is_valid(move_to.left()) || !field.is_valid(move_to.right()) {
            return plan;
        }
        if movement.no_move_calculation {
            plan.valid = true;
            return plan;
        }

        if move_to != stack.pos {
            if !stack.current.can_move || self.is_occupied(stack.id, &move_to) {
                return plan;
            }
            let Some(reach) = self.reach_map(stack.id) else {
                return plan;
            };
            let limit = (!movement.calculate_unlimited_path).then(|| speed_budget(stack));
            let path = reach.path_to(move_to.main(), limit);
            if path.is_empty() {
                return plan;
            }
            plan.walk_path = path;
        }
        plan.valid = true;
        plan
    }

    fn is_occupied(&self, walker: StackId, pos: &BattlePositionExtended) -> bool {
        pos.cells().iter().any(|cell| {
            self.state.obstacles.contains(cell)
                || self
                    .state
                    .find_stack_id(*cell, true)
                    .is_some_and(|id| id != walker)
        })
    }

    /// Attack half of a move plan, plus the cell the attacker ends on.
    fn plan_attack(
        &self,
        stack: &BattleStack,
        movement: &PlanMoveParams,
        attack: &PlanAttackParams,
    ) -> Option<(PlannedAttack, BattlePositionExtended)> {
        let target_cell = attack.target?;
        let free_attack = attack.alteration == AttackAlteration::FreeAttack;
        let target = self.state.find_stack(target_cell, true);
        if target.is_some_and(|target| target.side == stack.side) {
            return None;
        }
        if target.is_none() && !free_attack {
            return None;
        }

        let cur = &stack.current;
        let ranged = attack.alteration != AttackAlteration::ForceMelee && cur.can_shoot();
        if free_attack && !(ranged && cur.can_attack_free_splash) {
            return None;
        }

        let (mode, move_to, ranged_denom) = if ranged {
            let distance = match target {
                Some(target) => stack.pos.shortest_hex_distance(&target.pos),
                None => stack.pos.shortest_hex_distance_to_cell(target_cell),
            };
            let denom = ranged_denominator(stack, distance, false, self.config.ranged_limit);
            (AttackMode::Ranged, stack.pos, denom)
        } else {
            let direction = attack.direction?;
            if !cur.can_attack_melee || target.is_none() {
                return None;
            }
            if stack.pos.suggest_for_attack(target_cell, direction) != movement.move_to {
                return None;
            }
            (AttackMode::Melee, movement.move_to, 1)
        };
        let melee = mode == AttackMode::Melee;

        let main_damage = target.map(|target| estimate_damage(stack, target, melee, ranged_denom, &self.params));
        let retaliation_damage = match (target, &main_damage) {
            (Some(target), Some(main)) => estimate_retaliation(stack, target, melee, main, &self.params),
            _ => None,
        };

        let abilities = &stack.unit.abilities;
        let defender = target.map(BattleStack::id);
        let (splash_cells, extra_targets) = match (mode, attack.direction) {
            (AttackMode::Melee, Some(direction)) if abilities.splash.is_melee() => {
                let cells = splash_extra_cells(&self.state.field, abilities.splash, &move_to, direction);
                let extras = self.splash_targets(stack, defender, &cells, |_| true, |candidate| {
                    estimate_damage(stack, candidate, true, 1, &self.params)
                });
                (cells, extras)
            }
            (AttackMode::Ranged, _) if abilities.splash == SplashAttack::Ranged => {
                let cells = ranged_splash_cells(&self.state.field, target_cell);
                let element = abilities.splash_element;
                let extras = self.splash_targets(
                    stack,
                    defender,
                    &cells,
                    |candidate| {
                        let fire_immune = candidate.current.immunes.covers_school(MagicSchool::Fire);
                        candidate.unit.accepts_element(element, fire_immune)
                    },
                    |candidate| estimate_damage(stack, candidate, false, ranged_denom, &self.params),
                );
                (cells, extras)
            }
            _ => (PositionSet::new(), Vec::new()),
        };

        let (retaliation_splash_cells, retaliation_extra_targets) =
            match (target, attack.direction, &retaliation_damage) {
                (Some(target), Some(direction), Some(_)) if target.unit.abilities.splash.is_melee() => {
                    let cells = splash_extra_cells(
                        &self.state.field,
                        target.unit.abilities.splash,
                        &target.pos,
                        direction.inverse(),
                    );
                    let extras = self.splash_targets(target, Some(stack.id), &cells, |_| true, |candidate| {
                        estimate_damage(target, candidate, true, 1, &self.params)
                    });
                    (cells, extras)
                }
                _ => (PositionSet::new(), Vec::new()),
            };

        let planned = PlannedAttack {
            mode,
            target_cell,
            direction: attack.direction,
            defender,
            free_attack,
            ranged_denom,
            main_damage,
            retaliation_damage,
            splash_cells,
            extra_targets,
            retaliation_splash_cells,
            retaliation_extra_targets,
        };
        Some((planned, move_to))
    }

    /// Living stacks on `cells` that a splash by `striker` hits besides
    /// `opponent`, each estimated on its own.
    fn splash_targets(
        &self,
        striker: &BattleStack,
        opponent: Option<StackId>,
        cells: &PositionSet,
        accept: impl Fn(&BattleStack) -> bool,
        estimate: impl Fn(&BattleStack) -> crate::combat::DamageEstimate,
    ) -> Vec<PlannedTarget> {
        let friendly_fire = striker.unit.abilities.splash_friendly_fire;
        let mut targets: Vec<PlannedTarget> = Vec::new();
        for cell in cells {
            let Some(candidate) = self.state.find_stack(*cell, true) else {
                continue;
            };
            if candidate.id == striker.id
                || Some(candidate.id) == opponent
                || targets.iter().any(|target| target.stack == candidate.id)
            {
                continue;
            }
            if !friendly_fire && candidate.side == striker.side {
                continue;
            }
            if !accept(candidate) {
                continue;
            }
            targets.push(PlannedTarget {
                stack: candidate.id,
                damage: estimate(candidate),
            });
        }
        targets
    }

    // ========================================================================
    // Cast
    // ========================================================================

    /// Derives the cast plan of the active stack or its side's hero.
    pub fn find_plan_cast(&self, params: &CastParams) -> Result<CastPlan, FormulaError> {
        let mut plan = CastPlan::invalid(params.target, params.hero_cast);
        if !self.state.field.is_valid(params.target) {
            return Ok(plan);
        }
        let Some(stack) = self.active_stack() else {
            return Ok(plan);
        };
        let Some(spell) = self.spells.get(&params.spell).cloned() else {
            return Ok(plan);
        };
        if self.state.forbidden.contains(&spell) {
            return Ok(plan);
        }
        let Some((power, increase)) = self.cast_power(stack, &spell, params.hero_cast) else {
            return Ok(plan);
        };

        let range = spell.range_for(power.skill_level);
        let side = stack.side;
        let cells: Vec<BattlePosition> = match range.chain_limit() {
            Some(limit) => self.chain_cells(&spell, side, params.target, limit)?,
            None => spell_area(&self.state.field, &self.state.obstacles, params.target, range)
                .into_iter()
                .collect(),
        };

        let mut targets: Vec<CastTarget> = Vec::new();
        let mut loss_total = LossTotal::default();
        for cell in &cells {
            let Some(target) = self.state.find_stack(*cell, true) else {
                continue;
            };
            if targets.iter().any(|planned| planned.stack == target.id) {
                continue;
            }
            if !can_affect(&spell, side, target)? {
                continue;
            }
            let own = target.side == side;

            let success_chance = if own {
                BonusRatio::ONE
            } else {
                target.current.magic_opp_success_chance
            };
            let loss = if spell.kind == SpellType::Offensive {
                let damage = spell_damage(
                    &spell,
                    &power,
                    target.unit.level,
                    targets.len(),
                    increase,
                    target.current.magic_reduce.for_school(spell.school),
                )?;
                let loss = damage_loss(target, damage);
                loss_total.damage_total += loss.damage_total;
                loss_total.deaths += loss.deaths;
                Some(loss)
            } else {
                None
            };
            targets.push(CastTarget {
                stack: target.id,
                success_chance,
                loss,
            });
        }
        if targets.is_empty() {
            return Ok(plan);
        }

        plan.valid = true;
        plan.affected_area = cells.into_iter().collect();
        plan.targets = targets;
        plan.loss_total = loss_total;
        plan.spell = Some(spell);
        plan.power = Some(power);
        Ok(plan)
    }

    /// Power of a cast and the caster's damage increase, or `None` when the
    /// caster may not cast `spell` now.
    fn cast_power(&self, stack: &BattleStack, spell: &Spell, hero_cast: bool) -> Option<(SpellCastParams, BonusRatio)> {
        if hero_cast {
            let hero = self.state.hero(stack.side)?;
            if !hero.can_cast() || hero.mana < hero.mana_cost(&spell.id)? {
                return None;
            }
            let setup = &hero.setup;
            let power = SpellCastParams {
                spell: spell.id.clone(),
                spell_power: hero.estimated.spell_power,
                skill_level: setup.schools.level_for(spell.school),
                duration_bonus: setup.extra_rounds,
                hero_spec_level: (setup.specialty.as_ref() == Some(&spell.id)).then_some(setup.level),
            };
            return Some((power, setup.magic_increase.for_school(spell.school)));
        }

        let cur = &stack.current;
        let fixed = cur.fixed_cast.as_ref()?;
        if !cur.can_cast || fixed.params.spell != spell.id {
            return None;
        }
        Some((fixed.params.clone(), BonusRatio::ZERO))
    }

    /// Cells of the stacks a chain spell jumps through, in jump order.
    ///
    /// The chain starts at the stack on `start` and repeatedly moves to the
    /// nearest remaining stack the spell can affect (Cartesian distance, ties
    /// by cell order). Stacks the spell cannot affect are never jumped to and
    /// do not count toward `limit`.
    fn chain_cells(
        &self,
        spell: &Spell,
        caster: Side,
        start: BattlePosition,
        limit: usize,
    ) -> Result<Vec<BattlePosition>, FormulaError> {
        let Some(first) = self.state.find_stack(start, true) else {
            return Ok(Vec::new());
        };
        if !can_affect(spell, caster, first)? {
            return Ok(Vec::new());
        }

        let mut remaining: Vec<&BattleStack> = Vec::new();
        for stack in self.state.alive().filter(|stack| stack.id != first.id) {
            if can_affect(spell, caster, stack)? {
                remaining.push(stack);
            }
        }

        let mut chosen: Vec<&BattleStack> = vec![first];
        let mut current = first.pos.main();
        while chosen.len() < limit {
            let candidates: PositionSet = remaining.iter().map(|stack| stack.pos.main()).collect();
            let Some(next) = self.state.field.closest_to(current, &candidates).into_iter().next() else {
                break;
            };
            let Some(index) = remaining.iter().position(|stack| stack.pos.main() == next) else {
                break;
            };
            chosen.push(remaining.remove(index));
            current = next;
        }

        Ok(chosen.iter().flat_map(|stack| stack.pos.cells()).collect())
    }
}

/// Whether a spell cast by `caster`'s side may land on `target`.
///
/// Good spells only touch the caster's stacks and bad ones only the
/// opponent's; offensive spells spare the caster's stacks unless they are
/// indistinctive.
fn can_affect(spell: &Spell, caster: Side, target: &BattleStack) -> Result<bool, FormulaError> {
    let own = target.side == caster;
    let allowed = match spell.qualify {
        SpellQualify::Good => own,
        SpellQualify::Bad => !own,
        SpellQualify::None => true,
    };
    if !allowed || (spell.kind == SpellType::Offensive && !spell.indistinctive && own) {
        return Ok(false);
    }
    is_spell_target(spell, target)
}

fn speed_budget(stack: &BattleStack) -> u32 {
    u32::try_from(stack.current.speed).unwrap_or(0)
}

