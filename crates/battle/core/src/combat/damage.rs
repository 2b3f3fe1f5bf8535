//! Physical damage, losses and the random checks around an attack.

use super::{DamageEstimate, DamageResult, DamageRollMode, LossInfo, LuckRoll};
use crate::config::BattleConfig;
use crate::env::{BattleRng, BattleRules, PhysicalRules, RangePenalties, RngRules, ScriptedRng, UnitTraits};
use crate::state::BattleStack;
use crate::stats::BonusRatio;

/// Rule constants the damage formulas read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CombatParams {
    pub physical: PhysicalRules,
    pub dice_cap: i64,
    pub ranged_limit: i32,
}

impl CombatParams {
    pub fn new(rules: &BattleRules, config: &BattleConfig) -> Self {
        Self {
            physical: rules.physical,
            dice_cap: config.dice_cap.max(1),
            ranged_limit: config.ranged_limit,
        }
    }
}

impl Default for CombatParams {
    fn default() -> Self {
        Self::new(&BattleRules::default(), &BattleConfig::default())
    }
}

// ============================================================================
// Base Roll
// ============================================================================

/// `min·count` plus the spread roll for `count` individuals.
///
/// At most `dice_cap` dice are rolled; larger stacks scale the sum.
///
/// ```
/// # use battle_core::combat::{calculate_physical_base, DamageRollMode};
/// # use battle_core::env::ScriptedRng;
/// let mut rng = ScriptedRng::default();
/// assert_eq!(calculate_physical_base(2, 4, 10, DamageRollMode::Min, 10, &mut rng), 20);
/// assert_eq!(calculate_physical_base(2, 4, 10, DamageRollMode::Avg, 10, &mut rng), 30);
/// assert_eq!(calculate_physical_base(2, 4, 10, DamageRollMode::Max, 10, &mut rng), 40);
/// assert_eq!(rng.draws(), 0);
/// ```
pub fn calculate_physical_base(
    min_damage: i32,
    max_damage: i32,
    count: i32,
    mode: DamageRollMode,
    dice_cap: i64,
    rng: &mut dyn BattleRng,
) -> i64 {
    let count = i64::from(count.max(0));
    let spread = i64::from((max_damage - min_damage).max(0));
    let spread_roll = if spread == 0 {
        0
    } else {
        match mode {
            DamageRollMode::Min => 0,
            DamageRollMode::Max => spread * count,
            DamageRollMode::Avg => spread * count / 2,
            DamageRollMode::Random => {
                let dice = count.min(dice_cap.max(1));
                if dice == 0 {
                    0
                } else {
                    let total = rng.gen_sum_small_n(dice as u32, spread as u32);
                    if count > dice { total * count / dice } else { total }
                }
            }
        }
    };
    i64::from(min_damage) * count + spread_roll
}

/// Base-factor bonus and reduce amount for an attack/defense pair.
///
/// Positive difference adds `diff·attack_value` to the base factor; otherwise
/// the reduce factor loses `|diff|·defense_value`.
pub fn attack_power(attack: i32, defense: i32, rules: &PhysicalRules) -> (BonusRatio, BonusRatio) {
    let diff = (attack - defense).clamp(-rules.max_effective_defense, rules.max_effective_attack);
    if diff > 0 {
        (rules.attack_value * i64::from(diff), BonusRatio::ZERO)
    } else {
        (BonusRatio::ZERO, rules.defense_value * i64::from(-diff))
    }
}

// ============================================================================
// Damage Roll
// ============================================================================

/// Casualties `damage` causes to `defender`.
pub fn damage_loss(defender: &BattleStack, damage: i64) -> LossInfo {
    let max_health = i64::from(defender.current.max_health.max(1));
    let remaining = defender.effective_health() - damage;
    let remain_count = if remaining <= 0 {
        0
    } else {
        (remaining - 1) / max_health + 1
    };
    let remain_top_health = if remain_count == 0 {
        0
    } else {
        remaining - (remain_count - 1) * max_health
    };
    let remain_count = i32::try_from(remain_count).unwrap_or(i32::MAX);
    LossInfo {
        remain_count,
        remain_top_health: i32::try_from(remain_top_health).unwrap_or(i32::MAX),
        deaths: (defender.count - remain_count).max(0),
        damage_total: damage,
    }
}

fn melee_attack_factor(attacker: &BattleStack) -> BonusRatio {
    let penalized = attacker.unit.is_shooter()
        && !attacker
            .unit
            .abilities
            .disabled_penalties
            .contains(RangePenalties::MELEE);
    if penalized { BonusRatio::HALF } else { BonusRatio::ONE }
}

/// Damage of one hit by `attacker_count` individuals of `attacker`.
///
/// In [`DamageRollMode::Random`] a shared base roll stored earlier this round
/// is reused, scaled to the current count; otherwise a fresh base is computed.
#[allow(clippy::too_many_arguments)]
pub fn damage_roll(
    attacker: &BattleStack,
    attacker_count: i32,
    defender: &BattleStack,
    mode: DamageRollMode,
    melee: bool,
    ranged_denom: i64,
    luck: LuckRoll,
    params: &CombatParams,
    rng: &mut dyn BattleRng,
) -> DamageResult {
    let att = &attacker.current;
    let def = &defender.current;

    let base = match attacker.round.base_roll {
        Some(shared) if mode == DamageRollMode::Random && shared.count > 0 => {
            BonusRatio::from_int(shared.roll)
                * BonusRatio::new(i64::from(attacker_count), i64::from(shared.count))
        }
        _ => BonusRatio::from_int(calculate_physical_base(
            att.min_damage,
            att.max_damage,
            attacker_count,
            mode,
            params.dice_cap,
            rng,
        )),
    };

    let mut base_factor = BonusRatio::ZERO;
    let mut reduce_factor = BonusRatio::ONE;

    let attack = att.attack + if melee { att.melee_attack } else { att.ranged_attack };
    let attack = (defender.unit.abilities.reduce_attacker_attack * i64::from(attack)).round_down();
    let defense = (attacker.unit.abilities.reduce_target_defense * i64::from(def.defense)).round_down();
    let (power_bonus, power_reduce) = attack_power(
        i32::try_from(attack).unwrap_or(i32::MAX),
        i32::try_from(defense).unwrap_or(i32::MAX),
        &params.physical,
    );
    base_factor += power_bonus;
    reduce_factor *= BonusRatio::ONE - power_reduce;

    match luck {
        LuckRoll::Luck => base_factor += BonusRatio::ONE,
        LuckRoll::Unluck => reduce_factor *= BonusRatio::HALF,
        LuckRoll::None => {}
    }

    if melee {
        reduce_factor *= melee_attack_factor(attacker);
        base_factor += att.melee_damage;
        reduce_factor *= BonusRatio::ONE - def.melee_defense;
    } else {
        reduce_factor *= BonusRatio::new(1, ranged_denom.max(1));
        base_factor += att.ranged_damage;
        reduce_factor *= BonusRatio::ONE - def.ranged_defense;
    }
    reduce_factor *= BonusRatio::ONE - def.damage_reduction;

    let final_roll = base * (BonusRatio::ONE + base_factor) * reduce_factor;
    let total = final_roll.round_down().max(1);
    let damage_percent = if base > BonusRatio::ZERO {
        (final_roll * 100 / base).round_down()
    } else {
        0
    };

    DamageResult {
        loss: damage_loss(defender, total),
        damage_base_roll: base.round_down(),
        damage_percent,
    }
}

/// Min/avg/max damage of an attack without luck and without drawing.
pub fn estimate_damage(
    attacker: &BattleStack,
    defender: &BattleStack,
    melee: bool,
    ranged_denom: i64,
    params: &CombatParams,
) -> DamageEstimate {
    let mut idle = ScriptedRng::default();
    let mut roll = |mode| {
        damage_roll(
            attacker,
            attacker.count,
            defender,
            mode,
            melee,
            ranged_denom,
            LuckRoll::None,
            params,
            &mut idle,
        )
    };
    DamageEstimate {
        low: roll(DamageRollMode::Min),
        avg: roll(DamageRollMode::Avg),
        max: roll(DamageRollMode::Max),
    }
}

/// Retaliation `defender` would strike back with after `main`.
///
/// `None` for ranged attacks, when the low roll already kills the defender,
/// or when the defender may not retaliate.
pub fn estimate_retaliation(
    attacker: &BattleStack,
    defender: &BattleStack,
    melee: bool,
    main: &DamageEstimate,
    params: &CombatParams,
) -> Option<DamageEstimate> {
    if !melee || main.low.is_killed() || !can_retaliate(attacker, defender) {
        return None;
    }
    let mut idle = ScriptedRng::default();
    let mut roll = |mode, deaths: i32| {
        damage_roll(
            defender,
            defender.count - deaths,
            attacker,
            mode,
            true,
            1,
            LuckRoll::None,
            params,
            &mut idle,
        )
    };
    Some(DamageEstimate {
        low: roll(DamageRollMode::Min, main.low.loss.deaths),
        avg: roll(DamageRollMode::Avg, main.avg.loss.deaths),
        max: roll(DamageRollMode::Max, main.max.loss.deaths),
    })
}

/// Whether `defender` strikes back at `attacker` now.
pub fn can_retaliate(attacker: &BattleStack, defender: &BattleStack) -> bool {
    if !attacker.is_alive() || !defender.is_alive() || !defender.current.can_attack_melee {
        return false;
    }
    if attacker.unit.traits.contains(UnitTraits::FREE_ATTACK) {
        return false;
    }
    match defender.current.max_retaliations {
        None => true,
        Some(cap) => defender.round.retaliations_done < cap,
    }
}

/// Divisor applied to ranged damage: ×2 beyond the ranged limit, ×2 through a wall.
pub fn ranged_denominator(attacker: &BattleStack, distance: i32, wall_on_the_way: bool, ranged_limit: i32) -> i64 {
    let disabled = attacker.unit.abilities.disabled_penalties;
    let distance_den = if !disabled.contains(RangePenalties::DISTANCE) && distance > ranged_limit {
        2
    } else {
        1
    };
    let wall_den = if wall_on_the_way && !disabled.contains(RangePenalties::OBSTACLES) {
        2
    } else {
        1
    };
    distance_den * wall_den
}

// ============================================================================
// Random Checks
// ============================================================================

/// Luck or morale check at level `value`.
///
/// A neutral level never fires and never draws. Otherwise one draw in
/// `[0, 23]` succeeds when `roll/24` is below the table chance.
pub fn check_rng_effect(value: i32, table: &RngRules, rng: &mut dyn BattleRng) -> bool {
    let value = table.effective(value);
    if value == 0 {
        return false;
    }
    let chance = table.chance(value);
    let roll = rng.gen_small(23);
    BonusRatio::new(i64::from(roll), 24) < chance
}

/// Magic resist check; `true` when the spell is resisted.
///
/// The success chance is floored at 1%.
pub fn check_resist(success_chance: BonusRatio, rng: &mut dyn BattleRng) -> bool {
    let percent = (success_chance * 100).round_down().max(1);
    let roll = rng.gen_small(99);
    i64::from(roll) >= percent
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::env::{UnitPrimaryParams, UnitTemplate};
    use crate::state::{Side, StackId};

    fn stack(id: u32, count: i32, primary: UnitPrimaryParams, traits: UnitTraits) -> BattleStack {
        let unit = Arc::new(UnitTemplate::new("unit", 10, primary).with_traits(traits));
        let mut stack = BattleStack::new(StackId(id), Side::Attacker, 0, unit, count);
        stack.current.attack = primary.attack;
        stack.current.defense = primary.defense;
        stack.current.min_damage = primary.min_damage;
        stack.current.max_damage = primary.max_damage;
        stack.current.max_health = primary.max_health;
        stack.current.can_attack_melee = true;
        stack.current.max_retaliations = Some(1);
        stack.health = primary.max_health;
        stack
    }

    fn primary(attack: i32, defense: i32, min: i32, max: i32, health: i32) -> UnitPrimaryParams {
        UnitPrimaryParams {
            attack,
            defense,
            min_damage: min,
            max_damage: max,
            max_health: health,
            speed: 5,
            shots: 0,
        }
    }

    #[test]
    fn loss_keeps_count_non_negative() {
        let defender = stack(1, 3, primary(0, 0, 1, 1, 10), UnitTraits::empty());
        let loss = damage_loss(&defender, 1000);
        assert_eq!(loss.remain_count, 0);
        assert_eq!(loss.remain_top_health, 0);
        assert_eq!(loss.deaths, 3);

        let loss = damage_loss(&defender, 15);
        assert_eq!(loss.remain_count, 2);
        assert_eq!(loss.remain_top_health, 5);
        assert_eq!(loss.deaths, 1);
    }

    #[test]
    fn large_stacks_scale_the_capped_dice() {
        let mut rng = ScriptedRng::new([1]);
        // 10 dice of [0, 1] all rolling 1, scaled to 20 individuals
        let base = calculate_physical_base(1, 2, 20, DamageRollMode::Random, 10, &mut rng);
        assert_eq!(base, 20 + 20);
        assert_eq!(rng.draws(), 10);
    }

    #[test]
    fn attack_power_is_clamped() {
        let rules = PhysicalRules::default();
        assert_eq!(attack_power(100, 0, &rules).0, BonusRatio::new(3, 1));
        assert_eq!(attack_power(0, 100, &rules).1, BonusRatio::new(28, 40));
        assert_eq!(attack_power(5, 5, &rules), (BonusRatio::ZERO, BonusRatio::ZERO));
    }

    #[test]
    fn shooters_deal_half_in_melee() {
        let params = CombatParams::default();
        let archer = stack(0, 10, primary(5, 5, 4, 4, 10), UnitTraits::RANGE_ATTACK);
        let target = stack(1, 10, primary(5, 5, 1, 1, 100), UnitTraits::empty());
        let estimate = estimate_damage(&archer, &target, true, 1, &params);
        assert_eq!(estimate.low.loss.damage_total, 20);
        let ranged = estimate_damage(&archer, &target, false, 1, &params);
        assert_eq!(ranged.low.loss.damage_total, 40);
    }

    #[test]
    fn distance_penalty_halves_ranged_damage() {
        let params = CombatParams::default();
        let archer = stack(0, 10, primary(5, 5, 4, 4, 10), UnitTraits::RANGE_ATTACK);
        let target = stack(1, 10, primary(5, 5, 1, 1, 100), UnitTraits::empty());
        let denom = ranged_denominator(&archer, 11, false, params.ranged_limit);
        assert_eq!(denom, 2);
        assert_eq!(ranged_denominator(&archer, 10, false, params.ranged_limit), 1);
        assert_eq!(ranged_denominator(&archer, 11, true, params.ranged_limit), 4);
        let near = estimate_damage(&archer, &target, false, 1, &params);
        let far = estimate_damage(&archer, &target, false, denom, &params);
        assert_eq!(near.avg.loss.damage_total, 2 * far.avg.loss.damage_total);
    }

    #[test]
    fn retaliation_respects_cap_and_free_attack() {
        let attacker = stack(0, 10, primary(5, 5, 1, 1, 10), UnitTraits::empty());
        let mut defender = stack(1, 10, primary(5, 5, 1, 1, 10), UnitTraits::empty());
        assert!(can_retaliate(&attacker, &defender));
        defender.round.retaliations_done = 1;
        assert!(!can_retaliate(&attacker, &defender));
        defender.current.max_retaliations = None;
        assert!(can_retaliate(&attacker, &defender));
        defender.current.max_retaliations = Some(0);
        defender.round.retaliations_done = 0;
        assert!(!can_retaliate(&attacker, &defender));

        let free = stack(2, 10, primary(5, 5, 1, 1, 10), UnitTraits::FREE_ATTACK);
        defender.current.max_retaliations = None;
        assert!(!can_retaliate(&free, &defender));
    }

    #[test]
    fn retaliation_estimate_uses_survivors() {
        let params = CombatParams::default();
        let attacker = stack(0, 10, primary(5, 5, 2, 2, 10), UnitTraits::empty());
        let defender = stack(1, 10, primary(5, 5, 2, 2, 10), UnitTraits::empty());
        let main = estimate_damage(&attacker, &defender, true, 1, &params);
        assert_eq!(main.low.loss.deaths, 2);
        let back = estimate_retaliation(&attacker, &defender, true, &main, &params).unwrap();
        assert_eq!(back.low.loss.damage_total, 16);
        assert!(estimate_retaliation(&attacker, &defender, false, &main, &params).is_none());
    }

    #[test]
    fn neutral_luck_never_draws() {
        let mut rng = ScriptedRng::new([0]);
        let rules = RngRules::default();
        assert!(!check_rng_effect(0, &rules, &mut rng));
        assert_eq!(rng.draws(), 0);
        assert!(check_rng_effect(1, &rules, &mut rng));
        let mut rng = ScriptedRng::new([1]);
        assert!(!check_rng_effect(1, &rules, &mut rng));
        let mut rng = ScriptedRng::new([5]);
        assert!(check_rng_effect(-3, &rules, &mut rng));
    }

    #[test]
    fn resist_has_one_percent_floor() {
        let mut rng = ScriptedRng::new([0]);
        assert!(!check_resist(BonusRatio::ZERO, &mut rng));
        let mut rng = ScriptedRng::new([1]);
        assert!(check_resist(BonusRatio::ZERO, &mut rng));
        let mut rng = ScriptedRng::new([49]);
        assert!(!check_resist(BonusRatio::HALF, &mut rng));
    }
}
