//! Stat pipeline: folds templates, adventure bonuses and active effects into
//! the live [`StackStats`] and [`HeroStats`] snapshots.
//!
//! ```text
//! template + adventure deltas + army bonuses  → estimated_on_start  (battle start)
//! estimated_on_start + effects + guard        → current             (every recalculation)
//! current + adjacency                         → range_attack_blocked
//! ```

use std::collections::BTreeMap;

use crate::env::{
    ActionLocks, BattleRules, LibraryOracle, ModifiedStat, RangePenalties, SpellFilter, SpellId,
    SpellQualify, SplashAttack, StatBonus,
};
use crate::formula::{EffectBindings, FormulaError, evaluate};
use crate::state::{
    ActiveEffect, AdventureBonus, BattleHero, BattleStack, BattleState, HeroSetup, HeroSpell,
    RoundState, StackId,
};
use crate::stats::{Bonus, BonusRatio, BonusStack, HeroStats, StackStats};

/// Army-level inputs of [`calculate_stack_on_start`].
pub struct StartContext<'a> {
    pub bonus: &'a AdventureBonus,
    /// Sum of the own army's squad bonuses.
    pub squad: StatBonus,
    /// Sum of the opposing army's opponent bonuses.
    pub opponent: StatBonus,
    pub forbidden: &'a SpellFilter,
    pub library: &'a dyn LibraryOracle,
    pub rules: &'a BattleRules,
}

/// Sums the squad bonuses of every unit in an army.
pub fn sum_squad_bonus<'a>(stacks: impl IntoIterator<Item = &'a BattleStack>) -> StatBonus {
    stacks.into_iter().fold(StatBonus::default(), |acc, stack| {
        let bonus = stack.unit.abilities.squad_bonus;
        StatBonus {
            morale: acc.morale + bonus.morale,
            luck: acc.luck + bonus.luck,
            mana_cost: acc.mana_cost + bonus.mana_cost,
        }
    })
}

/// Sums the bonuses every unit in an army imposes on its opponent.
pub fn sum_opponent_bonus<'a>(stacks: impl IntoIterator<Item = &'a BattleStack>) -> StatBonus {
    stacks.into_iter().fold(StatBonus::default(), |acc, stack| {
        let bonus = stack.unit.abilities.opponent_bonus;
        StatBonus {
            morale: acc.morale + bonus.morale,
            luck: acc.luck + bonus.luck,
            mana_cost: acc.mana_cost + bonus.mana_cost,
        }
    })
}

// ============================================================================
// Battle Start
// ============================================================================

/// Builds the start snapshot, then runs one round calculation and fills
/// health and ammunition.
pub fn calculate_stack_on_start(
    stack: &mut BattleStack,
    ctx: &StartContext<'_>,
) -> Result<(), FormulaError> {
    let unit = stack.unit.clone();
    let primary = unit.primary;
    let abilities = &unit.abilities;
    let bonus = ctx.bonus;

    let mut start = StackStats {
        attack: primary.attack + bonus.attack,
        defense: primary.defense + bonus.defense,
        min_damage: primary.min_damage,
        max_damage: primary.max_damage,
        max_health: (primary.max_health + bonus.max_health).max(1),
        speed: (primary.speed + bonus.speed).max(0),
        shots: (primary.shots + bonus.shots).max(0),
        melee_attack: bonus.melee_attack,
        ranged_attack: bonus.ranged_attack,
        melee_damage: bonus.melee_damage,
        ranged_damage: bonus.ranged_damage,
        melee_defense: bonus.melee_defense,
        ranged_defense: bonus.ranged_defense,
        damage_reduction: bonus.damage_reduction,
        luck: bonus.luck + ctx.squad.luck + ctx.opponent.luck,
        morale: bonus.morale + ctx.squad.morale + ctx.opponent.morale,
        has_morale: unit.has_morale(),
        max_retaliations: abilities.max_retaliations,
        magic_opp_success_chance: abilities.magic_opp_success_chance,
        magic_reduce: abilities.magic_reduce,
        immunes: abilities.immunes.clone(),
        ..StackStats::default()
    };
    if !start.has_morale {
        start.morale = 0;
    }

    start.fixed_cast = abilities.fixed_cast.clone().filter(|cast| {
        ctx.library
            .spell(&cast.params.spell)
            .is_some_and(|spell| !ctx.forbidden.contains(&spell))
    });

    start.max_attacks_melee = 1;
    if unit.is_shooter() {
        start.max_attacks_ranged = 1;
    }
    if unit.traits.contains(crate::env::UnitTraits::DOUBLE_ATTACK) {
        if unit.is_shooter() {
            start.max_attacks_ranged = 2;
        } else {
            start.max_attacks_melee = 2;
        }
    }

    stack.estimated_on_start = start;
    stack.remaining_shots = stack.estimated_on_start.shots;
    calculate_stack_stats(stack, ctx.rules)?;

    stack.health = stack.current.max_health;
    stack.remaining_shots = stack.current.shots;
    stack.round = RoundState::default();
    Ok(())
}

// ============================================================================
// Round Calculation
// ============================================================================

/// Recomputes `current` from the start snapshot and the active effects.
///
/// Does nothing for dead stacks. Drops expired effects, keeps only the
/// latest effect of each spell and drops effects countered by a later one.
pub fn calculate_stack_stats(stack: &mut BattleStack, rules: &BattleRules) -> Result<(), FormulaError> {
    if stack.count <= 0 {
        return Ok(());
    }

    let mut cur = stack.estimated_on_start.clone();
    let unit = stack.unit.clone();

    cur.fixed_casts_left = cur
        .fixed_cast
        .as_ref()
        .map_or(0, |cast| cast.count.saturating_sub(stack.casts_done));
    cur.can_move = true;
    cur.can_attack_melee = true;
    cur.can_attack_ranged = unit.is_shooter() && stack.remaining_shots > 0;
    cur.can_cast = cur.fixed_casts_left > 0;
    cur.range_attack_blocked = false;

    prune_effects(&mut stack.effects);

    let guard: i32 = stack
        .effects
        .iter()
        .map(|effect| match effect {
            ActiveEffect::Guard { bonus } => *bonus,
            ActiveEffect::Spell(_) => 0,
        })
        .sum();
    cur.defense += guard;

    let mut stacks: BTreeMap<ModifiedStat, BonusStack> = BTreeMap::new();
    let mut locks = ActionLocks::empty();
    for effect in stack.effects.iter().filter_map(ActiveEffect::as_spell) {
        match effect.spell.qualify {
            SpellQualify::Good => cur.has_buff = true,
            SpellQualify::Bad => cur.has_debuff = true,
            SpellQualify::None => {}
        }
        locks |= effect.spell.locks;
        for modifier in &effect.spell.modifiers {
            let bindings = EffectBindings {
                spell_power: i64::from(effect.params.spell_power),
                skill_level: i64::from(effect.params.skill_level),
                hero_spec_level: effect.params.hero_spec_level.map(i64::from),
                unit_level: i64::from(unit.level / 10),
                value: stat_value(&cur, modifier.stat),
            };
            let value = evaluate(&modifier.value, &bindings)?;
            stacks
                .entry(modifier.stat)
                .or_default()
                .add(Bonus::new(modifier.kind, value));
        }
    }
    for (stat, bonuses) in &stacks {
        let value = bonuses.apply_unclamped(stat_value(&cur, *stat));
        set_stat_value(&mut cur, *stat, value);
    }

    if locks.contains(ActionLocks::MOVE) {
        cur.can_move = false;
    }
    if locks.contains(ActionLocks::MELEE) {
        cur.can_attack_melee = false;
    }
    if locks.contains(ActionLocks::RANGED) {
        cur.can_attack_ranged = false;
    }
    if locks.contains(ActionLocks::CAST) {
        cur.can_cast = false;
    }

    cur.can_attack_free_splash = cur.can_attack_ranged && unit.abilities.splash == SplashAttack::Ranged;
    cur.can_do_anything = cur.can_move || cur.can_attack_melee || cur.can_attack_ranged || cur.can_cast;

    cur.attack = cur.attack.clamp(0, rules.limits.max_unit_attack);
    cur.defense = cur.defense.clamp(0, rules.limits.max_unit_defense);
    cur.speed = cur.speed.max(0);
    cur.min_damage = cur.min_damage.max(0);
    cur.max_damage = cur.max_damage.max(cur.min_damage);

    cur.luck = cur.luck.max(unit.abilities.minimal_luck);
    cur.morale = cur.morale.max(unit.abilities.minimal_morale);
    if !cur.has_morale {
        cur.morale = 0;
    }
    cur.morale_chance = rules.morale.chance(cur.morale);
    cur.luck_chance = rules.luck.chance(cur.luck);

    stack.current = cur;
    Ok(())
}

/// Round calculation plus the adjacency check that blocks shooting.
pub fn recalc_stack(state: &mut BattleState, id: StackId, rules: &BattleRules) -> Result<(), FormulaError> {
    let blocked = state.has_adjacent_enemy(id);
    let Some(stack) = state.stack_mut(id) else {
        return Ok(());
    };
    calculate_stack_stats(stack, rules)?;
    if blocked
        && !stack
            .unit
            .abilities
            .disabled_penalties
            .contains(RangePenalties::BLOCKED)
    {
        stack.current.range_attack_blocked = true;
    }
    Ok(())
}

/// Drops expired spell effects, duplicates and countered effects.
fn prune_effects(effects: &mut Vec<ActiveEffect>) {
    effects.retain(|effect| match effect {
        ActiveEffect::Spell(spell) => spell.rounds_remaining > 0,
        ActiveEffect::Guard { .. } => true,
    });

    let mut used: Vec<(SpellId, Vec<SpellId>)> = Vec::new();
    let mut kept: Vec<ActiveEffect> = Vec::with_capacity(effects.len());
    for effect in effects.drain(..).rev() {
        let ActiveEffect::Spell(spell_effect) = &effect else {
            kept.push(effect);
            continue;
        };
        let spell = &spell_effect.spell;
        if used.iter().any(|(id, _)| *id == spell.id) {
            continue;
        }
        let countered = used
            .iter()
            .any(|(id, counters)| spell.counters(id) || counters.contains(&spell.id));
        if countered {
            continue;
        }
        used.push((spell.id.clone(), spell.counter_spells.clone()));
        kept.push(effect);
    }
    kept.reverse();
    *effects = kept;
}

fn ratio_percent(ratio: BonusRatio) -> i64 {
    (ratio * 100).round_down()
}

fn stat_value(stats: &StackStats, stat: ModifiedStat) -> i64 {
    match stat {
        ModifiedStat::Attack => i64::from(stats.attack),
        ModifiedStat::Defense => i64::from(stats.defense),
        ModifiedStat::MinDamage => i64::from(stats.min_damage),
        ModifiedStat::MaxDamage => i64::from(stats.max_damage),
        ModifiedStat::Speed => i64::from(stats.speed),
        ModifiedStat::Luck => i64::from(stats.luck),
        ModifiedStat::Morale => i64::from(stats.morale),
        ModifiedStat::MeleeDamage => ratio_percent(stats.melee_damage),
        ModifiedStat::RangedDamage => ratio_percent(stats.ranged_damage),
        ModifiedStat::MeleeDefense => ratio_percent(stats.melee_defense),
        ModifiedStat::RangedDefense => ratio_percent(stats.ranged_defense),
    }
}

fn set_stat_value(stats: &mut StackStats, stat: ModifiedStat, value: i64) {
    let int = i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX });
    let percent = BonusRatio::new(value, 100);
    match stat {
        ModifiedStat::Attack => stats.attack = int,
        ModifiedStat::Defense => stats.defense = int,
        ModifiedStat::MinDamage => stats.min_damage = int,
        ModifiedStat::MaxDamage => stats.max_damage = int,
        ModifiedStat::Speed => stats.speed = int,
        ModifiedStat::Luck => stats.luck = int,
        ModifiedStat::Morale => stats.morale = int,
        ModifiedStat::MeleeDamage => stats.melee_damage = percent,
        ModifiedStat::RangedDamage => stats.ranged_damage = percent,
        ModifiedStat::MeleeDefense => stats.melee_defense = percent,
        ModifiedStat::RangedDefense => stats.ranged_defense = percent,
    }
}

// ============================================================================
// Heroes
// ============================================================================

/// Army-level inputs of [`calculate_hero_on_start`].
pub struct HeroStartContext<'a> {
    pub opponent_hero: Option<&'a HeroSetup>,
    /// Mana-cost delta from the hero's own units.
    pub squad_mana_cost: i32,
    /// Mana-cost delta imposed by the opposing units.
    pub opponent_mana_cost: i32,
    pub forbidden: &'a SpellFilter,
    pub library: &'a dyn LibraryOracle,
}

/// Mana, reduced spell power and the castable spell list at battle start.
pub fn calculate_hero_on_start(hero: &mut BattleHero, ctx: &HeroStartContext<'_>) {
    hero.mana = hero.setup.mana;

    let mut spell_power = hero.setup.spell_power;
    if let Some(opponent) = ctx.opponent_hero {
        spell_power = i32::try_from(BonusRatio::calc_sub_decrease(
            i64::from(spell_power),
            opponent.sp_reduce_opp,
            1,
        ))
        .unwrap_or(1);
    }
    let opponent_cost = ctx.opponent_hero.map_or(0, |opponent| opponent.mana_cost_opp);

    let mut available_spells = Vec::new();
    for id in &hero.setup.spells {
        let Some(spell) = ctx.library.spell(id) else {
            continue;
        };
        if ctx.forbidden.contains(&spell) {
            continue;
        }
        let mut mana_cost = spell.mana_cost;
        if mana_cost != 0 {
            mana_cost = (mana_cost + ctx.squad_mana_cost + opponent_cost + ctx.opponent_mana_cost).max(0);
        }
        available_spells.push(HeroSpell { spell, mana_cost });
    }

    hero.estimated = HeroStats {
        spell_power,
        available_spells,
    };
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::env::{
        EndCondition, MagicSchool, MemoryLibrary, Spell, SpellCastParams, SpellType, StatModifier,
        UnitAbilities, UnitPrimaryParams, UnitTemplate, UnitTraits, UnitType,
    };
    use crate::formula::{Formula, Var};
    use crate::state::{Side, SpellEffect};
    use crate::stats::BonusKind;

    fn template() -> UnitTemplate {
        UnitTemplate::new(
            "swordsman",
            40,
            UnitPrimaryParams {
                attack: 10,
                defense: 12,
                min_damage: 6,
                max_damage: 9,
                max_health: 35,
                speed: 5,
                shots: 0,
            },
        )
    }

    fn start(stack: &mut BattleStack, bonus: &AdventureBonus) {
        let library = MemoryLibrary::new();
        let forbidden = SpellFilter::default();
        let rules = BattleRules::default();
        let ctx = StartContext {
            bonus,
            squad: StatBonus { morale: 1, ..StatBonus::default() },
            opponent: StatBonus::default(),
            forbidden: &forbidden,
            library: &library,
            rules: &rules,
        };
        calculate_stack_on_start(stack, &ctx).unwrap();
    }

    fn effect(spell: Spell, power: i32, rounds: i32) -> ActiveEffect {
        let params = SpellCastParams {
            spell_power: power,
            ..SpellCastParams::new(spell.id.clone())
        };
        ActiveEffect::Spell(SpellEffect {
            spell: Arc::new(spell),
            params,
            rounds_remaining: rounds,
        })
    }

    fn stone_skin() -> Spell {
        let mut spell = Spell::new("stone_skin", MagicSchool::Earth, SpellType::Temp, SpellQualify::Good);
        spell.modifiers.push(StatModifier {
            stat: ModifiedStat::Defense,
            kind: BonusKind::Flat,
            value: Formula::Constant(3),
        });
        spell
    }

    #[test]
    fn start_applies_adventure_deltas() {
        let mut stack = BattleStack::new(StackId(0), Side::Attacker, 0, Arc::new(template()), 10);
        let bonus = AdventureBonus {
            attack: 2,
            defense: 1,
            luck: 1,
            ..AdventureBonus::default()
        };
        start(&mut stack, &bonus);
        let cur = stack.current();
        assert_eq!(cur.attack, 12);
        assert_eq!(cur.defense, 13);
        assert_eq!(cur.morale, 1);
        assert_eq!(cur.luck_chance, BonusRatio::new(1, 24));
        assert_eq!(stack.health(), 35);
        assert!(cur.can_do_anything);
        assert!(!cur.can_attack_ranged);
    }

    #[test]
    fn non_living_units_never_have_morale() {
        let undead = template().with_abilities(UnitAbilities {
            unit_type: UnitType::NonLiving,
            non_living: crate::env::NonLivingType::Undead,
            ..UnitAbilities::default()
        });
        let mut stack = BattleStack::new(StackId(0), Side::Attacker, 0, Arc::new(undead), 10);
        start(&mut stack, &AdventureBonus { morale: 3, ..AdventureBonus::default() });
        assert_eq!(stack.current().morale, 0);
        assert_eq!(stack.current().morale_chance, BonusRatio::ZERO);
    }

    #[test]
    fn double_attack_goes_to_ranged_for_shooters() {
        let archer = template().with_traits(UnitTraits::RANGE_ATTACK | UnitTraits::DOUBLE_ATTACK);
        let mut stack = BattleStack::new(StackId(0), Side::Attacker, 0, Arc::new(archer), 10);
        start(&mut stack, &AdventureBonus { shots: 12, ..AdventureBonus::default() });
        assert_eq!(stack.current().max_attacks_ranged, 2);
        assert_eq!(stack.current().max_attacks_melee, 1);
        assert_eq!(stack.remaining_shots(), 12);
        assert!(stack.current().can_attack_ranged);
    }

    #[test]
    fn effects_and_guard_modify_defense() {
        let mut stack = BattleStack::new(StackId(0), Side::Attacker, 0, Arc::new(template()), 10);
        start(&mut stack, &AdventureBonus::default());
        stack.effects.push(effect(stone_skin(), 2, 2));
        stack.effects.push(ActiveEffect::Guard { bonus: 2 });
        calculate_stack_stats(&mut stack, &BattleRules::default()).unwrap();
        assert_eq!(stack.current().defense, 12 + 2 + 3);
        assert!(stack.current().has_buff);
    }

    #[test]
    fn expired_and_duplicate_effects_are_dropped() {
        let mut stack = BattleStack::new(StackId(0), Side::Attacker, 0, Arc::new(template()), 10);
        start(&mut stack, &AdventureBonus::default());
        stack.effects.push(effect(stone_skin(), 1, 0));
        stack.effects.push(effect(stone_skin(), 1, 3));
        stack.effects.push(effect(stone_skin(), 5, 1));
        calculate_stack_stats(&mut stack, &BattleRules::default()).unwrap();
        assert_eq!(stack.effects().len(), 1);
        let kept = stack.effects()[0].as_spell().unwrap();
        assert_eq!(kept.params.spell_power, 5);
    }

    #[test]
    fn later_counter_spell_removes_earlier_effect() {
        let mut stack = BattleStack::new(StackId(0), Side::Attacker, 0, Arc::new(template()), 10);
        start(&mut stack, &AdventureBonus::default());
        let mut weakness = Spell::new("weakness", MagicSchool::Water, SpellType::Temp, SpellQualify::Bad);
        weakness.counter_spells.push(SpellId::new("stone_skin"));
        weakness.end_condition = EndCondition::Time;
        stack.effects.push(effect(stone_skin(), 3, 3));
        stack.effects.push(effect(weakness, 3, 3));
        calculate_stack_stats(&mut stack, &BattleRules::default()).unwrap();
        assert_eq!(stack.effects().len(), 1);
        assert_eq!(stack.current().defense, 12);
        assert!(stack.current().has_debuff);
        assert!(!stack.current().has_buff);
    }

    #[test]
    fn modifier_formula_reads_current_value() {
        let mut stack = BattleStack::new(StackId(0), Side::Attacker, 0, Arc::new(template()), 10);
        start(&mut stack, &AdventureBonus::default());
        let mut haste = Spell::new("haste", MagicSchool::Air, SpellType::Temp, SpellQualify::Good);
        haste.modifiers.push(StatModifier {
            stat: ModifiedStat::Speed,
            kind: BonusKind::Flat,
            value: Formula::Div(Box::new(Formula::var(Var::Value)), Box::new(Formula::Constant(2))),
        });
        stack.effects.push(effect(haste, 1, 1));
        calculate_stack_stats(&mut stack, &BattleRules::default()).unwrap();
        assert_eq!(stack.current().speed, 7);
    }

    #[test]
    fn hero_spell_power_and_costs() {
        let mut library = MemoryLibrary::new();
        let mut bolt = Spell::new("fire_bolt", MagicSchool::Fire, SpellType::Offensive, SpellQualify::Bad);
        bolt.mana_cost = 10;
        library.insert_spell(bolt);
        library.insert_spell(Spell::new("free", MagicSchool::Air, SpellType::Temp, SpellQualify::Good));
        let mut forbidden_spell = Spell::new("armageddon", MagicSchool::Fire, SpellType::Offensive, SpellQualify::Bad);
        forbidden_spell.level = 4;
        library.insert_spell(forbidden_spell);

        let mut setup = HeroSetup::new("solmyr");
        setup.spell_power = 10;
        setup.mana = 30;
        setup.spells = vec![
            SpellId::new("fire_bolt"),
            SpellId::new("free"),
            SpellId::new("armageddon"),
        ];
        let mut opponent = HeroSetup::new("crag");
        opponent.sp_reduce_opp = BonusRatio::new(1, 4);
        opponent.mana_cost_opp = 2;
        let forbidden = SpellFilter {
            levels: vec![4],
            ..SpellFilter::default()
        };

        let mut hero = BattleHero::new(Side::Attacker, setup);
        calculate_hero_on_start(
            &mut hero,
            &HeroStartContext {
                opponent_hero: Some(&opponent),
                squad_mana_cost: -1,
                opponent_mana_cost: 0,
                forbidden: &forbidden,
                library: &library,
            },
        );
        assert_eq!(hero.estimated().spell_power, 7);
        assert_eq!(hero.mana(), 30);
        assert_eq!(hero.mana_cost(&SpellId::new("fire_bolt")), Some(11));
        assert_eq!(hero.mana_cost(&SpellId::new("free")), Some(0));
        assert_eq!(hero.mana_cost(&SpellId::new("armageddon")), None);
    }
}
