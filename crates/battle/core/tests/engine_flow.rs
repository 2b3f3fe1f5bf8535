//! Turn flow, control errors and determinism of the battle engine.

mod common;

use battle_core::{
    AdventureBonus, AttackDirection, BattleAction, BattleConfig, BattleControl, BattleEngine,
    BattleError, BattleEvent, BattlePosition, BattleResult, BattleRules, BattleSetup, BattleStack,
    BattleView, CastParams, Caster, HeroSetup, PlanAttackParams, PlanMoveParams, ScriptedRng, Side,
    SpellCastParams, SpellId, StackEffect,
};
use common::{
    FRAILTY, HASTE, STASIS, WEAKNESS, active_id, army, engine, library, melee_on, position_of,
    recorded, stack_of,
};

// ============================================================================
// Battle Start
// ============================================================================

#[test]
fn empty_army_finishes_without_a_round() {
    let setup = BattleSetup::new(army(&[("footman", 5)]), army(&[]));
    let (mut engine, log) = recorded(&setup);

    engine.start().unwrap();

    assert!(engine.is_finished());
    assert_eq!(engine.result(), Some(BattleResult::AttackerWon));
    assert_eq!(engine.round(), 0);
    assert!(!engine.control_available());
    assert!(
        !log.borrow()
            .iter()
            .any(|event| matches!(event, BattleEvent::RoundStarted { .. }))
    );
    assert!(
        log.borrow()
            .contains(&BattleEvent::BattleFinished { result: BattleResult::AttackerWon })
    );
}

#[test]
fn start_opens_round_one_for_the_fastest_stack() {
    let setup = BattleSetup::new(army(&[("pikeman", 5)]), army(&[("footman", 5)]));
    let (mut engine, log) = recorded(&setup);

    engine.start().unwrap();

    assert_eq!(engine.round(), 1);
    assert!(engine.control_available());
    assert_eq!(active_id(&engine), stack_of(&engine, "footman"));
    assert_eq!(engine.current_side(), Some(Side::Defender));
    assert_eq!(
        log.borrow().last(),
        Some(&BattleEvent::ControlAvailabilityChanged { available: true })
    );

    let events = log.borrow().len();
    engine.start().unwrap();
    assert_eq!(log.borrow().len(), events, "second start is a no-op");
}

#[test]
fn attacker_moves_first_on_equal_speed() {
    let setup = BattleSetup::new(army(&[("pikeman", 5)]), army(&[("pikeman", 5)]));
    let mut engine = engine(&setup);
    engine.start().unwrap();

    assert_eq!(engine.current_side(), Some(Side::Attacker));
    assert_eq!(engine.state().queue().len(), 2);
}

// ============================================================================
// Wait and Guard
// ============================================================================

#[test]
fn waited_stack_acts_last_and_cannot_wait_twice() {
    let setup = BattleSetup::new(army(&[("footman", 5)]), army(&[("pikeman", 5)]));
    let mut engine = engine(&setup);
    engine.start().unwrap();
    let footman = stack_of(&engine, "footman");
    let pikeman = stack_of(&engine, "pikeman");

    engine.do_wait().unwrap();
    assert_eq!(active_id(&engine), pikeman);

    engine.do_guard().unwrap();
    assert_eq!(active_id(&engine), footman);
    assert_eq!(engine.round(), 1);

    let root = engine.state_root();
    let err = engine.do_wait().unwrap_err();
    assert!(matches!(err, BattleError::AlreadyWaited { .. }));
    assert_eq!(engine.state_root(), root);
    assert_eq!(active_id(&engine), footman);
}

#[test]
fn guard_adds_a_fifth_of_defense_until_next_round() {
    let setup = BattleSetup::new(army(&[("guardian", 3)]), army(&[("pikeman", 5)]));
    let (mut engine, log) = recorded(&setup);
    engine.start().unwrap();
    let guardian = stack_of(&engine, "guardian");
    assert_eq!(active_id(&engine), guardian);

    engine.do_guard().unwrap();
    assert_eq!(engine.stack(guardian).unwrap().current().defense, 24);
    assert!(log.borrow().contains(&BattleEvent::BeforeGuard {
        stack: guardian,
        bonus: 4,
    }));

    // The pikeman's defense of 5 yields the minimum bonus.
    let pikeman = active_id(&engine);
    engine.do_guard().unwrap();
    assert!(log.borrow().contains(&BattleEvent::BeforeGuard {
        stack: pikeman,
        bonus: 1,
    }));

    assert_eq!(engine.round(), 2);
    assert_eq!(engine.stack(guardian).unwrap().current().defense, 20);
}

#[test]
fn apply_dispatches_recorded_actions() {
    let setup = BattleSetup::new(army(&[("footman", 5)]), army(&[("pikeman", 5)]));
    let mut engine = engine(&setup);
    engine.start().unwrap();
    let footman = active_id(&engine);

    engine.apply(&BattleAction::Wait).unwrap();

    assert!(engine.stack(footman).unwrap().round_state().waited);
}

// ============================================================================
// Activation Effects
// ============================================================================

fn morale(value: i32) -> AdventureBonus {
    AdventureBonus {
        morale: value,
        ..AdventureBonus::default()
    }
}

fn effect_count(log: &[BattleEvent], id: battle_core::StackId, effect: StackEffect) -> usize {
    log.iter()
        .filter(|event| **event == BattleEvent::StackUnderEffect { stack: id, effect })
        .count()
}

fn spells_on(stack: &BattleStack) -> Vec<String> {
    stack
        .effects()
        .iter()
        .filter_map(|effect| effect.as_spell())
        .map(|effect| effect.spell.id.to_string())
        .collect()
}

#[test]
fn bad_morale_skips_the_turn() {
    let setup = BattleSetup::new(
        army(&[("footman", 5)]).with_bonus(morale(-3)),
        army(&[("pikeman", 5)]),
    );
    let (engine, log) = recorded(&setup);
    let mut engine = engine.with_rng(ScriptedRng::new(vec![0]));
    let footman = stack_of(&engine, "footman");
    let pikeman = stack_of(&engine, "pikeman");

    engine.start().unwrap();

    assert_eq!(effect_count(&log.borrow(), footman, StackEffect::BadMorale), 1);
    let state = engine.stack(footman).unwrap().round_state();
    assert!(state.finished_turn);
    assert!(state.had_low_morale);
    assert_eq!(active_id(&engine), pikeman);
    assert!(!engine.state().queue().contains(&footman));
}

#[test]
fn good_morale_grants_one_extra_turn_per_round() {
    let setup = BattleSetup::new(
        army(&[("footman", 5)]).with_bonus(morale(3)),
        army(&[("pikeman", 5)]),
    );
    let (engine, log) = recorded(&setup);
    let mut engine = engine.with_rng(ScriptedRng::new(vec![0]));
    engine.start().unwrap();
    let footman = active_id(&engine);

    let from = *engine.stack(footman).unwrap().position();
    engine
        .do_move_attack(
            PlanMoveParams::new(from, from.moved_to(BattlePosition::new(4, 5))),
            PlanAttackParams::none(),
        )
        .unwrap();
    assert_eq!(effect_count(&log.borrow(), footman, StackEffect::GoodMorale), 1);
    assert_eq!(active_id(&engine), footman);
    assert!(engine.stack(footman).unwrap().round_state().had_high_morale);

    let from = *engine.stack(footman).unwrap().position();
    engine
        .do_move_attack(
            PlanMoveParams::new(from, from.moved_to(BattlePosition::new(6, 5))),
            PlanAttackParams::none(),
        )
        .unwrap();
    assert_eq!(effect_count(&log.borrow(), footman, StackEffect::GoodMorale), 1);
    assert_eq!(active_id(&engine), stack_of(&engine, "pikeman"));
    assert_eq!(engine.round(), 1);
}

#[test]
fn regeneration_heals_the_top_unit_on_activation() {
    let setup = BattleSetup::new(army(&[("footman", 10)]), army(&[("troll", 5)]));
    let (engine, log) = recorded(&setup);
    let mut engine = engine.with_rng(ScriptedRng::new(vec![1]));
    engine.start().unwrap();
    let troll = stack_of(&engine, "troll");

    let (movement, attack) = melee_on(&engine, position_of(&engine, troll), AttackDirection::Right);
    engine.do_move_attack(movement, attack).unwrap();

    let events = log.borrow();
    let hit = events
        .iter()
        .find_map(|event| match event {
            BattleEvent::BeforeAttackMelee {
                affected,
                is_retaliation: false,
            } => affected.main.as_ref().map(|hit| hit.damage.loss),
            _ => None,
        })
        .expect("the footman struck");
    assert!(hit.damage_total > 0);
    assert!(hit.remain_top_health < 40);

    assert_eq!(active_id(&engine), troll);
    assert_eq!(effect_count(&events, troll, StackEffect::Regenerate), 1);
    let troll_stack = engine.stack(troll).unwrap();
    assert_eq!(troll_stack.health(), 40);
    assert_eq!(troll_stack.count(), hit.remain_count);
}

// ============================================================================
// Spell Effects
// ============================================================================

fn caster(name: &str, spells: &[&str]) -> HeroSetup {
    let mut hero = HeroSetup::new(name);
    hero.has_spellbook = true;
    hero.mana = 20;
    hero.spells = spells.iter().map(|spell| SpellId::new(*spell)).collect();
    hero
}

fn cast_before_start(hero: &mut HeroSetup, spell: &str, spell_power: i32) {
    hero.casts_before_start.push(SpellCastParams {
        spell_power,
        ..SpellCastParams::new(SpellId::new(spell))
    });
}

fn pre_battle_casts(log: &[BattleEvent], side: Side) -> Vec<String> {
    log.iter()
        .filter_map(|event| match event {
            BattleEvent::Cast(magic) if magic.caster == Caster::BeforeStart(side) => Some(magic.spell.to_string()),
            _ => None,
        })
        .collect()
}

#[test]
fn pre_battle_casts_land_on_each_side_first_turn_and_expire() {
    let mut attacker_hero = HeroSetup::new("Warlock");
    cast_before_start(&mut attacker_hero, HASTE, 2);
    cast_before_start(&mut attacker_hero, WEAKNESS, 2);
    let mut defender_hero = HeroSetup::new("Warden");
    cast_before_start(&mut defender_hero, HASTE, 2);

    let setup = BattleSetup::new(
        army(&[("footman", 5)]).with_hero(attacker_hero),
        army(&[("pikeman", 5)]).with_hero(defender_hero),
    );
    let (mut engine, log) = recorded(&setup);
    engine.start().unwrap();
    let footman = stack_of(&engine, "footman");
    let pikeman = stack_of(&engine, "pikeman");

    // Attacker's first turn: haste on its own stack, weakness on the enemy.
    assert_eq!(pre_battle_casts(&log.borrow(), Side::Attacker), vec![HASTE, WEAKNESS]);
    assert!(pre_battle_casts(&log.borrow(), Side::Defender).is_empty());
    assert_eq!(engine.stack(footman).unwrap().current().speed, 22);
    assert_eq!(engine.stack(footman).unwrap().current().attack, 5);
    assert_eq!(engine.stack(pikeman).unwrap().current().attack, 3);
    assert_eq!(engine.stack(pikeman).unwrap().current().speed, 1);

    engine.do_guard().unwrap();
    assert_eq!(active_id(&engine), pikeman);
    assert_eq!(pre_battle_casts(&log.borrow(), Side::Defender), vec![HASTE]);
    assert_eq!(engine.stack(pikeman).unwrap().current().speed, 3);
    assert_eq!(pre_battle_casts(&log.borrow(), Side::Attacker).len(), 2, "cast once per battle");

    engine.do_guard().unwrap();
    assert_eq!(engine.round(), 2);
    assert_eq!(spells_on(engine.stack(footman).unwrap()), vec![HASTE]);
    assert_eq!(spells_on(engine.stack(pikeman).unwrap()), vec![WEAKNESS, HASTE]);

    while engine.round() < 3 {
        engine.do_guard().unwrap();
    }
    assert!(spells_on(engine.stack(footman).unwrap()).is_empty());
    assert!(spells_on(engine.stack(pikeman).unwrap()).is_empty());
    assert_eq!(engine.stack(footman).unwrap().current().speed, 20);
    assert_eq!(engine.stack(pikeman).unwrap().current().attack, 5);
    assert_eq!(engine.stack(pikeman).unwrap().current().speed, 1);
}

#[test]
fn resistant_stack_shrugs_off_a_timed_spell() {
    let setup = BattleSetup::new(
        army(&[("footman", 5)]).with_hero(caster("Mage", &[WEAKNESS])),
        army(&[("golem", 5)]),
    );
    let (engine, log) = recorded(&setup);
    let mut engine = engine.with_rng(ScriptedRng::new(vec![50]));
    engine.start().unwrap();
    let footman = active_id(&engine);
    let golem = stack_of(&engine, "golem");

    engine
        .do_cast(CastParams::hero(SpellId::new(WEAKNESS), position_of(&engine, golem)))
        .unwrap();

    assert_eq!(effect_count(&log.borrow(), golem, StackEffect::Resist), 1);
    assert!(!log.borrow().iter().any(|event| matches!(event, BattleEvent::Cast(_))));
    assert!(spells_on(engine.stack(golem).unwrap()).is_empty());
    assert_eq!(engine.stack(golem).unwrap().current().attack, 5);
    assert!(engine.hero(Side::Attacker).unwrap().cast_this_round());
    assert_eq!(active_id(&engine), footman, "a hero cast keeps the turn");
}

#[test]
fn damage_ends_spells_that_last_until_hit() {
    let setup = BattleSetup::new(
        army(&[("footman", 10)]).with_hero(caster("Mage", &[FRAILTY])),
        army(&[("pikeman", 20)]),
    );
    let engine = engine(&setup);
    let mut engine = engine.with_rng(ScriptedRng::new(vec![1]));
    engine.start().unwrap();
    let pikeman = stack_of(&engine, "pikeman");
    let target = position_of(&engine, pikeman);

    engine.do_cast(CastParams::hero(SpellId::new(FRAILTY), target)).unwrap();
    assert_eq!(spells_on(engine.stack(pikeman).unwrap()), vec![FRAILTY]);
    assert_eq!(engine.stack(pikeman).unwrap().current().defense, 3);

    let (movement, attack) = melee_on(&engine, target, AttackDirection::Right);
    engine.do_move_attack(movement, attack).unwrap();

    let pikeman_stack = engine.stack(pikeman).unwrap();
    assert!(pikeman_stack.is_alive());
    assert!(spells_on(pikeman_stack).is_empty());
    assert_eq!(pikeman_stack.current().defense, 5);
}

// ============================================================================
// Round Bookkeeping
// ============================================================================

#[test]
fn idle_rounds_end_in_a_tie() {
    let mut hero = HeroSetup::new("Warlock");
    cast_before_start(&mut hero, STASIS, 100);
    let setup = BattleSetup::new(army(&[("footman", 5)]).with_hero(hero), army(&[("pikeman", 5)]));
    let config = BattleConfig {
        max_empty_rounds: 3,
        ..BattleConfig::default()
    };
    let mut engine = BattleEngine::new(&setup, &library(), BattleRules::default(), config).unwrap();
    engine.start().unwrap();
    let footman = active_id(&engine);
    assert!(!engine.stack(footman).unwrap().current().can_do_anything);

    engine.do_guard().unwrap();

    assert_eq!(engine.result(), Some(BattleResult::Tie));
    assert_eq!(engine.round(), 4);
    assert!(engine.state().queue().is_empty());
    assert_eq!(engine.do_guard(), Err(BattleError::BattleFinished));
}

#[test]
fn dead_stack_never_rejoins_the_queue() {
    let setup = BattleSetup::new(
        army(&[("footman", 10)]),
        army(&[("pikeman", 1), ("pikeman", 10)]),
    );
    let (engine, log) = recorded(&setup);
    let mut engine = engine.with_rng(ScriptedRng::new(vec![1]));
    engine.start().unwrap();
    let lone = engine
        .stacks()
        .iter()
        .find(|stack| stack.count() == 1)
        .map(|stack| stack.id())
        .unwrap();

    let (movement, attack) = melee_on(&engine, position_of(&engine, lone), AttackDirection::Right);
    engine.do_move_attack(movement, attack).unwrap();
    assert!(!engine.stack(lone).unwrap().is_alive());
    assert_eq!(engine.stack(lone).unwrap().count(), 0);

    let events_at_death = log.borrow().len();
    while engine.round() < 4 && !engine.is_finished() {
        assert!(!engine.state().queue().contains(&lone));
        assert_ne!(active_id(&engine), lone);
        engine.do_guard().unwrap();
    }
    assert_eq!(engine.round(), 4);
    assert!(!engine.state().queue().contains(&lone));
    assert!(
        !log.borrow()[events_at_death..]
            .iter()
            .any(|event| matches!(event, BattleEvent::BeforeGuard { stack, .. } if *stack == lone))
    );
}

// ============================================================================
// Plan Validation
// ============================================================================

#[test]
fn rejected_move_leaves_the_battle_untouched() {
    let setup = BattleSetup::new(army(&[("footman", 5)]), army(&[("pikeman", 5)]));
    let (mut engine, log) = recorded(&setup);
    engine.start().unwrap();
    let footman = active_id(&engine);
    let pikeman_cell = position_of(&engine, stack_of(&engine, "pikeman"));
    let from = *engine.stack(footman).unwrap().position();
    let root = engine.state_root();
    let events = log.borrow().len();

    let staying = engine.do_move_attack(PlanMoveParams::stay(from), PlanAttackParams::none());
    assert!(matches!(staying, Err(BattleError::InvalidPlan { .. })));

    let onto_enemy = engine.do_move_attack(
        PlanMoveParams::new(from, from.moved_to(pikeman_cell)),
        PlanAttackParams::none(),
    );
    assert!(matches!(onto_enemy, Err(BattleError::InvalidPlan { .. })));

    assert_eq!(engine.state_root(), root);
    assert_eq!(log.borrow().len(), events);
}

#[test]
fn commands_after_the_end_are_refused() {
    let setup = BattleSetup::new(army(&[]), army(&[("pikeman", 5)]));
    let mut engine = engine(&setup);
    engine.start().unwrap();

    assert_eq!(engine.result(), Some(BattleResult::DefenderWon));
    assert_eq!(engine.do_guard(), Err(BattleError::BattleFinished));
}

#[test]
fn plan_reports_walk_path_within_speed() {
    let setup = BattleSetup::new(army(&[("footman", 5)]), army(&[("pikeman", 5)]));
    let mut engine = engine(&setup);
    engine.start().unwrap();
    let from = *engine.active_stack().unwrap().position();

    let plan = engine.find_plan_move(
        &PlanMoveParams::new(from, from.moved_to(BattlePosition::new(4, 5))),
        &PlanAttackParams::none(),
    );

    assert!(plan.is_valid());
    assert_eq!(plan.walk_path.last(), Some(&BattlePosition::new(4, 5)));
    assert!(!plan.walk_path.contains(&from.main()));
    assert!(engine.reachable(active_id(&engine)).contains(&BattlePosition::new(4, 5)));
}

// ============================================================================
// Determinism
// ============================================================================

fn scripted_battle(seed: u64) -> (Vec<BattleEvent>, [u8; 32]) {
    let setup = BattleSetup::new(army(&[("footman", 12)]), army(&[("pikeman", 30)])).with_seed(seed);
    let (mut engine, log) = recorded(&setup);
    engine.start().unwrap();

    let target = position_of(&engine, stack_of(&engine, "pikeman"));
    let (movement, attack) = melee_on(&engine, target, AttackDirection::Right);
    engine.do_move_attack(movement, attack).unwrap();

    while engine.round() < 4 && !engine.is_finished() {
        engine.do_guard().unwrap();
    }
    let events = log.borrow().clone();
    (events, engine.state_root())
}

#[test]
fn same_seed_same_battle() {
    let (events_a, root_a) = scripted_battle(42);
    let (events_b, root_b) = scripted_battle(42);

    assert_eq!(events_a, events_b);
    assert_eq!(root_a, root_b);
}

#[cfg(feature = "serde")]
#[test]
fn same_seed_same_encoded_events() {
    let (events_a, _) = scripted_battle(7);
    let (events_b, _) = scripted_battle(7);

    assert_eq!(
        bincode::serialize(&events_a).unwrap(),
        bincode::serialize(&events_b).unwrap()
    );
}

#[test]
fn state_root_tracks_changes() {
    let setup = BattleSetup::new(army(&[("footman", 5)]), army(&[("pikeman", 5)]));
    let mut engine = engine(&setup).with_rng(ScriptedRng::new(vec![0]));
    let before = engine.state_root();
    engine.start().unwrap();
    let started = engine.state_root();
    assert_ne!(before, started);

    engine.do_wait().unwrap();
    assert_ne!(engine.state_root(), started);
    assert_eq!(hex::encode(engine.state_root()).len(), 64);
}
