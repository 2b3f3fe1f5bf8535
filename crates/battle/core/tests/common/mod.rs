//! Shared fixtures for battle-core integration tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use battle_core::{
    ActionLocks, ArmySetup, BattleConfig, BattleEngine, BattleEvent, BattleRules, BattleSetup,
    BattleView, BonusKind, BonusRatio, EndCondition, Formula, MagicSchool, MemoryLibrary,
    ModifiedStat, Spell, SpellQualify, SpellRange, SpellType, SplashAttack, StackId, StackSetup,
    StatModifier, UnitAbilities, UnitPrimaryParams, UnitTemplate, UnitTraits,
};

pub const CHAIN_LIGHTNING: &str = "chain_lightning";
/// Good, +2 speed.
pub const HASTE: &str = "haste";
/// Bad, -2 attack.
pub const WEAKNESS: &str = "weakness";
/// Bad, -2 defense until the target is hit.
pub const FRAILTY: &str = "frailty";
/// Hits everyone and takes every action away.
pub const STASIS: &str = "stasis";

fn temp_spell(id: &str, qualify: SpellQualify, stat: ModifiedStat, delta: i64) -> Spell {
    let mut spell = Spell::new(id, MagicSchool::Earth, SpellType::Temp, qualify);
    spell.modifiers = vec![StatModifier {
        stat,
        kind: BonusKind::Flat,
        value: Formula::Constant(delta),
    }];
    spell
}

fn primary(attack: i32, defense: i32, damage: (i32, i32), max_health: i32, speed: i32) -> UnitPrimaryParams {
    UnitPrimaryParams {
        attack,
        defense,
        min_damage: damage.0,
        max_damage: damage.1,
        max_health,
        speed,
        shots: 0,
    }
}

/// Units and spells used across the integration tests.
pub fn library() -> MemoryLibrary {
    let mut archer = primary(5, 5, (2, 3), 10, 6);
    archer.shots = 12;
    let mut lich = primary(5, 5, (2, 3), 10, 6);
    lich.shots = 12;

    let mut chain = Spell::new(
        CHAIN_LIGHTNING,
        MagicSchool::Air,
        SpellType::Offensive,
        SpellQualify::Bad,
    );
    chain.mana_cost = 5;
    chain.range_by_level = vec![SpellRange::Chain4];
    chain.damage = Some(Formula::Constant(10));

    let mut frailty = temp_spell(FRAILTY, SpellQualify::Bad, ModifiedStat::Defense, -2);
    frailty.end_condition = EndCondition::GetHit;
    let mut stasis = Spell::new(STASIS, MagicSchool::Earth, SpellType::Temp, SpellQualify::None);
    stasis.locks = ActionLocks::all();

    let mut wild_chain = chain.clone();
    wild_chain.id = battle_core::SpellId::new("wild_chain");
    wild_chain.qualify = SpellQualify::None;
    wild_chain.indistinctive = true;

    MemoryLibrary::new()
        .with_unit(UnitTemplate::new("footman", 10, primary(5, 5, (2, 3), 10, 20)))
        .with_unit(UnitTemplate::new("pikeman", 10, primary(5, 5, (1, 1), 10, 1)))
        .with_unit(UnitTemplate::new("guardian", 20, primary(5, 20, (1, 1), 30, 10)))
        .with_unit(UnitTemplate::new("archer", 20, archer).with_traits(UnitTraits::RANGE_ATTACK))
        .with_unit(
            UnitTemplate::new("lich", 50, lich)
                .with_traits(UnitTraits::RANGE_ATTACK)
                .with_abilities(UnitAbilities {
                    splash: SplashAttack::Ranged,
                    ..UnitAbilities::default()
                }),
        )
        .with_unit(
            UnitTemplate::new("troll", 30, primary(5, 5, (1, 1), 40, 1)).with_abilities(UnitAbilities {
                regenerate: true,
                ..UnitAbilities::default()
            }),
        )
        .with_unit(
            UnitTemplate::new("golem", 30, primary(5, 5, (1, 1), 10, 1)).with_abilities(UnitAbilities {
                magic_opp_success_chance: BonusRatio::ZERO,
                ..UnitAbilities::default()
            }),
        )
        .with_spell(chain)
        .with_spell(wild_chain)
        .with_spell(temp_spell(HASTE, SpellQualify::Good, ModifiedStat::Speed, 2))
        .with_spell(temp_spell(WEAKNESS, SpellQualify::Bad, ModifiedStat::Attack, -2))
        .with_spell(frailty)
        .with_spell(stasis)
}

pub fn army(units: &[(&str, i32)]) -> ArmySetup {
    ArmySetup::new(units.iter().map(|(unit, count)| StackSetup::new(*unit, *count)))
}

pub fn engine(setup: &BattleSetup) -> BattleEngine {
    BattleEngine::new(setup, &library(), BattleRules::default(), BattleConfig::default())
        .expect("fixture setup resolves")
}

/// Builds an engine and records every event it emits from now on.
pub fn recorded(setup: &BattleSetup) -> (BattleEngine, Rc<RefCell<Vec<BattleEvent>>>) {
    let mut engine = engine(setup);
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    engine.add_observer(move |event: &BattleEvent| sink.borrow_mut().push(event.clone()));
    (engine, log)
}

pub fn active_id(engine: &BattleEngine) -> StackId {
    engine.active_stack().expect("a stack is active").id()
}

pub fn stack_of(engine: &BattleEngine, unit: &str) -> StackId {
    engine
        .stacks()
        .iter()
        .find(|stack| stack.unit().id.as_str() == unit)
        .map(|stack| stack.id())
        .expect("unit present in the battle")
}

/// Move and attack parameters for the active stack striking `target` in melee.
pub fn melee_on(
    engine: &BattleEngine,
    target: battle_core::BattlePosition,
    direction: battle_core::AttackDirection,
) -> (battle_core::PlanMoveParams, battle_core::PlanAttackParams) {
    let from = *engine.active_stack().expect("a stack is active").position();
    let to = from.suggest_for_attack(target, direction);
    (
        battle_core::PlanMoveParams::new(from, to),
        battle_core::PlanAttackParams::melee(target, direction),
    )
}

pub fn position_of(engine: &BattleEngine, id: StackId) -> battle_core::BattlePosition {
    engine.stack(id).expect("stack exists").position().main()
}
