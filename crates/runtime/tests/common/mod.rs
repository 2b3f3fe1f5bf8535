//! Shared fixtures for battle-runtime integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use battle_core::{
    ArmySetup, BattleConfig, BattleEngine, BattleRules, BattleSetup, BattleView, MemoryLibrary,
    StackId, StackSetup, UnitPrimaryParams, UnitTemplate, UnitTraits,
};
use battle_runtime::OracleManager;

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

/// Units used across the runtime tests. Unit value equals max health.
pub fn library() -> MemoryLibrary {
    let mut archer = primary(5, 5, (2, 3), 10, 6);
    archer.shots = 12;

    MemoryLibrary::new()
        .with_unit(UnitTemplate::new("footman", 10, primary(5, 5, (2, 3), 10, 20)))
        .with_unit(UnitTemplate::new("pikeman", 10, primary(5, 5, (1, 1), 10, 1)))
        .with_unit(UnitTemplate::new("guardian", 20, primary(5, 20, (1, 1), 30, 10)))
        .with_unit(UnitTemplate::new("archer", 20, archer).with_traits(UnitTraits::RANGE_ATTACK))
}

pub fn oracle() -> OracleManager {
    OracleManager::new(Arc::new(library()), BattleRules::default(), BattleConfig::default())
}

pub fn army(units: &[(&str, i32)]) -> ArmySetup {
    ArmySetup::new(units.iter().map(|(unit, count)| StackSetup::new(*unit, *count)))
}

/// A started engine for `setup`.
pub fn started(setup: &BattleSetup) -> BattleEngine {
    let mut engine = oracle().build_engine(setup).expect("fixture setup resolves");
    engine.start().expect("battle starts");
    engine
}

pub fn stack_of(engine: &BattleEngine, unit: &str) -> StackId {
    engine
        .stacks()
        .iter()
        .find(|stack| stack.unit().id.as_str() == unit)
        .map(|stack| stack.id())
        .expect("unit present in the battle")
}

pub fn active_id(engine: &BattleEngine) -> StackId {
    engine.active_stack().expect("a stack is active").id()
}
