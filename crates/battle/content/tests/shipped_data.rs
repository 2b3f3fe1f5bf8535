//! The data directory shipped with the crate loads and runs.

use std::path::PathBuf;

use battle_content::ContentFactory;
use battle_core::{BattleEngine, BattleView, LibraryOracle, Side, UnitId};

fn factory() -> ContentFactory {
    ContentFactory::new(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data"))
}

#[test]
fn library_resolves_every_reference() {
    let library = factory().load_library().unwrap();

    assert!(library.unit_count() >= 10);
    assert!(library.spell_count() >= 8);
    let dragon = library.unit(&UnitId::new("red_dragon")).unwrap();
    assert!(dragon.is_large());
}

#[test]
fn scenarios_build_engines() {
    let factory = factory();
    let library = factory.load_library().unwrap();
    let rules = factory.load_rules().unwrap();
    let config = factory.load_config().unwrap();

    for name in ["skirmish", "siege"] {
        let setup = factory.load_scenario(name, &library).unwrap();
        let mut engine = BattleEngine::new(&setup, &library, rules.clone(), config.clone()).unwrap();
        engine.start().unwrap();

        assert_eq!(engine.round(), 1, "{name}");
        assert!(engine.active_stack().is_some(), "{name}");
    }
}

#[test]
fn siege_heroes_are_loaded() {
    let factory = factory();
    let library = factory.load_library().unwrap();
    let setup = factory.load_scenario("siege", &library).unwrap();

    let hero = setup.attacker.hero.as_ref().unwrap();
    assert_eq!(hero.name, "Adela");
    assert!(hero.has_spellbook);
    assert_eq!(setup.preset.obstacles.len(), 4);
    assert!(setup.army(Side::Defender).compact_formation);
}

#[test]
fn broken_catalog_reports_the_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("units.ron"), "(units: [ (id: \"imp\" ])").unwrap();
    std::fs::write(dir.path().join("spells.ron"), "(spells: [])").unwrap();

    let err = ContentFactory::new(dir.path()).load_library().unwrap_err();
    assert!(err.to_string().contains("unit catalog"));
}

#[test]
fn missing_file_names_the_path() {
    let dir = tempfile::tempdir().unwrap();

    let err = ContentFactory::new(dir.path()).load_rules().unwrap_err();
    assert!(err.to_string().contains("rules.toml"));
}
