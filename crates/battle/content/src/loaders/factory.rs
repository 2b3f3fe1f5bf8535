//! Content factory for building the battle database from data files.

use std::path::{Path, PathBuf};

use battle_core::{BattleConfig, BattleRules, BattleSetup, MemoryLibrary};

use crate::loaders::{
    ConfigLoader, LibraryBuilder, LoadResult, RulesLoader, ScenarioLoader, SpellLoader, UnitLoader,
};

/// Content factory that loads all battle content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── rules.toml
/// ├── units.ron
/// ├── spells.ron
/// └── scenarios/
///     ├── skirmish.ron
///     └── siege.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load battle configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<BattleConfig> {
        let path = self.data_dir.join("config.toml");
        ConfigLoader::load(&path)
    }

    /// Load balance tables from `rules.toml`.
    pub fn load_rules(&self) -> LoadResult<BattleRules> {
        let path = self.data_dir.join("rules.toml");
        RulesLoader::load(&path)
    }

    /// Load `units.ron` and `spells.ron` and resolve them into a library.
    pub fn load_library(&self) -> LoadResult<MemoryLibrary> {
        let units = UnitLoader::load(&self.data_dir.join("units.ron"))?;
        let spells = SpellLoader::load(&self.data_dir.join("spells.ron"))?;
        LibraryBuilder::new()
            .with_units(units)
            .with_spells(spells)
            .build()
    }

    /// Load a scenario checked against `library`.
    ///
    /// `scenario` is a path to a RON file, or the name of a file in
    /// `scenarios/` without the `.ron` extension.
    pub fn load_scenario(&self, scenario: &str, library: &MemoryLibrary) -> LoadResult<BattleSetup> {
        ScenarioLoader::load(&self.scenario_path(scenario), library)
    }

    fn scenario_path(&self, scenario: &str) -> PathBuf {
        let direct = Path::new(scenario);
        if direct.extension().is_some() || direct.components().count() > 1 {
            return direct.to_path_buf();
        }
        self.data_dir.join("scenarios").join(format!("{}.ron", scenario))
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
