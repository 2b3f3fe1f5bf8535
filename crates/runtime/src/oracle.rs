//! Static battle content bundled for engine construction.
//!
//! The library, balance rules and configuration are immutable at runtime;
//! every engine a session or replay player builds comes from the same
//! [`OracleManager`], which is what makes a recorded battle reproducible.
use std::sync::Arc;

use battle_core::{BattleConfig, BattleEngine, BattleError, BattleRules, BattleSetup, LibraryOracle};

/// Manages the content oracles and builds engines from setups.
#[derive(Clone)]
pub struct OracleManager {
    library: Arc<dyn LibraryOracle>,
    rules: BattleRules,
    config: BattleConfig,
}

impl OracleManager {
    /// Creates a new oracle manager
    pub fn new(library: Arc<dyn LibraryOracle>, rules: BattleRules, config: BattleConfig) -> Self {
        Self {
            library,
            rules,
            config,
        }
    }

    /// Resolves `setup` into a fresh engine that has not started yet.
    pub fn build_engine(&self, setup: &BattleSetup) -> Result<BattleEngine, BattleError> {
        BattleEngine::new(
            setup,
            self.library.as_ref(),
            self.rules.clone(),
            self.config.clone(),
        )
    }

    pub fn library(&self) -> &dyn LibraryOracle {
        self.library.as_ref()
    }

    pub fn rules(&self) -> &BattleRules {
        &self.rules
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }
}

impl std::fmt::Debug for OracleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleManager")
            .field("units", &self.library.unit_ids().len())
            .field("spells", &self.library.spell_ids().len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
