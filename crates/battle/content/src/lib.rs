//! Data-driven battle content and its loaders.
//!
//! This crate reads the game database and battle descriptions from data files:
//! - Unit templates (RON)
//! - Spells (RON)
//! - Balance tables: luck/morale chances, physical constants, limits (TOML)
//! - Battle configuration (TOML)
//! - Scenarios: two armies, a field preset and a seed (RON)
//!
//! Content reaches the engine only through [`battle_core::LibraryOracle`] and
//! plain setup values; it never appears in battle state.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    ConfigLoader, ContentFactory, LibraryBuilder, LoadResult, RulesLoader, ScenarioLoader,
    SpellCatalog, SpellLoader, UnitCatalog, UnitLoader,
};
