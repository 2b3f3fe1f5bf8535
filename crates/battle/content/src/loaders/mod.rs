//! Content loaders for reading battle data from files.
//!
//! Catalog files are parsed in a first pass into raw records keyed by string
//! id; [`LibraryBuilder`] then checks every cross reference before handing
//! out shared templates.

pub mod config;
pub mod factory;
pub mod library;
pub mod rules;
pub mod scenario;
pub mod spells;
pub mod units;

pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use library::LibraryBuilder;
pub use rules::RulesLoader;
pub use scenario::ScenarioLoader;
pub use spells::{SpellCatalog, SpellLoader};
pub use units::{UnitCatalog, UnitLoader};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
