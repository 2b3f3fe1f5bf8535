//! Repository contracts for saving and loading replays.

use super::Result;
use crate::replay::ReplayLog;

/// Repository for replay persistence, keyed by name.
///
/// Names are plain identifiers; implementations reject anything that could
/// escape their storage (path separators, empty names).
pub trait ReplayRepository: Send + Sync {
    /// Save a replay, replacing any previous one with the same name
    fn save(&self, name: &str, log: &ReplayLog) -> Result<()>;

    /// Load a replay by name
    fn load(&self, name: &str) -> Result<Option<ReplayLog>>;

    /// Check if a replay exists
    fn exists(&self, name: &str) -> bool;

    /// Delete a replay
    fn delete(&self, name: &str) -> Result<()>;

    /// List all stored replay names, sorted
    fn list(&self) -> Result<Vec<String>> {
        Ok(vec![])
    }
}

/// Rejects names that are empty or could leave the storage directory.
pub(crate) fn check_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(super::RepositoryError::InvalidName(name.to_string()))
    }
}
