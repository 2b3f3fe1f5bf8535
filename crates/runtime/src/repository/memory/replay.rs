//! In-memory ReplayRepository implementation for tests and local runs.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::replay::ReplayLog;
use crate::repository::traits::check_name;
use crate::repository::{ReplayRepository, RepositoryError, Result};

/// In-memory implementation of ReplayRepository.
#[derive(Default)]
pub struct InMemoryReplayRepository {
    replays: RwLock<BTreeMap<String, ReplayLog>>,
}

impl InMemoryReplayRepository {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReplayRepository for InMemoryReplayRepository {
    fn save(&self, name: &str, log: &ReplayLog) -> Result<()> {
        check_name(name)?;
        let mut replays = self
            .replays
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        replays.insert(name.to_string(), log.clone());
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Option<ReplayLog>> {
        let replays = self
            .replays
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(replays.get(name).cloned())
    }

    fn exists(&self, name: &str) -> bool {
        self.replays
            .read()
            .map(|replays| replays.contains_key(name))
            .unwrap_or(false)
    }

    fn delete(&self, name: &str) -> Result<()> {
        let mut replays = self
            .replays
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        replays.remove(name);
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>> {
        let replays = self
            .replays
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(replays.keys().cloned().collect())
    }
}
