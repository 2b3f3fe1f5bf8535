//! Envelope and encodings of a stored replay.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::replay::ReplayLog;
use crate::repository::{RepositoryError, Result};

/// On-disk encoding of a replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ReplayFormat {
    /// Human-readable, for inspection and diffs.
    Json,
    /// Compact bincode.
    #[default]
    Bincode,
}

impl ReplayFormat {
    pub const fn extension(self) -> &'static str {
        match self {
            ReplayFormat::Json => "json",
            ReplayFormat::Bincode => "bin",
        }
    }

    /// Picks the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Some(ReplayFormat::Json),
            Some("bin") => Some(ReplayFormat::Bincode),
            _ => None,
        }
    }

    pub fn encode(self, stored: &StoredReplay) -> Result<Vec<u8>> {
        match self {
            ReplayFormat::Json => {
                serde_json::to_vec_pretty(stored).map_err(|e| RepositoryError::Json(e.to_string()))
            }
            ReplayFormat::Bincode => {
                bincode::serialize(stored).map_err(|e| RepositoryError::Serialization(e.to_string()))
            }
        }
    }

    pub fn decode(self, bytes: &[u8]) -> Result<StoredReplay> {
        match self {
            ReplayFormat::Json => {
                serde_json::from_slice(bytes).map_err(|e| RepositoryError::Json(e.to_string()))
            }
            ReplayFormat::Bincode => bincode::deserialize(bytes)
                .map_err(|e| RepositoryError::Serialization(e.to_string())),
        }
    }
}

impl std::fmt::Display for ReplayFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ReplayFormat::Json => "json",
            ReplayFormat::Bincode => "bincode",
        };
        write!(f, "{}", label)
    }
}

/// A replay plus the hex SHA-256 root of its actions.
///
/// The root is checked on load so a truncated or edited action list is
/// reported instead of silently replaying a different battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredReplay {
    pub actions_root: String,
    pub log: ReplayLog,
}

impl StoredReplay {
    pub fn seal(log: ReplayLog) -> Result<Self> {
        Ok(Self {
            actions_root: hex::encode(root_of(&log)?),
            log,
        })
    }

    /// Verifies the root and hands out the log.
    pub fn open(self) -> Result<ReplayLog> {
        let actual = hex::encode(root_of(&self.log)?);
        if actual != self.actions_root {
            return Err(RepositoryError::CorruptedData(format!(
                "actions root mismatch: stored {}, computed {}",
                self.actions_root, actual
            )));
        }
        Ok(self.log)
    }
}

fn root_of(log: &ReplayLog) -> Result<[u8; 32]> {
    log.actions_root()
        .map_err(|err| RepositoryError::Serialization(err.to_string()))
}
