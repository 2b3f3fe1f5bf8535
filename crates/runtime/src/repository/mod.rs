//! Repository layer for recorded battles.
//!
//! Repositories keep data produced while a battle runs: the replay logs.
//! Static content (units, spells, rules) comes from the oracle, not from
//! repositories.

mod error;
mod traits;

pub mod file;
pub mod memory;
pub mod types;

pub use error::{RepositoryError, Result};
pub use file::{FileReplayRepository, read_replay, write_replay};
pub use memory::InMemoryReplayRepository;
pub use traits::ReplayRepository;
pub use types::{ReplayFormat, StoredReplay};
