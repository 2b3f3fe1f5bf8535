//! Persisted record types shared by the repository implementations.

mod replay;

pub use replay::{ReplayFormat, StoredReplay};
