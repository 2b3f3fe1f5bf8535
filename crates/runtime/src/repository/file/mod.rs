//! File-based repository implementations.

mod replay;

pub use replay::{FileReplayRepository, read_replay, write_replay};
