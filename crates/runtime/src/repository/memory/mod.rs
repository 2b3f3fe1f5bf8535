//! In-memory repository implementations for testing and development.

mod replay;

pub use replay::InMemoryReplayRepository;
