//! Runtime orchestration for deterministic battles.
//!
//! This crate wires the action provider abstraction, content access, replay
//! recording and repositories around a [`battle_core::BattleEngine`].
//! Consumers build a [`BattleSession`] to drive a battle to its end and keep
//! the resulting [`ReplayLog`], or feed a log to a [`ReplayPlayer`] to watch
//! it again.
//!
//! Modules are organized by responsibility:
//! - [`api`] exposes the error and provider types downstream clients use
//! - [`providers`] hosts the built-in action providers, including the AI
//! - [`oracle`] bundles the static content an engine is built from
//! - [`replay`] records and plays back action sequences
//! - [`repository`] persists replays
//! - [`session`] drives a battle from start to finish
pub mod api;
pub mod oracle;
pub mod providers;
pub mod replay;
pub mod repository;
pub mod session;

pub use api::{ActionProvider, GuardActionProvider, Result, RuntimeError, ScriptedActionProvider};
pub use oracle::OracleManager;
pub use providers::ai::{AiParams, GreedyAi};
pub use replay::{RecordingControl, ReplayError, ReplayLog, ReplayPlayer};
pub use repository::{
    FileReplayRepository, InMemoryReplayRepository, ReplayFormat, ReplayRepository,
    RepositoryError,
};
pub use session::{BattleSession, SessionOutcome};
