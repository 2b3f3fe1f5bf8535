//! Public runtime API surface.
//!
//! This module gathers the types exposed to consumers of the runtime crate so
//! the other layers can stay focused on orchestration and persistence.

pub mod errors;
pub mod providers;

pub use errors::{Result, RuntimeError};
pub use providers::{ActionProvider, GuardActionProvider, ScriptedActionProvider};
