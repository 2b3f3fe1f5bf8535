//! Step-by-step playback of a recorded battle.

use battle_core::{BattleControl, BattleEngine, BattleView};

use super::{ReplayError, ReplayLog};
use crate::oracle::OracleManager;

/// Rebuilds a battle from its setup and resubmits the recorded commands.
///
/// The engine is recreated on [`ReplayPlayer::rewind_to_start`]; observers
/// attached through [`ReplayPlayer::engine_mut`] do not survive a rewind.
#[derive(Debug)]
pub struct ReplayPlayer {
    log: ReplayLog,
    oracle: OracleManager,
    engine: BattleEngine,
    position: usize,
}

impl ReplayPlayer {
    /// Builds and starts the battle; no recorded action is executed yet.
    pub fn new(log: ReplayLog, oracle: OracleManager) -> Result<Self, ReplayError> {
        let engine = Self::fresh_engine(&log, &oracle)?;
        tracing::debug!(actions = log.len(), seed = log.setup.seed, "replay loaded");
        Ok(Self {
            log,
            oracle,
            engine,
            position: 0,
        })
    }

    fn fresh_engine(log: &ReplayLog, oracle: &OracleManager) -> Result<BattleEngine, ReplayError> {
        let mut engine = oracle.build_engine(&log.setup).map_err(ReplayError::Setup)?;
        engine.start().map_err(ReplayError::Setup)?;
        Ok(engine)
    }

    /// Back to the state right after the battle started.
    pub fn rewind_to_start(&mut self) -> Result<(), ReplayError> {
        self.engine = Self::fresh_engine(&self.log, &self.oracle)?;
        self.position = 0;
        Ok(())
    }

    /// Number of recorded actions.
    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    /// Index of the next action to execute.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.log.len()
    }

    /// Executes the action at [`ReplayPlayer::position`] and advances.
    ///
    /// A rejected action means the recording does not match this content or
    /// engine; the position stays on the failing action.
    pub fn execute_current(&mut self) -> Result<(), ReplayError> {
        let index = self.position;
        let action = self
            .log
            .actions
            .get(index)
            .ok_or(ReplayError::Exhausted { position: index })?;

        self.engine.apply(action).map_err(|source| {
            tracing::warn!(index, %action, %source, "replay diverged");
            ReplayError::Diverged {
                index,
                action: action.clone(),
                source,
            }
        })?;
        tracing::trace!(index, %action, round = self.engine.round(), "replayed");
        self.position += 1;
        Ok(())
    }

    /// Executes every remaining action.
    pub fn execute_all(&mut self) -> Result<(), ReplayError> {
        while !self.is_at_end() {
            self.execute_current()?;
        }
        Ok(())
    }

    pub fn engine(&self) -> &BattleEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut BattleEngine {
        &mut self.engine
    }

    pub fn log(&self) -> &ReplayLog {
        &self.log
    }
}
