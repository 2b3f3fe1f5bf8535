//! Drives one battle from start to finish.
//!
//! A [`BattleSession`] owns a recording engine, asks the provider of the
//! active side for a command, submits it and repeats until the battle ends
//! or the configured action limit is hit. The accepted commands become the
//! session's [`ReplayLog`].
use std::cell::Cell;
use std::rc::Rc;

use battle_core::{
    BattleControl, BattleEngine, BattleError, BattleEvent, BattleObserver, BattleResult,
    BattleSetup, BattleView, ObserverHandle, Side,
};

use crate::api::{ActionProvider, Result, RuntimeError};
use crate::oracle::OracleManager;
use crate::providers::ai::{AiParams, GreedyAi};
use crate::replay::{RecordingControl, ReplayLog};

/// Summary of a driven (or replayed) battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionOutcome {
    /// `None` when the action limit stopped the battle first.
    pub result: Option<BattleResult>,
    pub rounds: u32,
    pub actions: usize,
    /// Events observed since the session was created.
    pub events: usize,
    pub state_root: [u8; 32],
}

impl SessionOutcome {
    pub fn from_engine(engine: &BattleEngine, actions: usize, events: usize) -> Self {
        Self {
            result: engine.result(),
            rounds: engine.round(),
            actions,
            events,
            state_root: engine.state_root(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.result.is_some()
    }
}

/// A battle driven by one [`ActionProvider`] per side.
#[derive(Debug)]
pub struct BattleSession {
    setup: BattleSetup,
    control: RecordingControl<BattleEngine>,
    events: Rc<Cell<usize>>,
    max_actions: u32,
}

impl BattleSession {
    /// Builds the engine for `setup`; the battle starts on the first run.
    pub fn new(setup: BattleSetup, oracle: &OracleManager) -> Result<Self> {
        let mut engine = oracle.build_engine(&setup)?;
        let events = Rc::new(Cell::new(0));
        let counter = Rc::clone(&events);
        engine.add_observer(move |_: &BattleEvent| counter.set(counter.get() + 1));

        Ok(Self {
            setup,
            control: RecordingControl::new(engine),
            events,
            max_actions: oracle.config().max_actions,
        })
    }

    #[must_use]
    pub fn with_max_actions(mut self, max_actions: u32) -> Self {
        self.max_actions = max_actions;
        self
    }

    pub fn add_observer(&mut self, observer: impl BattleObserver + 'static) -> ObserverHandle {
        self.control.inner_mut().add_observer(observer)
    }

    pub fn engine(&self) -> &BattleEngine {
        self.control.inner()
    }

    /// Runs until the battle is finished or the action limit is reached.
    ///
    /// A provider command the engine rejects as invalid is replaced by a
    /// guard so a confused provider cannot stall the battle; any other
    /// engine error ends the run.
    pub fn run(
        &mut self,
        attacker: &mut dyn ActionProvider,
        defender: &mut dyn ActionProvider,
    ) -> Result<SessionOutcome> {
        self.control.inner_mut().start()?;
        tracing::info!(
            seed = self.setup.seed,
            max_actions = self.max_actions,
            "session started"
        );

        while !self.control.is_finished() {
            if self.control.actions().len() >= self.max_actions as usize {
                tracing::warn!(
                    actions = self.control.actions().len(),
                    round = self.control.round(),
                    "action limit reached, stopping"
                );
                break;
            }
            let side = self.control.current_side().ok_or(RuntimeError::NoActiveStack)?;
            let provider: &mut dyn ActionProvider = match side {
                Side::Attacker => &mut *attacker,
                Side::Defender => &mut *defender,
            };

            let action = provider.provide_action(&self.control)?;
            tracing::debug!(round = self.control.round(), %side, %action, "action chosen");

            match self.control.apply(&action) {
                Ok(()) => {}
                Err(err @ (BattleError::InvalidPlan { .. } | BattleError::AlreadyWaited { .. })) => {
                    tracing::warn!(%side, %action, %err, "provider action rejected, guarding instead");
                    self.control.do_guard()?;
                }
                Err(err) => return Err(err.into()),
            }
        }

        let outcome = self.outcome();
        tracing::info!(
            result = ?outcome.result,
            rounds = outcome.rounds,
            actions = outcome.actions,
            events = outcome.events,
            "session finished"
        );
        Ok(outcome)
    }

    /// Runs with the greedy AI on both sides.
    pub fn run_ai(&mut self, params: AiParams) -> Result<SessionOutcome> {
        let mut attacker = GreedyAi::new(params);
        let mut defender = GreedyAi::new(params);
        self.run(&mut attacker, &mut defender)
    }

    pub fn outcome(&self) -> SessionOutcome {
        SessionOutcome::from_engine(
            self.control.inner(),
            self.control.actions().len(),
            self.events.get(),
        )
    }

    /// Setup plus every command accepted so far.
    pub fn replay_log(&self) -> ReplayLog {
        ReplayLog::with_actions(self.setup.clone(), self.control.actions().to_vec())
    }

    pub fn into_replay(self) -> ReplayLog {
        let (_, actions) = self.control.into_parts();
        ReplayLog::with_actions(self.setup, actions)
    }
}
