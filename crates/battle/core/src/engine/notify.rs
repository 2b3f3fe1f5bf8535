//! Observer fan-out for battle events.
//!
//! Every state change the engine makes is announced through a closed
//! [`BattleEvent`] enum. Observers are called synchronously, in
//! registration order, before the control call returns.

use std::sync::mpsc::Sender;

use crate::combat::{DamageResult, LossInfo};
use crate::env::SpellId;
use crate::field::{BattlePosition, BattlePositionExtended};
use crate::state::{BattleResult, Side, StackId};

/// Random or passive effect shown on a stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum StackEffect {
    GoodMorale,
    BadMorale,
    GoodLuck,
    BadLuck,
    Resist,
    Regenerate,
}

/// One stack hit by a physical attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhysicalHit {
    pub target: StackId,
    pub damage: DamageResult,
}

/// Everything one strike or shot is about to do.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AffectedPhysical {
    pub attacker: StackId,
    /// Absent for a free splash aimed at an empty cell.
    pub main: Option<PhysicalHit>,
    pub target_position: BattlePosition,
    pub extra: Vec<PhysicalHit>,
}

/// Source of a spell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Caster {
    Hero(Side),
    Unit(StackId),
    /// Pre-battle cast of a side's hero equipment.
    BeforeStart(Side),
}

/// One stack a spell took hold on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MagicHit {
    pub target: StackId,
    pub loss: Option<LossInfo>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AffectedMagic {
    pub caster: Caster,
    pub spell: SpellId,
    pub main_position: Option<BattlePosition>,
    pub area: Vec<BattlePosition>,
    pub targets: Vec<MagicHit>,
}

/// Everything observers can learn about a running battle.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleEvent {
    BeforeMove {
        stack: StackId,
        path: Vec<BattlePosition>,
    },
    BeforeAttackMelee {
        affected: AffectedPhysical,
        is_retaliation: bool,
    },
    BeforeAttackRanged {
        affected: AffectedPhysical,
    },
    BeforeWait {
        stack: StackId,
    },
    BeforeGuard {
        stack: StackId,
        bonus: i32,
    },
    StackUnderEffect {
        stack: StackId,
        effect: StackEffect,
    },
    Cast(AffectedMagic),
    PositionReset {
        stack: StackId,
        position: BattlePositionExtended,
    },
    RoundStarted {
        round: u32,
    },
    BattleFinished {
        result: BattleResult,
    },
    StateChanged,
    ControlAvailabilityChanged {
        available: bool,
    },
}

impl BattleEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BeforeMove { .. } => "before_move",
            Self::BeforeAttackMelee { .. } => "before_attack_melee",
            Self::BeforeAttackRanged { .. } => "before_attack_ranged",
            Self::BeforeWait { .. } => "before_wait",
            Self::BeforeGuard { .. } => "before_guard",
            Self::StackUnderEffect { .. } => "stack_under_effect",
            Self::Cast(_) => "cast",
            Self::PositionReset { .. } => "position_reset",
            Self::RoundStarted { .. } => "round_started",
            Self::BattleFinished { .. } => "battle_finished",
            Self::StateChanged => "state_changed",
            Self::ControlAvailabilityChanged { .. } => "control_availability_changed",
        }
    }
}

// ============================================================================
// Observers
// ============================================================================

/// Receiver of battle events.
pub trait BattleObserver {
    fn on_event(&mut self, event: &BattleEvent);
}

impl<F> BattleObserver for F
where
    F: FnMut(&BattleEvent),
{
    fn on_event(&mut self, event: &BattleEvent) {
        self(event)
    }
}

/// Forwards clones of every event; a disconnected receiver is ignored.
impl BattleObserver for Sender<BattleEvent> {
    fn on_event(&mut self, event: &BattleEvent) {
        let _ = self.send(event.clone());
    }
}

/// Registration token returned by [`ObserverSet::add`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverHandle(u64);

/// Ordered list of observers.
#[derive(Default)]
pub struct ObserverSet {
    observers: Vec<(ObserverHandle, Box<dyn BattleObserver>)>,
    next_handle: u64,
}

impl ObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, observer: Box<dyn BattleObserver>) -> ObserverHandle {
        let handle = ObserverHandle(self.next_handle);
        self.next_handle += 1;
        self.observers.push((handle, observer));
        handle
    }

    /// Returns `false` when the handle was not registered.
    pub fn remove(&mut self, handle: ObserverHandle) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(registered, _)| *registered != handle);
        self.observers.len() != before
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn notify(&mut self, event: &BattleEvent) {
        tracing::trace!(event = event.as_str(), "battle event");
        for (_, observer) in &mut self.observers {
            observer.on_event(event);
        }
    }
}

impl core::fmt::Debug for ObserverSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ObserverSet")
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::mpsc;

    use super::*;

    #[test]
    fn fan_out_follows_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut set = ObserverSet::new();
        let first = Rc::clone(&log);
        set.add(Box::new(move |_: &BattleEvent| first.borrow_mut().push(1)));
        let second = Rc::clone(&log);
        let handle = set.add(Box::new(move |_: &BattleEvent| second.borrow_mut().push(2)));

        set.notify(&BattleEvent::StateChanged);
        assert_eq!(*log.borrow(), vec![1, 2]);

        assert!(set.remove(handle));
        assert!(!set.remove(handle));
        set.notify(&BattleEvent::StateChanged);
        assert_eq!(*log.borrow(), vec![1, 2, 1]);
    }

    #[test]
    fn channel_observer_receives_clones() {
        let (tx, rx) = mpsc::channel();
        let mut set = ObserverSet::new();
        set.add(Box::new(tx));
        set.notify(&BattleEvent::RoundStarted { round: 1 });
        assert_eq!(rx.try_recv().unwrap(), BattleEvent::RoundStarted { round: 1 });
    }
}
