//! Battle state machine.
//!
//! [`BattleEngine`] owns the [`BattleState`], the RNG, the pathfinder and the
//! observer list. Callers read it through [`BattleView`] and change it only
//! through [`BattleControl`]; every accepted command is re-planned, executed,
//! announced to observers and followed by a queue update before it returns.
//!
//! ```text
//! start ──► round start ──► queue ──► before-active checks ──► control command
//!               ▲                                                    │
//!               └──────────────────── queue empty ◄──────────────────┘
//! ```

mod errors;
mod execute;
mod notify;
mod plan;
mod turns;
mod view;

pub use errors::BattleError;
pub use notify::{
    AffectedMagic, AffectedPhysical, BattleEvent, BattleObserver, Caster, MagicHit, ObserverHandle,
    ObserverSet, PhysicalHit, StackEffect,
};
pub use view::{BattleControl, BattleView};

use std::collections::BTreeMap;

use crate::combat::CombatParams;
use crate::config::BattleConfig;
use crate::env::{BattleRng, BattleRules, LibraryOracle, PcgRng, SpellId, SpellRef, UnitTraits};
use crate::field::{BattlePositionExtended, HexFloodFinder, PathFinder, PathQuery, ReachMap, Sight};
use crate::state::{BattleHero, BattleSetup, BattleStack, BattleState, Side, StackId};
use crate::stats::{
    HeroStartContext, StartContext, calculate_hero_on_start, calculate_stack_on_start,
    sum_opponent_bonus, sum_squad_bonus,
};

/// Authoritative battle orchestrator.
///
/// Single-threaded and not reentrant: while a command executes, control is
/// unavailable and observers are told so.
pub struct BattleEngine {
    state: BattleState,
    rules: BattleRules,
    config: BattleConfig,
    params: CombatParams,
    /// Every spell that can appear in this battle, resolved at construction.
    spells: BTreeMap<SpellId, SpellRef>,
    rng: Box<dyn BattleRng>,
    pathfinder: Box<dyn PathFinder>,
    observers: ObserverSet,
    control_available: bool,
    /// Stack whose before-active checks already ran for its current activation.
    activated: Option<StackId>,
}

impl BattleEngine {
    /// Resolves the setup against the library, places the armies and runs
    /// the start-of-battle stat pipeline.
    ///
    /// Stacks that do not fit the field layout are created dead. The battle
    /// does not begin until [`BattleEngine::start`].
    pub fn new(
        setup: &BattleSetup,
        library: &dyn LibraryOracle,
        rules: BattleRules,
        config: BattleConfig,
    ) -> Result<Self, BattleError> {
        let preset = &setup.preset;
        let mut state = BattleState::new(preset.field, preset.obstacles.clone());
        let mut spells = BTreeMap::new();

        for side in Side::BOTH {
            let army = setup.army(side);
            let limit = rules.limits.stacks;
            if army.stacks.len() > limit {
                tracing::warn!(%side, stacks = army.stacks.len(), limit, "army exceeds the stack limit");
            }
            let total = army.stacks.len().min(limit);
            let sight = match side {
                Side::Attacker => Sight::ToRight,
                Side::Defender => Sight::ToLeft,
            };

            for (slot, entry) in army.stacks.iter().take(limit).enumerate() {
                let unit = library
                    .unit(&entry.unit)
                    .ok_or_else(|| BattleError::UnknownUnit(entry.unit.clone()))?;
                if let Some(cast) = &unit.abilities.fixed_cast {
                    let spell = library
                        .spell(&cast.params.spell)
                        .ok_or_else(|| BattleError::UnknownSpell(cast.params.spell.clone()))?;
                    spells.insert(spell.id.clone(), spell);
                }

                // Two armies of at most `limits.stacks` entries each.
                let id = StackId(u32::try_from(state.stacks.len()).expect("stack count fits in u32"));
                let mut stack = BattleStack::new(id, side, slot, unit.clone(), entry.count);
                match preset.calc_position(side, slot, total, army.compact_formation) {
                    Some(main) => stack.pos = BattlePositionExtended::new(main, sight, unit.is_large()),
                    None => {
                        tracing::warn!(%side, slot, unit = %entry.unit, "no starting cell, stack left out");
                        stack.count = 0;
                    }
                }
                state.stacks.push(stack);
            }

            state.bonuses[side.index()] = army.bonus;
            if let Some(hero) = &army.hero {
                state.forbidden.union(&hero.forbid_spells);
                state.heroes[side.index()] = Some(BattleHero::new(side, hero.clone()));
            }
        }

        for side in Side::BOTH {
            let own = state.stacks.iter().filter(|stack| stack.side == side && stack.is_alive());
            let squad = sum_squad_bonus(own);
            let theirs = state
                .stacks
                .iter()
                .filter(|stack| stack.side == side.opponent() && stack.is_alive());
            let opponent = sum_opponent_bonus(theirs);
            let bonus = state.bonuses[side.index()];
            let forbidden = state.forbidden.clone();
            let ctx = StartContext {
                bonus: &bonus,
                squad,
                opponent,
                forbidden: &forbidden,
                library,
                rules: &rules,
            };
            for stack in state.stacks.iter_mut().filter(|stack| stack.side == side) {
                calculate_stack_on_start(stack, &ctx)?;
            }
        }

        for side in Side::BOTH {
            let opponent_hero = state.hero(side.opponent()).map(|hero| hero.setup.clone());
            let squad_mana_cost = sum_squad_bonus(state.alive().filter(|stack| stack.side == side)).mana_cost;
            let opponent_mana_cost =
                sum_opponent_bonus(state.alive().filter(|stack| stack.side == side.opponent())).mana_cost;
            let forbidden = state.forbidden.clone();
            let Some(hero) = state.hero_mut(side) else {
                continue;
            };

            for id in &hero.setup.spells {
                let spell = library
                    .spell(id)
                    .ok_or_else(|| BattleError::UnknownSpell(id.clone()))?;
                spells.insert(spell.id.clone(), spell);
            }
            for params in &hero.setup.casts_before_start {
                let spell = library
                    .spell(&params.spell)
                    .ok_or_else(|| BattleError::UnknownSpell(params.spell.clone()))?;
                spells.insert(spell.id.clone(), spell.clone());
                hero.casts_before_start.push((spell, params.clone()));
            }

            calculate_hero_on_start(
                hero,
                &HeroStartContext {
                    opponent_hero: opponent_hero.as_ref(),
                    squad_mana_cost,
                    opponent_mana_cost,
                    forbidden: &forbidden,
                    library,
                },
            );
        }

        tracing::debug!(
            attackers = state.alive_count(Side::Attacker),
            defenders = state.alive_count(Side::Defender),
            seed = setup.seed,
            "battle constructed"
        );

        Ok(Self {
            state,
            params: CombatParams::new(&rules, &config),
            rules,
            config,
            spells,
            rng: Box::new(PcgRng::from_seed(setup.seed)),
            pathfinder: Box::new(HexFloodFinder),
            observers: ObserverSet::new(),
            control_available: false,
            activated: None,
        })
    }

    /// Replaces the random source; call before [`BattleEngine::start`].
    #[must_use]
    pub fn with_rng(mut self, rng: impl BattleRng + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    #[must_use]
    pub fn with_pathfinder(mut self, pathfinder: impl PathFinder + 'static) -> Self {
        self.pathfinder = Box::new(pathfinder);
        self
    }

    pub fn add_observer(&mut self, observer: impl BattleObserver + 'static) -> ObserverHandle {
        self.observers.add(Box::new(observer))
    }

    /// Returns `false` when the handle is unknown.
    pub fn remove_observer(&mut self, handle: ObserverHandle) -> bool {
        self.observers.remove(handle)
    }

    /// Begins the first round, or finishes at once when a side has no
    /// living stack. Calling it again is a no-op.
    pub fn start(&mut self) -> Result<(), BattleError> {
        if self.state.phase != crate::state::BattlePhase::AwaitingFirstRound {
            return Ok(());
        }
        if !self.detect_finish() {
            self.start_new_round();
            self.update_state()?;
        }
        let available = !self.state.phase.is_finished();
        self.control_available = available;
        self.notify(BattleEvent::ControlAvailabilityChanged { available });
        Ok(())
    }

    pub fn rules(&self) -> &BattleRules {
        &self.rules
    }

    pub fn control_available(&self) -> bool {
        self.control_available
    }

    /// SHA-256 over the observable battle state.
    ///
    /// Two engines that received the same setup, seed and commands have the
    /// same root.
    pub fn state_root(&self) -> [u8; 32] {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        hasher.update(self.state.round.to_le_bytes());
        let phase: u8 = match self.state.phase {
            crate::state::BattlePhase::AwaitingFirstRound => 0,
            crate::state::BattlePhase::RoundInProgress => 1,
            crate::state::BattlePhase::Finished(result) => 2 + result as u8,
        };
        hasher.update([phase]);
        for stack in &self.state.stacks {
            hasher.update(stack.id.0.to_le_bytes());
            hasher.update(stack.count.to_le_bytes());
            hasher.update(stack.health.to_le_bytes());
            for cell in stack.pos.cells() {
                hasher.update(cell.x.to_le_bytes());
                hasher.update(cell.y.to_le_bytes());
            }
            hasher.update(stack.remaining_shots.to_le_bytes());
            hasher.update(stack.casts_done.to_le_bytes());
            hasher.update([
                u8::from(stack.round.finished_turn),
                u8::from(stack.round.waited),
                u8::from(stack.round.had_high_morale),
                u8::from(stack.round.had_low_morale),
            ]);
            hasher.update((stack.effects.len() as u32).to_le_bytes());
        }
        for hero in self.state.heroes.iter().flatten() {
            hasher.update(hero.mana.to_le_bytes());
            hasher.update([u8::from(hero.cast_this_round)]);
        }
        hasher.finalize().into()
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    fn notify(&mut self, event: BattleEvent) {
        self.observers.notify(&event);
    }

    fn active_stack(&self) -> Option<&BattleStack> {
        self.state.current.and_then(|id| self.state.stack(id))
    }

    /// Reachability of `id` with every other living stack and the static
    /// obstacles blocking its way.
    fn reach_map(&self, id: StackId) -> Option<ReachMap> {
        let stack = self.state.stack(id)?;
        let blocked = self
            .state
            .alive()
            .filter(|other| other.id != id)
            .flat_map(|other| other.pos.cells())
            .chain(self.state.obstacles.iter().copied());
        let obstacles = PathQuery::expand_obstacles(
            &self.state.field,
            blocked,
            stack.pos.is_large(),
            stack.pos.sight() == Sight::ToLeft,
        );
        let query = PathQuery {
            field: &self.state.field,
            obstacles: &obstacles,
            start: stack.pos.main(),
            through_obstacles: stack
                .unit
                .traits
                .intersects(UnitTraits::FLY | UnitTraits::TELEPORT),
        };
        Some(self.pathfinder.explore(&query))
    }
}

impl core::fmt::Debug for BattleEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BattleEngine")
            .field("round", &self.state.round)
            .field("phase", &self.state.phase)
            .field("current", &self.state.current)
            .field("control_available", &self.control_available)
            .field("observers", &self.observers)
            .finish_non_exhaustive()
    }
}
