//! Arena of stacks plus round bookkeeping.

use super::{AdventureBonus, BattleHero, BattlePhase, BattleStack, Side, StackId};
use crate::env::SpellFilter;
use crate::field::{BattleField, BattlePosition, PositionSet};

/// Complete mutable state of one battle.
#[derive(Clone, Debug)]
pub struct BattleState {
    pub(crate) field: BattleField,
    pub(crate) obstacles: PositionSet,
    pub(crate) stacks: Vec<BattleStack>,
    pub(crate) heroes: [Option<BattleHero>; 2],
    pub(crate) bonuses: [AdventureBonus; 2],
    /// Spells nobody may cast (union of both heroes' restrictions).
    pub(crate) forbidden: SpellFilter,
    pub(crate) round: u32,
    pub(crate) phase: BattlePhase,
    pub(crate) queue: Vec<StackId>,
    pub(crate) current: Option<StackId>,
    pub(crate) first_turn_done: [bool; 2],
}

impl BattleState {
    pub(crate) fn new(field: BattleField, obstacles: PositionSet) -> Self {
        Self {
            field,
            obstacles,
            stacks: Vec::new(),
            heroes: [None, None],
            bonuses: [AdventureBonus::default(); 2],
            forbidden: SpellFilter::default(),
            round: 0,
            phase: BattlePhase::AwaitingFirstRound,
            queue: Vec::new(),
            current: None,
            first_turn_done: [false; 2],
        }
    }

    pub fn field(&self) -> &BattleField {
        &self.field
    }

    pub fn obstacles(&self) -> &PositionSet {
        &self.obstacles
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn queue(&self) -> &[StackId] {
        &self.queue
    }

    pub fn current(&self) -> Option<StackId> {
        self.current
    }

    pub fn forbidden(&self) -> &SpellFilter {
        &self.forbidden
    }

    pub fn bonus(&self, side: Side) -> &AdventureBonus {
        &self.bonuses[side.index()]
    }

    pub fn stacks(&self) -> &[BattleStack] {
        &self.stacks
    }

    pub fn stack(&self, id: StackId) -> Option<&BattleStack> {
        self.stacks.get(id.index())
    }

    pub(crate) fn stack_mut(&mut self, id: StackId) -> Option<&mut BattleStack> {
        self.stacks.get_mut(id.index())
    }

    pub fn alive(&self) -> impl Iterator<Item = &BattleStack> {
        self.stacks.iter().filter(|stack| stack.is_alive())
    }

    pub fn alive_count(&self, side: Side) -> usize {
        self.alive().filter(|stack| stack.side == side).count()
    }

    pub fn hero(&self, side: Side) -> Option<&BattleHero> {
        self.heroes[side.index()].as_ref()
    }

    pub(crate) fn hero_mut(&mut self, side: Side) -> Option<&mut BattleHero> {
        self.heroes[side.index()].as_mut()
    }

    /// Stack covering `pos`, optionally restricted to living stacks.
    pub fn find_stack(&self, pos: BattlePosition, only_alive: bool) -> Option<&BattleStack> {
        self.stacks
            .iter()
            .find(|stack| (!only_alive || stack.is_alive()) && stack.pos.contains(pos))
    }

    pub fn find_stack_id(&self, pos: BattlePosition, only_alive: bool) -> Option<StackId> {
        self.find_stack(pos, only_alive).map(BattleStack::id)
    }

    /// Living stacks touching `id`, in arena order and without duplicates.
    pub fn neighbours_of(&self, id: StackId) -> Vec<StackId> {
        let Some(stack) = self.stack(id) else {
            return Vec::new();
        };
        let mut result: Vec<StackId> = Vec::new();
        for pos in self.field.adjacent_to_extended(&stack.pos) {
            if let Some(neighbour) = self.find_stack_id(pos, true) {
                if neighbour != id && !result.contains(&neighbour) {
                    result.push(neighbour);
                }
            }
        }
        result.sort();
        result
    }

    pub fn has_adjacent_enemy(&self, id: StackId) -> bool {
        let Some(stack) = self.stack(id) else {
            return false;
        };
        self.neighbours_of(id)
            .into_iter()
            .filter_map(|other| self.stack(other))
            .any(|other| other.side != stack.side)
    }
}
