//! Battlefield geometry, starting layouts and reachability.
//!
//! [`BattleField`] answers purely geometric questions (validity, adjacency,
//! flood fill, nearest cell). [`FieldPreset`] adds obstacles and the starting
//! layout, and [`pathfinder`] holds the reachability collaborator contract.
pub mod extended;
pub mod pathfinder;
pub mod position;
pub mod preset;

use std::collections::{BTreeMap, BTreeSet};

pub use extended::{AttackVariants, BattlePositionExtended, Sight, TargetCell};
pub use pathfinder::{HexFloodFinder, PathFinder, PathQuery, ReachMap};
pub use position::{AttackDirection, BattleDirection, BattlePosition};
pub use preset::{FieldLayout, FieldPreset};

/// Ordered cell set; iteration order is part of several tie-breaks.
pub type PositionSet = BTreeSet<BattlePosition>;

/// Rectangular hex grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleField {
    pub width: i32,
    pub height: i32,
}

impl BattleField {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub const fn is_valid(&self, pos: BattlePosition) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    /// Valid neighbours of `pos`, keyed by direction.
    pub fn adjacent(&self, pos: BattlePosition) -> BTreeMap<BattleDirection, BattlePosition> {
        BattleDirection::ALL
            .iter()
            .map(|&direction| (direction, pos.neighbour(direction)))
            .filter(|(_, neighbour)| self.is_valid(*neighbour))
            .collect()
    }

    pub fn adjacent_set(&self, pos: BattlePosition) -> PositionSet {
        self.adjacent(pos).into_values().collect()
    }

    /// Cells touching either cell of a (possibly large) stack.
    pub fn adjacent_to_extended(&self, pos: &BattlePositionExtended) -> PositionSet {
        let mut result = self.adjacent_set(pos.main());
        if pos.is_large() {
            result.extend(self.adjacent_set(pos.secondary()));
            result.remove(&pos.main());
            result.remove(&pos.secondary());
        }
        result
    }

    /// `pos` plus every cell within `iterations` steps of it.
    pub fn flood_fill(&self, pos: BattlePosition, iterations: u32) -> PositionSet {
        let mut result = PositionSet::new();
        result.insert(pos);
        let mut frontier = result.clone();
        for _ in 0..iterations {
            let next: PositionSet = frontier
                .iter()
                .flat_map(|edge| self.adjacent_set(*edge))
                .collect();
            result.extend(next.iter().copied());
            frontier = next;
        }
        result
    }

    /// Candidates at the smallest Cartesian distance from `pos`.
    pub fn closest_to(&self, pos: BattlePosition, candidates: &PositionSet) -> PositionSet {
        let Some(best) = candidates
            .iter()
            .map(|candidate| pos.cartesian_distance_sqr(*candidate))
            .min()
        else {
            return PositionSet::new();
        };
        candidates
            .iter()
            .filter(|candidate| pos.cartesian_distance_sqr(**candidate) == best)
            .copied()
            .collect()
    }

    /// Neighbours of `pos` in the given directions that lie on the field.
    pub fn valid_neighbours(&self, pos: BattlePosition, directions: &[BattleDirection]) -> PositionSet {
        directions
            .iter()
            .map(|direction| pos.neighbour(*direction))
            .filter(|neighbour| self.is_valid(*neighbour))
            .collect()
    }

    pub fn all_positions(&self) -> PositionSet {
        (0..self.width)
            .flat_map(|x| (0..self.height).map(move |y| BattlePosition::new(x, y)))
            .collect()
    }
}

impl Default for BattleField {
    fn default() -> Self {
        Self::new(
            crate::config::BattleConfig::DEFAULT_FIELD_WIDTH,
            crate::config::BattleConfig::DEFAULT_FIELD_HEIGHT,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32, y: i32) -> BattlePosition {
        BattlePosition::new(x, y)
    }

    #[test]
    fn corner_has_fewer_neighbours() {
        let field = BattleField::new(15, 11);
        assert_eq!(field.adjacent_set(p(0, 0)).len(), 3);
        assert_eq!(field.adjacent_set(p(7, 5)).len(), 6);
    }

    #[test]
    fn flood_fill_radius_one_is_seven_cells() {
        let field = BattleField::new(15, 11);
        assert_eq!(field.flood_fill(p(7, 5), 1).len(), 7);
        assert_eq!(field.flood_fill(p(7, 5), 2).len(), 19);
        assert_eq!(field.flood_fill(p(7, 5), 0).len(), 1);
    }

    #[test]
    fn extended_adjacency_excludes_own_cells() {
        let field = BattleField::new(15, 11);
        let large = BattlePositionExtended::new(p(5, 5), Sight::ToRight, true);
        let around = field.adjacent_to_extended(&large);
        assert!(!around.contains(&p(5, 5)));
        assert!(!around.contains(&p(6, 5)));
        assert_eq!(around.len(), 8);
    }

    #[test]
    fn closest_to_returns_all_ties() {
        let field = BattleField::new(15, 11);
        let candidates: PositionSet = [p(4, 5), p(6, 5), p(9, 9)].into_iter().collect();
        let closest = field.closest_to(p(5, 5), &candidates);
        assert_eq!(closest.len(), 2);
        assert_eq!(closest.first(), Some(&p(4, 5)));
    }

    #[test]
    fn all_positions_covers_grid() {
        assert_eq!(BattleField::new(15, 11).all_positions().len(), 165);
    }
}
