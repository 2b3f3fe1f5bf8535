//! Reachability collaborator.
//!
//! The engine never searches the grid itself. It builds a [`PathQuery`]
//! (field, blocked cells, start, flying) and asks a [`PathFinder`] for a
//! [`ReachMap`], which then answers budget-bounded reachability and
//! shortest-path questions. [`HexFloodFinder`] is the breadth-first
//! implementation used by default.

use std::collections::BTreeMap;

use super::{BattleDirection, BattleField, BattlePosition, PositionSet};

/// Input of a reachability search.
#[derive(Clone, Debug)]
pub struct PathQuery<'a> {
    pub field: &'a BattleField,
    /// Cells the walker cannot enter, already expanded for large walkers.
    pub obstacles: &'a PositionSet,
    pub start: BattlePosition,
    /// Flying and teleporting walkers ignore obstacles between cells.
    pub through_obstacles: bool,
}

impl PathQuery<'_> {
    /// Expands raw blocked cells for a walker of the given size.
    ///
    /// A large walker is addressed by its main cell while its body trails one
    /// cell behind, so every blocked cell also blocks the cell in front of it
    /// and the far edge column becomes unusable.
    pub fn expand_obstacles(
        field: &BattleField,
        blocked: impl IntoIterator<Item = BattlePosition>,
        large: bool,
        mirrored: bool,
    ) -> PositionSet {
        let mut result = PositionSet::new();
        for pos in blocked {
            result.insert(pos);
            if large {
                let shift = if mirrored { 1 } else { -1 };
                result.insert(BattlePosition::new(pos.x + shift, pos.y));
            }
        }
        if large {
            let column = if mirrored { 0 } else { field.width - 1 };
            result.extend((0..field.height).map(|y| BattlePosition::new(column, y)));
        }
        result
    }
}

/// Pluggable reachability search.
pub trait PathFinder {
    fn explore(&self, query: &PathQuery<'_>) -> ReachMap;
}

/// Step counts from the start cell; `None` marks unreachable cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReachMap {
    field: BattleField,
    steps: Vec<Option<u32>>,
    obstacles: PositionSet,
    through_obstacles: bool,
}

impl ReachMap {
    /// Wraps precomputed step counts (row-major by `x`, then `y`).
    pub fn from_steps(
        field: BattleField,
        steps: Vec<Option<u32>>,
        obstacles: PositionSet,
        through_obstacles: bool,
    ) -> Self {
        Self {
            field,
            steps,
            obstacles,
            through_obstacles,
        }
    }

    pub fn steps_to(&self, pos: BattlePosition) -> Option<u32> {
        self.index(pos).and_then(|index| self.steps.get(index).copied().flatten())
    }

    /// Cells reachable in `1..=limit` steps; `None` means unlimited.
    pub fn available(&self, limit: Option<u32>) -> PositionSet {
        self.distances(limit).into_keys().collect()
    }

    /// Reachable cells with their step count; the start cell is excluded.
    pub fn distances(&self, limit: Option<u32>) -> BTreeMap<BattlePosition, u32> {
        if limit == Some(0) {
            return BTreeMap::new();
        }
        self.field
            .all_positions()
            .into_iter()
            .filter_map(|pos| {
                let steps = self.steps_to(pos)?;
                let within = steps > 0 && limit.is_none_or(|limit| steps <= limit);
                (within && !self.obstacles.contains(&pos)).then_some((pos, steps))
            })
            .collect()
    }

    /// Walk from the start to `end`, excluding the start cell.
    ///
    /// Empty when `end` is unreachable, blocked, or further than `limit`.
    /// Ties between equally short steps follow a fixed direction priority
    /// so the same path is produced on every run.
    pub fn path_to(&self, end: BattlePosition, limit: Option<u32>) -> Vec<BattlePosition> {
        let Some(end_steps) = self.steps_to(end) else {
            return Vec::new();
        };
        if self.obstacles.contains(&end) || limit.is_some_and(|limit| end_steps > limit) {
            return Vec::new();
        }

        let mut path = vec![end];
        let mut visited = PositionSet::new();
        let mut current = end;
        loop {
            let next = self
                .field
                .adjacent(current)
                .into_iter()
                .filter(|(_, pos)| {
                    !visited.contains(pos) && (self.through_obstacles || !self.obstacles.contains(pos))
                })
                .min_by_key(|(direction, pos)| match self.steps_to(*pos) {
                    Some(steps) => (false, steps, walk_priority(*direction)),
                    None => (true, 0, 0),
                });
            let Some((_, pos)) = next else {
                break;
            };
            current = pos;
            path.push(current);
            visited.insert(current);
            if self.steps_to(current) == Some(0) {
                break;
            }
        }
        path.reverse();
        path.remove(0);
        path
    }

    fn index(&self, pos: BattlePosition) -> Option<usize> {
        self.field
            .is_valid(pos)
            .then(|| (pos.x * self.field.height + pos.y) as usize)
    }
}

fn walk_priority(direction: BattleDirection) -> u8 {
    match direction {
        BattleDirection::BottomRight => 0,
        BattleDirection::Right => 1,
        BattleDirection::TopRight => 2,
        BattleDirection::TopLeft => 3,
        BattleDirection::Left => 4,
        BattleDirection::BottomLeft => 5,
    }
}

/// Breadth-first flood fill over the hex grid.
#[derive(Clone, Copy, Debug, Default)]
pub struct HexFloodFinder;

impl PathFinder for HexFloodFinder {
    fn explore(&self, query: &PathQuery<'_>) -> ReachMap {
        let field = *query.field;
        let cell_count = (field.width.max(0) * field.height.max(0)) as usize;
        let mut map = ReachMap::from_steps(
            field,
            vec![None; cell_count],
            query.obstacles.clone(),
            query.through_obstacles,
        );
        let Some(start_index) = map.index(query.start) else {
            return map;
        };
        map.steps[start_index] = Some(0);

        let passable = |pos: &BattlePosition| query.through_obstacles || !query.obstacles.contains(pos);
        let mut seen = PositionSet::new();
        seen.insert(query.start);
        let mut edge: PositionSet = field
            .adjacent_set(query.start)
            .into_iter()
            .filter(|pos| passable(pos))
            .collect();
        let mut step = 0;
        while !edge.is_empty() {
            step += 1;
            seen.extend(edge.iter().copied());
            let mut next_edge = PositionSet::new();
            for pos in &edge {
                if let Some(index) = map.index(*pos) {
                    map.steps[index] = Some(step);
                }
                next_edge.extend(
                    field
                        .adjacent_set(*pos)
                        .into_iter()
                        .filter(|next| !seen.contains(next) && passable(next)),
                );
            }
            edge = next_edge;
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32, y: i32) -> BattlePosition {
        BattlePosition::new(x, y)
    }

    fn explore(obstacles: &PositionSet, start: BattlePosition, through: bool) -> ReachMap {
        let field = BattleField::new(15, 11);
        HexFloodFinder.explore(&PathQuery {
            field: &field,
            obstacles,
            start,
            through_obstacles: through,
        })
    }

    #[test]
    fn open_field_distances_match_hex_distance() {
        let map = explore(&PositionSet::new(), p(0, 5), false);
        assert_eq!(map.steps_to(p(0, 5)), Some(0));
        assert_eq!(map.steps_to(p(6, 5)), Some(6));
        assert_eq!(map.steps_to(p(3, 2)), Some(p(0, 5).hex_distance(p(3, 2)) as u32));
    }

    #[test]
    fn path_excludes_start_and_respects_limit() {
        let map = explore(&PositionSet::new(), p(0, 5), false);
        let path = map.path_to(p(4, 5), Some(4));
        assert_eq!(path.len(), 4);
        assert_eq!(path.last(), Some(&p(4, 5)));
        assert!(map.path_to(p(4, 5), Some(3)).is_empty());
    }

    #[test]
    fn wall_forces_detour() {
        let wall: PositionSet = (2..=8).map(|y| p(3, y)).collect();
        let map = explore(&wall, p(1, 5), false);
        assert!(map.steps_to(p(5, 5)).unwrap() > 4);
        assert_eq!(map.steps_to(p(3, 5)), None);
        assert!(!map.available(None).contains(&p(3, 5)));
    }

    #[test]
    fn flyer_crosses_walls_but_cannot_land_on_them() {
        let wall: PositionSet = (0..11).map(|y| p(3, y)).collect();
        let walker = explore(&wall, p(1, 5), false);
        assert_eq!(walker.steps_to(p(5, 5)), None);
        let flyer = explore(&wall, p(1, 5), true);
        assert_eq!(flyer.steps_to(p(5, 5)), Some(4));
        assert!(flyer.path_to(p(3, 5), None).is_empty());
        assert!(!flyer.path_to(p(5, 5), None).is_empty());
    }

    #[test]
    fn zero_limit_reaches_nothing() {
        let map = explore(&PositionSet::new(), p(7, 5), false);
        assert!(map.available(Some(0)).is_empty());
        assert_eq!(map.distances(Some(1)).len(), 6);
    }

    #[test]
    fn large_walker_blocks_far_column() {
        let field = BattleField::new(15, 11);
        let expanded = PathQuery::expand_obstacles(&field, [p(5, 5)], true, false);
        assert!(expanded.contains(&p(4, 5)));
        assert!(expanded.contains(&p(14, 0)));
        assert_eq!(expanded.len(), 2 + 11);
    }
}
