//! Positions of stacks that may occupy one or two cells.

use arrayvec::ArrayVec;

use super::position::{AttackDirection, BattleDirection, BattlePosition};

/// Which way a stack faces. Attackers look right, defenders look left.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sight {
    #[default]
    ToRight,
    ToLeft,
}

/// Cell of a (possibly large) target that an attack is aimed at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetCell {
    Right,
    Left,
}

/// Attack variants between a source and a target of given widths.
pub type AttackVariants = ArrayVec<(AttackDirection, TargetCell), 14>;

/// Position of a stack: a head cell plus, for large units, a tail cell.
///
/// The secondary cell sits in front of the main cell in the sight direction.
/// For small units both cells coincide.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattlePositionExtended {
    main: BattlePosition,
    secondary: BattlePosition,
    sight: Sight,
    large: bool,
}

impl BattlePositionExtended {
    pub fn new(main: BattlePosition, sight: Sight, large: bool) -> Self {
        let mut pos = Self {
            main,
            secondary: main,
            sight,
            large,
        };
        pos.update_secondary();
        pos
    }

    pub const fn main(&self) -> BattlePosition {
        self.main
    }

    pub const fn secondary(&self) -> BattlePosition {
        self.secondary
    }

    pub const fn sight(&self) -> Sight {
        self.sight
    }

    pub const fn is_large(&self) -> bool {
        self.large
    }

    pub fn right(&self) -> BattlePosition {
        match self.sight {
            Sight::ToRight => self.secondary,
            Sight::ToLeft => self.main,
        }
    }

    pub fn left(&self) -> BattlePosition {
        match self.sight {
            Sight::ToLeft => self.secondary,
            Sight::ToRight => self.main,
        }
    }

    pub fn cell(&self, cell: TargetCell) -> BattlePosition {
        match cell {
            TargetCell::Right => self.right(),
            TargetCell::Left => self.left(),
        }
    }

    pub fn set_main(&mut self, pos: BattlePosition) {
        self.main = pos;
        self.update_secondary();
    }

    /// Places the stack so that its right cell lands on `pos`.
    pub fn set_right(&mut self, pos: BattlePosition) {
        self.main = if self.large && self.sight == Sight::ToRight {
            BattlePosition::new(pos.x - 1, pos.y)
        } else {
            pos
        };
        self.update_secondary();
    }

    /// Places the stack so that its left cell lands on `pos`.
    pub fn set_left(&mut self, pos: BattlePosition) {
        self.main = if self.large && self.sight == Sight::ToLeft {
            BattlePosition::new(pos.x + 1, pos.y)
        } else {
            pos
        };
        self.update_secondary();
    }

    #[must_use]
    pub fn moved_to(&self, pos: BattlePosition) -> Self {
        let mut copy = *self;
        copy.set_main(pos);
        copy
    }

    pub fn contains(&self, pos: BattlePosition) -> bool {
        self.main == pos || self.secondary == pos
    }

    /// Both occupied cells; a single cell for small units.
    pub fn cells(&self) -> ArrayVec<BattlePosition, 2> {
        let mut cells = ArrayVec::new();
        cells.push(self.main);
        if self.large {
            cells.push(self.secondary);
        }
        cells
    }

    /// Smallest hex distance between any cell of `self` and any cell of `to`.
    pub fn shortest_hex_distance(&self, to: &BattlePositionExtended) -> i32 {
        [
            (self.right(), to.right()),
            (self.right(), to.left()),
            (self.left(), to.right()),
            (self.left(), to.left()),
        ]
        .iter()
        .map(|(from, to)| from.hex_distance(*to))
        .min()
        .unwrap_or_default()
    }

    pub fn shortest_hex_distance_to_cell(&self, to: BattlePosition) -> i32 {
        self.right()
            .hex_distance(to)
            .min(self.left().hex_distance(to))
    }

    /// Where a stack starting at `self` must stand to strike `target_cell`
    /// in `direction`.
    #[must_use]
    pub fn suggest_for_attack(&self, target_cell: BattlePosition, direction: AttackDirection) -> Self {
        let mut pos = *self;
        match direction {
            AttackDirection::Right => pos.set_right(target_cell.neighbour(BattleDirection::Left)),
            AttackDirection::Left => pos.set_left(target_cell.neighbour(BattleDirection::Right)),
            AttackDirection::TopRight => {
                pos.set_right(target_cell.neighbour(BattleDirection::BottomLeft))
            }
            AttackDirection::BottomRight => {
                pos.set_right(target_cell.neighbour(BattleDirection::TopLeft))
            }
            AttackDirection::TopLeft => {
                pos.set_left(target_cell.neighbour(BattleDirection::BottomRight))
            }
            AttackDirection::BottomLeft => {
                pos.set_left(target_cell.neighbour(BattleDirection::TopRight))
            }
            AttackDirection::Top => pos.set_left(target_cell.neighbour(BattleDirection::BottomLeft)),
            AttackDirection::Bottom => pos.set_left(target_cell.neighbour(BattleDirection::TopLeft)),
        }
        pos
    }

    /// Every (direction, target cell) pair worth trying for a melee attack.
    ///
    /// Directions that would require standing inside the target's own second
    /// cell are left out.
    pub fn attack_suggestions(source_wide: bool, target_wide: bool) -> AttackVariants {
        use AttackDirection::*;
        use TargetCell::{Left as L_, Right as R_};

        let list: &[(AttackDirection, TargetCell)] = match (source_wide, target_wide) {
            (false, false) => &[
                (TopRight, R_),
                (Right, R_),
                (BottomRight, R_),
                (BottomLeft, R_),
                (Left, R_),
                (TopLeft, R_),
            ],
            (false, true) => &[
                (TopRight, R_),
                (Right, R_),
                (BottomRight, R_),
                (BottomLeft, R_),
                (TopLeft, R_),
                (TopRight, L_),
                (BottomRight, L_),
                (BottomLeft, L_),
                (Left, L_),
                (TopLeft, L_),
            ],
            (true, false) => &[
                (TopRight, R_),
                (Right, R_),
                (BottomRight, R_),
                (BottomLeft, R_),
                (Left, R_),
                (TopLeft, R_),
                (Bottom, R_),
                (Top, R_),
            ],
            (true, true) => &[
                (TopRight, R_),
                (Right, R_),
                (BottomRight, R_),
                (BottomLeft, R_),
                (TopLeft, R_),
                (Bottom, R_),
                (Top, R_),
                (TopRight, L_),
                (BottomRight, L_),
                (BottomLeft, L_),
                (Left, L_),
                (TopLeft, L_),
                (Bottom, L_),
                (Top, L_),
            ],
        };
        list.iter().copied().collect()
    }

    fn update_secondary(&mut self) {
        self.secondary = if self.large {
            match self.sight {
                Sight::ToRight => BattlePosition::new(self.main.x + 1, self.main.y),
                Sight::ToLeft => BattlePosition::new(self.main.x - 1, self.main.y),
            }
        } else {
            self.main
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32, y: i32) -> BattlePosition {
        BattlePosition::new(x, y)
    }

    #[test]
    fn large_unit_occupies_cell_in_sight_direction() {
        let att = BattlePositionExtended::new(p(0, 5), Sight::ToRight, true);
        assert_eq!(att.secondary(), p(1, 5));
        assert_eq!(att.right(), p(1, 5));
        assert_eq!(att.left(), p(0, 5));

        let def = BattlePositionExtended::new(p(14, 5), Sight::ToLeft, true);
        assert_eq!(def.secondary(), p(13, 5));
        assert_eq!(def.left(), p(13, 5));
        assert_eq!(def.right(), p(14, 5));
    }

    #[test]
    fn small_unit_cells_coincide() {
        let pos = BattlePositionExtended::new(p(3, 3), Sight::ToLeft, false);
        assert_eq!(pos.left(), pos.right());
        assert_eq!(pos.cells().len(), 1);
    }

    #[test]
    fn set_right_keeps_large_body_on_field_side() {
        let mut pos = BattlePositionExtended::new(p(0, 0), Sight::ToRight, true);
        pos.set_right(p(5, 2));
        assert_eq!(pos.main(), p(4, 2));
        assert_eq!(pos.right(), p(5, 2));
    }

    #[test]
    fn suggestion_for_right_attack_stands_left_of_target() {
        let start = BattlePositionExtended::new(p(0, 4), Sight::ToRight, false);
        let pos = start.suggest_for_attack(p(6, 4), AttackDirection::Right);
        assert_eq!(pos.main(), p(5, 4));
        let wide = BattlePositionExtended::new(p(0, 4), Sight::ToRight, true);
        let pos = wide.suggest_for_attack(p(6, 4), AttackDirection::Right);
        assert_eq!(pos.right(), p(5, 4));
        assert_eq!(pos.main(), p(4, 4));
    }

    #[test]
    fn shortest_distance_uses_closest_cells() {
        let a = BattlePositionExtended::new(p(2, 2), Sight::ToRight, true);
        let b = BattlePositionExtended::new(p(6, 2), Sight::ToLeft, true);
        // a covers x=2..3, b covers x=5..6
        assert_eq!(a.shortest_hex_distance(&b), 2);
        assert_eq!(a.shortest_hex_distance_to_cell(p(6, 2)), 3);
    }

    #[test]
    fn suggestion_counts_match_widths() {
        assert_eq!(BattlePositionExtended::attack_suggestions(false, false).len(), 6);
        assert_eq!(BattlePositionExtended::attack_suggestions(false, true).len(), 10);
        assert_eq!(BattlePositionExtended::attack_suggestions(true, false).len(), 8);
        assert_eq!(BattlePositionExtended::attack_suggestions(true, true).len(), 14);
    }
}
