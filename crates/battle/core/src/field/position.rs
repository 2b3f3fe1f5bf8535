//! Hex cell coordinates and directions.
//!
//! The battlefield uses offset coordinates: even rows are shifted half a cell
//! to the right. Distances, neighbours and the Cartesian projection all follow
//! that convention.

use core::ops::Add;

/// A single hex cell.
///
/// Ordering is lexicographic on `(x, y)`; several tie-breaks (closest cell,
/// chain targeting) rely on it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattlePosition {
    pub x: i32,
    pub y: i32,
}

impl BattlePosition {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Number of steps between two cells on the hex grid.
    ///
    /// ```
    /// # use battle_core::field::BattlePosition;
    /// let origin = BattlePosition::new(0, 0);
    /// assert_eq!(origin.hex_distance(BattlePosition::new(2, 2)), 3);
    /// assert_eq!(origin.hex_distance(BattlePosition::new(4, 3)), 5);
    /// ```
    pub const fn hex_distance(&self, to: BattlePosition) -> i32 {
        let du = (to.y / 2 + to.x) - (self.y / 2 + self.x);
        let dv = to.y - self.y;
        let adu = du.abs();
        let adv = dv.abs();
        if (du >= 0 && dv >= 0) || (du < 0 && dv < 0) {
            if adu > adv { adu } else { adv }
        } else {
            adu + adv
        }
    }

    /// Projection onto a doubled Cartesian grid.
    pub const fn to_cartesian(&self) -> (i32, i32) {
        let even_row = self.y % 2 == 0;
        (self.x * 2 + if even_row { 1 } else { 0 }, self.y * 2)
    }

    pub const fn cartesian_distance_sqr(&self, to: BattlePosition) -> i32 {
        let (x1, y1) = self.to_cartesian();
        let (x2, y2) = to.to_cartesian();
        let dx = x1 - x2;
        let dy = y1 - y2;
        dx * dx + dy * dy
    }

    /// Adjacent cell in `direction`. The result may lie outside the field.
    pub const fn neighbour(&self, direction: BattleDirection) -> BattlePosition {
        let odd_row = self.y % 2 == 1;
        let even_right_step = if odd_row { 0 } else { 1 };
        let odd_left_step = if odd_row { -1 } else { 0 };
        let (dx, dy) = match direction {
            BattleDirection::TopRight => (even_right_step, -1),
            BattleDirection::Right => (1, 0),
            BattleDirection::BottomRight => (even_right_step, 1),
            BattleDirection::BottomLeft => (odd_left_step, 1),
            BattleDirection::Left => (-1, 0),
            BattleDirection::TopLeft => (odd_left_step, -1),
        };
        BattlePosition::new(self.x + dx, self.y + dy)
    }
}

impl Add for BattlePosition {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl core::fmt::Display for BattlePosition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the six hex neighbours.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleDirection {
    TopRight,
    Right,
    BottomRight,
    BottomLeft,
    Left,
    TopLeft,
}

impl BattleDirection {
    pub const ALL: [BattleDirection; 6] = [
        Self::TopRight,
        Self::Right,
        Self::BottomRight,
        Self::BottomLeft,
        Self::Left,
        Self::TopLeft,
    ];
}

/// Direction of a melee strike, seen from the attacker.
///
/// `Top` and `Bottom` only exist for large attackers hitting straight up or
/// down across their two cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttackDirection {
    TopRight,
    Right,
    BottomRight,
    BottomLeft,
    Left,
    TopLeft,
    Top,
    Bottom,
}

impl AttackDirection {
    /// The direction a retaliation travels back in.
    pub const fn inverse(self) -> Self {
        match self {
            Self::TopRight => Self::BottomLeft,
            Self::Right => Self::Left,
            Self::BottomRight => Self::TopLeft,
            Self::BottomLeft => Self::TopRight,
            Self::Left => Self::Right,
            Self::TopLeft => Self::BottomRight,
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32, y: i32) -> BattlePosition {
        BattlePosition::new(x, y)
    }

    #[test]
    fn hex_distance_reference_values() {
        assert_eq!(p(0, 0).hex_distance(p(0, 0)), 0);
        assert_eq!(p(0, 0).hex_distance(p(1, 0)), 1);
        assert_eq!(p(0, 0).hex_distance(p(0, 1)), 1);
        assert_eq!(p(0, 0).hex_distance(p(1, 1)), 1);
        assert_eq!(p(0, 0).hex_distance(p(2, 1)), 2);
        assert_eq!(p(2, 1).hex_distance(p(0, 0)), 2);
        assert_eq!(p(0, 0).hex_distance(p(2, 2)), 3);
        assert_eq!(p(0, 0).hex_distance(p(2, 0)), 2);
        assert_eq!(p(1, 2).hex_distance(p(3, 1)), 2);
        assert_eq!(p(1, 2).hex_distance(p(3, 2)), 2);
    }

    #[test]
    fn neighbours_are_one_step_away() {
        for origin in [p(4, 4), p(4, 5)] {
            for direction in BattleDirection::ALL {
                assert_eq!(origin.hex_distance(origin.neighbour(direction)), 1);
            }
        }
    }

    #[test]
    fn even_rows_shift_right() {
        assert_eq!(p(3, 2).neighbour(BattleDirection::TopRight), p(4, 1));
        assert_eq!(p(3, 3).neighbour(BattleDirection::TopRight), p(3, 2));
        assert_eq!(p(3, 3).neighbour(BattleDirection::BottomLeft), p(2, 4));
        assert_eq!(p(0, 0).to_cartesian(), (1, 0));
        assert_eq!(p(0, 1).to_cartesian(), (0, 2));
    }

    #[test]
    fn inverse_is_involution() {
        for direction in [
            AttackDirection::TopRight,
            AttackDirection::Right,
            AttackDirection::Top,
            AttackDirection::Bottom,
        ] {
            assert_eq!(direction.inverse().inverse(), direction);
        }
    }
}
