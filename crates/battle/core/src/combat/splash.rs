//! Cells hit in addition to the main target.

use crate::env::SplashAttack;
use crate::field::{
    AttackDirection, BattleDirection, BattleField, BattlePositionExtended, PositionSet, Sight,
};

/// Extra cells a melee splash of kind `splash` covers when striking from
/// `from` in `direction`.
///
/// The result may contain empty cells, the attacker or the main target;
/// callers filter those out.
pub fn splash_extra_cells(
    field: &BattleField,
    splash: SplashAttack,
    from: &BattlePositionExtended,
    direction: AttackDirection,
) -> PositionSet {
    use AttackDirection as A;
    use BattleDirection as D;

    let facing_right = from.sight() == Sight::ToRight;
    match splash {
        SplashAttack::Sides => match direction {
            A::Right => field.valid_neighbours(from.right(), &[D::BottomRight, D::TopRight]),
            A::TopRight => field.valid_neighbours(from.right(), &[D::TopLeft, D::Right]),
            A::BottomRight => field.valid_neighbours(from.right(), &[D::BottomLeft, D::Right]),
            A::Left => field.valid_neighbours(from.left(), &[D::BottomLeft, D::TopLeft]),
            A::TopLeft => field.valid_neighbours(from.left(), &[D::TopRight, D::Left]),
            A::BottomLeft => field.valid_neighbours(from.left(), &[D::BottomRight, D::Left]),
            A::Top if facing_right => field.valid_neighbours(from.right(), &[D::TopRight]),
            A::Bottom if facing_right => field.valid_neighbours(from.right(), &[D::BottomRight]),
            A::Top => field.valid_neighbours(from.left(), &[D::TopLeft]),
            A::Bottom => field.valid_neighbours(from.left(), &[D::BottomLeft]),
        },
        SplashAttack::Neighbours => field.adjacent_to_extended(from),
        SplashAttack::Dragon => {
            // The cell behind the target, in the strike direction.
            let (origin, step) = match direction {
                A::Right => (from.right(), D::Right),
                A::TopRight => (from.right(), D::TopRight),
                A::BottomRight => (from.right(), D::BottomRight),
                A::Left => (from.left(), D::Left),
                A::TopLeft => (from.left(), D::TopLeft),
                A::BottomLeft => (from.left(), D::BottomLeft),
                A::Top if facing_right => (from.right(), D::TopLeft),
                A::Bottom if facing_right => (from.right(), D::BottomLeft),
                A::Top => (from.left(), D::TopRight),
                A::Bottom => (from.left(), D::BottomRight),
            };
            field.valid_neighbours(origin.neighbour(step), &[step])
        }
        SplashAttack::None | SplashAttack::Ranged => PositionSet::new(),
    }
}

/// Cells around the aimed tile hit by a ranged splash.
pub fn ranged_splash_cells(field: &BattleField, target: crate::field::BattlePosition) -> PositionSet {
    field.adjacent_set(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::BattlePosition;

    fn p(x: i32, y: i32) -> BattlePosition {
        BattlePosition::new(x, y)
    }

    #[test]
    fn dragon_breath_hits_cell_behind_target() {
        let field = BattleField::default();
        let from = BattlePositionExtended::new(p(4, 5), Sight::ToRight, true);
        let cells = splash_extra_cells(&field, SplashAttack::Dragon, &from, AttackDirection::Right);
        // right cell (5,5), target at (6,5), breath reaches (7,5)
        assert_eq!(cells.into_iter().collect::<Vec<_>>(), vec![p(7, 5)]);
    }

    #[test]
    fn sides_splash_flanks_the_strike() {
        let field = BattleField::default();
        let from = BattlePositionExtended::new(p(4, 4), Sight::ToRight, false);
        let cells = splash_extra_cells(&field, SplashAttack::Sides, &from, AttackDirection::Right);
        assert_eq!(cells.len(), 2);
        assert!(cells.contains(&p(4, 4).neighbour(BattleDirection::TopRight)));
        assert!(cells.contains(&p(4, 4).neighbour(BattleDirection::BottomRight)));
    }

    #[test]
    fn neighbours_splash_surrounds_attacker() {
        let field = BattleField::default();
        let from = BattlePositionExtended::new(p(7, 5), Sight::ToRight, false);
        let cells = splash_extra_cells(&field, SplashAttack::Neighbours, &from, AttackDirection::Left);
        assert_eq!(cells.len(), 6);
        assert!(!cells.contains(&p(7, 5)));
    }

    #[test]
    fn ranged_splash_is_adjacent_ring() {
        let field = BattleField::default();
        assert_eq!(ranged_splash_cells(&field, p(7, 5)).len(), 6);
        assert!(splash_extra_cells(
            &field,
            SplashAttack::Ranged,
            &BattlePositionExtended::default(),
            AttackDirection::Right
        )
        .is_empty());
    }
}
