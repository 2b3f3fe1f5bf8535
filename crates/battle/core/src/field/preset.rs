//! Static battlefield description and starting layouts.

use super::{BattleField, BattlePosition, PositionSet};
use crate::state::Side;

/// Arrangement of the two armies at battle start.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum FieldLayout {
    /// Attackers on the left edge, defenders on the right edge.
    #[default]
    Standard,
    /// Attackers in the middle, defenders around them.
    Object,
    Churchyard1,
    Churchyard2,
    Ruins,
    Spit,
}

/// Anchor points of non-standard defender layouts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LayoutAnchor {
    TopRight,
    Right,
    BottomRight,
    BottomLeft,
    Left,
    TopLeft,
    Top,
    Bottom,
}

// Pseudo x: -1 is the right edge, -2 is the centre column.
const RIGHT_EDGE: i32 = -1;
const CENTRE: i32 = -2;

const SPARSE_ROWS: [&[i32]; 8] = [
    &[],
    &[5],
    &[2, 8],
    &[2, 5, 8],
    &[0, 4, 6, 10],
    &[0, 2, 5, 8, 10],
    &[0, 2, 4, 6, 8, 10],
    &[0, 2, 4, 5, 6, 8, 10],
];

const COMPACT_ROWS: [&[i32]; 8] = [
    &[],
    &[5],
    &[4, 6],
    &[4, 5, 6],
    &[2, 4, 6, 8],
    &[2, 4, 5, 6, 8],
    &[0, 2, 4, 6, 8, 10],
    &[0, 2, 4, 5, 6, 8, 10],
];

const SURROUNDED_ATTACKERS: [BattlePosition; 7] = [
    BattlePosition::new(5, 3),
    BattlePosition::new(9, 3),
    BattlePosition::new(4, 5),
    BattlePosition::new(7, 5),
    BattlePosition::new(10, 5),
    BattlePosition::new(5, 7),
    BattlePosition::new(9, 7),
];

/// Field size, static obstacles and starting layout.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldPreset {
    pub field: BattleField,
    #[cfg_attr(feature = "serde", serde(default))]
    pub obstacles: PositionSet,
    #[cfg_attr(feature = "serde", serde(default))]
    pub layout: FieldLayout,
}

impl FieldPreset {
    pub fn new(field: BattleField) -> Self {
        Self {
            field,
            obstacles: PositionSet::new(),
            layout: FieldLayout::Standard,
        }
    }

    #[must_use]
    pub fn with_obstacles(mut self, obstacles: impl IntoIterator<Item = BattlePosition>) -> Self {
        self.obstacles.extend(obstacles);
        self
    }

    #[must_use]
    pub fn with_layout(mut self, layout: FieldLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Starting cell of the `index`-th stack out of `total` on `side`.
    ///
    /// Returns `None` when the layout has no room for that stack.
    pub fn calc_position(&self, side: Side, index: usize, total: usize, compact: bool) -> Option<BattlePosition> {
        let pseudo = match (side, self.layout) {
            (Side::Attacker, FieldLayout::Standard) => {
                BattlePosition::new(0, Self::standard_row(index, total, compact)?)
            }
            (Side::Attacker, _) => *SURROUNDED_ATTACKERS.get(index)?,
            (Side::Defender, FieldLayout::Standard) => {
                BattlePosition::new(RIGHT_EDGE, Self::standard_row(index, total, compact)?)
            }
            (Side::Defender, layout) => Self::anchor_position(*Self::anchors(layout).get(index)?),
        };
        Some(self.resolve(pseudo))
    }

    fn standard_row(index: usize, total: usize, compact: bool) -> Option<i32> {
        let rows = if compact { &COMPACT_ROWS } else { &SPARSE_ROWS };
        rows.get(total)?.get(index).copied()
    }

    fn anchors(layout: FieldLayout) -> &'static [LayoutAnchor] {
        use LayoutAnchor::*;
        match layout {
            FieldLayout::Standard => &[],
            FieldLayout::Object => &[TopRight, BottomRight, BottomLeft, TopLeft, Right],
            FieldLayout::Churchyard1 => &[TopRight, BottomRight, BottomLeft, TopLeft, Right, Left],
            FieldLayout::Churchyard2 => &[TopRight, BottomRight, BottomLeft, TopLeft, Top, Bottom],
            FieldLayout::Ruins => &[TopRight, BottomRight, BottomLeft, TopLeft, Top],
            FieldLayout::Spit => &[Right, Left, Bottom, Top],
        }
    }

    fn anchor_position(anchor: LayoutAnchor) -> BattlePosition {
        match anchor {
            LayoutAnchor::TopRight => BattlePosition::new(RIGHT_EDGE, 0),
            LayoutAnchor::Right => BattlePosition::new(RIGHT_EDGE, 5),
            LayoutAnchor::BottomRight => BattlePosition::new(RIGHT_EDGE, 10),
            LayoutAnchor::TopLeft => BattlePosition::new(1, 0),
            LayoutAnchor::Left => BattlePosition::new(1, 5),
            LayoutAnchor::BottomLeft => BattlePosition::new(1, 10),
            LayoutAnchor::Top => BattlePosition::new(CENTRE, 0),
            LayoutAnchor::Bottom => BattlePosition::new(CENTRE, 10),
        }
    }

    fn resolve(&self, pseudo: BattlePosition) -> BattlePosition {
        match pseudo.x {
            RIGHT_EDGE => BattlePosition::new(self.field.width - 1, pseudo.y),
            CENTRE => BattlePosition::new(self.field.width / 2, pseudo.y),
            _ => pseudo,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preset(layout: FieldLayout) -> FieldPreset {
        FieldPreset::new(BattleField::new(15, 11)).with_layout(layout)
    }

    #[test]
    fn standard_layout_uses_edges() {
        let preset = preset(FieldLayout::Standard);
        assert_eq!(
            preset.calc_position(Side::Attacker, 0, 1, false),
            Some(BattlePosition::new(0, 5))
        );
        assert_eq!(
            preset.calc_position(Side::Defender, 2, 3, false),
            Some(BattlePosition::new(14, 8))
        );
        assert_eq!(
            preset.calc_position(Side::Defender, 1, 2, true),
            Some(BattlePosition::new(14, 6))
        );
    }

    #[test]
    fn surrounded_layout_places_attackers_in_centre() {
        let preset = preset(FieldLayout::Object);
        assert_eq!(
            preset.calc_position(Side::Attacker, 3, 7, false),
            Some(BattlePosition::new(7, 5))
        );
        assert_eq!(
            preset.calc_position(Side::Defender, 4, 5, false),
            Some(BattlePosition::new(14, 5))
        );
    }

    #[test]
    fn overflowing_defender_has_no_position() {
        let preset = preset(FieldLayout::Spit);
        assert_eq!(
            preset.calc_position(Side::Defender, 3, 5, false),
            Some(BattlePosition::new(7, 0))
        );
        assert_eq!(preset.calc_position(Side::Defender, 4, 5, false), None);
    }
}
