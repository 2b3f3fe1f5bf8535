//! Layered stat modifiers applied by spell effects.
//!
//! Every effect that touches a stat contributes one [`Bonus`]; the stack
//! folds them in a fixed order:
//! Flat → %Inc → More → Less → Clamp

/// Application layer of a [`Bonus`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum BonusKind {
    Flat,
    Increased,
    More,
    Less,
}

/// A single change to a stat value.
///
/// - **Flat**: additive, applied first (+3 attack)
/// - **Increased**: percentages, summed then multiplied (+20%)
/// - **More**: multipliers applied one by one (50 = ×1.5)
/// - **Less**: reductions applied one by one (10 = ×0.9)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Bonus {
    Flat(i64),
    Increased(i64),
    More(i64),
    Less(i64),
}

impl Bonus {
    pub fn new(kind: BonusKind, value: i64) -> Self {
        match kind {
            BonusKind::Flat => Bonus::Flat(value),
            BonusKind::Increased => Bonus::Increased(value),
            BonusKind::More => Bonus::More(value),
            BonusKind::Less => Bonus::Less(value),
        }
    }

    pub fn kind(&self) -> BonusKind {
        match self {
            Bonus::Flat(_) => BonusKind::Flat,
            Bonus::Increased(_) => BonusKind::Increased,
            Bonus::More(_) => BonusKind::More,
            Bonus::Less(_) => BonusKind::Less,
        }
    }
}

/// Bonuses collected for one stat, applied in layer order.
///
/// # Example
/// ```
/// # use battle_core::stats::{Bonus, BonusStack};
/// let mut stack = BonusStack::new();
/// stack.add(Bonus::Flat(5));       // +5
/// stack.add(Bonus::Increased(20)); // +20%
/// stack.add(Bonus::Increased(15)); // +15% (summed)
/// stack.add(Bonus::More(50));      // ×1.5
/// stack.add(Bonus::Less(10));      // ×0.9
///
/// // (10 + 5) × 1.35 × 1.5 × 0.9 = 27.3375
/// assert_eq!(stack.apply(10, 0, 99), 27);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BonusStack {
    bonuses: Vec<Bonus>,
}

impl BonusStack {
    pub fn new() -> Self {
        Self {
            bonuses: Vec::new(),
        }
    }

    pub fn add(&mut self, bonus: Bonus) {
        self.bonuses.push(bonus);
    }

    pub fn extend(&mut self, bonuses: impl IntoIterator<Item = Bonus>) {
        self.bonuses.extend(bonuses);
    }

    /// `clamp((base + flat) × (1 + inc/100) × Π(1 + more/100) × Π(1 - less/100), min, max)`
    pub fn apply(&self, base: i64, min: i64, max: i64) -> i64 {
        let flat_sum: i64 = self
            .bonuses
            .iter()
            .filter_map(|b| match b {
                Bonus::Flat(v) => Some(*v),
                _ => None,
            })
            .sum();

        let inc_sum: i64 = self
            .bonuses
            .iter()
            .filter_map(|b| match b {
                Bonus::Increased(p) => Some(*p),
                _ => None,
            })
            .sum();

        let after_inc = if inc_sum == 0 {
            base + flat_sum
        } else {
            (base + flat_sum) * (100 + inc_sum) / 100
        };

        let after_more = self
            .bonuses
            .iter()
            .filter_map(|b| match b {
                Bonus::More(p) => Some(*p),
                _ => None,
            })
            .fold(after_inc, |acc, more| acc * (100 + more) / 100);

        let after_less = self
            .bonuses
            .iter()
            .filter_map(|b| match b {
                Bonus::Less(p) => Some(*p),
                _ => None,
            })
            .fold(after_more, |acc, less| acc * (100 - less) / 100);

        after_less.clamp(min, max)
    }

    pub fn apply_unclamped(&self, base: i64) -> i64 {
        self.apply(base, i64::MIN, i64::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.bonuses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bonuses.len()
    }
}
