//! Exact rational arithmetic for chances and multipliers.
//!
//! Every probability, damage multiplier and resistance in the battle rules is
//! a [`BonusRatio`]. Floating point never enters the combat math, so a battle
//! replays identically on every platform.

use core::cmp::Ordering;
use core::fmt;
use core::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

/// Reduced fraction `num / denom` with a positive denominator.
///
/// # Example
/// ```
/// # use battle_core::stats::BonusRatio;
/// let half = BonusRatio::new(2, 4);
/// assert_eq!(half, BonusRatio::new(1, 2));
/// assert_eq!((half * 7).round_down(), 3);
/// assert!(half > BonusRatio::new(1, 3));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "(i64, i64)", into = "(i64, i64)"))]
pub struct BonusRatio {
    num: i64,
    denom: i64,
}

impl BonusRatio {
    pub const ZERO: Self = Self { num: 0, denom: 1 };
    pub const ONE: Self = Self { num: 1, denom: 1 };
    pub const HALF: Self = Self { num: 1, denom: 2 };

    /// Creates a reduced ratio.
    ///
    /// # Panics
    ///
    /// Panics if `denom` is zero. Use [`BonusRatio::checked`] for untrusted input.
    pub fn new(num: i64, denom: i64) -> Self {
        match Self::checked(num, denom) {
            Some(ratio) => ratio,
            None => panic!("BonusRatio denominator must not be zero"),
        }
    }

    /// Creates a reduced ratio, or `None` when `denom` is zero.
    pub fn checked(num: i64, denom: i64) -> Option<Self> {
        if denom == 0 {
            return None;
        }
        Some(Self::from_wide(num as i128, denom as i128))
    }

    pub const fn from_int(value: i64) -> Self {
        Self {
            num: value,
            denom: 1,
        }
    }

    pub const fn num(&self) -> i64 {
        self.num
    }

    pub const fn denom(&self) -> i64 {
        self.denom
    }

    pub const fn is_zero(&self) -> bool {
        self.num == 0
    }

    /// Integer part, truncated toward zero.
    pub const fn round_down(&self) -> i64 {
        self.num / self.denom
    }

    pub fn abs(self) -> Self {
        Self {
            num: self.num.abs(),
            denom: self.denom,
        }
    }

    /// Division that returns `None` instead of panicking on a zero divisor.
    pub fn checked_div(self, rhs: Self) -> Option<Self> {
        if rhs.num == 0 {
            return None;
        }
        Some(Self::from_wide(
            self.num as i128 * rhs.denom as i128,
            self.denom as i128 * rhs.num as i128,
        ))
    }

    /// `round_down(value + value * increase)`.
    ///
    /// ```
    /// # use battle_core::stats::BonusRatio;
    /// assert_eq!(BonusRatio::calc_add_increase(10, BonusRatio::new(1, 4)), 12);
    /// ```
    pub fn calc_add_increase(value: i64, increase: Self) -> i64 {
        let base = Self::from_int(value);
        (base + base * increase).round_down()
    }

    /// `max(round_down(value - value * decrease), min)`.
    ///
    /// ```
    /// # use battle_core::stats::BonusRatio;
    /// assert_eq!(BonusRatio::calc_sub_decrease(10, BonusRatio::new(1, 2), 1), 5);
    /// assert_eq!(BonusRatio::calc_sub_decrease(1, BonusRatio::new(9, 10), 1), 1);
    /// ```
    pub fn calc_sub_decrease(value: i64, decrease: Self, min: i64) -> i64 {
        let base = Self::from_int(value);
        (base - base * decrease).round_down().max(min)
    }

    fn from_wide(num: i128, denom: i128) -> Self {
        let (mut num, mut denom) = if denom < 0 { (-num, -denom) } else { (num, denom) };
        let divisor = gcd(num.unsigned_abs(), denom.unsigned_abs()) as i128;
        if divisor > 1 {
            num /= divisor;
            denom /= divisor;
        }
        // Lossy halving keeps the value within i64 range.
        while num > i64::MAX as i128 || num < i64::MIN as i128 || denom > i64::MAX as i128 {
            num /= 2;
            denom /= 2;
            if denom == 0 {
                denom = 1;
            }
        }
        Self {
            num: num as i64,
            denom: denom as i64,
        }
    }
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    if a == 0 { 1 } else { a }
}

impl Default for BonusRatio {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<i64> for BonusRatio {
    fn from(value: i64) -> Self {
        Self::from_int(value)
    }
}

impl From<BonusRatio> for (i64, i64) {
    fn from(value: BonusRatio) -> Self {
        (value.num, value.denom)
    }
}

impl TryFrom<(i64, i64)> for BonusRatio {
    type Error = &'static str;

    fn try_from((num, denom): (i64, i64)) -> Result<Self, Self::Error> {
        Self::checked(num, denom).ok_or("ratio denominator must not be zero")
    }
}

impl fmt::Display for BonusRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.denom)
    }
}

impl Ord for BonusRatio {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = self.num as i128 * other.denom as i128;
        let rhs = other.num as i128 * self.denom as i128;
        lhs.cmp(&rhs)
    }
}

impl PartialOrd for BonusRatio {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Add for BonusRatio {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::from_wide(
            self.num as i128 * rhs.denom as i128 + rhs.num as i128 * self.denom as i128,
            self.denom as i128 * rhs.denom as i128,
        )
    }
}

impl Sub for BonusRatio {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self + (-rhs)
    }
}

impl Neg for BonusRatio {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            num: -self.num,
            denom: self.denom,
        }
    }
}

impl Mul for BonusRatio {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::from_wide(
            self.num as i128 * rhs.num as i128,
            self.denom as i128 * rhs.denom as i128,
        )
    }
}

impl Mul<i64> for BonusRatio {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self {
        Self::from_wide(self.num as i128 * rhs as i128, self.denom as i128)
    }
}

impl Div for BonusRatio {
    type Output = Self;

    /// # Panics
    ///
    /// Panics when dividing by a zero ratio.
    fn div(self, rhs: Self) -> Self {
        match self.checked_div(rhs) {
            Some(ratio) => ratio,
            None => panic!("BonusRatio division by zero"),
        }
    }
}

impl Div<i64> for BonusRatio {
    type Output = Self;

    fn div(self, rhs: i64) -> Self {
        self / Self::from_int(rhs)
    }
}

impl AddAssign for BonusRatio {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for BonusRatio {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl MulAssign for BonusRatio {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}
