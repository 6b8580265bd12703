use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

use crate::{EngineError, parser};

/// Signed money amount represented as **integer cents**.
///
/// Use this type for **all** monetary values in the engine (till balances,
/// virtual balances, collected cash) to avoid floating-point drift.
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// let amount = Money::new(1_250_50);
/// assert_eq!(amount.minor(), 125050);
/// assert_eq!(amount.to_string(), "1,250.50");
/// ```
///
/// Parsing goes through the lenient currency parser, so both separator
/// conventions are understood:
///
/// ```rust
/// use engine::Money;
///
/// assert_eq!("1.250,50".parse::<Money>().unwrap().minor(), 125050);
/// assert_eq!("200,80".parse::<Money>().unwrap().minor(), 20080);
/// assert!("abc".parse::<Money>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Largest amount accepted from operator input: one trillion major units.
    pub const MAX_INPUT: Money = Money(100_000_000_000_000);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(minor: i64) -> Self {
        Self(minor)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Clamps negative amounts to zero.
    #[must_use]
    pub fn at_least_zero(self) -> Self {
        Self(self.0.max(0))
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    /// Addition clamped to the representable range.
    #[must_use]
    pub fn saturating_add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }

    /// Subtraction clamped to the representable range.
    #[must_use]
    pub fn saturating_sub(self, rhs: Money) -> Money {
        Money(self.0.saturating_sub(rhs.0))
    }

    /// Clamps the magnitude to [`MAX_INPUT`](Self::MAX_INPUT).
    #[must_use]
    pub fn clamp_input(self) -> Money {
        Money(self.0.clamp(-Self::MAX_INPUT.0, Self::MAX_INPUT.0))
    }

    /// Converts a major-unit decimal (e.g. `12.345`) into cents, rounding half
    /// away from zero. Returns `None` when the value does not fit.
    #[must_use]
    pub fn from_decimal(value: Decimal) -> Option<Money> {
        value
            .checked_mul(Decimal::ONE_HUNDRED)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .map(Money)
    }

    /// Returns the amount in major units.
    #[must_use]
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Applies a rate (e.g. `0.05` for 5%) rounding to the nearest cent.
    #[must_use]
    pub fn apply_rate(self, rate: Decimal) -> Money {
        let scaled = Decimal::from(self.0) * rate;
        scaled
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .map(Money)
            .unwrap_or(Money::ZERO)
    }

    /// Returns `self * numerator / denominator` rounded half away from zero.
    ///
    /// `denominator` must be non-zero.
    #[must_use]
    pub(crate) fn scale(self, numerator: Money, denominator: Money) -> Money {
        debug_assert!(!denominator.is_zero());
        let num = i128::from(self.0) * i128::from(numerator.0);
        let den = i128::from(denominator.0);
        let quotient = num / den;
        let remainder = num % den;
        let rounded = if 2 * remainder.abs() >= den.abs() {
            quotient + if (num < 0) == (den < 0) { 1 } else { -1 }
        } else {
            quotient
        };
        Money(i64::try_from(rounded).unwrap_or(if rounded < 0 { i64::MIN } else { i64::MAX }))
    }
}

impl fmt::Display for Money {
    /// Two fixed decimals, dot decimal separator, comma thousands grouping.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = (abs / 100).to_string();
        let cents = abs % 100;

        let mut grouped = String::with_capacity(units.len() + units.len() / 3);
        for (idx, ch) in units.chars().enumerate() {
            if idx > 0 && (units.len() - idx) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        write!(f, "{sign}{grouped}.{cents:02}")
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Money> for i64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl FromStr for Money {
    type Err = EngineError;

    /// Parses human input with the lenient currency rules, but rejects input
    /// that carries no number at all.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parser::try_parse_text(s)
            .ok_or_else(|| EngineError::Validation(format!("\"{}\" is not an amount", s.trim())))
    }
}
