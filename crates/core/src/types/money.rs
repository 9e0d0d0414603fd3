//! Rupiah amounts using decimal arithmetic.
//!
//! Prices, subtotals and report revenue are `NUMERIC(12,2)` columns. They are
//! carried as [`Decimal`] so no float rounding sneaks into order totals.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An amount of Indonesian Rupiah.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero rupiah.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Whole rupiah.
    #[must_use]
    pub fn from_rupiah(amount: i64) -> Self {
        Self(Decimal::from(amount))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Multiply a unit price by a quantity.
    #[must_use]
    pub fn times(self, quantity: i32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Format for display with thousands separators, e.g. `Rp 150.000`.
    ///
    /// Rupiah are shown without fractional digits; amounts are rounded
    /// half-away-from-zero to whole rupiah.
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self
            .0
            .round_dp_with_strategy(0, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
        let digits = rounded.abs().trunc().to_string();

        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        if rounded.is_sign_negative() && !rounded.is_zero() {
            format!("-Rp {grouped}")
        } else {
            format!("Rp {grouped}")
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Mul<i32> for Money {
    type Output = Self;

    fn mul(self, rhs: i32) -> Self::Output {
        self.times(rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Money {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Money {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        Ok(Self(<Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Money {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Money::from_rupiah(150_000).display(), "Rp 150.000");
        assert_eq!(Money::from_rupiah(1_250_000).display(), "Rp 1.250.000");
        assert_eq!(Money::from_rupiah(999).display(), "Rp 999");
        assert_eq!(Money::ZERO.display(), "Rp 0");
    }

    #[test]
    fn test_display_rounds_to_whole_rupiah() {
        let money = Money::new(Decimal::from_str("12500.50").unwrap_or_default());
        assert_eq!(money.display(), "Rp 12.501");
    }

    #[test]
    fn test_display_negative() {
        assert_eq!(Money::from_rupiah(-15_000).display(), "-Rp 15.000");
    }

    #[test]
    fn test_times_and_sum() {
        let lines = [
            Money::from_rupiah(85_000).times(2),
            Money::from_rupiah(120_000) * 1,
        ];
        let total: Money = lines.into_iter().sum();
        assert_eq!(total, Money::from_rupiah(290_000));
    }

    #[test]
    fn test_is_negative() {
        assert!(Money::from_rupiah(-1).is_negative());
        assert!(!Money::ZERO.is_negative());
        assert!(!Money::from_rupiah(1).is_negative());
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&Money::from_rupiah(5000)).unwrap_or_default();
        assert_eq!(json, "\"5000\"");
    }
}
