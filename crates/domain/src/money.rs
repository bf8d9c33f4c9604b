// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Fixed-point amounts with two decimal places.
//!
//! Rates are stored and computed in hundredths (cents) so that rounding is
//! exact and deterministic. Percentages supplied to bulk edits use the same
//! representation (`12.5%` is `1250` hundredths).

use num_traits::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const SCALE: i64 = 100;
const PERCENT_SCALE: i128 = 10_000;

/// Integer division rounding half away from zero (`ROUND_HALF_UP`).
const fn div_round_half_up(numerator: i128, denominator: i128) -> i128 {
    let half: i128 = denominator / 2;
    if numerator >= 0 {
        (numerator + half) / denominator
    } else {
        -((-numerator + half) / denominator)
    }
}

/// A decimal amount with exactly two fractional digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(i64);

impl Amount {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Creates an amount from hundredths (e.g. `15000` is `150.00`).
    #[must_use]
    pub const fn from_hundredths(hundredths: i64) -> Self {
        Self(hundredths)
    }

    /// Creates an amount from whole units.
    #[must_use]
    pub const fn from_units(units: i64) -> Self {
        Self(units.saturating_mul(SCALE))
    }

    /// Converts a floating point value, rounding to the nearest hundredth.
    ///
    /// Returns `None` for non-finite or out-of-range values.
    #[must_use]
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        (value * 100.0).round().to_i64().map(Self)
    }

    /// Returns the raw value in hundredths.
    #[must_use]
    pub const fn hundredths(self) -> i64 {
        self.0
    }

    /// Returns the value as a float, for wire formats.
    #[must_use]
    pub fn to_f64(self) -> f64 {
        self.0.to_f64().unwrap_or_default() / 100.0
    }

    /// Returns the whole-unit part, truncated toward zero.
    #[must_use]
    pub const fn truncated_units(self) -> i64 {
        self.0 / SCALE
    }

    /// Returns true if the amount is below zero.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Returns the amount with its sign flipped, saturating on overflow.
    #[must_use]
    pub const fn negated(self) -> Self {
        Self(self.0.saturating_neg())
    }

    /// Returns the amount floored at zero.
    #[must_use]
    pub const fn floored_at_zero(self) -> Self {
        if self.0 < 0 { Self::ZERO } else { self }
    }

    /// Adds two amounts, saturating on overflow.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Subtracts two amounts, saturating on overflow.
    #[must_use]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Scales by `(1 + percent / 100)`, rounding half-up to the hundredth.
    ///
    /// `percent` is itself an amount (`10.00` means ten percent); negative
    /// percentages decrease the value.
    #[must_use]
    pub fn scale_by_percent(self, percent: Self) -> Self {
        let factor: i128 = PERCENT_SCALE + i128::from(percent.0);
        let scaled: i128 = div_round_half_up(i128::from(self.0) * factor, PERCENT_SCALE);
        Self(scaled.to_i64().unwrap_or(if scaled < 0 { i64::MIN } else { i64::MAX }))
    }

    /// Multiplies by a floating point factor, rounding to the hundredth.
    ///
    /// Used for channel rate multipliers, which are configured as decimals.
    #[must_use]
    pub fn multiplied_by(self, factor: f64) -> Option<Self> {
        Self::from_f64(self.to_f64() * factor)
    }

    /// Divides by a floating point factor, rounding to the hundredth.
    ///
    /// Returns `None` for a zero or non-finite divisor.
    #[must_use]
    pub fn divided_by(self, factor: f64) -> Option<Self> {
        if factor.abs() < f64::EPSILON || !factor.is_finite() {
            return None;
        }
        Self::from_f64(self.to_f64() / factor)
    }
}

/// Scales a whole number by `(1 + percent / 100)`, truncating toward zero.
#[must_use]
pub fn scale_whole_by_percent(value: i64, percent: Amount) -> i64 {
    let factor: i128 = PERCENT_SCALE + i128::from(percent.hundredths());
    let scaled: i128 = i128::from(value) * factor / PERCENT_SCALE;
    scaled
        .to_i64()
        .unwrap_or(if scaled < 0 { i64::MIN } else { i64::MAX })
}

/// Adds a fixed-point amount to a whole number, truncating toward zero.
#[must_use]
pub fn add_amount_to_whole(value: i64, amount: Amount) -> i64 {
    value
        .saturating_mul(SCALE)
        .saturating_add(amount.hundredths())
        / SCALE
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign: &str = if self.0 < 0 { "-" } else { "" };
        let abs: u64 = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value: f64 = f64::deserialize(deserializer)?;
        Self::from_f64(value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid amount: {value}")))
    }
}
