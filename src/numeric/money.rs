// ============================================================================
// Money
// Non-negative two-decimal amounts with a single rounding policy
// ============================================================================

use super::errors::{NumericError, NumericResult};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Physical weight of a recipient or item. Any precision, never negative.
pub type Weight = Decimal;

/// Monetary amount with exactly two decimal digits.
///
/// Internally stores `value × 100` (integer cents) as an i64. The value is
/// never negative: every constructor and every arithmetic operation rejects
/// results below zero.
///
/// All producing operations route through [`Money::round`], which is the
/// only place the rounding policy (half away from zero) is defined.
///
/// # Example
/// ```
/// use shipping_allocation::numeric::Money;
///
/// let a = Money::try_from_f64(0.1).unwrap();
/// let b = Money::try_from_f64(0.2).unwrap();
/// assert_eq!(a.checked_add(b).unwrap().to_string(), "0.30");
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "i64"))]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    /// The scale factor (10^2)
    pub const SCALE: i64 = 100;

    /// Zero value
    pub const ZERO: Self = Self(0);

    /// Default tolerance for [`Money::approx_eq`]: half a cent.
    pub const DEFAULT_TOLERANCE: Decimal = Decimal::from_parts(5, 0, 0, false, 3);

    // ========================================================================
    // Construction
    // ========================================================================

    /// Round an arbitrary decimal to two digits, half away from zero.
    ///
    /// Scales by 100, rounds to the nearest integer and rescales.
    ///
    /// # Errors
    /// - `InvalidInput` if `value` is negative
    /// - `Overflow` if the value does not fit in i64 cents
    pub fn round(value: Decimal) -> NumericResult<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(NumericError::InvalidInput);
        }

        let scaled = value
            .checked_mul(Decimal::from(Self::SCALE))
            .ok_or(NumericError::Overflow)?;
        let rounded = scaled.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

        rounded.to_i64().map(Self).ok_or(NumericError::Overflow)
    }

    /// Create from integer cents.
    ///
    /// # Errors
    /// Returns `InvalidInput` for negative cents.
    #[inline]
    pub fn from_cents(cents: i64) -> NumericResult<Self> {
        if cents < 0 {
            Err(NumericError::InvalidInput)
        } else {
            Ok(Self(cents))
        }
    }

    /// Create from a whole number of currency units.
    #[inline]
    pub fn from_integer(units: i64) -> NumericResult<Self> {
        units
            .checked_mul(Self::SCALE)
            .ok_or(NumericError::Overflow)
            .and_then(Self::from_cents)
    }

    /// Create from whole units and cents (`cents` must be < 100).
    ///
    /// ```
    /// use shipping_allocation::numeric::Money;
    ///
    /// assert_eq!(Money::from_parts(133, 34).unwrap().to_string(), "133.34");
    /// ```
    #[inline]
    pub fn from_parts(units: i64, cents: u8) -> NumericResult<Self> {
        if i64::from(cents) >= Self::SCALE {
            return Err(NumericError::InvalidInput);
        }

        Self::from_integer(units)?.checked_add(Self(i64::from(cents)))
    }

    /// Create from a float coming in over an untyped boundary.
    ///
    /// # Errors
    /// Returns `InvalidInput` for NaN, infinities and negative values.
    pub fn try_from_f64(value: f64) -> NumericResult<Self> {
        if !Self::is_valid(value) {
            return Err(NumericError::InvalidInput);
        }

        let decimal = Decimal::from_f64(value).ok_or(NumericError::Overflow)?;
        Self::round(decimal)
    }

    /// Whether a raw float is acceptable as a monetary value.
    #[inline]
    pub fn is_valid(value: f64) -> bool {
        value.is_finite() && value >= 0.0
    }

    /// Convert from an exact decimal.
    ///
    /// Unlike [`Money::round`], this refuses values carrying more than two
    /// significant decimal digits.
    ///
    /// # Errors
    /// - `InvalidInput` if negative
    /// - `PrecisionLoss` if rounding would change the value
    /// - `Overflow` if the value is too large
    pub fn from_decimal(value: Decimal) -> NumericResult<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(NumericError::InvalidInput);
        }
        if value.round_dp(2) != value {
            return Err(NumericError::PrecisionLoss);
        }

        Self::round(value)
    }

    /// Convert to rust_decimal::Decimal with scale 2.
    #[inline]
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Get the raw value in cents.
    #[inline]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Get the whole-unit part.
    #[inline]
    pub const fn integer_part(self) -> i64 {
        self.0 / Self::SCALE
    }

    /// Get the cents part.
    #[inline]
    pub const fn fractional_part(self) -> i64 {
        self.0 % Self::SCALE
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    // ========================================================================
    // Arithmetic Operations
    // ========================================================================

    /// Checked addition.
    ///
    /// # Errors
    /// Returns `Overflow` if the result is out of range.
    #[inline]
    pub fn checked_add(self, rhs: Self) -> NumericResult<Self> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or(NumericError::Overflow)
    }

    /// Checked subtraction.
    ///
    /// # Errors
    /// Returns `Underflow` if `rhs` is larger than `self`.
    #[inline]
    pub fn checked_sub(self, rhs: Self) -> NumericResult<Self> {
        if rhs.0 > self.0 {
            Err(NumericError::Underflow)
        } else {
            Ok(Self(self.0 - rhs.0))
        }
    }

    /// Multiply by a decimal factor, rounding the product.
    ///
    /// # Errors
    /// - `InvalidInput` if the factor is negative
    /// - `Overflow` if the product is out of range
    pub fn checked_mul(self, factor: Decimal) -> NumericResult<Self> {
        let product = self
            .to_decimal()
            .checked_mul(factor)
            .ok_or(NumericError::Overflow)?;
        Self::round(product)
    }

    /// Multiply by a whole quantity. Exact, no rounding needed.
    #[inline]
    pub fn checked_mul_int(self, quantity: u32) -> NumericResult<Self> {
        self.0
            .checked_mul(i64::from(quantity))
            .map(Self)
            .ok_or(NumericError::Overflow)
    }

    /// Divide by a decimal, rounding the quotient.
    ///
    /// # Errors
    /// - `DivisionByZero` if `divisor` is zero
    /// - `InvalidInput` if `divisor` is negative
    pub fn checked_div(self, divisor: Decimal) -> NumericResult<Self> {
        if divisor.is_zero() {
            return Err(NumericError::DivisionByZero);
        }

        let quotient = self
            .to_decimal()
            .checked_div(divisor)
            .ok_or(NumericError::Overflow)?;
        Self::round(quotient)
    }

    /// Sum amounts in cent space. Equivalent to rounding the exact total once.
    pub fn sum<I>(values: I) -> NumericResult<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        values
            .into_iter()
            .try_fold(Self::ZERO, |acc, value| acc.checked_add(value))
    }

    // ========================================================================
    // Comparison
    // ========================================================================

    /// Tolerant comparison of two raw decimals: `|a - b| <= tolerance`.
    ///
    /// ```
    /// use rust_decimal::Decimal;
    /// use shipping_allocation::numeric::Money;
    ///
    /// let tol = Money::DEFAULT_TOLERANCE;
    /// assert!(Money::approx_eq(Decimal::new(10_001, 3), Decimal::new(10_000, 3), tol));
    /// assert!(!Money::approx_eq(Decimal::new(1002, 2), Decimal::new(1000, 2), tol));
    /// ```
    #[inline]
    pub fn approx_eq(a: Decimal, b: Decimal, tolerance: Decimal) -> bool {
        (a - b).abs() <= tolerance
    }

    /// Compare two amounts within `tolerance`.
    #[inline]
    pub fn equals_within(self, other: Self, tolerance: Decimal) -> bool {
        Self::approx_eq(self.to_decimal(), other.to_decimal(), tolerance)
    }

    /// Compare two amounts within [`Money::DEFAULT_TOLERANCE`].
    #[inline]
    pub fn equals(self, other: Self) -> bool {
        self.equals_within(other, Self::DEFAULT_TOLERANCE)
    }

    // ========================================================================
    // Formatting
    // ========================================================================

    /// Render as a currency string, e.g. `$1,234.50`.
    pub fn format(self, format: &CurrencyFormat) -> String {
        let digits = self.integer_part().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(format.thousands_separator);
            }
            grouped.push(ch);
        }

        format!(
            "{}{}{}{:02}",
            format.symbol,
            grouped,
            format.decimal_separator,
            self.fractional_part()
        )
    }
}

// ============================================================================
// Currency Format
// ============================================================================

/// Rendering rules for [`Money::format`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CurrencyFormat {
    /// Prefix symbol, e.g. `$` or `NT$`
    pub symbol: String,
    pub thousands_separator: char,
    pub decimal_separator: char,
}

impl CurrencyFormat {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }

    /// Builder method: Set grouping and decimal separators
    pub fn with_separators(mut self, thousands: char, decimal: char) -> Self {
        self.thousands_separator = thousands;
        self.decimal_separator = decimal;
        self
    }
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self {
            symbol: "$".to_string(),
            thousands_separator: ',',
            decimal_separator: '.',
        }
    }
}

// ============================================================================
// Trait Implementations
// ============================================================================

impl fmt::Debug for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Money({})", self)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.integer_part(), self.fractional_part())
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.to_decimal()
    }
}

impl TryFrom<Decimal> for Money {
    type Error = NumericError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::from_decimal(value)
    }
}

/// Cents, as stored. Negative values are rejected.
impl TryFrom<i64> for Money {
    type Error = NumericError;

    fn try_from(cents: i64) -> Result<Self, Self::Error> {
        Self::from_cents(cents)
    }
}

impl std::str::FromStr for Money {
    type Err = NumericError;

    /// Parse from a decimal string.
    ///
    /// # Examples
    /// - "123" -> 123.00
    /// - "0.5" -> 0.50
    /// - "1.999" -> PrecisionLoss
    /// - "-1" -> InvalidInput
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(NumericError::InvalidInput);
        }

        let value: Decimal = s.parse().map_err(|_| NumericError::InvalidInput)?;
        Self::from_decimal(value)
    }
}

// ============================================================================
// Tests
// ============================================================================
