// ============================================================================
// Allocation Configuration
// Tolerance, rendering and verification settings for the cascade
// ============================================================================

use crate::numeric::{CurrencyFormat, Money};
use rust_decimal::Decimal;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Comprehensive configuration for creating a recalculation cascade
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AllocationConfig {
    /// Maximum absolute difference the validator accepts between an
    /// expected and an actual sum
    pub tolerance: Decimal,

    /// How amounts are rendered in logs and reports
    pub currency: CurrencyFormat,

    /// Run the invariant validator after every cascade and attach the report
    /// to the outcome. Failed checks are logged, never raised.
    pub verify_after_cascade: bool,
}

impl AllocationConfig {
    pub fn new(tolerance: Decimal) -> Self {
        Self {
            tolerance,
            currency: CurrencyFormat::default(),
            verify_after_cascade: false,
        }
    }

    /// Builder method: Set the validator tolerance
    pub fn with_tolerance(mut self, tolerance: Decimal) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Builder method: Set the currency format
    pub fn with_currency(mut self, currency: CurrencyFormat) -> Self {
        self.currency = currency;
        self
    }

    /// Builder method: Validate the group after every cascade run
    pub fn with_verification(mut self, enabled: bool) -> Self {
        self.verify_after_cascade = enabled;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.tolerance.is_sign_negative() && !self.tolerance.is_zero() {
            return Err("Tolerance cannot be negative".to_string());
        }

        // A tolerance of a full cent would hide a real one-cent drift
        if self.tolerance >= Decimal::new(1, 2) {
            return Err("Tolerance must be below one cent".to_string());
        }

        if self.currency.thousands_separator == self.currency.decimal_separator {
            return Err("Thousands and decimal separators must differ".to_string());
        }

        Ok(())
    }
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self::new(Money::DEFAULT_TOLERANCE)
    }
}

// ============================================================================
// Preset Configurations (Factory Methods)
// ============================================================================

impl AllocationConfig {
    /// Exact comparison and a validator pass after every cascade.
    /// Suited to tests and reconciliation jobs.
    pub fn strict() -> Self {
        Self::new(Decimal::ZERO).with_verification(true)
    }
}
