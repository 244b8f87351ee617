// ============================================================================
// Numeric Module
// Two-decimal monetary arithmetic
// ============================================================================
//
// This module provides:
// - Money: non-negative amount stored as integer cents
// - CurrencyFormat: rendering rules for human-facing output
// - NumericError: Error types for arithmetic operations
//
// Design principles:
// - No floating-point operations past the input boundary
// - All arithmetic returns Result (no panics)
// - One rounding policy (half away from zero), defined in Money::round

mod errors;
mod money;

pub use errors::{NumericError, NumericResult};
pub use money::{CurrencyFormat, Money, Weight};
