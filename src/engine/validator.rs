// ============================================================================
// Invariant Validator
// Read-only audit of a group's stored amounts
// ============================================================================

use crate::domain::{Group, GroupId, OrderId};
use crate::numeric::{Money, NumericResult};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which invariant a check or violation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Invariant {
    /// Sum of shipping fees equals the cost pool total
    ShippingDistribution,
    /// Sum of totals equals sum of subtotals plus the cost pool total
    TotalCalculation,
    /// Sum of totals equals paid totals plus unpaid totals
    PaidUnpaidSum,
    /// An order subtotal equals the sum of its line subtotals
    OrderSubtotal,
    /// An order total equals its subtotal plus its shipping fee
    OrderTotal,
    /// An order without weight carries no shipping fee
    ZeroWeightFee,
}

impl fmt::Display for Invariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Invariant::ShippingDistribution => "shipping_distribution",
            Invariant::TotalCalculation => "total_calculation",
            Invariant::PaidUnpaidSum => "paid_unpaid_sum",
            Invariant::OrderSubtotal => "order_subtotal",
            Invariant::OrderTotal => "order_total",
            Invariant::ZeroWeightFee => "zero_weight_fee",
        };
        f.write_str(name)
    }
}

/// Outcome of one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CheckResult {
    pub passed: bool,
    pub expected: Money,
    pub actual: Money,
}

impl CheckResult {
    fn compare(expected: Money, actual: Money, tolerance: Decimal) -> Self {
        Self {
            passed: expected.equals_within(actual, tolerance),
            expected,
            actual,
        }
    }
}

/// A failed check, as data.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InvariantViolation {
    pub invariant: Invariant,
    /// Set for per-order invariants
    pub order_id: Option<OrderId>,
    pub expected: Money,
    pub actual: Money,
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.order_id {
            Some(order_id) => write!(
                f,
                "{} violated for order {}: expected {}, actual {}",
                self.invariant, order_id, self.expected, self.actual
            ),
            None => write!(
                f,
                "{} violated: expected {}, actual {}",
                self.invariant, self.expected, self.actual
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ValidationChecks {
    pub shipping_distribution: CheckResult,
    pub total_calculation: CheckResult,
    pub paid_unpaid_sum: CheckResult,
}

/// Group-level validation result. `passed` is the conjunction of all checks.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ValidationReport {
    pub group_id: GroupId,
    pub passed: bool,
    pub checks: ValidationChecks,
    pub checked_at: DateTime<Utc>,
}

impl ValidationReport {
    /// Failed checks as violations, in check order.
    pub fn violations(&self) -> Vec<InvariantViolation> {
        [
            (Invariant::ShippingDistribution, self.checks.shipping_distribution),
            (Invariant::TotalCalculation, self.checks.total_calculation),
            (Invariant::PaidUnpaidSum, self.checks.paid_unpaid_sum),
        ]
        .into_iter()
        .filter(|(_, check)| !check.passed)
        .map(|(invariant, check)| InvariantViolation {
            invariant,
            order_id: None,
            expected: check.expected,
            actual: check.actual,
        })
        .collect()
    }

    /// Pretty JSON for diagnostic endpoints.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Re-derives the invariants the cascade maintains. Performs no writes, so it
/// may run at any time without coordinating with cascade runs.
#[derive(Debug, Clone, Copy)]
pub struct InvariantValidator {
    tolerance: Decimal,
}

impl InvariantValidator {
    pub fn new(tolerance: Decimal) -> Self {
        Self { tolerance }
    }

    pub fn tolerance(&self) -> Decimal {
        self.tolerance
    }

    /// Run the three group-level checks.
    pub fn validate(&self, group: &Group) -> NumericResult<ValidationReport> {
        let pool_total = group.cost_pool.total;

        let fees = Money::sum(group.orders.iter().map(|o| o.shipping_fee()))?;
        let subtotals = Money::sum(group.orders.iter().map(|o| o.subtotal()))?;
        let totals = Money::sum(group.orders.iter().map(|o| o.total()))?;
        let paid = Money::sum(group.orders.iter().filter(|o| o.is_paid).map(|o| o.total()))?;
        let unpaid = Money::sum(group.orders.iter().filter(|o| !o.is_paid).map(|o| o.total()))?;

        let checks = ValidationChecks {
            shipping_distribution: CheckResult::compare(pool_total, fees, self.tolerance),
            total_calculation: CheckResult::compare(
                subtotals.checked_add(pool_total)?,
                totals,
                self.tolerance,
            ),
            paid_unpaid_sum: CheckResult::compare(
                paid.checked_add(unpaid)?,
                totals,
                self.tolerance,
            ),
        };

        let passed = checks.shipping_distribution.passed
            && checks.total_calculation.passed
            && checks.paid_unpaid_sum.passed;

        if !passed {
            tracing::warn!(group_id = %group.id, ?checks, "group failed validation");
        }

        Ok(ValidationReport {
            group_id: group.id,
            passed,
            checks,
            checked_at: Utc::now(),
        })
    }

    /// Per-order checks: subtotal matches items, total is subtotal + fee,
    /// and weightless orders carry no fee.
    pub fn audit_orders(&self, group: &Group) -> NumericResult<Vec<InvariantViolation>> {
        let mut violations = Vec::new();

        for order in &group.orders {
            let subtotal = order.compute_subtotal()?;
            if subtotal != order.subtotal() {
                violations.push(InvariantViolation {
                    invariant: Invariant::OrderSubtotal,
                    order_id: Some(order.id),
                    expected: subtotal,
                    actual: order.subtotal(),
                });
            }

            let total = order.subtotal().checked_add(order.shipping_fee())?;
            if total != order.total() {
                violations.push(InvariantViolation {
                    invariant: Invariant::OrderTotal,
                    order_id: Some(order.id),
                    expected: total,
                    actual: order.total(),
                });
            }

            if order.weight()?.is_zero() && !order.shipping_fee().is_zero() {
                violations.push(InvariantViolation {
                    invariant: Invariant::ZeroWeightFee,
                    order_id: Some(order.id),
                    expected: Money::ZERO,
                    actual: order.shipping_fee(),
                });
            }
        }

        Ok(violations)
    }
}

impl Default for InvariantValidator {
    fn default() -> Self {
        Self::new(Money::DEFAULT_TOLERANCE)
    }
}
