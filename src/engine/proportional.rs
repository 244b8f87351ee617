// ============================================================================
// Proportional Distribution Algorithm
// Weight-proportional split with exact sum conservation
// ============================================================================

use crate::interfaces::DistributionAlgorithm;
use crate::numeric::{Money, NumericError, NumericResult, Weight};

/// Proportional distribution algorithm
///
/// Allocates a total across recipients in proportion to their weights.
/// Every share but the last is rounded independently; the last recipient by
/// input position absorbs the accumulated rounding residue, so the shares
/// always sum to exactly the total.
///
/// # Example
/// ```text
/// Total: 10.00
///   A weight 1 -> round(1/3 * 10.00) = 3.33
///   B weight 1 -> round(1/3 * 10.00) = 3.33
///   C weight 1 -> 10.00 - 6.66      = 3.34
/// ```
///
/// The residue position is literal. Callers wanting another policy (e.g.
/// largest remainder first) reorder the weights before the call and restore
/// the order afterwards.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProportionalDistributor;

impl ProportionalDistributor {
    pub fn new() -> Self {
        Self
    }
}

impl DistributionAlgorithm for ProportionalDistributor {
    fn distribute(&self, total: Money, weights: &[Weight]) -> NumericResult<Vec<Money>> {
        let Some(last) = weights.len().checked_sub(1) else {
            return Ok(Vec::new());
        };

        if weights.iter().any(|w| w.is_sign_negative() && !w.is_zero()) {
            return Err(NumericError::InvalidInput);
        }

        let weight_total = weights
            .iter()
            .try_fold(Weight::ZERO, |acc, w| acc.checked_add(*w))
            .ok_or(NumericError::Overflow)?;

        // No weight, no share. Not an even split.
        if weight_total.is_zero() {
            return Ok(vec![Money::ZERO; weights.len()]);
        }

        let total_decimal = total.to_decimal();
        let mut allocations = Vec::with_capacity(weights.len());
        let mut distributed = Money::ZERO;

        for weight in &weights[..last] {
            // Multiply first: an exact half-cent share must not be truncated
            // below the midpoint by a non-terminating ratio.
            let share = weight
                .checked_mul(total_decimal)
                .and_then(|product| product.checked_div(weight_total))
                .ok_or(NumericError::Overflow)?;

            // Many rounded-up shares of a tiny total can overshoot it;
            // capping keeps the residue for the last recipient non-negative.
            let remaining = total.checked_sub(distributed)?;
            let allocation = Money::round(share)?.min(remaining);

            distributed = distributed.checked_add(allocation)?;
            allocations.push(allocation);
        }

        allocations.push(total.checked_sub(distributed)?);

        Ok(allocations)
    }

    fn name(&self) -> &str {
        "Proportional"
    }
}

/// Split `total` across `weights` with the [`ProportionalDistributor`].
///
/// ```
/// use rust_decimal::Decimal;
/// use shipping_allocation::engine::distribute;
/// use shipping_allocation::numeric::Money;
///
/// let fees = distribute(Money::from_integer(10).unwrap(), &[Decimal::ONE; 3]).unwrap();
/// let rendered: Vec<String> = fees.iter().map(ToString::to_string).collect();
/// assert_eq!(rendered, ["3.33", "3.33", "3.34"]);
/// ```
pub fn distribute(total: Money, weights: &[Weight]) -> NumericResult<Vec<Money>> {
    ProportionalDistributor.distribute(total, weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Recipient;
    use proptest::prelude::*;
    use rust_decimal::{Decimal, RoundingStrategy};

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    fn weights(values: &[i64]) -> Vec<Weight> {
        values.iter().map(|v| Decimal::from(*v)).collect()
    }

    fn amounts(values: &[&str]) -> Vec<Money> {
        values.iter().map(|v| money(v)).collect()
    }

    #[test]
    fn test_empty_weights() {
        assert!(distribute(money("100.00"), &[]).unwrap().is_empty());
    }

    #[test]
    fn test_zero_weight_policy() {
        let fees = distribute(money("100.00"), &weights(&[0, 0, 0])).unwrap();
        assert_eq!(fees, vec![Money::ZERO; 3]);
    }

    #[test]
    fn test_single_recipient() {
        assert_eq!(
            distribute(money("50.00"), &weights(&[1])).unwrap(),
            amounts(&["50.00"])
        );
        // A lone weightless recipient still gets nothing, zero weight wins
        assert_eq!(
            distribute(money("50.00"), &weights(&[0])).unwrap(),
            vec![Money::ZERO]
        );
    }

    #[test]
    fn test_equal_weights_remainder_goes_last() {
        assert_eq!(
            distribute(money("10.00"), &weights(&[1, 1, 1])).unwrap(),
            amounts(&["3.33", "3.33", "3.34"])
        );
    }

    #[test]
    fn test_weighted_split() {
        let fees = distribute(money("100.00"), &weights(&[1, 2, 3])).unwrap();
        assert_eq!(fees, amounts(&["16.67", "33.33", "50.00"]));
        assert_eq!(Money::sum(fees).unwrap(), money("100.00"));
    }

    #[test]
    fn test_zero_total() {
        let fees = distribute(Money::ZERO, &weights(&[3, 1, 4])).unwrap();
        assert_eq!(fees, vec![Money::ZERO; 3]);
    }

    #[test]
    fn test_residue_follows_input_position() {
        // Same weights, different order: the last slot always takes the residue
        let forward = distribute(money("10.00"), &weights(&[2, 1, 1])).unwrap();
        assert_eq!(forward, amounts(&["5.00", "2.50", "2.50"]));

        let fees = distribute(money("1.00"), &weights(&[1, 1, 1, 3])).unwrap();
        assert_eq!(fees, amounts(&["0.17", "0.17", "0.17", "0.49"]));
    }

    #[test]
    fn test_midpoint_share_rounds_away_from_zero() {
        // 1/12 of 1000.02 is exactly 83.335
        let fees = distribute(money("1000.02"), &weights(&[1, 11])).unwrap();
        assert_eq!(fees, amounts(&["83.34", "916.68"]));

        // 1/6 of 0.03 is exactly 0.005
        let fees = distribute(money("0.03"), &weights(&[1, 5])).unwrap();
        assert_eq!(fees, amounts(&["0.01", "0.02"]));
    }

    #[test]
    fn test_fractional_weights() {
        let fees = distribute(
            money("12.00"),
            &[Decimal::new(25, 2), Decimal::new(75, 2)],
        )
        .unwrap();
        assert_eq!(fees, amounts(&["3.00", "9.00"]));
    }

    #[test]
    fn test_tiny_total_never_goes_negative() {
        // round(0.05 / 9) = 0.01 per slot would overshoot by the fifth share
        let fees = distribute(money("0.05"), &vec![Decimal::ONE; 9]).unwrap();
        assert_eq!(Money::sum(fees.clone()).unwrap(), money("0.05"));
        assert_eq!(fees[..5], amounts(&["0.01", "0.01", "0.01", "0.01", "0.01"])[..]);
        assert!(fees[5..].iter().all(|fee| fee.is_zero()));
    }

    #[test]
    fn test_negative_weight_rejected() {
        assert_eq!(
            distribute(money("10.00"), &weights(&[1, -1])),
            Err(NumericError::InvalidInput)
        );
    }

    #[test]
    fn test_distribute_to_recipients() {
        let mut recipients = vec![
            Recipient::new(Decimal::from(10)),
            Recipient::new(Decimal::from(10)),
            Recipient::new(Decimal::from(10)),
        ];
        ProportionalDistributor::new()
            .distribute_to(money("400.00"), &mut recipients)
            .unwrap();

        let fees: Vec<Money> = recipients.iter().filter_map(|r| r.allocated_fee).collect();
        assert_eq!(fees, amounts(&["133.33", "133.33", "133.34"]));
    }

    proptest! {
        #[test]
        fn prop_sum_is_conserved(
            total_cents in 0i64..100_000_000,
            raw in prop::collection::vec(0u32..10_000, 1..40),
        ) {
            let total = Money::from_cents(total_cents).unwrap();
            let weights: Vec<Weight> = raw.iter().map(|w| Decimal::new(i64::from(*w), 2)).collect();

            let fees = distribute(total, &weights).unwrap();
            prop_assert_eq!(fees.len(), weights.len());

            let weight_total: Decimal = weights.iter().sum();
            if weight_total.is_zero() {
                prop_assert!(fees.iter().all(|fee| fee.is_zero()));
            } else {
                prop_assert_eq!(Money::sum(fees).unwrap(), total);
            }
        }

        #[test]
        fn prop_is_deterministic(
            total_cents in 0i64..1_000_000,
            raw in prop::collection::vec(0u32..500, 1..20),
        ) {
            let total = Money::from_cents(total_cents).unwrap();
            let weights: Vec<Weight> = raw.iter().map(|w| Decimal::from(*w)).collect();
            prop_assert_eq!(distribute(total, &weights), distribute(total, &weights));
        }

        #[test]
        fn prop_shares_are_rounded_exact_value(
            total_cents in 0i64..1_000_000,
            raw in prop::collection::vec(1u32..500, 2..20),
        ) {
            let total = Money::from_cents(total_cents).unwrap();
            let weights: Vec<Weight> = raw.iter().map(|w| Decimal::from(*w)).collect();
            let weight_total: Decimal = weights.iter().sum();
            let fees = distribute(total, &weights).unwrap();

            // Non-last shares are round(w * T / W), or whatever was left when
            // that would overshoot the total
            let mut remaining = total;
            for (fee, weight) in fees.iter().zip(&weights).take(weights.len() - 1) {
                let exact = weight * total.to_decimal() / weight_total;
                let rounded = exact.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
                if rounded <= remaining.to_decimal() {
                    prop_assert_eq!(fee.to_decimal(), rounded);
                    prop_assert!((fee.to_decimal() - exact).abs() <= Decimal::new(5, 3));
                } else {
                    prop_assert_eq!(*fee, remaining);
                }
                remaining = remaining.checked_sub(*fee).unwrap();
            }
            prop_assert_eq!(fees[weights.len() - 1], remaining);
        }
    }
}
