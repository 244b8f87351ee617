// ============================================================================
// Distribution Algorithm Interface
// Defines the contract for splitting a total across weighted recipients
// ============================================================================

use crate::domain::Recipient;
use crate::numeric::{Money, NumericError, NumericResult, Weight};

/// Strategy pattern interface for distribution algorithms
pub trait DistributionAlgorithm: Send + Sync {
    /// Split `total` across `weights`
    ///
    /// # Arguments
    /// * `total` - The amount to divide
    /// * `weights` - Non-negative weights, in recipient order
    ///
    /// # Returns
    /// One amount per weight, in the same order, summing exactly to `total`
    fn distribute(&self, total: Money, weights: &[Weight]) -> NumericResult<Vec<Money>>;

    /// Get the algorithm name for logging
    fn name(&self) -> &str;

    /// Distribute into recipients in place, filling `allocated_fee`
    fn distribute_to(&self, total: Money, recipients: &mut [Recipient]) -> NumericResult<()> {
        let weights: Vec<Weight> = recipients.iter().map(|r| r.weight).collect();
        let fees = self.distribute(total, &weights)?;

        if fees.len() != recipients.len() {
            return Err(NumericError::InvalidInput);
        }

        for (recipient, fee) in recipients.iter_mut().zip(fees) {
            recipient.allocated_fee = Some(fee);
        }

        Ok(())
    }
}
