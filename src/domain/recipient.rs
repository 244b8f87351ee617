// ============================================================================
// Recipient
// A weighted participant in a proportional distribution
// ============================================================================

use crate::numeric::{Money, Weight};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Recipient {
    /// Share weight, never negative, may be zero
    pub weight: Weight,

    /// Output of the distribution, `None` until allocated
    pub allocated_fee: Option<Money>,
}

impl Recipient {
    pub fn new(weight: Weight) -> Self {
        Self {
            weight,
            allocated_fee: None,
        }
    }
}
