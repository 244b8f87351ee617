// ============================================================================
// Item Domain Model
// One product line inside an order
// ============================================================================

use crate::numeric::{Money, NumericError, NumericResult, Weight};
use std::fmt;
use uuid::Uuid;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ItemId(Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A line item: `quantity` units of one product.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Item {
    pub id: ItemId,

    /// Product name or SKU, informational only
    pub product: String,

    /// Number of units, at least 1
    pub quantity: u32,

    /// Price of a single unit
    pub unit_price: Money,

    /// Physical weight of a single unit
    pub unit_weight: Weight,
}

impl Item {
    pub fn new(
        product: impl Into<String>,
        quantity: u32,
        unit_price: Money,
        unit_weight: Weight,
    ) -> Self {
        Self {
            id: ItemId::new(),
            product: product.into(),
            quantity,
            unit_price,
            unit_weight,
        }
    }

    /// `quantity × unit_price`
    pub fn line_subtotal(&self) -> NumericResult<Money> {
        self.unit_price.checked_mul_int(self.quantity)
    }

    /// `quantity × unit_weight`
    pub fn line_weight(&self) -> NumericResult<Weight> {
        self.unit_weight
            .checked_mul(Weight::from(self.quantity))
            .ok_or(NumericError::Overflow)
    }

    /// Reject zero quantities and negative weights.
    pub fn validate(&self) -> Result<(), String> {
        if self.quantity == 0 {
            return Err(format!("Item {} quantity must be at least 1", self.id));
        }

        if self.unit_weight.is_sign_negative() && !self.unit_weight.is_zero() {
            return Err(format!("Item {} unit weight cannot be negative", self.id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_line_subtotal() {
        let item = Item::new("tea", 3, "19.99".parse().unwrap(), Decimal::new(25, 2));
        assert_eq!(item.line_subtotal().unwrap(), "59.97".parse().unwrap());
        assert_eq!(item.line_weight().unwrap(), Decimal::new(75, 2));
    }

    #[test]
    fn test_validation() {
        let ok = Item::new("tea", 1, Money::ZERO, Decimal::ZERO);
        assert!(ok.validate().is_ok());

        let zero_qty = Item::new("tea", 0, Money::ZERO, Decimal::ONE);
        assert!(zero_qty.validate().is_err());

        let negative = Item::new("tea", 1, Money::ZERO, Decimal::NEGATIVE_ONE);
        assert!(negative.validate().is_err());
    }
}
