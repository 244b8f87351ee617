// ============================================================================
// Order Domain Model
// ============================================================================

use super::item::{Item, ItemId};
use crate::numeric::{Money, NumericError, NumericResult, Weight};
use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Value Objects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderId(Uuid);

impl OrderId {
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

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The derived amounts of an order, as last written by the cascade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderAmounts {
    /// Sum of line subtotals
    pub subtotal: Money,

    /// This order's share of the group cost pool
    pub shipping_fee: Money,

    /// `subtotal + shipping_fee`
    pub total: Money,
}

// ============================================================================
// Order
// ============================================================================

/// One buyer's order inside a group.
///
/// `items` and `is_paid` belong to the caller. The amounts are derived and
/// only the recalculation cascade writes them; between an item mutation and
/// the next cascade run they are stale.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Order {
    pub id: OrderId,

    /// Buyer handle, informational only
    pub buyer: String,

    pub items: Vec<Item>,

    pub is_paid: bool,

    amounts: OrderAmounts,

    updated_at: DateTime<Utc>,
}

impl Order {
    /// Create an empty, unpaid order with zero amounts.
    pub fn new(buyer: impl Into<String>) -> Self {
        Self {
            id: OrderId::new(),
            buyer: buyer.into(),
            items: Vec::new(),
            is_paid: false,
            amounts: OrderAmounts::default(),
            updated_at: Utc::now(),
        }
    }

    /// Rehydrate an order from storage, amounts included.
    pub fn from_stored(
        id: OrderId,
        buyer: String,
        items: Vec<Item>,
        is_paid: bool,
        amounts: OrderAmounts,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            buyer,
            items,
            is_paid,
            amounts,
            updated_at,
        }
    }

    /// Builder method: Add an item
    pub fn with_item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    pub fn add_item(&mut self, item: Item) -> ItemId {
        let id = item.id;
        self.items.push(item);
        id
    }

    pub fn remove_item(&mut self, item_id: ItemId) -> Option<Item> {
        let index = self.items.iter().position(|item| item.id == item_id)?;
        Some(self.items.remove(index))
    }

    pub fn item_mut(&mut self, item_id: ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|item| item.id == item_id)
    }

    // ========================================================================
    // Derived values
    // ========================================================================

    /// Sum of the line subtotals of the current item set.
    pub fn compute_subtotal(&self) -> NumericResult<Money> {
        self.items
            .iter()
            .try_fold(Money::ZERO, |acc, item| acc.checked_add(item.line_subtotal()?))
    }

    /// Sum of `quantity × unit_weight` over the current item set.
    pub fn weight(&self) -> NumericResult<Weight> {
        self.items.iter().try_fold(Weight::ZERO, |acc, item| {
            acc.checked_add(item.line_weight()?)
                .ok_or(NumericError::Overflow)
        })
    }

    // ========================================================================
    // Stored amounts
    // ========================================================================

    pub fn amounts(&self) -> OrderAmounts {
        self.amounts
    }

    pub fn subtotal(&self) -> Money {
        self.amounts.subtotal
    }

    pub fn shipping_fee(&self) -> Money {
        self.amounts.shipping_fee
    }

    pub fn total(&self) -> Money {
        self.amounts.total
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub(crate) fn set_amounts(&mut self, amounts: OrderAmounts) {
        self.amounts = amounts;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    #[test]
    fn test_order_creation() {
        let order = Order::new("alice");
        assert_eq!(order.buyer, "alice");
        assert!(order.items.is_empty());
        assert!(!order.is_paid);
        assert_eq!(order.amounts(), OrderAmounts::default());
    }

    #[test]
    fn test_subtotal_and_weight() {
        let order = Order::new("bob")
            .with_item(Item::new("rice", 2, money("12.50"), Decimal::new(5, 0)))
            .with_item(Item::new("tea", 1, money("3.20"), Decimal::new(25, 2)));

        assert_eq!(order.compute_subtotal().unwrap(), money("28.20"));
        assert_eq!(order.weight().unwrap(), Decimal::new(1025, 2));
    }

    #[test]
    fn test_item_mutations() {
        let mut order = Order::new("carol");
        let item_id = order.add_item(Item::new("rice", 1, money("1.00"), Decimal::ONE));

        order.item_mut(item_id).unwrap().quantity = 4;
        assert_eq!(order.compute_subtotal().unwrap(), money("4.00"));

        let removed = order.remove_item(item_id).unwrap();
        assert_eq!(removed.quantity, 4);
        assert!(order.remove_item(item_id).is_none());
        assert_eq!(order.compute_subtotal().unwrap(), Money::ZERO);
        assert_eq!(order.weight().unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_set_amounts_touches_timestamp() {
        let mut order = Order::new("dave");
        let before = order.updated_at();
        let amounts = OrderAmounts {
            subtotal: money("10.00"),
            shipping_fee: money("2.50"),
            total: money("12.50"),
        };
        order.set_amounts(amounts);
        assert_eq!(order.total(), money("12.50"));
        assert!(order.updated_at() >= before);
    }
}
