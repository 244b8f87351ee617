// ============================================================================
// Group Domain Model
// A campaign whose orders share one cost pool
// ============================================================================

use super::order::{Order, OrderId};
use crate::numeric::{Money, NumericError, NumericResult, Weight};
use std::fmt;
use uuid::Uuid;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GroupId(Uuid);

impl GroupId {
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

impl Default for GroupId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Shared amount divided among the orders of a group (e.g. shipping).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CostPool {
    pub total: Money,
}

impl CostPool {
    pub fn new(total: Money) -> Self {
        Self { total }
    }
}

/// A campaign: one cost pool and every order sharing it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub cost_pool: CostPool,
    pub orders: Vec<Order>,
}

impl Group {
    pub fn new(name: impl Into<String>, pool_total: Money) -> Self {
        Self {
            id: GroupId::new(),
            name: name.into(),
            cost_pool: CostPool::new(pool_total),
            orders: Vec::new(),
        }
    }

    /// Builder method: Add an order
    pub fn with_order(mut self, order: Order) -> Self {
        self.orders.push(order);
        self
    }

    pub fn order(&self, order_id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|order| order.id == order_id)
    }

    pub fn order_mut(&mut self, order_id: OrderId) -> Option<&mut Order> {
        self.orders.iter_mut().find(|order| order.id == order_id)
    }

    pub fn remove_order(&mut self, order_id: OrderId) -> Option<Order> {
        let index = self.orders.iter().position(|order| order.id == order_id)?;
        Some(self.orders.remove(index))
    }

    /// Sum of all order weights.
    pub fn total_weight(&self) -> NumericResult<Weight> {
        self.orders.iter().try_fold(Weight::ZERO, |acc, order| {
            acc.checked_add(order.weight()?)
                .ok_or(NumericError::Overflow)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Item;
    use rust_decimal::Decimal;

    #[test]
    fn test_group_lookup() {
        let order = Order::new("alice").with_item(Item::new(
            "rice",
            2,
            Money::from_integer(5).unwrap(),
            Decimal::new(15, 1),
        ));
        let order_id = order.id;
        let mut group = Group::new("June run", Money::from_integer(40).unwrap())
            .with_order(order)
            .with_order(Order::new("bob"));

        assert_eq!(group.order(order_id).unwrap().buyer, "alice");
        assert_eq!(group.total_weight().unwrap(), Decimal::new(3, 0));

        assert!(group.remove_order(order_id).is_some());
        assert!(group.order(order_id).is_none());
        assert_eq!(group.total_weight().unwrap(), Decimal::ZERO);
    }
}
