// ============================================================================
// In-Memory Order Store
// Transactional group storage backing the OrderRepository contract
// ============================================================================

use crate::domain::{Group, GroupId, Item, ItemId, Order, OrderId};
use crate::engine::{AllocationError, AllocationResult};
use crate::interfaces::OrderRepository;
use crate::numeric::Money;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Groups keyed by id, readable and writable only through transactions.
///
/// A transaction works on private copies of the groups it touches and
/// publishes them in one step when its closure returns `Ok`. Concurrent
/// transactions on the same group are last-writer-wins; serialize them with
/// [`GroupLocks`](crate::sync::GroupLocks).
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    groups: RwLock<HashMap<GroupId, Group>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a group as-is, stored amounts included.
    pub fn insert_group(&self, group: Group) -> GroupId {
        let group_id = group.id;
        self.groups.write().insert(group_id, group);
        group_id
    }

    /// Snapshot of a committed group.
    pub fn group(&self, group_id: GroupId) -> Option<Group> {
        self.groups.read().get(&group_id).cloned()
    }

    pub fn remove_group(&self, group_id: GroupId) -> Option<Group> {
        self.groups.write().remove(&group_id)
    }

    pub fn group_ids(&self) -> Vec<GroupId> {
        self.groups.read().keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.groups.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.read().is_empty()
    }

    /// Run `f` as one unit of work. Its writes become visible only if it
    /// returns `Ok`; on `Err` they are discarded.
    pub fn transaction<T, F>(&self, f: F) -> AllocationResult<T>
    where
        F: FnOnce(&mut StoreTransaction<'_>) -> AllocationResult<T>,
    {
        let mut tx = StoreTransaction {
            store: self,
            working: HashMap::new(),
        };

        match f(&mut tx) {
            Ok(value) => {
                let touched = tx.working.len();
                let mut groups = self.groups.write();
                for (group_id, group) in tx.working {
                    groups.insert(group_id, group);
                }
                tracing::debug!(groups = touched, "transaction committed");
                Ok(value)
            },
            Err(err) => {
                tracing::debug!(groups = tx.working.len(), error = %err, "transaction rolled back");
                Err(err)
            },
        }
    }
}

/// Handle to one open transaction of an [`InMemoryOrderStore`].
pub struct StoreTransaction<'a> {
    store: &'a InMemoryOrderStore,
    working: HashMap<GroupId, Group>,
}

impl StoreTransaction<'_> {
    // ========================================================================
    // Item-level mutations. None of these touch the derived amounts; run the
    // cascade afterwards in the same transaction.
    // ========================================================================

    pub fn add_order(&mut self, group_id: GroupId, order: Order) -> AllocationResult<OrderId> {
        let order_id = order.id;
        self.group_mut(group_id)?.orders.push(order);
        Ok(order_id)
    }

    pub fn delete_order(&mut self, group_id: GroupId, order_id: OrderId) -> AllocationResult<Order> {
        self.group_mut(group_id)?
            .remove_order(order_id)
            .ok_or(AllocationError::OrderNotFound { group_id, order_id })
    }

    pub fn add_item(
        &mut self,
        group_id: GroupId,
        order_id: OrderId,
        item: Item,
    ) -> AllocationResult<ItemId> {
        item.validate().map_err(AllocationError::InvalidInput)?;
        Ok(self.order_mut(group_id, order_id)?.add_item(item))
    }

    pub fn remove_item(
        &mut self,
        group_id: GroupId,
        order_id: OrderId,
        item_id: ItemId,
    ) -> AllocationResult<Item> {
        self.order_mut(group_id, order_id)?
            .remove_item(item_id)
            .ok_or_else(|| AllocationError::InvalidInput(format!("Item {} not in order {}", item_id, order_id)))
    }

    pub fn set_quantity(
        &mut self,
        group_id: GroupId,
        order_id: OrderId,
        item_id: ItemId,
        quantity: u32,
    ) -> AllocationResult<()> {
        if quantity == 0 {
            return Err(AllocationError::InvalidInput(
                "Quantity must be at least 1, remove the item instead".to_string(),
            ));
        }

        let item = self
            .order_mut(group_id, order_id)?
            .item_mut(item_id)
            .ok_or_else(|| AllocationError::InvalidInput(format!("Item {} not in order {}", item_id, order_id)))?;
        item.quantity = quantity;
        Ok(())
    }

    pub fn set_paid(&mut self, group_id: GroupId, order_id: OrderId, paid: bool) -> AllocationResult<()> {
        self.order_mut(group_id, order_id)?.is_paid = paid;
        Ok(())
    }

    pub fn set_cost_pool_total(&mut self, group_id: GroupId, total: Money) -> AllocationResult<()> {
        self.group_mut(group_id)?.cost_pool.total = total;
        Ok(())
    }

    // ========================================================================
    // Private methods
    // ========================================================================

    /// Working copy of a group, cloned from the store on first access.
    fn group_mut(&mut self, group_id: GroupId) -> AllocationResult<&mut Group> {
        if !self.working.contains_key(&group_id) {
            let group = self
                .store
                .group(group_id)
                .ok_or(AllocationError::GroupNotFound(group_id))?;
            self.working.insert(group_id, group);
        }

        self.working
            .get_mut(&group_id)
            .ok_or(AllocationError::GroupNotFound(group_id))
    }

    fn order_mut(&mut self, group_id: GroupId, order_id: OrderId) -> AllocationResult<&mut Order> {
        self.group_mut(group_id)?
            .order_mut(order_id)
            .ok_or(AllocationError::OrderNotFound { group_id, order_id })
    }
}

impl OrderRepository for StoreTransaction<'_> {
    fn load_group_with_orders(&mut self, group_id: GroupId) -> AllocationResult<Group> {
        Ok(self.group_mut(group_id)?.clone())
    }

    fn save_order(&mut self, group_id: GroupId, order: &Order) -> AllocationResult<()> {
        let group = self.group_mut(group_id)?;
        match group.order_mut(order.id) {
            Some(stored) => stored.set_amounts(order.amounts()),
            None => group.orders.push(order.clone()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{create_from_config, CascadeTrigger, InvariantValidator};
    use crate::domain::AllocationConfig;
    use crate::interfaces::NoOpEventHandler;
    use rust_decimal::Decimal;
    use std::sync::Arc;

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    fn seeded() -> (InMemoryOrderStore, GroupId, OrderId) {
        let order = Order::new("alice").with_item(Item::new("tea", 2, money("3.50"), Decimal::ONE));
        let order_id = order.id;
        let store = InMemoryOrderStore::new();
        let group_id = store.insert_group(Group::new("g", money("12.00")).with_order(order));
        (store, group_id, order_id)
    }

    #[test]
    fn test_commit_on_ok() {
        let (store, group_id, order_id) = seeded();

        store
            .transaction(|tx| {
                tx.set_paid(group_id, order_id, true)?;
                tx.set_cost_pool_total(group_id, money("20.00"))
            })
            .unwrap();

        let group = store.group(group_id).unwrap();
        assert!(group.orders[0].is_paid);
        assert_eq!(group.cost_pool.total, money("20.00"));
    }

    #[test]
    fn test_rollback_on_error() {
        let (store, group_id, order_id) = seeded();
        let before = store.group(group_id).unwrap();

        let result: AllocationResult<()> = store.transaction(|tx| {
            tx.set_paid(group_id, order_id, true)?;
            tx.set_cost_pool_total(group_id, money("99.00"))?;
            tx.delete_order(group_id, OrderId::new()).map(|_| ())
        });

        assert!(matches!(result, Err(AllocationError::OrderNotFound { .. })));
        assert_eq!(store.group(group_id).unwrap(), before);
    }

    #[test]
    fn test_missing_group() {
        let store = InMemoryOrderStore::new();
        let group_id = GroupId::new();
        let result = store.transaction(|tx| tx.load_group_with_orders(group_id));
        assert_eq!(result.unwrap_err(), AllocationError::GroupNotFound(group_id));
    }

    #[test]
    fn test_mutators_validate() {
        let (store, group_id, order_id) = seeded();
        let item_id = store.group(group_id).unwrap().orders[0].items[0].id;

        let zero = store.transaction(|tx| tx.set_quantity(group_id, order_id, item_id, 0));
        assert!(matches!(zero, Err(AllocationError::InvalidInput(_))));

        let bad_item = Item::new("rock", 1, money("1.00"), Decimal::NEGATIVE_ONE);
        let negative = store.transaction(|tx| tx.add_item(group_id, order_id, bad_item));
        assert!(matches!(negative, Err(AllocationError::InvalidInput(_))));

        let unknown = store.transaction(|tx| tx.remove_item(group_id, order_id, ItemId::new()));
        assert!(matches!(unknown, Err(AllocationError::InvalidInput(_))));
    }

    #[test]
    fn test_cascade_inside_transaction() {
        let (store, group_id, order_id) = seeded();
        let cascade = create_from_config(AllocationConfig::strict(), Arc::new(NoOpEventHandler)).unwrap();

        let outcome = store
            .transaction(|tx| {
                let other = tx.add_order(
                    group_id,
                    Order::new("bob").with_item(Item::new("mug", 1, money("8.00"), Decimal::from(2))),
                )?;
                cascade.on_order_changed(tx, group_id, other, CascadeTrigger::ItemAdded)
            })
            .unwrap();
        assert!(outcome.validation.unwrap().passed);

        let group = store.group(group_id).unwrap();
        assert_eq!(group.order(order_id).unwrap().subtotal(), money("7.00"));
        assert_eq!(group.order(order_id).unwrap().shipping_fee(), money("6.00"));
        assert_eq!(group.orders[1].shipping_fee(), money("6.00"));
        assert_eq!(group.orders[1].total(), money("14.00"));

        let report = InvariantValidator::default().validate(&group).unwrap();
        assert!(report.passed);
    }

    #[test]
    fn test_failed_cascade_leaves_store_untouched() {
        let (store, group_id, order_id) = seeded();
        let cascade = create_from_config(AllocationConfig::default(), Arc::new(NoOpEventHandler)).unwrap();
        let before = store.group(group_id).unwrap();

        let result = store.transaction(|tx| {
            tx.delete_order(group_id, order_id)?;
            // The deleted order is no longer there to anchor the run
            cascade.on_order_changed(tx, group_id, order_id, CascadeTrigger::ItemRemoved)
        });

        assert!(matches!(result, Err(AllocationError::OrderNotFound { .. })));
        assert_eq!(store.group(group_id).unwrap(), before);
    }

    #[test]
    fn test_save_order_is_idempotent() {
        let (store, group_id, order_id) = seeded();
        store
            .transaction(|tx| {
                let mut group = tx.load_group_with_orders(group_id)?;
                let order = group.order_mut(order_id).ok_or(AllocationError::GroupNotFound(group_id))?;
                order.set_amounts(crate::domain::OrderAmounts {
                    subtotal: money("7.00"),
                    shipping_fee: money("12.00"),
                    total: money("19.00"),
                });
                let order = order.clone();
                tx.save_order(group_id, &order)?;
                tx.save_order(group_id, &order)
            })
            .unwrap();

        let group = store.group(group_id).unwrap();
        assert_eq!(group.orders.len(), 1);
        assert_eq!(group.orders[0].total(), money("19.00"));
    }
}
