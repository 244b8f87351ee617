// ============================================================================
// Basic Usage Example
// ============================================================================

use rust_decimal::Decimal;
use shipping_allocation::numeric::{CurrencyFormat, Money};
use shipping_allocation::prelude::*;
use std::sync::Arc;

fn print_group(group: &Group, format: &CurrencyFormat) {
    println!("{:<8} {:>12} {:>12} {:>12}", "buyer", "subtotal", "shipping", "total");
    for order in &group.orders {
        println!(
            "{:<8} {:>12} {:>12} {:>12}",
            order.buyer,
            order.subtotal().format(format),
            order.shipping_fee().format(format),
            order.total().format(format),
        );
    }
}

fn main() -> Result<(), AllocationError> {
    #[cfg(feature = "logging")]
    shipping_allocation::utils::init_logging();

    println!("=== Shipping Allocation Example ===\n");

    let config = AllocationConfig::strict();
    let format = config.currency.clone();
    let cascade = CascadeBuilder::new()
        .with_config(config)
        .with_event_handler(Arc::new(LoggingEventHandler))
        .build()
        .map_err(AllocationError::InvalidInput)?;

    let store = InMemoryOrderStore::new();
    let group_id = store.insert_group(Group::new("Harvest box", Money::from_integer(400)?));
    println!("Created group with a 400.00 shipping pool\n");

    // Three buyers join with 10 kg each
    let mut buyers = Vec::new();
    for (buyer, price) in [("ann", 1250), ("ben", 899), ("cat", 3000)] {
        let order = Order::new(buyer).with_item(Item::new(
            "produce crate",
            1,
            Money::from_cents(price)?,
            Decimal::from(10),
        ));
        let order_id = store.transaction(|tx| {
            let order_id = tx.add_order(group_id, order)?;
            cascade.on_order_changed(tx, group_id, order_id, CascadeTrigger::ItemAdded)?;
            Ok(order_id)
        })?;
        buyers.push(order_id);
    }

    let group = store.group(group_id).ok_or(AllocationError::GroupNotFound(group_id))?;
    print_group(&group, &format);

    // Ben doubles up, everyone else's share drops
    println!("\n=== ben adds a second crate ===");
    let ben = buyers[1];
    let outcome = store.transaction(|tx| {
        let group = tx.load_group_with_orders(group_id)?;
        let item_id = group
            .order(ben)
            .and_then(|order| order.items.first())
            .map(|item| item.id)
            .ok_or(AllocationError::OrderNotFound { group_id, order_id: ben })?;
        tx.set_quantity(group_id, ben, item_id, 2)?;
        cascade.on_order_changed(tx, group_id, ben, CascadeTrigger::QuantityChanged)
    })?;

    let group = store.group(group_id).ok_or(AllocationError::GroupNotFound(group_id))?;
    print_group(&group, &format);
    println!("\nDistributed: {}", outcome.distributed_total.format(&format));

    if let Some(report) = outcome.validation {
        println!("Validation passed: {}", report.passed);
        for violation in report.violations() {
            println!("  {}", violation);
        }
    }

    // Cat leaves the group
    println!("\n=== cat leaves ===");
    store.transaction(|tx| {
        tx.delete_order(group_id, buyers[2])?;
        cascade.recalculate_group(tx, group_id, CascadeTrigger::OrderDeleted)
    })?;

    let group = store.group(group_id).ok_or(AllocationError::GroupNotFound(group_id))?;
    print_group(&group, &format);

    Ok(())
}
