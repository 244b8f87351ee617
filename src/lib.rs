// ============================================================================
// Shipping Allocation Library
// Weight-proportional cost sharing with exact rounding conservation
// ============================================================================

//! # Shipping Allocation
//!
//! Splits a group's shared shipping cost across its orders in proportion to
//! each order's physical weight, and keeps every order's subtotal, shipping
//! fee and total consistent whenever items change.
//!
//! ## Features
//!
//! - **Exact conservation**: fees always sum to the cost pool to the cent
//! - **Pluggable distribution algorithms** behind [`interfaces::DistributionAlgorithm`]
//! - **Recalculation cascade** that rewrites a whole group in one unit of work
//! - **Invariant validator** for read-only audits
//! - **Event hooks** for observing cascade progress
//!
//! ## Example
//!
//! ```rust
//! use shipping_allocation::prelude::*;
//! use shipping_allocation::numeric::Money;
//! use rust_decimal::Decimal;
//! use std::sync::Arc;
//!
//! let store = InMemoryOrderStore::new();
//! let mut group = Group::new("Spring order", "400.00".parse().unwrap());
//! for buyer in ["ann", "ben", "cat"] {
//!     group.orders.push(Order::new(buyer).with_item(Item::new(
//!         "flour",
//!         1,
//!         Money::from_integer(10).unwrap(),
//!         Decimal::from(10),
//!     )));
//! }
//! let group_id = store.insert_group(group);
//!
//! let cascade = create_from_config(AllocationConfig::default(), Arc::new(NoOpEventHandler)).unwrap();
//! store
//!     .transaction(|tx| cascade.recalculate_group(tx, group_id, CascadeTrigger::CostPoolChanged))
//!     .unwrap();
//!
//! let fees: Vec<String> = store
//!     .group(group_id)
//!     .unwrap()
//!     .orders
//!     .iter()
//!     .map(|o| o.shipping_fee().to_string())
//!     .collect();
//! assert_eq!(fees, ["133.33", "133.33", "133.34"]);
//! ```

pub mod domain;
pub mod engine;
pub mod interfaces;
pub mod numeric;
pub mod store;
pub mod sync;
pub mod utils;

// Re-exports for convenience
pub mod prelude {
    pub use crate::domain::{
        AllocationConfig, CostPool, Group, GroupId, Item, ItemId, Order, OrderAmounts, OrderId,
        Recipient,
    };
    pub use crate::engine::{
        create_from_config, distribute, AllocationError, AllocationResult, CascadeBuilder,
        CascadeOutcome, CascadeStage, CascadeTrigger, InvariantValidator, ProportionalDistributor,
        RecalculationCascade, ValidationReport,
    };
    pub use crate::interfaces::{
        CascadeEvent, DistributionAlgorithm, EventHandler, LoggingEventHandler, NoOpEventHandler,
        OrderRepository,
    };
    pub use crate::store::InMemoryOrderStore;
    pub use crate::sync::GroupLocks;
}
