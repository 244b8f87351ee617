// ============================================================================
// Domain Models Module
// Contains all core domain entities and value objects
// ============================================================================

pub mod config;
pub mod group;
pub mod item;
pub mod order;
pub mod recipient;

pub use config::AllocationConfig;
pub use group::{CostPool, Group, GroupId};
pub use item::{Item, ItemId};
pub use order::{Order, OrderAmounts, OrderId};
pub use recipient::Recipient;
