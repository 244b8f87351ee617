// ============================================================================
// Persistence Interface
// The storage collaborator the cascade reads from and writes to
// ============================================================================

use crate::domain::{Group, GroupId, Order};
use crate::engine::AllocationResult;

/// Storage seen through one unit of work.
///
/// Implementations are expected to be a transaction handle: everything read
/// and written through one value commits or rolls back together. The
/// cascade never opens or commits transactions itself.
pub trait OrderRepository {
    /// Load a group with every order and every item eagerly populated
    ///
    /// # Errors
    /// `GroupNotFound` if the group no longer exists
    fn load_group_with_orders(&mut self, group_id: GroupId) -> AllocationResult<Group>;

    /// Upsert the derived amounts (subtotal, shipping fee, total) of an order.
    /// Saving the same order twice must be harmless.
    fn save_order(&mut self, group_id: GroupId, order: &Order) -> AllocationResult<()>;
}
