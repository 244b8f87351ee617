// ============================================================================
// Store Module
// Reference implementations of the persistence contract
// ============================================================================

mod in_memory;

pub use in_memory::{InMemoryOrderStore, StoreTransaction};
