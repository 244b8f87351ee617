// ============================================================================
// Interfaces Module
// Contains all trait definitions and contracts
// ============================================================================

mod distribution_algorithm;
mod event_handler;
mod persistence;

pub use distribution_algorithm::DistributionAlgorithm;
pub use event_handler::{CascadeEvent, EventHandler, LoggingEventHandler, NoOpEventHandler};
pub use persistence::OrderRepository;
