// ============================================================================
// Event Handler Interface
// Defines the contract for observing cascade progress
// ============================================================================

use crate::domain::{GroupId, OrderId};
use crate::engine::{CascadeTrigger, InvariantViolation};
use crate::numeric::Money;
use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Events emitted by the recalculation cascade
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CascadeEvent {
    /// A cascade run began for a group
    CascadeStarted {
        group_id: GroupId,
        trigger: CascadeTrigger,
        timestamp: DateTime<Utc>,
    },

    /// The changed order's subtotal was re-derived from its items
    SubtotalRecomputed {
        order_id: OrderId,
        subtotal: Money,
        timestamp: DateTime<Utc>,
    },

    /// The cost pool was split across the weighted orders
    FeesRedistributed {
        group_id: GroupId,
        weighted_orders: usize,
        distributed_total: Money,
        timestamp: DateTime<Utc>,
    },

    /// Every order total was set to subtotal + fee
    TotalsUpdated {
        group_id: GroupId,
        orders: usize,
        timestamp: DateTime<Utc>,
    },

    /// All orders were handed to the repository
    CascadeCompleted {
        group_id: GroupId,
        orders_saved: usize,
        timestamp: DateTime<Utc>,
    },

    /// The run aborted, nothing was saved by this cascade
    CascadeFailed {
        group_id: GroupId,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// Post-cascade verification found a broken invariant
    InvariantViolated {
        group_id: GroupId,
        violation: InvariantViolation,
        timestamp: DateTime<Utc>,
    },
}

/// Event handler trait for processing cascade events
/// Implementations can handle logging, metrics, notifications, etc.
pub trait EventHandler: Send + Sync {
    /// Handle a cascade event
    fn on_event(&self, event: CascadeEvent);

    /// Batch event handler (optional optimization)
    fn on_events(&self, events: Vec<CascadeEvent>) {
        for event in events {
            self.on_event(event);
        }
    }
}

/// No-op event handler for testing
pub struct NoOpEventHandler;

impl EventHandler for NoOpEventHandler {
    fn on_event(&self, _event: CascadeEvent) {}
}

/// Logging event handler
pub struct LoggingEventHandler;

impl EventHandler for LoggingEventHandler {
    fn on_event(&self, event: CascadeEvent) {
        match &event {
            CascadeEvent::CascadeFailed { .. } | CascadeEvent::InvariantViolated { .. } => {
                tracing::warn!("Cascade event: {:?}", event);
            },
            _ => tracing::debug!("Cascade event: {:?}", event),
        }
    }
}
