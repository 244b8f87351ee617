// ============================================================================
// Recalculation Cascade
// Keeps every order's subtotal, shipping fee and total consistent with the
// group's live item set
// ============================================================================

use super::errors::{AllocationError, AllocationResult};
use super::validator::{InvariantValidator, ValidationReport};
use crate::domain::{AllocationConfig, Group, GroupId, OrderAmounts, OrderId};
use crate::interfaces::{CascadeEvent, DistributionAlgorithm, EventHandler, OrderRepository};
use crate::numeric::{Money, Weight};
use chrono::Utc;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What changed before the cascade was invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CascadeTrigger {
    ItemAdded,
    ItemRemoved,
    QuantityChanged,
    OrderDeleted,
    CostPoolChanged,
}

/// Stages of one cascade run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CascadeStage {
    ItemsChanged,
    SubtotalRecomputed,
    GroupFeesRedistributed,
    TotalsUpdated,
    Done,
}

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CascadeOutcome {
    pub group_id: GroupId,
    pub trigger: CascadeTrigger,
    pub stage: CascadeStage,
    /// Orders whose amounts were (re)written
    pub orders_updated: usize,
    /// Orders with positive weight, i.e. that took part in the distribution
    pub weighted_orders: usize,
    /// Sum of all shipping fees after the run
    pub distributed_total: Money,
    /// Present when the config asks for post-cascade verification
    pub validation: Option<ValidationReport>,
}

/// Recomputes a group after any item-level mutation or cost pool edit.
///
/// Every run re-reads and rewrites the *whole* group. One order's weight
/// shifts every other order's share, so recomputing only the changed order
/// would break sum conservation.
///
/// The cascade takes no locks. Callers must serialize runs per group (see
/// [`GroupLocks`](crate::sync::GroupLocks)) and pass a repository that is a
/// single unit of work; two interleaved runs on one group lose updates.
pub struct RecalculationCascade {
    /// Pluggable distribution algorithm
    distributor: Box<dyn DistributionAlgorithm>,

    /// Event handler for processing events
    event_handler: Arc<dyn EventHandler>,

    config: AllocationConfig,
}

impl RecalculationCascade {
    /// Create a new cascade
    pub fn new(
        distributor: Box<dyn DistributionAlgorithm>,
        event_handler: Arc<dyn EventHandler>,
        config: AllocationConfig,
    ) -> Self {
        Self {
            distributor,
            event_handler,
            config,
        }
    }

    pub fn config(&self) -> &AllocationConfig {
        &self.config
    }

    pub fn distributor_name(&self) -> &str {
        self.distributor.name()
    }

    /// Run the cascade for an order whose items changed.
    ///
    /// # Errors
    /// - `GroupNotFound` / `OrderNotFound` if either vanished
    /// - `InvalidInput` / `Numeric` if an item cannot be computed with
    /// - whatever the repository returns
    ///
    /// On error nothing has been saved by this run.
    pub fn on_order_changed<R>(
        &self,
        repo: &mut R,
        group_id: GroupId,
        order_id: OrderId,
        trigger: CascadeTrigger,
    ) -> AllocationResult<CascadeOutcome>
    where
        R: OrderRepository + ?Sized,
    {
        self.run(repo, group_id, Some(order_id), trigger)
    }

    /// Run the cascade for the whole group when no single order survives the
    /// change: an order was deleted or the cost pool total was edited.
    pub fn recalculate_group<R>(
        &self,
        repo: &mut R,
        group_id: GroupId,
        trigger: CascadeTrigger,
    ) -> AllocationResult<CascadeOutcome>
    where
        R: OrderRepository + ?Sized,
    {
        self.run(repo, group_id, None, trigger)
    }

    /// Recompute an already loaded group in memory.
    ///
    /// All amounts are computed before any order is touched, so on error the
    /// group is left exactly as it was.
    pub fn recalculate(
        &self,
        group: &mut Group,
        changed: Option<OrderId>,
        trigger: CascadeTrigger,
    ) -> AllocationResult<CascadeOutcome> {
        let mut events = Vec::new();

        // ItemsChanged
        for order in &group.orders {
            for item in &order.items {
                item.validate().map_err(AllocationError::InvalidInput)?;
            }
        }

        // SubtotalRecomputed. The changed order first so a missing one fails
        // fast; the others are re-derived too so stale subtotals cannot survive.
        if let Some(order_id) = changed {
            let order = group.order(order_id).ok_or(AllocationError::OrderNotFound {
                group_id: group.id,
                order_id,
            })?;
            let subtotal = order.compute_subtotal()?;
            tracing::debug!(%order_id, %subtotal, "subtotal recomputed");
            events.push(CascadeEvent::SubtotalRecomputed {
                order_id,
                subtotal,
                timestamp: Utc::now(),
            });
        }

        let mut amounts = Vec::with_capacity(group.orders.len());
        for order in &group.orders {
            amounts.push(OrderAmounts {
                subtotal: order.compute_subtotal()?,
                shipping_fee: Money::ZERO,
                total: Money::ZERO,
            });
        }

        // GroupFeesRedistributed. Weightless orders stay out of the vector
        // and keep a zero fee.
        let mut weighted = Vec::new();
        let mut weights: Vec<Weight> = Vec::new();
        for (index, order) in group.orders.iter().enumerate() {
            let weight = order.weight()?;
            if !weight.is_zero() {
                weighted.push(index);
                weights.push(weight);
            }
        }

        let fees = self
            .distributor
            .distribute(group.cost_pool.total, &weights)?;
        if fees.len() != weighted.len() {
            return Err(AllocationError::InvalidInput(format!(
                "{} returned {} fees for {} weighted orders",
                self.distributor.name(),
                fees.len(),
                weighted.len()
            )));
        }
        for (index, fee) in weighted.iter().zip(fees) {
            amounts[*index].shipping_fee = fee;
        }

        let distributed_total = Money::sum(amounts.iter().map(|a| a.shipping_fee))?;
        tracing::debug!(
            group_id = %group.id,
            weighted_orders = weighted.len(),
            %distributed_total,
            "fees redistributed"
        );
        events.push(CascadeEvent::FeesRedistributed {
            group_id: group.id,
            weighted_orders: weighted.len(),
            distributed_total,
            timestamp: Utc::now(),
        });

        // TotalsUpdated
        for entry in amounts.iter_mut() {
            entry.total = entry.subtotal.checked_add(entry.shipping_fee)?;
        }

        for (order, entry) in group.orders.iter_mut().zip(amounts) {
            order.set_amounts(entry);
        }
        tracing::debug!(group_id = %group.id, orders = group.orders.len(), "totals updated");
        events.push(CascadeEvent::TotalsUpdated {
            group_id: group.id,
            orders: group.orders.len(),
            timestamp: Utc::now(),
        });

        let validation = if self.config.verify_after_cascade {
            let report = InvariantValidator::new(self.config.tolerance).validate(group)?;
            for violation in report.violations() {
                events.push(CascadeEvent::InvariantViolated {
                    group_id: group.id,
                    violation,
                    timestamp: Utc::now(),
                });
            }
            Some(report)
        } else {
            None
        };

        self.event_handler.on_events(events);

        Ok(CascadeOutcome {
            group_id: group.id,
            trigger,
            stage: CascadeStage::Done,
            orders_updated: group.orders.len(),
            weighted_orders: weighted.len(),
            distributed_total,
            validation,
        })
    }

    // ========================================================================
    // Private methods
    // ========================================================================

    fn run<R>(
        &self,
        repo: &mut R,
        group_id: GroupId,
        changed: Option<OrderId>,
        trigger: CascadeTrigger,
    ) -> AllocationResult<CascadeOutcome>
    where
        R: OrderRepository + ?Sized,
    {
        self.event_handler.on_event(CascadeEvent::CascadeStarted {
            group_id,
            trigger,
            timestamp: Utc::now(),
        });

        match self.load_compute_save(repo, group_id, changed, trigger) {
            Ok(outcome) => {
                tracing::info!(
                    %group_id,
                    ?trigger,
                    orders = outcome.orders_updated,
                    distributed = %outcome.distributed_total.format(&self.config.currency),
                    "cascade completed"
                );
                self.event_handler.on_event(CascadeEvent::CascadeCompleted {
                    group_id,
                    orders_saved: outcome.orders_updated,
                    timestamp: Utc::now(),
                });
                Ok(outcome)
            },
            Err(err) => {
                tracing::warn!(%group_id, ?trigger, error = %err, "cascade aborted");
                self.event_handler.on_event(CascadeEvent::CascadeFailed {
                    group_id,
                    reason: err.to_string(),
                    timestamp: Utc::now(),
                });
                Err(err)
            },
        }
    }

    fn load_compute_save<R>(
        &self,
        repo: &mut R,
        group_id: GroupId,
        changed: Option<OrderId>,
        trigger: CascadeTrigger,
    ) -> AllocationResult<CascadeOutcome>
    where
        R: OrderRepository + ?Sized,
    {
        let mut group = repo.load_group_with_orders(group_id)?;
        if group.id != group_id {
            return Err(AllocationError::GroupNotFound(group_id));
        }

        let outcome = self.recalculate(&mut group, changed, trigger)?;

        for order in &group.orders {
            repo.save_order(group_id, order)?;
        }

        Ok(outcome)
    }
}
