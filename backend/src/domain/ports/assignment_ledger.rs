//! Port for reading the per-stage assignment ledger.
//!
//! Assignments are opened and closed only by
//! [`OrderRepository::apply`](super::OrderRepository::apply); this port
//! exposes the read side used by authorization gates.

use async_trait::async_trait;

use crate::domain::ActorId;
use crate::domain::orders::{OrderAssignment, OrderId, Stage};

use super::OrderRepositoryError;

/// Read access to order assignments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssignmentLedger: Send + Sync {
    /// Every assignment recorded for an order, open or closed, oldest first.
    async fn assignments_for_order(
        &self,
        order_id: &OrderId,
    ) -> Result<Vec<OrderAssignment>, OrderRepositoryError>;

    /// Whether `actor_id` has ever been assigned `stage` on the order.
    async fn is_assigned_to(
        &self,
        order_id: &OrderId,
        actor_id: &ActorId,
        stage: Stage,
    ) -> Result<bool, OrderRepositoryError>;
}
