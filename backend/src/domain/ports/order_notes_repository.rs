//! Port for operator comments and print-job details.

use async_trait::async_trait;

use crate::domain::orders::{LabelJobDetails, OrderComment, OrderId};

use super::OrderRepositoryError;

/// Storage for notes attached to orders.
///
/// Comments are written through [`super::OrderRepository::apply`] so the
/// stage gate and the insert share the order lock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderNotesRepository: Send + Sync {
    /// Comments for an order, oldest first.
    async fn comments_for_order(
        &self,
        order_id: &OrderId,
    ) -> Result<Vec<OrderComment>, OrderRepositoryError>;

    /// Insert or replace the print-job details for an order.
    async fn save_label_job(&self, details: &LabelJobDetails) -> Result<(), OrderRepositoryError>;

    /// Print-job details for an order, if recorded.
    async fn label_job_for_order(
        &self,
        order_id: &OrderId,
    ) -> Result<Option<LabelJobDetails>, OrderRepositoryError>;
}
