//! Port for reading the append-only status history.

use async_trait::async_trait;

use crate::domain::orders::{HistoryEntry, OrderId};

use super::OrderRepositoryError;

/// Read access to the status history ledger.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatusHistoryLedger: Send + Sync {
    /// History rows for an order, ordered by `changed_at` ascending.
    async fn history_for_order(
        &self,
        order_id: &OrderId,
    ) -> Result<Vec<HistoryEntry>, OrderRepositoryError>;
}
