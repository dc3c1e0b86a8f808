//! Rows of the append-only status history ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ActorId;

use super::{HistoryStatus, OrderId, Reason};

/// One recorded status change.
///
/// Rows are never updated or deleted. Every order has at least the row
/// written when it was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub order_id: OrderId,
    pub status: HistoryStatus,
    pub changed_by: ActorId,
    pub changed_at: DateTime<Utc>,
    pub reason: Option<Reason>,
}

impl HistoryEntry {
    /// Build a history row.
    pub fn new(
        order_id: OrderId,
        status: impl Into<HistoryStatus>,
        changed_by: ActorId,
        changed_at: DateTime<Utc>,
        reason: Option<Reason>,
    ) -> Self {
        Self {
            order_id,
            status: status.into(),
            changed_by,
            changed_at,
            reason,
        }
    }
}
