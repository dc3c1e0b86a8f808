//! Driving port for order reads.

use async_trait::async_trait;

use crate::domain::Actor;
use crate::domain::orders::{
    HistoryEntry, LabelJobDetails, Order, OrderComment, OrderId, OrderPage, OrderRejection, Page,
};

/// Request naming a single order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLookup {
    pub actor: Actor,
    pub order_id: OrderId,
}

/// Request for one page of the actor's order listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOrdersRequest {
    pub actor: Actor,
    pub page: Page,
}

/// Driving port for order read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderQuery: Send + Sync {
    async fn get_order(&self, lookup: OrderLookup) -> Result<Order, OrderRejection>;

    async fn list_orders(&self, request: ListOrdersRequest) -> Result<OrderPage, OrderRejection>;

    async fn order_history(
        &self,
        lookup: OrderLookup,
    ) -> Result<Vec<HistoryEntry>, OrderRejection>;

    async fn list_comments(
        &self,
        lookup: OrderLookup,
    ) -> Result<Vec<OrderComment>, OrderRejection>;

    async fn label_job(&self, lookup: OrderLookup) -> Result<LabelJobDetails, OrderRejection>;
}
