//! Port for the order record store and its unit of work.

use async_trait::async_trait;

use crate::domain::orders::{
    HistoryEntry, ListingScope, LockedOrder, Order, OrderId, OrderMutation, OrderPage,
    OrderRejection, Page,
};

use super::define_port_error;
use super::{AssignmentLedger, OrderNotesRepository, StatusHistoryLedger};

define_port_error! {
    /// Errors raised by order store adapters.
    pub enum OrderRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "order repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "order repository query failed: {message}",
        /// The order to lock does not exist.
        NotFound { order_id: OrderId } =>
            "order {order_id} not found",
        /// The decider refused the change; nothing was written.
        Rejected { rejection: OrderRejection } =>
            "order change rejected: {rejection}",
    }
}

/// Decision callback run against the locked order inside the transaction.
pub type OrderDecider =
    Box<dyn FnOnce(&LockedOrder) -> Result<OrderMutation, OrderRejection> + Send>;

/// Box a closure as an [`OrderDecider`].
pub fn decider<F>(decide: F) -> OrderDecider
where
    F: FnOnce(&LockedOrder) -> Result<OrderMutation, OrderRejection> + Send + 'static,
{
    Box::new(decide)
}

/// Port for order rows.
///
/// [`apply`](OrderRepository::apply) is the only way to change an existing
/// order. Implementations must:
/// - lock the order row (and read its open assignments) before calling the
///   decider, so concurrent calls on one order serialise;
/// - write the column changes, the history row, any comment, and the
///   assignment open/close from the returned mutation in one atomic unit;
/// - write nothing when the decider rejects or any write fails.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist a newly placed order together with its creation history row.
    async fn create(&self, order: &Order, created: &HistoryEntry)
    -> Result<(), OrderRepositoryError>;

    /// Find an order by id.
    async fn find_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderRepositoryError>;

    /// List the page of orders admitted by `scope`, newest first.
    async fn list(&self, scope: &ListingScope, page: &Page)
    -> Result<OrderPage, OrderRepositoryError>;

    /// Lock the order, decide, and apply the decision atomically.
    async fn apply(
        &self,
        order_id: &OrderId,
        decide: OrderDecider,
    ) -> Result<Order, OrderRepositoryError>;
}

/// Everything the order lifecycle service needs from one backing store.
///
/// The ledgers share the order's transaction, so a single adapter provides
/// all of them.
pub trait OrderStore:
    OrderRepository + AssignmentLedger + StatusHistoryLedger + OrderNotesRepository
{
}

impl<T> OrderStore for T where
    T: OrderRepository + AssignmentLedger + StatusHistoryLedger + OrderNotesRepository
{
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn rejected_error_carries_rejection() {
        let err = OrderRepositoryError::rejected(OrderRejection::PaymentNotUploaded);
        assert_eq!(
            err.to_string(),
            "order change rejected: cannot update payment: payment not uploaded yet"
        );
    }

    #[rstest]
    fn not_found_names_the_order() {
        let order_id = OrderId::random();
        let err = OrderRepositoryError::not_found(order_id);
        assert!(err.to_string().contains(&order_id.to_string()));
    }
}
