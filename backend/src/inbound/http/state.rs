//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and depend only on the driving
//! ports, so they can be exercised with mocks and no I/O.

use std::sync::Arc;

use crate::domain::ports::{OrderCommand, OrderQuery};

/// Port implementations the order handlers call into.
#[derive(Clone)]
pub struct HttpState {
    pub orders: Arc<dyn OrderCommand>,
    pub orders_query: Arc<dyn OrderQuery>,
}

impl HttpState {
    /// Bundle the command and query ports.
    ///
    /// The lifecycle service implements both, so production wiring passes the
    /// same `Arc` twice.
    pub fn new(orders: Arc<dyn OrderCommand>, orders_query: Arc<dyn OrderQuery>) -> Self {
        Self {
            orders,
            orders_query,
        }
    }
}
