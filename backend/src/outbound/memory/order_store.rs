//! Order store held behind a single async mutex.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::ActorId;
use crate::domain::orders::{
    HistoryEntry, LabelJobDetails, ListingScope, LockedOrder, Order, OrderAssignment,
    OrderComment, OrderId, OrderMutation, OrderPage, OrderRejection, Page, Stage,
};
use crate::domain::ports::{
    AssignmentLedger, OrderDecider, OrderNotesRepository, OrderRepository, OrderRepositoryError,
    StatusHistoryLedger,
};

#[derive(Debug, Default)]
struct State {
    orders: HashMap<OrderId, Order>,
    history: Vec<HistoryEntry>,
    assignments: Vec<OrderAssignment>,
    comments: Vec<OrderComment>,
    label_jobs: HashMap<OrderId, LabelJobDetails>,
}

impl State {
    fn assignments_for(&self, order_id: OrderId) -> Vec<OrderAssignment> {
        self.assignments
            .iter()
            .filter(|a| a.order_id == order_id)
            .cloned()
            .collect()
    }

    fn open_index(&self, order_id: OrderId, stage: Stage) -> Option<usize> {
        self.assignments
            .iter()
            .position(|a| a.order_id == order_id && a.stage == stage && a.is_open())
    }

    /// Validate the assignment side effects, then write everything.
    fn commit(
        &mut self,
        mut order: Order,
        mutation: OrderMutation,
    ) -> Result<Order, OrderRepositoryError> {
        let order_id = order.id();
        let already_open = mutation
            .open_assignment
            .as_ref()
            .map(|opening| opening.stage)
            .filter(|stage| self.open_index(order_id, *stage).is_some());
        if let Some(stage) = already_open {
            return Err(OrderRepositoryError::rejected(
                OrderRejection::StageAlreadyAssigned { stage },
            ));
        }
        let closing = match &mutation.close_assignment {
            Some(closure) => {
                let index = self
                    .open_index(order_id, closure.stage)
                    .filter(|i| {
                        self.assignments
                            .get(*i)
                            .is_some_and(|held| held.actor_id == closure.actor_id)
                    })
                    .ok_or_else(|| {
                        OrderRepositoryError::rejected(OrderRejection::NotAssigned {
                            stage: closure.stage,
                        })
                    })?;
                Some((index, closure.completed_at))
            }
            None => None,
        };

        mutation.apply_to(&mut order);
        if let Some((index, completed_at)) = closing {
            if let Some(held) = self.assignments.get_mut(index) {
                held.completed_at = Some(completed_at);
            }
        }
        if let Some(opening) = mutation.open_assignment {
            self.assignments.push(opening);
        }
        if let Some(entry) = mutation.history {
            self.history.push(entry);
        }
        if let Some(comment) = mutation.comment {
            self.comments.push(comment);
        }
        self.orders.insert(order_id, order.clone());
        Ok(order)
    }
}

/// Order store for tests and database-less runs.
///
/// One mutex guards every table, so [`OrderRepository::apply`] calls
/// serialise exactly like row locks would for a single order.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    state: Mutex<State>,
}

impl InMemoryOrderStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderStore {
    async fn create(
        &self,
        order: &Order,
        created: &HistoryEntry,
    ) -> Result<(), OrderRepositoryError> {
        let mut state = self.state.lock().await;
        if state.orders.contains_key(&order.id()) {
            return Err(OrderRepositoryError::query(format!(
                "order {} already exists",
                order.id()
            )));
        }
        state.orders.insert(order.id(), order.clone());
        state.history.push(created.clone());
        Ok(())
    }

    async fn find_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderRepositoryError> {
        Ok(self.state.lock().await.orders.get(order_id).cloned())
    }

    async fn list(
        &self,
        scope: &ListingScope,
        page: &Page,
    ) -> Result<OrderPage, OrderRepositoryError> {
        let state = self.state.lock().await;
        let mut admitted: Vec<&Order> = state
            .orders
            .values()
            .filter(|order| scope.admits(order, &state.assignments_for(order.id())))
            .collect();
        admitted.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().as_uuid().cmp(a.id().as_uuid()))
        });

        let total = admitted.len() as u64;
        let orders = admitted
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect();
        Ok(OrderPage { orders, total })
    }

    async fn apply(
        &self,
        order_id: &OrderId,
        decide: OrderDecider,
    ) -> Result<Order, OrderRepositoryError> {
        let mut state = self.state.lock().await;
        let order = state
            .orders
            .get(order_id)
            .cloned()
            .ok_or_else(|| OrderRepositoryError::not_found(*order_id))?;
        let locked = LockedOrder {
            open_assignments: state
                .assignments_for(*order_id)
                .into_iter()
                .filter(OrderAssignment::is_open)
                .collect(),
            order,
        };

        let mutation = decide(&locked).map_err(OrderRepositoryError::rejected)?;
        state.commit(locked.order, mutation)
    }
}

#[async_trait]
impl AssignmentLedger for InMemoryOrderStore {
    async fn assignments_for_order(
        &self,
        order_id: &OrderId,
    ) -> Result<Vec<OrderAssignment>, OrderRepositoryError> {
        Ok(self.state.lock().await.assignments_for(*order_id))
    }

    async fn is_assigned_to(
        &self,
        order_id: &OrderId,
        actor_id: &ActorId,
        stage: Stage,
    ) -> Result<bool, OrderRepositoryError> {
        let state = self.state.lock().await;
        Ok(state.assignments.iter().any(|a| {
            a.order_id == *order_id && a.actor_id == *actor_id && a.stage == stage
        }))
    }
}

#[async_trait]
impl StatusHistoryLedger for InMemoryOrderStore {
    async fn history_for_order(
        &self,
        order_id: &OrderId,
    ) -> Result<Vec<HistoryEntry>, OrderRepositoryError> {
        let state = self.state.lock().await;
        let mut rows: Vec<HistoryEntry> = state
            .history
            .iter()
            .filter(|entry| entry.order_id == *order_id)
            .cloned()
            .collect();
        rows.sort_by_key(|entry| entry.changed_at);
        Ok(rows)
    }
}

#[async_trait]
impl OrderNotesRepository for InMemoryOrderStore {
    async fn comments_for_order(
        &self,
        order_id: &OrderId,
    ) -> Result<Vec<OrderComment>, OrderRepositoryError> {
        let state = self.state.lock().await;
        let mut rows: Vec<OrderComment> = state
            .comments
            .iter()
            .filter(|comment| comment.order_id == *order_id)
            .cloned()
            .collect();
        rows.sort_by_key(|comment| comment.created_at);
        Ok(rows)
    }

    async fn save_label_job(&self, details: &LabelJobDetails) -> Result<(), OrderRepositoryError> {
        self.state
            .lock()
            .await
            .label_jobs
            .insert(details.order_id, details.clone());
        Ok(())
    }

    async fn label_job_for_order(
        &self,
        order_id: &OrderId,
    ) -> Result<Option<LabelJobDetails>, OrderRepositoryError> {
        Ok(self.state.lock().await.label_jobs.get(order_id).cloned())
    }
}

#[cfg(test)]
#[path = "order_store_tests.rs"]
mod tests;
