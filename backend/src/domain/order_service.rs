//! Order lifecycle service.
//!
//! Implements the [`OrderCommand`] and [`OrderQuery`] driving ports on top of
//! the driven [`OrderStore`] and [`CompanyDirectory`]. Every state change is
//! decided by [`rules`] against the order as read under its row lock, so two
//! operators racing on one order can never both win. Deciders read the clock
//! themselves, keeping history timestamps in commit order.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info, warn};

use crate::domain::orders::{
    HistoryEntry, LabelJobDetails, ListingScope, LockedOrder, Order, OrderChanges, OrderComment,
    OrderDetails, OrderId, OrderMutation, OrderPage, OrderRejection, OrderStatus, PaymentStatus,
    Reason, Stage, TransitionTarget, rules,
};
use crate::domain::ports::{
    AddCommentRequest, CompanyDirectory, CompanyDirectoryError, CreateOrderRequest,
    InvoiceDocumentsRequest, ListOrdersRequest, OrderCommand, OrderDecider, OrderLookup,
    OrderQuery, OrderRepositoryError, OrderStore, PaymentDecisionRequest, PaymentProofRequest,
    SaveLabelJobRequest, StatusTransitionRequest, decider,
};
use crate::domain::{Actor, Role};

fn map_repository_error(error: OrderRepositoryError) -> OrderRejection {
    match error {
        OrderRepositoryError::Rejected { rejection } => rejection,
        OrderRepositoryError::NotFound { order_id } => OrderRejection::OrderNotFound { order_id },
        other @ (OrderRepositoryError::Connection { .. } | OrderRepositoryError::Query { .. }) => {
            warn!(error = %other, "order store failure");
            OrderRejection::PersistenceFailure {
                message: other.to_string(),
            }
        }
    }
}

fn map_directory_error(error: CompanyDirectoryError) -> OrderRejection {
    warn!(error = %error, "company directory failure");
    OrderRejection::PersistenceFailure {
        message: error.to_string(),
    }
}

/// Transition engine for label orders.
#[derive(Clone)]
pub struct OrderLifecycleService<S, C> {
    store: Arc<S>,
    companies: Arc<C>,
    clock: Arc<dyn Clock>,
}

impl<S, C> OrderLifecycleService<S, C> {
    /// Create a service over an order store and company directory.
    pub fn new(store: Arc<S>, companies: Arc<C>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            companies,
            clock,
        }
    }
}

impl<S, C> OrderLifecycleService<S, C>
where
    S: OrderStore,
    C: CompanyDirectory,
{
    async fn load_order(&self, order_id: &OrderId) -> Result<Order, OrderRejection> {
        self.store
            .find_by_id(order_id)
            .await
            .map_err(map_repository_error)?
            .ok_or(OrderRejection::OrderNotFound {
                order_id: *order_id,
            })
    }

    /// Load an order and check it falls inside the actor's listing scope.
    async fn visible_order(&self, lookup: &OrderLookup) -> Result<Order, OrderRejection> {
        let order = self.load_order(&lookup.order_id).await?;
        let scope = ListingScope::for_actor(&lookup.actor);
        let assignments = match scope {
            ListingScope::All | ListingScope::Owner(_) => Vec::new(),
            ListingScope::Printing(_) | ListingScope::Plant(_) => self
                .store
                .assignments_for_order(&lookup.order_id)
                .await
                .map_err(map_repository_error)?,
        };
        if scope.admits(&order, &assignments) {
            Ok(order)
        } else {
            Err(scope.rejection())
        }
    }

    /// Run `decide` under the order lock and log the outcome.
    async fn apply(
        &self,
        actor: &Actor,
        order_id: OrderId,
        operation: &'static str,
        decide: OrderDecider,
    ) -> Result<Order, OrderRejection> {
        match self.store.apply(&order_id, decide).await {
            Ok(order) => {
                info!(
                    %order_id,
                    actor_id = %actor.id(),
                    role = %actor.role(),
                    operation,
                    status = %order.status(),
                    payment_status = %order.payment_status(),
                    "order updated"
                );
                Ok(order)
            }
            Err(error) => {
                let rejection = map_repository_error(error);
                debug!(
                    %order_id,
                    actor_id = %actor.id(),
                    operation,
                    kind = rejection.kind(),
                    "order change refused"
                );
                Err(rejection)
            }
        }
    }
}

#[async_trait]
impl<S, C> OrderCommand for OrderLifecycleService<S, C>
where
    S: OrderStore,
    C: CompanyDirectory,
{
    async fn create_order(&self, request: CreateOrderRequest) -> Result<Order, OrderRejection> {
        let CreateOrderRequest { actor, draft } = request;
        if actor.role() != Role::BusinessOwner {
            return Err(OrderRejection::UnauthorizedRole { role: actor.role() });
        }
        let details =
            OrderDetails::new(draft).map_err(|err| OrderRejection::InvalidOrderDetails {
                message: err.to_string(),
            })?;

        let company_id = self
            .companies
            .company_for_owner(&actor.id())
            .await
            .map_err(map_directory_error)?
            .ok_or(OrderRejection::CompanyNotFound)?;
        let owns_label = self
            .companies
            .label_belongs_to(&company_id, &details.label_id())
            .await
            .map_err(map_directory_error)?;
        if !owns_label {
            return Err(OrderRejection::LabelNotOwned);
        }

        let now = self.clock.utc();
        let order = Order::place(actor.id(), details, now);
        let placed = HistoryEntry::new(order.id(), OrderStatus::Placed, actor.id(), now, None);
        self.store
            .create(&order, &placed)
            .await
            .map_err(map_repository_error)?;

        info!(
            order_id = %order.id(),
            owner_id = %actor.id(),
            %company_id,
            "order placed"
        );
        Ok(order)
    }

    async fn transition_status(
        &self,
        request: StatusTransitionRequest,
    ) -> Result<Order, OrderRejection> {
        let StatusTransitionRequest {
            actor,
            order_id,
            status,
            reason,
        } = request;
        if actor.role() == Role::BusinessOwner {
            return Err(OrderRejection::UnauthorizedRole { role: actor.role() });
        }
        let target = status.parse::<TransitionTarget>().map_err(|_| {
            OrderRejection::InvalidStatusForRole {
                role: actor.role(),
                requested: status.trim().to_owned(),
            }
        })?;
        let reason = Reason::parse(reason.as_deref());
        let clock = Arc::clone(&self.clock);

        let decide = decider(move |locked: &LockedOrder| {
            let plan = rules::plan_transition(&actor, locked, target, reason)?;
            Ok(plan.into_mutation(&locked.order, actor.id(), clock.utc()))
        });
        self.apply(&actor, order_id, "transition_status", decide)
            .await
    }

    async fn decide_payment(
        &self,
        request: PaymentDecisionRequest,
    ) -> Result<Order, OrderRejection> {
        let PaymentDecisionRequest {
            actor,
            order_id,
            payment_status,
            reason,
        } = request;
        rules::require_admin(&actor)?;
        let desired = payment_status.parse::<PaymentStatus>().map_err(|_| {
            OrderRejection::InvalidPaymentStatus {
                requested: payment_status.trim().to_owned(),
            }
        })?;
        let reason = Reason::parse(reason.as_deref());
        let clock = Arc::clone(&self.clock);

        let decide = decider(move |locked: &LockedOrder| {
            let plan = rules::plan_payment_decision(&actor, &locked.order, desired, reason)?;
            Ok(plan.into_mutation(&locked.order, actor.id(), clock.utc()))
        });
        self.apply(&actor, order_id, "decide_payment", decide).await
    }

    async fn record_payment_proof(
        &self,
        request: PaymentProofRequest,
    ) -> Result<Order, OrderRejection> {
        let PaymentProofRequest {
            actor,
            order_id,
            url,
        } = request;
        let clock = Arc::clone(&self.clock);

        let decide = decider(move |locked: &LockedOrder| {
            rules::check_payment_proof(&actor, &locked.order)?;
            let now = clock.utc();
            Ok(OrderMutation {
                history: Some(HistoryEntry::new(
                    locked.order.id(),
                    PaymentStatus::PaymentUploaded,
                    actor.id(),
                    now,
                    None,
                )),
                ..OrderMutation::changes_only(
                    OrderChanges {
                        payment_status: Some(PaymentStatus::PaymentUploaded),
                        payment_proof_url: Some(url),
                        ..OrderChanges::default()
                    },
                    now,
                )
            })
        });
        self.apply(&actor, order_id, "record_payment_proof", decide)
            .await
    }

    async fn record_documents(
        &self,
        request: InvoiceDocumentsRequest,
    ) -> Result<Order, OrderRejection> {
        let InvoiceDocumentsRequest {
            actor,
            order_id,
            invoice_url,
            pi_url,
        } = request;
        rules::require_admin(&actor)?;
        if invoice_url.is_none() && pi_url.is_none() {
            return Err(OrderRejection::NoDocuments);
        }
        let changes = OrderChanges {
            invoice_url,
            pi_url,
            ..OrderChanges::default()
        };
        let clock = Arc::clone(&self.clock);

        let decide = decider(move |_: &LockedOrder| {
            Ok(OrderMutation::changes_only(changes, clock.utc()))
        });
        self.apply(&actor, order_id, "record_documents", decide)
            .await
    }

    async fn add_comment(
        &self,
        request: AddCommentRequest,
    ) -> Result<OrderComment, OrderRejection> {
        let AddCommentRequest {
            actor,
            order_id,
            text,
        } = request;
        let stage = actor
            .role()
            .stage()
            .ok_or(OrderRejection::UnauthorizedRole { role: actor.role() })?;
        let comment = OrderComment::compose(
            order_id,
            actor.id(),
            actor.role(),
            &text,
            self.clock.utc(),
        )
        .ok_or(OrderRejection::EmptyComment)?;

        // Assignment rows are never removed, so a positive answer read before
        // the lock still holds under it. The stage check needs the locked row.
        let is_assigned = self
            .store
            .is_assigned_to(&order_id, &actor.id(), stage)
            .await
            .map_err(map_repository_error)?;
        let filed = comment.clone();
        let decide = decider(move |locked: &LockedOrder| {
            rules::check_comment(&actor, locked.order.status(), is_assigned)?;
            Ok(OrderMutation::comment_only(filed))
        });
        self.apply(&actor, order_id, "add_comment", decide).await?;
        info!(%order_id, actor_id = %actor.id(), %stage, "comment added");
        Ok(comment)
    }

    async fn save_label_job(
        &self,
        request: SaveLabelJobRequest,
    ) -> Result<LabelJobDetails, OrderRejection> {
        let SaveLabelJobRequest {
            actor,
            order_id,
            draft,
        } = request;
        rules::require_admin(&actor)?;
        self.load_order(&order_id).await?;
        let details = LabelJobDetails::new(order_id, draft, actor.id(), self.clock.utc())
            .map_err(|err| OrderRejection::InvalidLabelJobDetails {
                message: err.to_string(),
            })?;

        self.store
            .save_label_job(&details)
            .await
            .map_err(map_repository_error)?;
        info!(%order_id, actor_id = %actor.id(), "label job details saved");
        Ok(details)
    }
}

#[async_trait]
impl<S, C> OrderQuery for OrderLifecycleService<S, C>
where
    S: OrderStore,
    C: CompanyDirectory,
{
    async fn get_order(&self, lookup: OrderLookup) -> Result<Order, OrderRejection> {
        self.visible_order(&lookup).await
    }

    async fn list_orders(&self, request: ListOrdersRequest) -> Result<OrderPage, OrderRejection> {
        let scope = ListingScope::for_actor(&request.actor);
        self.store
            .list(&scope, &request.page)
            .await
            .map_err(map_repository_error)
    }

    async fn order_history(
        &self,
        lookup: OrderLookup,
    ) -> Result<Vec<HistoryEntry>, OrderRejection> {
        self.visible_order(&lookup).await?;
        self.store
            .history_for_order(&lookup.order_id)
            .await
            .map_err(map_repository_error)
    }

    async fn list_comments(
        &self,
        lookup: OrderLookup,
    ) -> Result<Vec<OrderComment>, OrderRejection> {
        rules::require_admin(&lookup.actor)?;
        self.load_order(&lookup.order_id).await?;
        self.store
            .comments_for_order(&lookup.order_id)
            .await
            .map_err(map_repository_error)
    }

    async fn label_job(&self, lookup: OrderLookup) -> Result<LabelJobDetails, OrderRejection> {
        let OrderLookup { actor, order_id } = lookup;
        match actor.role() {
            Role::Admin => {}
            Role::Printing => {
                let assigned = self
                    .store
                    .is_assigned_to(&order_id, &actor.id(), Stage::Printing)
                    .await
                    .map_err(map_repository_error)?;
                if !assigned {
                    return Err(OrderRejection::NotAssigned {
                        stage: Stage::Printing,
                    });
                }
            }
            role @ (Role::BusinessOwner | Role::Plant) => {
                return Err(OrderRejection::UnauthorizedRole { role });
            }
        }
        self.load_order(&order_id).await?;
        self.store
            .label_job_for_order(&order_id)
            .await
            .map_err(map_repository_error)?
            .ok_or(OrderRejection::LabelJobDetailsNotFound { order_id })
    }
}

#[cfg(test)]
#[path = "order_service_tests.rs"]
mod tests;
