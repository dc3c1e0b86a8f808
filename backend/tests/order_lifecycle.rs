//! End-to-end order lifecycle over the in-memory adapters.
//!
//! Drives the public `OrderCommand` and `OrderQuery` ports the way the HTTP
//! layer does, with a real clock and a shared store. `StalledStore` delays
//! one unit of work so contention on the order lock can be staged.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use labelflow::domain::orders::{
    CompanyId, DocumentUrl, HistoryEntry, HistoryStatus, LabelId, LabelJobDetails, LabelJobDraft,
    ListingScope, Order, OrderAssignment, OrderComment, OrderDraft, OrderId, OrderPage,
    OrderRejection, OrderStatus, Page, PaymentStatus, Stage,
};
use labelflow::domain::ports::{
    AddCommentRequest, AssignmentLedger, CreateOrderRequest, ListOrdersRequest, OrderCommand,
    OrderDecider, OrderLookup, OrderNotesRepository, OrderQuery, OrderRepository,
    OrderRepositoryError, OrderStore, PaymentDecisionRequest, PaymentProofRequest,
    SaveLabelJobRequest, StatusHistoryLedger, StatusTransitionRequest,
};
use labelflow::domain::{Actor, ActorId, OrderLifecycleService, Role};
use labelflow::outbound::memory::{InMemoryCompanyDirectory, InMemoryOrderStore};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use uuid::Uuid;

type Service<S = InMemoryOrderStore> = OrderLifecycleService<S, InMemoryCompanyDirectory>;

/// In-memory store whose next `apply` waits before queueing for the lock.
#[derive(Default)]
struct StalledStore {
    inner: InMemoryOrderStore,
    stall_next: AtomicBool,
}

impl StalledStore {
    fn stall_next_apply(&self) {
        self.stall_next.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl OrderRepository for StalledStore {
    async fn create(
        &self,
        order: &Order,
        created: &HistoryEntry,
    ) -> Result<(), OrderRepositoryError> {
        self.inner.create(order, created).await
    }

    async fn find_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderRepositoryError> {
        self.inner.find_by_id(order_id).await
    }

    async fn list(
        &self,
        scope: &ListingScope,
        page: &Page,
    ) -> Result<OrderPage, OrderRepositoryError> {
        self.inner.list(scope, page).await
    }

    async fn apply(
        &self,
        order_id: &OrderId,
        decide: OrderDecider,
    ) -> Result<Order, OrderRepositoryError> {
        if self.stall_next.swap(false, Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        self.inner.apply(order_id, decide).await
    }
}

#[async_trait]
impl AssignmentLedger for StalledStore {
    async fn assignments_for_order(
        &self,
        order_id: &OrderId,
    ) -> Result<Vec<OrderAssignment>, OrderRepositoryError> {
        self.inner.assignments_for_order(order_id).await
    }

    async fn is_assigned_to(
        &self,
        order_id: &OrderId,
        actor_id: &ActorId,
        stage: Stage,
    ) -> Result<bool, OrderRepositoryError> {
        self.inner.is_assigned_to(order_id, actor_id, stage).await
    }
}

#[async_trait]
impl StatusHistoryLedger for StalledStore {
    async fn history_for_order(
        &self,
        order_id: &OrderId,
    ) -> Result<Vec<HistoryEntry>, OrderRepositoryError> {
        self.inner.history_for_order(order_id).await
    }
}

#[async_trait]
impl OrderNotesRepository for StalledStore {
    async fn comments_for_order(
        &self,
        order_id: &OrderId,
    ) -> Result<Vec<OrderComment>, OrderRepositoryError> {
        self.inner.comments_for_order(order_id).await
    }

    async fn save_label_job(&self, details: &LabelJobDetails) -> Result<(), OrderRepositoryError> {
        self.inner.save_label_job(details).await
    }

    async fn label_job_for_order(
        &self,
        order_id: &OrderId,
    ) -> Result<Option<LabelJobDetails>, OrderRepositoryError> {
        self.inner.label_job_for_order(order_id).await
    }
}

struct World<S = InMemoryOrderStore> {
    service: Arc<Service<S>>,
    store: Arc<S>,
    owner: Actor,
    admin: Actor,
    label_id: LabelId,
}

impl<S: OrderStore> World<S> {
    async fn place_order(&self) -> OrderId {
        self.service
            .create_order(CreateOrderRequest {
                actor: self.owner,
                draft: OrderDraft {
                    label_id: self.label_id,
                    variant: "gloss".to_owned(),
                    quantity: 500,
                    cap_color: "white".to_owned(),
                    volume: 330,
                },
            })
            .await
            .expect("owner places order")
            .id()
    }

    async fn verified_order(&self) -> OrderId {
        let order_id = self.place_order().await;
        self.service
            .record_payment_proof(PaymentProofRequest {
                actor: self.owner,
                order_id,
                url: DocumentUrl::parse("https://files.example.com/proof.pdf").expect("valid url"),
            })
            .await
            .expect("owner uploads proof");
        self.service
            .decide_payment(PaymentDecisionRequest {
                actor: self.admin,
                order_id,
                payment_status: "payment_verified".to_owned(),
                reason: None,
            })
            .await
            .expect("admin verifies payment");
        order_id
    }

    async fn transition(
        &self,
        actor: Actor,
        order_id: OrderId,
        status: &str,
    ) -> Result<OrderStatus, OrderRejection> {
        self.service
            .transition_status(StatusTransitionRequest {
                actor,
                order_id,
                status: status.to_owned(),
                reason: None,
            })
            .await
            .map(|order| order.status())
    }
}

fn world_over<S>(store: Arc<S>) -> World<S> {
    let owner = Actor::new(ActorId::random(), Role::BusinessOwner);
    let label_id = LabelId::from_uuid(Uuid::new_v4());
    let directory = InMemoryCompanyDirectory::default().with_company(
        owner.id(),
        CompanyId::from_uuid(Uuid::new_v4()),
        [label_id],
    );
    let service = Arc::new(OrderLifecycleService::new(
        Arc::clone(&store),
        Arc::new(directory),
        Arc::new(DefaultClock),
    ));
    World {
        service,
        store,
        owner,
        admin: Actor::new(ActorId::random(), Role::Admin),
        label_id,
    }
}

#[fixture]
fn world() -> World {
    world_over(Arc::new(InMemoryOrderStore::new()))
}

#[rstest]
#[tokio::test]
async fn order_travels_from_placement_to_dispatch(world: World) {
    let printer = Actor::new(ActorId::random(), Role::Printing);
    let plant = Actor::new(ActorId::random(), Role::Plant);
    let order_id = world.verified_order().await;

    assert_eq!(
        world.transition(printer, order_id, "accepted").await,
        Ok(OrderStatus::Printing)
    );
    world
        .service
        .add_comment(AddCommentRequest {
            actor: printer,
            order_id,
            text: "ink batch 42".to_owned(),
        })
        .await
        .expect("assigned printer comments");
    assert_eq!(
        world.transition(printer, order_id, "ready_for_plant").await,
        Ok(OrderStatus::ReadyForPlant)
    );
    assert_eq!(
        world.transition(plant, order_id, "accepted").await,
        Ok(OrderStatus::PlantProcessing)
    );
    assert_eq!(
        world.transition(plant, order_id, "dispatched").await,
        Ok(OrderStatus::Dispatched)
    );

    let history = world
        .service
        .order_history(OrderLookup {
            actor: world.owner,
            order_id,
        })
        .await
        .expect("owner reads history");
    let statuses: Vec<HistoryStatus> = history.iter().map(|entry| entry.status).collect();
    assert_eq!(
        statuses,
        vec![
            HistoryStatus::Order(OrderStatus::Placed),
            HistoryStatus::Payment(PaymentStatus::PaymentUploaded),
            HistoryStatus::Payment(PaymentStatus::PaymentVerified),
            HistoryStatus::Order(OrderStatus::Printing),
            HistoryStatus::Order(OrderStatus::ReadyForPlant),
            HistoryStatus::Order(OrderStatus::PlantProcessing),
            HistoryStatus::Order(OrderStatus::Dispatched),
        ]
    );

    let assignments = world
        .store
        .assignments_for_order(&order_id)
        .await
        .expect("assignments readable");
    assert_eq!(assignments.len(), 2);
    assert!(assignments.iter().all(|assignment| !assignment.is_open()));

    let comments = world
        .service
        .list_comments(OrderLookup {
            actor: world.admin,
            order_id,
        })
        .await
        .expect("admin lists comments");
    assert_eq!(comments.len(), 1);
}

#[rstest]
#[tokio::test]
async fn concurrent_accepts_leave_one_assignment(world: World) {
    let order_id = world.verified_order().await;
    let first = Actor::new(ActorId::random(), Role::Printing);
    let second = Actor::new(ActorId::random(), Role::Printing);

    let (left, right) = tokio::join!(
        world.transition(first, order_id, "accepted"),
        world.transition(second, order_id, "accepted"),
    );

    let outcomes = [left, right];
    let winners = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    assert_eq!(winners, 1, "exactly one printer claims the order: {outcomes:?}");
    assert!(outcomes.iter().any(|outcome| matches!(
        outcome,
        Err(OrderRejection::InvalidPrintingTransition { .. }
            | OrderRejection::StageAlreadyAssigned { .. })
    )));

    let open: Vec<_> = world
        .store
        .assignments_for_order(&order_id)
        .await
        .expect("assignments readable")
        .into_iter()
        .filter(|assignment| assignment.is_open())
        .collect();
    assert_eq!(open.len(), 1);
    assert_eq!(open.first().map(|a| a.stage), Some(Stage::Printing));
}

#[rstest]
#[tokio::test]
async fn only_the_holder_hands_off(world: World) {
    let order_id = world.verified_order().await;
    let holder = Actor::new(ActorId::random(), Role::Printing);
    let intruder = Actor::new(ActorId::random(), Role::Printing);
    world
        .transition(holder, order_id, "accepted")
        .await
        .expect("holder claims");

    assert_eq!(
        world.transition(intruder, order_id, "ready_for_plant").await,
        Err(OrderRejection::NotAssigned {
            stage: Stage::Printing
        })
    );
    assert_eq!(
        world.transition(holder, order_id, "ready_for_plant").await,
        Ok(OrderStatus::ReadyForPlant)
    );
}

#[rstest]
#[tokio::test]
async fn printing_waits_for_verified_payment(world: World) {
    let order_id = world.place_order().await;
    let printer = Actor::new(ActorId::random(), Role::Printing);

    assert_eq!(
        world.transition(printer, order_id, "accepted").await,
        Err(OrderRejection::PrintingRequiresVerifiedPayment)
    );
}

#[rstest]
#[tokio::test]
async fn listing_is_scoped_per_role(world: World) {
    let claimed = world.verified_order().await;
    world.verified_order().await;
    let printer = Actor::new(ActorId::random(), Role::Printing);
    world
        .transition(printer, claimed, "accepted")
        .await
        .expect("printer claims");

    let list = |actor: Actor| {
        let service = world.service.clone();
        async move {
            service
                .list_orders(ListOrdersRequest {
                    actor,
                    page: Page::new(None, None),
                })
                .await
                .expect("listing succeeds")
        }
    };

    let owner_page = list(world.owner).await;
    assert_eq!(owner_page.total, 2);

    let printer_page = list(printer).await;
    assert_eq!(printer_page.total, 2, "placed orders plus the held one");

    let other_printer = list(Actor::new(ActorId::random(), Role::Printing)).await;
    assert_eq!(other_printer.total, 1, "only the unclaimed placed order");

    let stranger = list(Actor::new(ActorId::random(), Role::BusinessOwner)).await;
    assert_eq!(stranger.total, 0);
}

#[rstest]
#[tokio::test]
async fn label_job_is_visible_to_the_assigned_printer_only(world: World) {
    let order_id = world.verified_order().await;
    let printer = Actor::new(ActorId::random(), Role::Printing);
    world
        .service
        .save_label_job(SaveLabelJobRequest {
            actor: world.admin,
            order_id,
            draft: LabelJobDraft {
                no_of_sheets: 12,
                cutting_type: "die-cut".to_owned(),
                labels_per_sheet: 24,
                description: None,
            },
        })
        .await
        .expect("admin saves job");

    let lookup = |actor| OrderLookup { actor, order_id };
    assert_eq!(
        world.service.label_job(lookup(printer)).await.err(),
        Some(OrderRejection::NotAssigned {
            stage: Stage::Printing
        })
    );

    world
        .transition(printer, order_id, "accepted")
        .await
        .expect("printer claims");
    let details = world
        .service
        .label_job(lookup(printer))
        .await
        .expect("holder reads job");
    assert_eq!(details.no_of_sheets, 12);
}

#[rstest]
#[tokio::test]
async fn history_follows_commit_order_when_a_caller_waits_for_the_lock() {
    let world = world_over(Arc::new(StalledStore::default()));
    let order_id = world.verified_order().await;
    let first_admin = Actor::new(ActorId::random(), Role::Admin);
    let second_admin = Actor::new(ActorId::random(), Role::Admin);

    world.store.stall_next_apply();
    let (stalled, prompt) = tokio::join!(
        world.transition(first_admin, order_id, "completed"),
        async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            world.transition(second_admin, order_id, "dispatched").await
        },
    );
    assert_eq!(stalled, Ok(OrderStatus::Completed));
    assert_eq!(prompt, Ok(OrderStatus::Dispatched));

    let order = world
        .service
        .get_order(OrderLookup {
            actor: world.admin,
            order_id,
        })
        .await
        .expect("order readable");
    let history = world
        .service
        .order_history(OrderLookup {
            actor: world.admin,
            order_id,
        })
        .await
        .expect("history readable");

    assert_eq!(order.status(), OrderStatus::Completed);
    assert_eq!(
        history.last().map(|entry| entry.status),
        Some(HistoryStatus::Order(OrderStatus::Completed))
    );
    assert!(
        history
            .windows(2)
            .all(|pair| matches!(pair, [earlier, later] if earlier.changed_at <= later.changed_at))
    );
    assert_eq!(history.last().map(|entry| entry.changed_at), Some(order.updated_at()));
}
