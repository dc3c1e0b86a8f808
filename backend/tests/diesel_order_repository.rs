//! Integration tests for the Diesel order adapters against PostgreSQL.
//!
//! Set `LABELFLOW_TEST_DATABASE_URL` to a disposable database to run them;
//! without it every test returns early. Each test seeds its own company and
//! label so runs do not interfere with each other.

use std::sync::Arc;

use diesel::sql_types::{Text, Uuid as SqlUuid};
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use labelflow::domain::orders::{
    CompanyId, DocumentUrl, LabelId, LabelJobDraft, OrderDraft, OrderId, OrderRejection,
    OrderStatus, PaymentStatus,
};
use labelflow::domain::ports::{
    AddCommentRequest, AssignmentLedger, CreateOrderRequest, OrderCommand, OrderLookup, OrderQuery,
    PaymentDecisionRequest, PaymentProofRequest, SaveLabelJobRequest, StatusTransitionRequest,
};
use labelflow::domain::{Actor, ActorId, OrderLifecycleService, Role};
use labelflow::outbound::persistence::{
    DbPool, DieselCompanyDirectory, DieselOrderRepository, PoolConfig, run_pending_migrations,
};
use mockable::DefaultClock;
use rstest::rstest;
use uuid::Uuid;

const DATABASE_URL_ENV: &str = "LABELFLOW_TEST_DATABASE_URL";

type Service = OrderLifecycleService<DieselOrderRepository, DieselCompanyDirectory>;

struct Harness {
    service: Arc<Service>,
    repository: Arc<DieselOrderRepository>,
    owner: Actor,
    admin: Actor,
    label_id: LabelId,
}

async fn seed_company(database_url: &str, owner: ActorId) -> LabelId {
    let company_id = CompanyId::from_uuid(Uuid::new_v4());
    let label_id = LabelId::from_uuid(Uuid::new_v4());
    let mut conn = AsyncPgConnection::establish(database_url)
        .await
        .expect("test database reachable");
    diesel::sql_query("INSERT INTO companies (id, owner_id, name) VALUES ($1, $2, $3)")
        .bind::<SqlUuid, _>(*company_id.as_uuid())
        .bind::<SqlUuid, _>(*owner.as_uuid())
        .bind::<Text, _>("Harbour Bottling")
        .execute(&mut conn)
        .await
        .expect("company seeded");
    diesel::sql_query("INSERT INTO labels (id, company_id, name) VALUES ($1, $2, $3)")
        .bind::<SqlUuid, _>(*label_id.as_uuid())
        .bind::<SqlUuid, _>(*company_id.as_uuid())
        .bind::<Text, _>("Sparkling 330ml")
        .execute(&mut conn)
        .await
        .expect("label seeded");
    label_id
}

async fn harness() -> Option<Harness> {
    let Ok(database_url) = std::env::var(DATABASE_URL_ENV) else {
        eprintln!("{DATABASE_URL_ENV} not set; skipping");
        return None;
    };
    run_pending_migrations(&database_url)
        .await
        .expect("migrations apply");
    let pool = DbPool::new(PoolConfig::new(database_url.clone()).with_max_size(4))
        .await
        .expect("pool builds");

    let owner = Actor::new(ActorId::random(), Role::BusinessOwner);
    let label_id = seed_company(&database_url, owner.id()).await;
    let repository = Arc::new(DieselOrderRepository::new(pool.clone()));
    let service = Arc::new(OrderLifecycleService::new(
        repository.clone(),
        Arc::new(DieselCompanyDirectory::new(pool)),
        Arc::new(DefaultClock),
    ));
    Some(Harness {
        service,
        repository,
        owner,
        admin: Actor::new(ActorId::random(), Role::Admin),
        label_id,
    })
}

impl Harness {
    async fn verified_order(&self) -> OrderId {
        let order_id = self
            .service
            .create_order(CreateOrderRequest {
                actor: self.owner,
                draft: OrderDraft {
                    label_id: self.label_id,
                    variant: "matte".to_owned(),
                    quantity: 1000,
                    cap_color: "green".to_owned(),
                    volume: 330,
                },
            })
            .await
            .expect("order placed")
            .id();
        self.service
            .record_payment_proof(PaymentProofRequest {
                actor: self.owner,
                order_id,
                url: DocumentUrl::parse("https://files.example.com/receipt.png")
                    .expect("valid url"),
            })
            .await
            .expect("proof recorded");
        let order = self
            .service
            .decide_payment(PaymentDecisionRequest {
                actor: self.admin,
                order_id,
                payment_status: "payment_verified".to_owned(),
                reason: None,
            })
            .await
            .expect("payment verified");
        assert_eq!(order.payment_status(), PaymentStatus::PaymentVerified);
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

#[rstest]
#[tokio::test]
async fn lifecycle_persists_history_and_assignments() {
    let Some(h) = harness().await else {
        return;
    };
    let printer = Actor::new(ActorId::random(), Role::Printing);
    let order_id = h.verified_order().await;

    assert_eq!(
        h.transition(printer, order_id, "accepted").await,
        Ok(OrderStatus::Printing)
    );
    let comment = h
        .service
        .add_comment(AddCommentRequest {
            actor: printer,
            order_id,
            text: " plate cracked, reprinting ".to_owned(),
        })
        .await
        .expect("assigned printer comments");
    assert_eq!(
        h.transition(printer, order_id, "ready_for_plant").await,
        Ok(OrderStatus::ReadyForPlant)
    );
    assert_eq!(
        h.service
            .add_comment(AddCommentRequest {
                actor: printer,
                order_id,
                text: "late note".to_owned(),
            })
            .await
            .err(),
        Some(OrderRejection::WrongStage {
            expected: OrderStatus::Printing,
            current: OrderStatus::ReadyForPlant,
        })
    );

    let history = h
        .service
        .order_history(OrderLookup {
            actor: h.admin,
            order_id,
        })
        .await
        .expect("history readable");
    assert_eq!(history.len(), 5);

    let assignments = h
        .repository
        .assignments_for_order(&order_id)
        .await
        .expect("assignments readable");
    assert_eq!(assignments.len(), 1);
    assert!(assignments.iter().all(|a| !a.is_open()));

    let comments = h
        .service
        .list_comments(OrderLookup {
            actor: h.admin,
            order_id,
        })
        .await
        .expect("comments readable");
    let stored: Vec<_> = comments
        .iter()
        .map(|stored| (stored.id, stored.body.as_str()))
        .collect();
    assert_eq!(stored, vec![(comment.id, "plate cracked, reprinting")]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn racing_printers_cannot_both_claim() {
    let Some(h) = harness().await else {
        return;
    };
    let h = Arc::new(h);
    let order_id = h.verified_order().await;

    let claims = [ActorId::random(), ActorId::random()].map(|id| {
        let h = h.clone();
        tokio::spawn(async move {
            h.transition(Actor::new(id, Role::Printing), order_id, "accepted")
                .await
        })
    });
    let mut outcomes = Vec::new();
    for claim in claims {
        outcomes.push(claim.await.expect("claim task completes"));
    }

    assert_eq!(outcomes.iter().filter(|o| o.is_ok()).count(), 1);
    let open = h
        .repository
        .assignments_for_order(&order_id)
        .await
        .expect("assignments readable")
        .into_iter()
        .filter(|a| a.is_open())
        .count();
    assert_eq!(open, 1);
}

#[rstest]
#[tokio::test]
async fn rejected_transition_leaves_no_trace() {
    let Some(h) = harness().await else {
        return;
    };
    let order_id = h.verified_order().await;
    let plant = Actor::new(ActorId::random(), Role::Plant);

    let outcome = h.transition(plant, order_id, "dispatched").await;

    assert!(matches!(
        outcome,
        Err(OrderRejection::PlantCannotHandleStatus { .. })
    ));
    let history = h
        .service
        .order_history(OrderLookup {
            actor: h.admin,
            order_id,
        })
        .await
        .expect("history readable");
    assert_eq!(history.len(), 3);
}

#[rstest]
#[tokio::test]
async fn label_job_upsert_replaces_previous_details() {
    let Some(h) = harness().await else {
        return;
    };
    let order_id = h.verified_order().await;
    let save = |sheets: i64| {
        let h = &h;
        async move {
            h.service
                .save_label_job(SaveLabelJobRequest {
                    actor: h.admin,
                    order_id,
                    draft: LabelJobDraft {
                        no_of_sheets: sheets,
                        cutting_type: "kiss-cut".to_owned(),
                        labels_per_sheet: 16,
                        description: Some("matte laminate".to_owned()),
                    },
                })
                .await
                .expect("details saved")
        }
    };

    save(10).await;
    save(14).await;

    let details = h
        .service
        .label_job(OrderLookup {
            actor: h.admin,
            order_id,
        })
        .await
        .expect("details readable");
    assert_eq!(details.no_of_sheets, 14);
}
