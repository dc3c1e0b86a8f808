//! PostgreSQL-backed order store using Diesel ORM.
//!
//! One adapter implements the record store and every ledger port so the
//! unit of work in [`OrderRepository::apply`] can span them in a single
//! transaction:
//!
//! 1. `SELECT … FOR UPDATE` on the order row;
//! 2. read the open assignments;
//! 3. run the domain decider against that snapshot;
//! 4. write the order columns, the assignment open/close, the history row,
//!    and any comment filed under the lock.
//!
//! Any rejection or write failure rolls the whole transaction back.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_query;
use diesel::sql_types::{Array, BigInt, Nullable, Text, Uuid as SqlUuid};
use diesel::upsert::excluded;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ActorId;
use crate::domain::orders::{
    AssignmentClosure, HistoryEntry, LabelJobDetails, ListingScope, LockedOrder, Order,
    OrderAssignment, OrderComment, OrderId, OrderPage, OrderRejection, OrderStatus, Page, Stage,
};
use crate::domain::ports::{
    AssignmentLedger, OrderDecider, OrderNotesRepository, OrderRepository, OrderRepositoryError,
    StatusHistoryLedger,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{
    AssignmentRow, CommentRow, CountRow, HistoryRow, LabelJobRow, NewAssignmentRow,
    NewHistoryRow, OrderRow, OrderUpdate,
};
use super::pool::{DbPool, PoolError};
use super::schema::{
    order_assignments, order_comments, order_label_jobs, order_status_history, orders,
};

/// Latest holder per stage, joined onto orders for role-scoped listings.
///
/// Binds: `$1` scope kind, `$2` actor id, `$3` plant queue statuses.
const SCOPED_FROM: &str = "
FROM orders o
LEFT JOIN LATERAL (
    SELECT a.actor_id FROM order_assignments a
    WHERE a.order_id = o.id AND a.stage = 'printing'
    ORDER BY a.assigned_at DESC, a.id DESC LIMIT 1
) printing_holder ON TRUE
LEFT JOIN LATERAL (
    SELECT a.actor_id FROM order_assignments a
    WHERE a.order_id = o.id AND a.stage = 'plant'
    ORDER BY a.assigned_at DESC, a.id DESC LIMIT 1
) plant_holder ON TRUE
WHERE CASE $1
    WHEN 'all' THEN TRUE
    WHEN 'owner' THEN o.owner_id = $2
    WHEN 'printing' THEN o.payment_status = 'payment_verified'
        AND (printing_holder.actor_id IS NULL OR printing_holder.actor_id = $2)
        AND (o.status <> 'declined' OR printing_holder.actor_id IS NOT DISTINCT FROM $2)
    WHEN 'plant' THEN o.status = ANY($3)
        AND (plant_holder.actor_id IS NULL OR plant_holder.actor_id = $2)
    ELSE FALSE
END";

/// Diesel-backed implementation of the order store ports.
#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> OrderRepositoryError {
    map_basic_pool_error(error, |message| OrderRepositoryError::connection(message))
}

fn map_diesel_error(error: DieselError) -> OrderRepositoryError {
    map_basic_diesel_error(
        error,
        OrderRepositoryError::query,
        OrderRepositoryError::connection,
    )
}

/// Failure inside the unit of work; either rolls the transaction back.
#[derive(Debug)]
enum UnitOfWorkError {
    Diesel(DieselError),
    Repository(OrderRepositoryError),
}

impl From<DieselError> for UnitOfWorkError {
    fn from(error: DieselError) -> Self {
        Self::Diesel(error)
    }
}

impl From<OrderRepositoryError> for UnitOfWorkError {
    fn from(error: OrderRepositoryError) -> Self {
        Self::Repository(error)
    }
}

fn map_unit_of_work_error(error: UnitOfWorkError) -> OrderRepositoryError {
    match error {
        UnitOfWorkError::Diesel(err) => map_diesel_error(err),
        UnitOfWorkError::Repository(err) => err,
    }
}

fn scope_binds(scope: &ListingScope) -> (&'static str, Option<Uuid>) {
    match scope {
        ListingScope::All => ("all", None),
        ListingScope::Owner(id) => ("owner", Some(*id.as_uuid())),
        ListingScope::Printing(id) => ("printing", Some(*id.as_uuid())),
        ListingScope::Plant(id) => ("plant", Some(*id.as_uuid())),
    }
}

fn plant_queue() -> Vec<&'static str> {
    OrderStatus::PLANT_QUEUE
        .iter()
        .map(|status| status.as_str())
        .collect()
}

fn collect_rows<R, T>(rows: Vec<R>) -> Result<Vec<T>, OrderRepositoryError>
where
    T: TryFrom<R, Error = OrderRepositoryError>,
{
    rows.into_iter().map(T::try_from).collect()
}

async fn lock_order(
    conn: &mut AsyncPgConnection,
    order_id: &OrderId,
) -> Result<LockedOrder, UnitOfWorkError> {
    let row = orders::table
        .find(order_id.as_uuid())
        .select(OrderRow::as_select())
        .for_update()
        .first::<OrderRow>(conn)
        .await
        .optional()?
        .ok_or_else(|| OrderRepositoryError::not_found(*order_id))?;
    let order = Order::try_from(row)?;

    let open_rows = order_assignments::table
        .filter(order_assignments::order_id.eq(order_id.as_uuid()))
        .filter(order_assignments::completed_at.is_null())
        .select(AssignmentRow::as_select())
        .load::<AssignmentRow>(conn)
        .await?;

    Ok(LockedOrder {
        order,
        open_assignments: collect_rows(open_rows)?,
    })
}

/// Open an assignment; the partial unique index backs the in-lock check.
async fn assign_order(
    conn: &mut AsyncPgConnection,
    assignment: &OrderAssignment,
) -> Result<(), UnitOfWorkError> {
    let inserted = diesel::insert_into(order_assignments::table)
        .values(NewAssignmentRow::from(assignment))
        .execute(conn)
        .await;
    match inserted {
        Ok(_) => Ok(()),
        Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            Err(OrderRepositoryError::rejected(OrderRejection::StageAlreadyAssigned {
                stage: assignment.stage,
            })
            .into())
        }
        Err(err) => Err(err.into()),
    }
}

/// Close the open assignment held by the closing actor.
async fn complete_assignment(
    conn: &mut AsyncPgConnection,
    order_id: &OrderId,
    closure: &AssignmentClosure,
) -> Result<(), UnitOfWorkError> {
    let closed = diesel::update(
        order_assignments::table
            .filter(order_assignments::order_id.eq(order_id.as_uuid()))
            .filter(order_assignments::stage.eq(closure.stage.as_str()))
            .filter(order_assignments::actor_id.eq(closure.actor_id.as_uuid()))
            .filter(order_assignments::completed_at.is_null()),
    )
    .set(order_assignments::completed_at.eq(closure.completed_at))
    .execute(conn)
    .await?;
    if closed == 0 {
        return Err(OrderRepositoryError::rejected(OrderRejection::NotAssigned {
            stage: closure.stage,
        })
        .into());
    }
    Ok(())
}

async fn run_unit_of_work(
    conn: &mut AsyncPgConnection,
    order_id: &OrderId,
    decide: OrderDecider,
) -> Result<Order, UnitOfWorkError> {
    let locked = lock_order(conn, order_id).await?;
    let mutation = decide(&locked).map_err(OrderRepositoryError::rejected)?;

    if let Some(opening) = &mutation.open_assignment {
        if locked.open_assignment(opening.stage).is_some() {
            return Err(OrderRepositoryError::rejected(
                OrderRejection::StageAlreadyAssigned {
                    stage: opening.stage,
                },
            )
            .into());
        }
        assign_order(conn, opening).await?;
    }
    if let Some(closure) = &mutation.close_assignment {
        complete_assignment(conn, order_id, closure).await?;
    }

    let mut order = locked.order;
    if mutation.touches_order() {
        mutation.apply_to(&mut order);
        diesel::update(orders::table.find(order_id.as_uuid()))
            .set(OrderUpdate::from(&order))
            .execute(conn)
            .await?;
    }

    if let Some(entry) = &mutation.history {
        diesel::insert_into(order_status_history::table)
            .values(NewHistoryRow::from(entry))
            .execute(conn)
            .await?;
    }
    if let Some(comment) = &mutation.comment {
        diesel::insert_into(order_comments::table)
            .values(CommentRow::from(comment))
            .execute(conn)
            .await?;
    }
    Ok(order)
}

#[async_trait]
impl OrderRepository for DieselOrderRepository {
    async fn create(
        &self,
        order: &Order,
        created: &HistoryEntry,
    ) -> Result<(), OrderRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let row = OrderRow::from(order);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move {
                diesel::insert_into(orders::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(order_status_history::table)
                    .values(NewHistoryRow::from(created))
                    .execute(conn)
                    .await?;
                Ok::<_, DieselError>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = orders::table
            .find(order_id.as_uuid())
            .select(OrderRow::as_select())
            .first::<OrderRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Order::try_from).transpose()
    }

    async fn list(
        &self,
        scope: &ListingScope,
        page: &Page,
    ) -> Result<OrderPage, OrderRepositoryError> {
        let (kind, actor) = scope_binds(scope);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<OrderRow> = sql_query(format!(
            "SELECT o.* {SCOPED_FROM} ORDER BY o.created_at DESC, o.id DESC LIMIT $4 OFFSET $5"
        ))
        .bind::<Text, _>(kind)
        .bind::<Nullable<SqlUuid>, _>(actor)
        .bind::<Array<Text>, _>(plant_queue())
        .bind::<BigInt, _>(i64::from(page.limit()))
        .bind::<BigInt, _>(i64::from(page.offset()))
        .load(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        let count: CountRow = sql_query(format!("SELECT COUNT(*) AS total {SCOPED_FROM}"))
            .bind::<Text, _>(kind)
            .bind::<Nullable<SqlUuid>, _>(actor)
            .bind::<Array<Text>, _>(plant_queue())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(OrderPage {
            orders: collect_rows(rows)?,
            total: u64::try_from(count.total).unwrap_or_default(),
        })
    }

    async fn apply(
        &self,
        order_id: &OrderId,
        decide: OrderDecider,
    ) -> Result<Order, OrderRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let order_id = *order_id;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| run_unit_of_work(conn, &order_id, decide).scope_boxed())
            .await
            .map_err(|err| {
                let mapped = map_unit_of_work_error(err);
                debug!(%order_id, error = %mapped, "order unit of work rolled back");
                mapped
            })
    }
}

#[async_trait]
impl AssignmentLedger for DieselOrderRepository {
    async fn assignments_for_order(
        &self,
        order_id: &OrderId,
    ) -> Result<Vec<OrderAssignment>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = order_assignments::table
            .filter(order_assignments::order_id.eq(order_id.as_uuid()))
            .order((order_assignments::assigned_at.asc(), order_assignments::id.asc()))
            .select(AssignmentRow::as_select())
            .load::<AssignmentRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_rows(rows)
    }

    async fn is_assigned_to(
        &self,
        order_id: &OrderId,
        actor_id: &ActorId,
        stage: Stage,
    ) -> Result<bool, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            order_assignments::table
                .filter(order_assignments::order_id.eq(order_id.as_uuid()))
                .filter(order_assignments::actor_id.eq(actor_id.as_uuid()))
                .filter(order_assignments::stage.eq(stage.as_str())),
        ))
        .get_result::<bool>(&mut conn)
        .await
        .map_err(map_diesel_error)
    }
}

#[async_trait]
impl StatusHistoryLedger for DieselOrderRepository {
    async fn history_for_order(
        &self,
        order_id: &OrderId,
    ) -> Result<Vec<HistoryEntry>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = order_status_history::table
            .filter(order_status_history::order_id.eq(order_id.as_uuid()))
            .order((
                order_status_history::changed_at.asc(),
                order_status_history::id.asc(),
            ))
            .select(HistoryRow::as_select())
            .load::<HistoryRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_rows(rows)
    }
}

#[async_trait]
impl OrderNotesRepository for DieselOrderRepository {
    async fn comments_for_order(
        &self,
        order_id: &OrderId,
    ) -> Result<Vec<OrderComment>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = order_comments::table
            .filter(order_comments::order_id.eq(order_id.as_uuid()))
            .order((order_comments::created_at.asc(), order_comments::id.asc()))
            .select(CommentRow::as_select())
            .load::<CommentRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_rows(rows)
    }

    async fn save_label_job(&self, details: &LabelJobDetails) -> Result<(), OrderRepositoryError> {
        let row = LabelJobRow::from(details);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(order_label_jobs::table)
            .values(&row)
            .on_conflict(order_label_jobs::order_id)
            .do_update()
            .set((
                order_label_jobs::no_of_sheets.eq(excluded(order_label_jobs::no_of_sheets)),
                order_label_jobs::cutting_type.eq(excluded(order_label_jobs::cutting_type)),
                order_label_jobs::labels_per_sheet
                    .eq(excluded(order_label_jobs::labels_per_sheet)),
                order_label_jobs::description.eq(excluded(order_label_jobs::description)),
                order_label_jobs::updated_by.eq(excluded(order_label_jobs::updated_by)),
                order_label_jobs::updated_at.eq(excluded(order_label_jobs::updated_at)),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn label_job_for_order(
        &self,
        order_id: &OrderId,
    ) -> Result<Option<LabelJobDetails>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = order_label_jobs::table
            .find(order_id.as_uuid())
            .select(LabelJobRow::as_select())
            .first::<LabelJobRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(LabelJobDetails::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    //! Error mapping and bind coverage; database behaviour is exercised by
    //! the integration suite.
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let err = map_pool_error(PoolError::checkout("connection refused"));

        assert!(matches!(err, OrderRepositoryError::Connection { .. }));
        assert!(err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn decider_rejection_survives_rollback_mapping() {
        let err = map_unit_of_work_error(UnitOfWorkError::Repository(
            OrderRepositoryError::rejected(OrderRejection::ReasonRequired),
        ));

        assert_eq!(
            err,
            OrderRepositoryError::rejected(OrderRejection::ReasonRequired)
        );
    }

    #[rstest]
    fn diesel_failure_inside_unit_of_work_maps_to_query_error() {
        let err = map_unit_of_work_error(UnitOfWorkError::Diesel(DieselError::NotFound));

        assert!(matches!(err, OrderRepositoryError::Query { .. }));
    }

    #[rstest]
    #[case(ListingScope::All, "all", false)]
    #[case(ListingScope::Owner(ActorId::random()), "owner", true)]
    #[case(ListingScope::Printing(ActorId::random()), "printing", true)]
    #[case(ListingScope::Plant(ActorId::random()), "plant", true)]
    fn scopes_bind_kind_and_actor(
        #[case] scope: ListingScope,
        #[case] kind: &str,
        #[case] has_actor: bool,
    ) {
        let (bound_kind, actor) = scope_binds(&scope);

        assert_eq!(bound_kind, kind);
        assert_eq!(actor.is_some(), has_actor);
    }

    #[rstest]
    fn plant_queue_binds_storage_names() {
        assert_eq!(
            plant_queue(),
            vec!["ready_for_plant", "plant_processing", "dispatched", "completed"]
        );
    }
}
