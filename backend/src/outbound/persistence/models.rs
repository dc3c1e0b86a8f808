//! Internal Diesel row structs and their translation to domain types.
//!
//! Row types never leave the persistence module. Reading a row back goes
//! through the domain parsers, so a corrupted enum or URL column surfaces as a
//! query error instead of a panic.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use uuid::Uuid;

use crate::domain::orders::{
    DocumentUrl, HistoryEntry, LabelId, LabelJobDetails, Order, OrderAssignment, OrderComment,
    OrderId, OrderRecord, Reason,
};
use crate::domain::ports::OrderRepositoryError;
use crate::domain::ActorId;

use super::schema::{
    order_assignments, order_comments, order_label_jobs, order_status_history, orders,
};

fn parse_column<T>(column: &str, raw: &str) -> Result<T, OrderRepositoryError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|err| OrderRepositoryError::query(format!("invalid {column} column: {err}")))
}

fn count_column(column: &str, value: i32) -> Result<u32, OrderRepositoryError> {
    u32::try_from(value)
        .map_err(|_| OrderRepositoryError::query(format!("negative {column} column: {value}")))
}

fn url_column(
    column: &str,
    raw: Option<String>,
) -> Result<Option<DocumentUrl>, OrderRepositoryError> {
    raw.map(|value| {
        DocumentUrl::parse(&value)
            .map_err(|err| OrderRepositoryError::query(format!("invalid {column} column: {err}")))
    })
    .transpose()
}

/// Domain validation keeps counts within `MAX_COUNT`, so this never clamps
/// a validated value.
fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// Full order row, also readable from raw listing queries.
#[derive(Debug, Clone, Queryable, Selectable, QueryableByName, Insertable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrderRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub label_id: Uuid,
    pub variant: String,
    pub quantity: i32,
    pub cap_color: String,
    pub volume: i32,
    pub status: String,
    pub payment_status: String,
    pub decline_reason: Option<String>,
    pub payment_proof_url: Option<String>,
    pub invoice_url: Option<String>,
    pub pi_url: Option<String>,
    pub expected_delivery: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Order> for OrderRow {
    fn from(order: &Order) -> Self {
        let record = order.record();
        Self {
            id: *record.id.as_uuid(),
            owner_id: *record.owner_id.as_uuid(),
            label_id: *record.label_id.as_uuid(),
            variant: record.variant.clone(),
            quantity: to_i32(record.quantity),
            cap_color: record.cap_color.clone(),
            volume: to_i32(record.volume),
            status: record.status.as_str().to_owned(),
            payment_status: record.payment_status.as_str().to_owned(),
            decline_reason: record.decline_reason.as_ref().map(|r| r.as_str().to_owned()),
            payment_proof_url: record.payment_proof_url.as_ref().map(|u| u.as_str().to_owned()),
            invoice_url: record.invoice_url.as_ref().map(|u| u.as_str().to_owned()),
            pi_url: record.pi_url.as_ref().map(|u| u.as_str().to_owned()),
            expected_delivery: record.expected_delivery,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl TryFrom<OrderRow> for Order {
    type Error = OrderRepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Order::restore(OrderRecord {
            id: OrderId::from_uuid(row.id),
            owner_id: ActorId::from_uuid(row.owner_id),
            label_id: LabelId::from_uuid(row.label_id),
            variant: row.variant,
            quantity: count_column("quantity", row.quantity)?,
            cap_color: row.cap_color,
            volume: count_column("volume", row.volume)?,
            status: parse_column("status", &row.status)?,
            payment_status: parse_column("payment_status", &row.payment_status)?,
            decline_reason: row.decline_reason.and_then(Reason::from_stored),
            payment_proof_url: url_column("payment_proof_url", row.payment_proof_url)?,
            invoice_url: url_column("invoice_url", row.invoice_url)?,
            pi_url: url_column("pi_url", row.pi_url)?,
            expected_delivery: row.expected_delivery,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }))
    }
}

/// Columns an order mutation may change.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = orders)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct OrderUpdate {
    pub status: String,
    pub payment_status: String,
    pub decline_reason: Option<String>,
    pub payment_proof_url: Option<String>,
    pub invoice_url: Option<String>,
    pub pi_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Order> for OrderUpdate {
    fn from(order: &Order) -> Self {
        let row = OrderRow::from(order);
        Self {
            status: row.status,
            payment_status: row.payment_status,
            decline_reason: row.decline_reason,
            payment_proof_url: row.payment_proof_url,
            invoice_url: row.invoice_url,
            pi_url: row.pi_url,
            updated_at: row.updated_at,
        }
    }
}

/// Single-column result of the listing count query.
#[derive(Debug, QueryableByName)]
pub(crate) struct CountRow {
    #[diesel(sql_type = BigInt)]
    pub total: i64,
}

// ---------------------------------------------------------------------------
// Ledgers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = order_status_history)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct HistoryRow {
    pub order_id: Uuid,
    pub status: String,
    pub changed_by: Uuid,
    pub changed_at: DateTime<Utc>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = order_status_history)]
pub(crate) struct NewHistoryRow<'a> {
    pub order_id: Uuid,
    pub status: &'a str,
    pub changed_by: Uuid,
    pub changed_at: DateTime<Utc>,
    pub reason: Option<&'a str>,
}

impl<'a> From<&'a HistoryEntry> for NewHistoryRow<'a> {
    fn from(entry: &'a HistoryEntry) -> Self {
        Self {
            order_id: *entry.order_id.as_uuid(),
            status: entry.status.as_str(),
            changed_by: *entry.changed_by.as_uuid(),
            changed_at: entry.changed_at,
            reason: entry.reason.as_ref().map(Reason::as_str),
        }
    }
}

impl TryFrom<HistoryRow> for HistoryEntry {
    type Error = OrderRepositoryError;

    fn try_from(row: HistoryRow) -> Result<Self, Self::Error> {
        let status: crate::domain::orders::HistoryStatus = parse_column("status", &row.status)?;
        Ok(HistoryEntry::new(
            OrderId::from_uuid(row.order_id),
            status,
            ActorId::from_uuid(row.changed_by),
            row.changed_at,
            row.reason.and_then(Reason::from_stored),
        ))
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = order_assignments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AssignmentRow {
    pub order_id: Uuid,
    pub stage: String,
    pub actor_id: Uuid,
    pub assigned_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = order_assignments)]
pub(crate) struct NewAssignmentRow<'a> {
    pub order_id: Uuid,
    pub stage: &'a str,
    pub actor_id: Uuid,
    pub assigned_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
}

impl<'a> From<&'a OrderAssignment> for NewAssignmentRow<'a> {
    fn from(assignment: &'a OrderAssignment) -> Self {
        Self {
            order_id: *assignment.order_id.as_uuid(),
            stage: assignment.stage.as_str(),
            actor_id: *assignment.actor_id.as_uuid(),
            assigned_at: assignment.assigned_at,
            deadline: assignment.deadline,
        }
    }
}

impl TryFrom<AssignmentRow> for OrderAssignment {
    type Error = OrderRepositoryError;

    fn try_from(row: AssignmentRow) -> Result<Self, Self::Error> {
        Ok(OrderAssignment {
            order_id: OrderId::from_uuid(row.order_id),
            stage: parse_column("stage", &row.stage)?,
            actor_id: ActorId::from_uuid(row.actor_id),
            assigned_at: row.assigned_at,
            deadline: row.deadline,
            completed_at: row.completed_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Notes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = order_comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CommentRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub author_id: Uuid,
    pub author_role: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl From<&OrderComment> for CommentRow {
    fn from(comment: &OrderComment) -> Self {
        Self {
            id: comment.id,
            order_id: *comment.order_id.as_uuid(),
            author_id: *comment.author_id.as_uuid(),
            author_role: comment.author_role.as_str().to_owned(),
            body: comment.body.clone(),
            created_at: comment.created_at,
        }
    }
}

impl TryFrom<CommentRow> for OrderComment {
    type Error = OrderRepositoryError;

    fn try_from(row: CommentRow) -> Result<Self, Self::Error> {
        Ok(OrderComment {
            id: row.id,
            order_id: OrderId::from_uuid(row.order_id),
            author_id: ActorId::from_uuid(row.author_id),
            author_role: parse_column("author_role", &row.author_role)?,
            body: row.body,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = order_label_jobs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct LabelJobRow {
    pub order_id: Uuid,
    pub no_of_sheets: i32,
    pub cutting_type: String,
    pub labels_per_sheet: i32,
    pub description: Option<String>,
    pub updated_by: Uuid,
    pub updated_at: DateTime<Utc>,
}

impl From<&LabelJobDetails> for LabelJobRow {
    fn from(details: &LabelJobDetails) -> Self {
        Self {
            order_id: *details.order_id.as_uuid(),
            no_of_sheets: to_i32(details.no_of_sheets),
            cutting_type: details.cutting_type.clone(),
            labels_per_sheet: to_i32(details.labels_per_sheet),
            description: details.description.clone(),
            updated_by: *details.updated_by.as_uuid(),
            updated_at: details.updated_at,
        }
    }
}

impl TryFrom<LabelJobRow> for LabelJobDetails {
    type Error = OrderRepositoryError;

    fn try_from(row: LabelJobRow) -> Result<Self, Self::Error> {
        Ok(LabelJobDetails {
            order_id: OrderId::from_uuid(row.order_id),
            no_of_sheets: count_column("no_of_sheets", row.no_of_sheets)?,
            cutting_type: row.cutting_type,
            labels_per_sheet: count_column("labels_per_sheet", row.labels_per_sheet)?,
            description: row.description,
            updated_by: ActorId::from_uuid(row.updated_by),
            updated_at: row.updated_at,
        })
    }
}
