//! Write-sets applied by a repository unit of work.
//!
//! A repository locks the order, hands the decider a [`LockedOrder`], and
//! applies the returned [`OrderMutation`] in the same transaction. Adapters
//! stay free of business rules: they only persist what the mutation says.

use chrono::{DateTime, Utc};

use super::{
    AssignmentClosure, DocumentUrl, HistoryEntry, Order, OrderAssignment, OrderComment,
    OrderStatus, PaymentStatus, Reason, Stage,
};

/// An order as read under its row lock, with its open assignments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockedOrder {
    pub order: Order,
    pub open_assignments: Vec<OrderAssignment>,
}

impl LockedOrder {
    /// The open assignment for `stage`, if one exists.
    pub fn open_assignment(&self, stage: Stage) -> Option<&OrderAssignment> {
        self.open_assignments
            .iter()
            .find(|assignment| assignment.stage == stage && assignment.is_open())
    }
}

/// Column-level changes to the order row. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderChanges {
    pub status: Option<OrderStatus>,
    pub decline_reason: Option<Reason>,
    pub payment_status: Option<PaymentStatus>,
    pub payment_proof_url: Option<DocumentUrl>,
    pub invoice_url: Option<DocumentUrl>,
    pub pi_url: Option<DocumentUrl>,
}

/// Everything one successful operation writes, as a single atomic unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderMutation {
    pub changes: OrderChanges,
    pub history: Option<HistoryEntry>,
    pub open_assignment: Option<OrderAssignment>,
    pub close_assignment: Option<AssignmentClosure>,
    pub comment: Option<OrderComment>,
    pub at: DateTime<Utc>,
}

impl OrderMutation {
    /// A mutation touching only order columns.
    pub fn changes_only(changes: OrderChanges, at: DateTime<Utc>) -> Self {
        Self {
            changes,
            history: None,
            open_assignment: None,
            close_assignment: None,
            comment: None,
            at,
        }
    }

    /// A mutation that only files a comment; the order row stays as read.
    pub fn comment_only(comment: OrderComment) -> Self {
        let at = comment.created_at;
        Self {
            comment: Some(comment),
            ..Self::changes_only(OrderChanges::default(), at)
        }
    }

    /// Whether the order row itself changes.
    pub fn touches_order(&self) -> bool {
        self.changes != OrderChanges::default()
    }

    /// Apply the column changes to an in-memory order.
    ///
    /// Moving to any status other than `declined` clears the decline reason.
    /// `updated_at` only moves when a column changes.
    pub fn apply_to(&self, order: &mut Order) {
        if !self.touches_order() {
            return;
        }
        let OrderChanges {
            status,
            decline_reason,
            payment_status,
            payment_proof_url,
            invoice_url,
            pi_url,
        } = &self.changes;
        let record = order.record_mut();

        if let Some(next) = status {
            record.status = *next;
            record.decline_reason = if *next == OrderStatus::Declined {
                decline_reason.clone()
            } else {
                None
            };
        }
        if let Some(next) = payment_status {
            record.payment_status = *next;
        }
        if let Some(url) = payment_proof_url {
            record.payment_proof_url = Some(url.clone());
        }
        if let Some(url) = invoice_url {
            record.invoice_url = Some(url.clone());
        }
        if let Some(url) = pi_url {
            record.pi_url = Some(url.clone());
        }
        record.updated_at = self.at;
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use rstest::rstest;
    use uuid::Uuid;

    use super::*;
    use crate::domain::ActorId;
    use crate::domain::orders::{LabelId, OrderDetails, OrderDraft};

    fn placed_order(now: DateTime<Utc>) -> Order {
        let details = OrderDetails::new(OrderDraft {
            label_id: LabelId::from_uuid(Uuid::new_v4()),
            variant: "matte".to_owned(),
            quantity: 10,
            cap_color: "white".to_owned(),
            volume: 330,
        })
        .expect("valid draft");
        Order::place(ActorId::random(), details, now)
    }

    #[rstest]
    fn decline_sets_reason_and_later_status_clears_it() {
        let now = Utc::now();
        let mut order = placed_order(now);
        let reason = Reason::parse(Some("artwork missing"));

        OrderMutation::changes_only(
            OrderChanges {
                status: Some(OrderStatus::Declined),
                decline_reason: reason.clone(),
                ..OrderChanges::default()
            },
            now,
        )
        .apply_to(&mut order);
        assert_eq!(order.decline_reason(), reason.as_ref());

        let later = now + Duration::hours(1);
        OrderMutation::changes_only(
            OrderChanges {
                status: Some(OrderStatus::Placed),
                ..OrderChanges::default()
            },
            later,
        )
        .apply_to(&mut order);
        assert!(order.decline_reason().is_none());
        assert_eq!(order.updated_at(), later);
    }

    #[rstest]
    fn untouched_fields_survive() {
        let now = Utc::now();
        let mut order = placed_order(now);
        let url = DocumentUrl::parse("https://blobs.example.com/invoice.pdf").expect("url");

        OrderMutation::changes_only(
            OrderChanges {
                invoice_url: Some(url.clone()),
                ..OrderChanges::default()
            },
            now,
        )
        .apply_to(&mut order);

        assert_eq!(order.invoice_url(), Some(&url));
        assert!(order.pi_url().is_none());
        assert_eq!(order.status(), OrderStatus::Placed);
        assert_eq!(order.payment_status(), PaymentStatus::PaymentPending);
    }

    #[rstest]
    fn comment_only_leaves_order_untouched() {
        let now = Utc::now();
        let mut order = placed_order(now);
        let before = order.clone();
        let comment = OrderComment::compose(
            order.id(),
            ActorId::random(),
            crate::domain::Role::Printing,
            "ink batch 7",
            now + Duration::minutes(5),
        )
        .expect("non-blank comment");

        let mutation = OrderMutation::comment_only(comment);
        mutation.apply_to(&mut order);

        assert!(!mutation.touches_order());
        assert_eq!(order, before);
        assert_eq!(mutation.at, now + Duration::minutes(5));
    }
}
