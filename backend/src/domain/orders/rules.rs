//! Transition rules for every role.
//!
//! All decisions are pure functions of the actor, the order as read under
//! its lock, and the request. The repository applies the resulting
//! [`OrderMutation`] atomically; nothing here performs I/O.
//!
//! | role     | current            | target                          | effect                         |
//! |----------|--------------------|---------------------------------|--------------------------------|
//! | admin    | any                | any status (payment verified)   | set status                     |
//! | admin    | any                | `declined` + reason             | set status                     |
//! | printing | `placed`           | `accepted`                      | open printing, `printing`      |
//! | printing | `placed`           | `declined` + reason             | `declined`                     |
//! | printing | `printing`         | `ready_for_plant`               | close printing                 |
//! | plant    | `ready_for_plant`  | `accepted` / `plant_processing` | open plant, `plant_processing` |
//! | plant    | `plant_processing` | `dispatched`                    | close plant                    |

use chrono::{DateTime, Utc};

use crate::domain::{Actor, ActorId, Role};

use super::{
    AssignmentClosure, HistoryEntry, LockedOrder, Order, OrderAssignment, OrderChanges,
    OrderMutation, OrderRejection, OrderStatus, PaymentStatus, Reason, Stage, TransitionTarget,
};

/// Assignment ledger side effect of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentEffect {
    None,
    Open(Stage),
    Close(Stage),
}

/// Decision reached for an allowed status transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPlan {
    pub next: OrderStatus,
    pub reason: Option<Reason>,
    pub assignment: AssignmentEffect,
}

impl TransitionPlan {
    fn advance(next: OrderStatus, assignment: AssignmentEffect) -> Self {
        Self {
            next,
            reason: None,
            assignment,
        }
    }

    fn decline(reason: Option<Reason>) -> Result<Self, OrderRejection> {
        let reason = reason.ok_or(OrderRejection::ReasonRequired)?;
        Ok(Self {
            next: OrderStatus::Declined,
            reason: Some(reason),
            assignment: AssignmentEffect::None,
        })
    }

    /// Expand the plan into the write-set for `order`.
    pub fn into_mutation(self, order: &Order, actor_id: ActorId, now: DateTime<Utc>) -> OrderMutation {
        let (open_assignment, close_assignment) = match self.assignment {
            AssignmentEffect::None => (None, None),
            AssignmentEffect::Open(stage) => (
                Some(OrderAssignment::open(order.id(), stage, actor_id, now)),
                None,
            ),
            AssignmentEffect::Close(stage) => (
                None,
                Some(AssignmentClosure {
                    stage,
                    actor_id,
                    completed_at: now,
                }),
            ),
        };
        OrderMutation {
            changes: OrderChanges {
                status: Some(self.next),
                decline_reason: self.reason.clone(),
                ..OrderChanges::default()
            },
            history: Some(HistoryEntry::new(
                order.id(),
                self.next,
                actor_id,
                now,
                self.reason,
            )),
            open_assignment,
            close_assignment,
            comment: None,
            at: now,
        }
    }
}

/// Decide whether `actor` may move the locked order to `target`.
pub fn plan_transition(
    actor: &Actor,
    locked: &LockedOrder,
    target: TransitionTarget,
    reason: Option<Reason>,
) -> Result<TransitionPlan, OrderRejection> {
    match actor.role() {
        Role::Admin => plan_admin(&locked.order, target, reason),
        Role::Printing => plan_printing(actor.id(), locked, target, reason),
        Role::Plant => plan_plant(actor.id(), locked, target),
        role @ Role::BusinessOwner => Err(OrderRejection::UnauthorizedRole { role }),
    }
}

fn plan_admin(
    order: &Order,
    target: TransitionTarget,
    reason: Option<Reason>,
) -> Result<TransitionPlan, OrderRejection> {
    let TransitionTarget::Status(next) = target else {
        return Err(invalid_for(Role::Admin, target));
    };
    if next == OrderStatus::Declined {
        return TransitionPlan::decline(reason);
    }
    if order.payment_status() != PaymentStatus::PaymentVerified {
        return Err(OrderRejection::PaymentNotVerified);
    }
    Ok(TransitionPlan::advance(next, AssignmentEffect::None))
}

fn plan_printing(
    actor_id: ActorId,
    locked: &LockedOrder,
    target: TransitionTarget,
    reason: Option<Reason>,
) -> Result<TransitionPlan, OrderRejection> {
    let order = &locked.order;
    if order.payment_status() != PaymentStatus::PaymentVerified {
        return Err(OrderRejection::PrintingRequiresVerifiedPayment);
    }

    let current = order.status();
    match (current, target) {
        (OrderStatus::Placed, TransitionTarget::Accepted) => claim(locked, Stage::Printing),
        (OrderStatus::Placed, TransitionTarget::Status(OrderStatus::Declined)) => {
            TransitionPlan::decline(reason)
        }
        (OrderStatus::Printing, TransitionTarget::Status(OrderStatus::ReadyForPlant)) => {
            hand_off(locked, Stage::Printing, actor_id, OrderStatus::ReadyForPlant)
        }
        (OrderStatus::Placed | OrderStatus::Printing, requested) => {
            Err(OrderRejection::InvalidPrintingTransition {
                current,
                requested: requested.to_string(),
            })
        }
        (current, _) => Err(OrderRejection::PrintingCannotHandleStatus { current }),
    }
}

fn plan_plant(
    actor_id: ActorId,
    locked: &LockedOrder,
    target: TransitionTarget,
) -> Result<TransitionPlan, OrderRejection> {
    let order = &locked.order;
    if order.payment_status() != PaymentStatus::PaymentVerified {
        return Err(OrderRejection::PaymentNotVerified);
    }

    match order.status() {
        OrderStatus::ReadyForPlant => match target {
            TransitionTarget::Accepted
            | TransitionTarget::Status(OrderStatus::PlantProcessing) => claim(locked, Stage::Plant),
            other => Err(invalid_for(Role::Plant, other)),
        },
        OrderStatus::PlantProcessing => match target {
            TransitionTarget::Status(OrderStatus::Dispatched) => {
                hand_off(locked, Stage::Plant, actor_id, OrderStatus::Dispatched)
            }
            other => Err(invalid_for(Role::Plant, other)),
        },
        current => Err(OrderRejection::PlantCannotHandleStatus { current }),
    }
}

fn claim(locked: &LockedOrder, stage: Stage) -> Result<TransitionPlan, OrderRejection> {
    if locked.open_assignment(stage).is_some() {
        return Err(OrderRejection::StageAlreadyAssigned { stage });
    }
    Ok(TransitionPlan::advance(
        stage.in_progress_status(),
        AssignmentEffect::Open(stage),
    ))
}

fn hand_off(
    locked: &LockedOrder,
    stage: Stage,
    actor_id: ActorId,
    next: OrderStatus,
) -> Result<TransitionPlan, OrderRejection> {
    match locked.open_assignment(stage) {
        Some(assignment) if assignment.actor_id == actor_id => Ok(TransitionPlan::advance(
            next,
            AssignmentEffect::Close(stage),
        )),
        _ => Err(OrderRejection::NotAssigned { stage }),
    }
}

fn invalid_for(role: Role, target: TransitionTarget) -> OrderRejection {
    OrderRejection::InvalidStatusForRole {
        role,
        requested: target.to_string(),
    }
}

/// Decision reached for a payment verification request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentPlan {
    pub next: PaymentStatus,
    pub reason: Option<Reason>,
}

impl PaymentPlan {
    /// Expand the plan into the write-set for `order`.
    pub fn into_mutation(self, order: &Order, actor_id: ActorId, now: DateTime<Utc>) -> OrderMutation {
        OrderMutation {
            changes: OrderChanges {
                payment_status: Some(self.next),
                ..OrderChanges::default()
            },
            history: Some(HistoryEntry::new(
                order.id(),
                self.next,
                actor_id,
                now,
                self.reason,
            )),
            open_assignment: None,
            close_assignment: None,
            comment: None,
            at: now,
        }
    }
}

/// Decide an administrator's verdict on an uploaded payment proof.
pub fn plan_payment_decision(
    actor: &Actor,
    order: &Order,
    desired: PaymentStatus,
    reason: Option<Reason>,
) -> Result<PaymentPlan, OrderRejection> {
    if actor.role() != Role::Admin {
        return Err(OrderRejection::UnauthorizedRole { role: actor.role() });
    }
    if order.payment_status() != PaymentStatus::PaymentUploaded {
        return Err(OrderRejection::PaymentNotUploaded);
    }
    match desired {
        PaymentStatus::PaymentVerified => Ok(PaymentPlan {
            next: desired,
            reason,
        }),
        PaymentStatus::PaymentRejected => {
            let reason = reason.ok_or(OrderRejection::ReasonRequired)?;
            Ok(PaymentPlan {
                next: desired,
                reason: Some(reason),
            })
        }
        other @ (PaymentStatus::PaymentPending | PaymentStatus::PaymentUploaded) => {
            Err(OrderRejection::InvalidPaymentStatus {
                requested: other.to_string(),
            })
        }
    }
}

/// Decide whether the owner may attach a payment proof.
///
/// A fresh upload is allowed while payment is pending, uploaded (replacing
/// the previous proof), or rejected. Verified payments are final.
pub fn check_payment_proof(actor: &Actor, order: &Order) -> Result<(), OrderRejection> {
    if order.owner_id() != actor.id() {
        return Err(OrderRejection::NotOrderOwner);
    }
    if order.payment_status() == PaymentStatus::PaymentVerified {
        return Err(OrderRejection::PaymentAlreadyVerified);
    }
    Ok(())
}

/// Decide whether `actor` may comment on an order in `current` status.
///
/// Returns the stage the comment is filed under.
pub fn check_comment(
    actor: &Actor,
    current: OrderStatus,
    is_assigned: bool,
) -> Result<Stage, OrderRejection> {
    let stage = actor
        .role()
        .stage()
        .ok_or(OrderRejection::UnauthorizedRole { role: actor.role() })?;
    if !is_assigned {
        return Err(OrderRejection::NotAssigned { stage });
    }
    let expected = stage.in_progress_status();
    if current != expected {
        return Err(OrderRejection::WrongStage { expected, current });
    }
    Ok(stage)
}

/// Require the administrator role.
pub fn require_admin(actor: &Actor) -> Result<(), OrderRejection> {
    match actor.role() {
        Role::Admin => Ok(()),
        role => Err(OrderRejection::UnauthorizedRole { role }),
    }
}

#[cfg(test)]
#[path = "rules_tests.rs"]
mod tests;
