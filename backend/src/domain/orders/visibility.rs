//! Which orders each role may see.

use crate::domain::{Actor, ActorId, Role};

use super::{Order, OrderAssignment, OrderRejection, OrderStatus, PaymentStatus, Stage};

/// Default and maximum page sizes for order listings.
pub const DEFAULT_PAGE_LIMIT: u32 = 10;
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Role-scoped filter materialised by order stores.
///
/// - admins see every order;
/// - printing operators see payment-verified orders that nobody else has
///   claimed for printing, and declined orders only when they held them;
/// - plant operators see orders in the plant queue statuses that nobody else
///   has claimed for the plant;
/// - business owners see their own orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingScope {
    All,
    Owner(ActorId),
    Printing(ActorId),
    Plant(ActorId),
}

impl ListingScope {
    /// Scope for the given actor.
    pub const fn for_actor(actor: &Actor) -> Self {
        match actor.role() {
            Role::Admin => Self::All,
            Role::BusinessOwner => Self::Owner(actor.id()),
            Role::Printing => Self::Printing(actor.id()),
            Role::Plant => Self::Plant(actor.id()),
        }
    }

    /// Whether `order` falls inside this scope.
    ///
    /// `assignments` holds every assignment row recorded for the order, open
    /// or closed.
    pub fn admits(&self, order: &Order, assignments: &[OrderAssignment]) -> bool {
        match *self {
            Self::All => true,
            Self::Owner(owner) => order.owner_id() == owner,
            Self::Printing(me) => {
                let holder = holder_for(assignments, Stage::Printing);
                order.payment_status() == PaymentStatus::PaymentVerified
                    && holder.is_none_or(|id| id == me)
                    && (order.status() != OrderStatus::Declined || holder == Some(me))
            }
            Self::Plant(me) => {
                OrderStatus::PLANT_QUEUE.contains(&order.status())
                    && holder_for(assignments, Stage::Plant).is_none_or(|id| id == me)
            }
        }
    }

    /// Rejection reported when an order falls outside the scope.
    pub const fn rejection(&self) -> OrderRejection {
        match self {
            Self::Owner(_) => OrderRejection::NotOrderOwner,
            Self::All | Self::Printing(_) | Self::Plant(_) => OrderRejection::OrderNotVisible,
        }
    }
}

fn holder_for(assignments: &[OrderAssignment], stage: Stage) -> Option<ActorId> {
    assignments
        .iter()
        .filter(|assignment| assignment.stage == stage)
        .max_by_key(|assignment| assignment.assigned_at)
        .map(|assignment| assignment.actor_id)
}

/// Pagination window over a role-scoped listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    limit: u32,
    offset: u32,
}

impl Page {
    /// Clamp raw query values: non-positive limits fall back to the default,
    /// negative offsets to zero.
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        let limit = limit
            .filter(|value| *value > 0)
            .map_or(DEFAULT_PAGE_LIMIT, |value| {
                u32::try_from(value).unwrap_or(MAX_PAGE_LIMIT).min(MAX_PAGE_LIMIT)
            });
        let offset = offset
            .filter(|value| *value > 0)
            .map_or(0, |value| u32::try_from(value).unwrap_or(u32::MAX));
        Self { limit, offset }
    }

    pub const fn limit(&self) -> u32 {
        self.limit
    }

    pub const fn offset(&self) -> u32 {
        self.offset
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of a role-scoped listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub total: u64,
}
