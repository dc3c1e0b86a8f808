//! Per-stage ownership locks on orders.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ActorId, Role};

use super::{OrderId, OrderStatus, StatusParseError};

/// Pipeline stage worked by a dedicated operator role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Printing,
    Plant,
}

impl Stage {
    /// Stable string form used in storage.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Printing => "printing",
            Self::Plant => "plant",
        }
    }

    /// Advisory SLA window granted to the assignee.
    pub const fn sla_days(self) -> i64 {
        match self {
            Self::Printing => 2,
            Self::Plant => 3,
        }
    }

    /// Status an order holds while this stage works on it.
    pub const fn in_progress_status(self) -> OrderStatus {
        match self {
            Self::Printing => OrderStatus::Printing,
            Self::Plant => OrderStatus::PlantProcessing,
        }
    }

    /// Role that operates this stage.
    pub const fn role(self) -> Role {
        match self {
            Self::Printing => Role::Printing,
            Self::Plant => Role::Plant,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "printing" => Ok(Self::Printing),
            "plant" => Ok(Self::Plant),
            other => Err(StatusParseError::stage(other)),
        }
    }
}

/// One row of the assignment ledger.
///
/// An assignment is open while `completed_at` is `None`. At most one open
/// assignment exists per `(order_id, stage)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderAssignment {
    pub order_id: OrderId,
    pub stage: Stage,
    pub actor_id: ActorId,
    pub assigned_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl OrderAssignment {
    /// Open an assignment with the stage's SLA deadline.
    pub fn open(order_id: OrderId, stage: Stage, actor_id: ActorId, now: DateTime<Utc>) -> Self {
        Self {
            order_id,
            stage,
            actor_id,
            assigned_at: now,
            deadline: now + Duration::days(stage.sla_days()),
            completed_at: None,
        }
    }

    /// Whether the assignee is still working the order.
    pub fn is_open(&self) -> bool {
        self.completed_at.is_none()
    }
}

/// Close instruction for the open assignment of `stage` held by `actor_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentClosure {
    pub stage: Stage,
    pub actor_id: ActorId,
    pub completed_at: DateTime<Utc>,
}
