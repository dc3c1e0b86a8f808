//! Order and payment status axes.
//!
//! `OrderStatus` and `PaymentStatus` move independently. The transition
//! rules in [`super::rules`] enforce the ordering constraints between them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error returned when a status string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {axis}: {value}")]
pub struct StatusParseError {
    axis: &'static str,
    value: String,
}

impl StatusParseError {
    fn new(axis: &'static str, value: &str) -> Self {
        Self {
            axis,
            value: value.to_owned(),
        }
    }

    pub(crate) fn stage(value: &str) -> Self {
        Self::new("stage", value)
    }

    /// The rejected input.
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Fulfilment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Placed,
    Printing,
    ReadyForPlant,
    PlantProcessing,
    Dispatched,
    Completed,
    Declined,
}

impl OrderStatus {
    /// Every status, in pipeline order with `Declined` last.
    pub const ALL: [Self; 7] = [
        Self::Placed,
        Self::Printing,
        Self::ReadyForPlant,
        Self::PlantProcessing,
        Self::Dispatched,
        Self::Completed,
        Self::Declined,
    ];

    /// Statuses the plant role may see in its queue.
    pub const PLANT_QUEUE: [Self; 4] = [
        Self::ReadyForPlant,
        Self::PlantProcessing,
        Self::Dispatched,
        Self::Completed,
    ];

    /// Stable string form used in storage and on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Placed => "placed",
            Self::Printing => "printing",
            Self::ReadyForPlant => "ready_for_plant",
            Self::PlantProcessing => "plant_processing",
            Self::Dispatched => "dispatched",
            Self::Completed => "completed",
            Self::Declined => "declined",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| StatusParseError::new("order status", s))
    }
}

/// Payment verification status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    PaymentPending,
    PaymentUploaded,
    PaymentVerified,
    PaymentRejected,
}

impl PaymentStatus {
    /// Every payment status.
    pub const ALL: [Self; 4] = [
        Self::PaymentPending,
        Self::PaymentUploaded,
        Self::PaymentVerified,
        Self::PaymentRejected,
    ];

    /// Stable string form used in storage and on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PaymentPending => "payment_pending",
            Self::PaymentUploaded => "payment_uploaded",
            Self::PaymentVerified => "payment_verified",
            Self::PaymentRejected => "payment_rejected",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| StatusParseError::new("payment status", s))
    }
}

/// Status an actor asks for when driving an order forward.
///
/// `accepted` is not a stored status: a printing or plant operator uses it to
/// claim an order, which moves it into that stage's in-progress status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionTarget {
    Accepted,
    Status(OrderStatus),
}

impl fmt::Display for TransitionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted => f.write_str("accepted"),
            Self::Status(status) => fmt::Display::fmt(status, f),
        }
    }
}

impl FromStr for TransitionTarget {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "accepted" {
            return Ok(Self::Accepted);
        }
        s.parse::<OrderStatus>()
            .map(Self::Status)
            .map_err(|_| StatusParseError::new("transition target", s))
    }
}

/// Status recorded on a history row.
///
/// Payment changes are written to the same ledger as pseudo-statuses so the
/// trail reads as one timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum HistoryStatus {
    Order(OrderStatus),
    Payment(PaymentStatus),
}

impl HistoryStatus {
    /// Stable string form used in storage.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Order(status) => status.as_str(),
            Self::Payment(status) => status.as_str(),
        }
    }
}

impl fmt::Display for HistoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistoryStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<OrderStatus>()
            .map(Self::Order)
            .or_else(|_| s.parse::<PaymentStatus>().map(Self::Payment))
            .map_err(|_| StatusParseError::new("history status", s))
    }
}

impl From<OrderStatus> for HistoryStatus {
    fn from(value: OrderStatus) -> Self {
        Self::Order(value)
    }
}

impl From<PaymentStatus> for HistoryStatus {
    fn from(value: PaymentStatus) -> Self {
        Self::Payment(value)
    }
}
