//! The order aggregate and its identifiers.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ActorId;

use super::{OrderStatus, PaymentStatus, Reason};

/// Days between order placement and the promised delivery date.
pub const DELIVERY_LEAD_DAYS: i64 = 10;

/// Stable order identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, format = "uuid")]
pub struct OrderId(Uuid);

impl OrderId {
    /// Wrap an existing UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for OrderId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Identifier of a label design owned by a company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, format = "uuid")]
pub struct LabelId(Uuid);

impl LabelId {
    /// Wrap an existing UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Identifier of a customer company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, format = "uuid")]
pub struct CompanyId(Uuid);

impl CompanyId {
    /// Wrap an existing UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Reasons a document reference is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentUrlError {
    #[error("document URL is not a valid absolute URL: {message}")]
    Malformed { message: String },
    #[error("document URL must use http or https, got {scheme}")]
    UnsupportedScheme { scheme: String },
}

/// Durable reference to an uploaded document (payment proof, invoice, PI).
///
/// The upload itself happens before any order operation runs; the order
/// only stores where the blob landed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, format = "uri")]
pub struct DocumentUrl(Url);

impl DocumentUrl {
    /// Validate an absolute `http`/`https` URL.
    pub fn parse(raw: &str) -> Result<Self, DocumentUrlError> {
        let url = Url::parse(raw.trim()).map_err(|err| DocumentUrlError::Malformed {
            message: err.to_string(),
        })?;
        match url.scheme() {
            "http" | "https" => Ok(Self(url)),
            other => Err(DocumentUrlError::UnsupportedScheme {
                scheme: other.to_owned(),
            }),
        }
    }

    /// Borrow the URL text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for DocumentUrl {
    type Error = DocumentUrlError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DocumentUrl> for String {
    fn from(value: DocumentUrl) -> Self {
        value.0.into()
    }
}

/// Validation failures for order creation input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderValidationError {
    #[error("variant must not be blank")]
    BlankVariant,
    #[error("cap colour must not be blank")]
    BlankCapColor,
    #[error("quantity must be greater than zero")]
    NonPositiveQuantity,
    #[error("quantity must not exceed {MAX_COUNT}")]
    QuantityTooLarge,
    #[error("volume must be greater than zero")]
    NonPositiveVolume,
    #[error("volume must not exceed {MAX_COUNT}")]
    VolumeTooLarge,
}

/// Unvalidated creation input as received from a driving adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub label_id: LabelId,
    pub variant: String,
    pub quantity: i64,
    pub cap_color: String,
    pub volume: i64,
}

/// Validated creation input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDetails {
    label_id: LabelId,
    variant: String,
    quantity: u32,
    cap_color: String,
    volume: u32,
}

impl OrderDetails {
    /// Validate a draft.
    ///
    /// # Examples
    /// ```
    /// use labelflow::domain::orders::{LabelId, OrderDetails, OrderDraft};
    /// use uuid::Uuid;
    ///
    /// let details = OrderDetails::new(OrderDraft {
    ///     label_id: LabelId::from_uuid(Uuid::nil()),
    ///     variant: " matte ".to_owned(),
    ///     quantity: 500,
    ///     cap_color: "red".to_owned(),
    ///     volume: 250,
    /// })
    /// .expect("valid draft");
    /// assert_eq!(details.variant(), "matte");
    /// ```
    pub fn new(draft: OrderDraft) -> Result<Self, OrderValidationError> {
        let variant = draft.variant.trim();
        if variant.is_empty() {
            return Err(OrderValidationError::BlankVariant);
        }
        let cap_color = draft.cap_color.trim();
        if cap_color.is_empty() {
            return Err(OrderValidationError::BlankCapColor);
        }
        let quantity = bounded_count(
            draft.quantity,
            OrderValidationError::NonPositiveQuantity,
            OrderValidationError::QuantityTooLarge,
        )?;
        let volume = bounded_count(
            draft.volume,
            OrderValidationError::NonPositiveVolume,
            OrderValidationError::VolumeTooLarge,
        )?;

        Ok(Self {
            label_id: draft.label_id,
            variant: variant.to_owned(),
            quantity,
            cap_color: cap_color.to_owned(),
            volume,
        })
    }

    pub fn label_id(&self) -> LabelId {
        self.label_id
    }

    pub fn variant(&self) -> &str {
        &self.variant
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn cap_color(&self) -> &str {
        &self.cap_color
    }

    pub fn volume(&self) -> u32 {
        self.volume
    }
}

/// Largest quantity, volume, or sheet count accepted; storage columns are
/// 32-bit signed integers.
pub const MAX_COUNT: u32 = i32::MAX.unsigned_abs();

/// Accept `value` when it lies in `1..=MAX_COUNT`.
pub(crate) fn bounded_count<E>(value: i64, non_positive: E, too_large: E) -> Result<u32, E> {
    if value <= 0 {
        return Err(non_positive);
    }
    u32::try_from(value)
        .ok()
        .filter(|count| *count <= MAX_COUNT)
        .ok_or(too_large)
}

/// Plain field bundle used by adapters to rehydrate an [`Order`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    pub id: OrderId,
    pub owner_id: ActorId,
    pub label_id: LabelId,
    pub variant: String,
    pub quantity: u32,
    pub cap_color: String,
    pub volume: u32,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub decline_reason: Option<Reason>,
    pub payment_proof_url: Option<DocumentUrl>,
    pub invoice_url: Option<DocumentUrl>,
    pub pi_url: Option<DocumentUrl>,
    pub expected_delivery: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A label order.
///
/// ## Invariants
/// - `decline_reason` is only set while `status` is `declined`.
/// - Fields change only through [`super::OrderMutation`] applied inside a
///   repository unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    record: OrderRecord,
}

impl Order {
    /// Place a new order for `owner_id`.
    pub fn place(owner_id: ActorId, details: OrderDetails, now: DateTime<Utc>) -> Self {
        let OrderDetails {
            label_id,
            variant,
            quantity,
            cap_color,
            volume,
        } = details;
        Self {
            record: OrderRecord {
                id: OrderId::random(),
                owner_id,
                label_id,
                variant,
                quantity,
                cap_color,
                volume,
                status: OrderStatus::Placed,
                payment_status: PaymentStatus::PaymentPending,
                decline_reason: None,
                payment_proof_url: None,
                invoice_url: None,
                pi_url: None,
                expected_delivery: now + Duration::days(DELIVERY_LEAD_DAYS),
                created_at: now,
                updated_at: now,
            },
        }
    }

    /// Rehydrate an order from storage.
    pub fn restore(record: OrderRecord) -> Self {
        Self { record }
    }

    /// Borrow every field at once.
    pub fn record(&self) -> &OrderRecord {
        &self.record
    }

    pub fn id(&self) -> OrderId {
        self.record.id
    }

    pub fn owner_id(&self) -> ActorId {
        self.record.owner_id
    }

    pub fn label_id(&self) -> LabelId {
        self.record.label_id
    }

    pub fn variant(&self) -> &str {
        &self.record.variant
    }

    pub fn quantity(&self) -> u32 {
        self.record.quantity
    }

    pub fn cap_color(&self) -> &str {
        &self.record.cap_color
    }

    pub fn volume(&self) -> u32 {
        self.record.volume
    }

    pub fn status(&self) -> OrderStatus {
        self.record.status
    }

    pub fn payment_status(&self) -> PaymentStatus {
        self.record.payment_status
    }

    pub fn decline_reason(&self) -> Option<&Reason> {
        self.record.decline_reason.as_ref()
    }

    pub fn payment_proof_url(&self) -> Option<&DocumentUrl> {
        self.record.payment_proof_url.as_ref()
    }

    pub fn invoice_url(&self) -> Option<&DocumentUrl> {
        self.record.invoice_url.as_ref()
    }

    pub fn pi_url(&self) -> Option<&DocumentUrl> {
        self.record.pi_url.as_ref()
    }

    pub fn expected_delivery(&self) -> DateTime<Utc> {
        self.record.expected_delivery
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.record.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.record.updated_at
    }

    pub(crate) fn record_mut(&mut self) -> &mut OrderRecord {
        &mut self.record
    }
}
