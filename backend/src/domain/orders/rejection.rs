//! Typed reasons an order operation is refused.

use serde_json::json;

use crate::domain::{Error, ErrorCode, Role};

use super::{OrderId, OrderStatus, Stage};

/// Every way an order operation can be turned down.
///
/// Each variant has a stable machine-readable [`kind`](Self::kind) that
/// adapters surface alongside the human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum OrderRejection {
    #[error("login required")]
    Unauthenticated,
    #[error("role {role} may not perform this operation")]
    UnauthorizedRole { role: Role },
    #[error("order {order_id} not found")]
    OrderNotFound { order_id: OrderId },
    #[error("order belongs to another customer")]
    NotOrderOwner,
    #[error("order is not in your queue")]
    OrderNotVisible,
    #[error("status '{requested}' is not valid for role {role}")]
    InvalidStatusForRole { role: Role, requested: String },
    #[error("cannot update order status until payment is verified")]
    PaymentNotVerified,
    #[error("printing can only handle payment-verified orders")]
    PrintingRequiresVerifiedPayment,
    #[error("cannot update payment: payment not uploaded yet")]
    PaymentNotUploaded,
    #[error("payment has already been verified")]
    PaymentAlreadyVerified,
    #[error("'{requested}' is not a valid payment status decision")]
    InvalidPaymentStatus { requested: String },
    #[error("printing cannot move an order from {current} to {requested}")]
    InvalidPrintingTransition {
        current: OrderStatus,
        requested: String,
    },
    #[error("printing cannot handle orders in status {current}")]
    PrintingCannotHandleStatus { current: OrderStatus },
    #[error("plant can only handle 'ready_for_plant' or 'plant_processing' orders, not {current}")]
    PlantCannotHandleStatus { current: OrderStatus },
    #[error("reason required")]
    ReasonRequired,
    #[error("order is not assigned to you for the {stage} stage")]
    NotAssigned { stage: Stage },
    #[error("order is already assigned for the {stage} stage")]
    StageAlreadyAssigned { stage: Stage },
    #[error("order must be {expected} for this action, but is {current}")]
    WrongStage {
        expected: OrderStatus,
        current: OrderStatus,
    },
    #[error("comment cannot be empty")]
    EmptyComment,
    #[error("no company found for user")]
    CompanyNotFound,
    #[error("label does not belong to your company")]
    LabelNotOwned,
    #[error("invalid order details: {message}")]
    InvalidOrderDetails { message: String },
    #[error("invalid label job details: {message}")]
    InvalidLabelJobDetails { message: String },
    #[error("label job details not found for order {order_id}")]
    LabelJobDetailsNotFound { order_id: OrderId },
    #[error("no URLs to update")]
    NoDocuments,
    #[error("order storage failed: {message}")]
    PersistenceFailure { message: String },
}

impl OrderRejection {
    /// Stable machine-readable identifier.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::UnauthorizedRole { .. } => "unauthorized_role",
            Self::OrderNotFound { .. } => "order_not_found",
            Self::NotOrderOwner => "not_order_owner",
            Self::OrderNotVisible => "order_not_visible",
            Self::InvalidStatusForRole { .. } => "invalid_status_for_role",
            Self::PaymentNotVerified => "payment_not_verified",
            Self::PrintingRequiresVerifiedPayment => "printing_requires_verified_payment",
            Self::PaymentNotUploaded => "payment_not_uploaded",
            Self::PaymentAlreadyVerified => "payment_already_verified",
            Self::InvalidPaymentStatus { .. } => "invalid_payment_status",
            Self::InvalidPrintingTransition { .. } => "invalid_printing_transition",
            Self::PrintingCannotHandleStatus { .. } => "printing_cannot_handle_status",
            Self::PlantCannotHandleStatus { .. } => "plant_cannot_handle_status",
            Self::ReasonRequired => "reason_required",
            Self::NotAssigned { .. } => "not_assigned",
            Self::StageAlreadyAssigned { .. } => "stage_already_assigned",
            Self::WrongStage { .. } => "wrong_stage",
            Self::EmptyComment => "empty_comment",
            Self::CompanyNotFound => "company_not_found",
            Self::LabelNotOwned => "label_not_owned",
            Self::InvalidOrderDetails { .. } => "invalid_order_details",
            Self::InvalidLabelJobDetails { .. } => "invalid_label_job_details",
            Self::LabelJobDetailsNotFound { .. } => "label_job_details_not_found",
            Self::NoDocuments => "no_documents",
            Self::PersistenceFailure { .. } => "persistence_failure",
        }
    }

    /// Transport-agnostic failure category.
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Unauthenticated => ErrorCode::Unauthorized,
            Self::UnauthorizedRole { .. }
            | Self::NotOrderOwner
            | Self::OrderNotVisible
            | Self::NotAssigned { .. }
            | Self::LabelNotOwned => ErrorCode::Forbidden,
            Self::OrderNotFound { .. }
            | Self::CompanyNotFound
            | Self::LabelJobDetailsNotFound { .. } => ErrorCode::NotFound,
            Self::InvalidStatusForRole { .. }
            | Self::PaymentNotVerified
            | Self::PrintingRequiresVerifiedPayment
            | Self::PaymentNotUploaded
            | Self::PaymentAlreadyVerified
            | Self::InvalidPrintingTransition { .. }
            | Self::PrintingCannotHandleStatus { .. }
            | Self::PlantCannotHandleStatus { .. }
            | Self::StageAlreadyAssigned { .. }
            | Self::WrongStage { .. } => ErrorCode::Conflict,
            Self::ReasonRequired
            | Self::EmptyComment
            | Self::InvalidPaymentStatus { .. }
            | Self::InvalidOrderDetails { .. }
            | Self::InvalidLabelJobDetails { .. }
            | Self::NoDocuments => ErrorCode::InvalidRequest,
            Self::PersistenceFailure { .. } => ErrorCode::InternalError,
        }
    }
}

impl From<OrderRejection> for Error {
    fn from(value: OrderRejection) -> Self {
        Error::new(value.error_code(), value.to_string()).with_details(json!({
            "code": value.kind(),
        }))
    }
}
