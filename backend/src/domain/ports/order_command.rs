//! Driving port for order lifecycle mutations.
//!
//! Every request carries the authenticated [`Actor`]; implementations
//! return either the updated record or exactly one [`OrderRejection`].

use async_trait::async_trait;

use crate::domain::Actor;
use crate::domain::orders::{
    DocumentUrl, LabelJobDetails, LabelJobDraft, Order, OrderComment, OrderDraft, OrderId,
    OrderRejection,
};

/// Request to place a new order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOrderRequest {
    pub actor: Actor,
    pub draft: OrderDraft,
}

/// Request to move an order to a new status.
///
/// `status` and `reason` are raw client input; the service parses and
/// normalises them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTransitionRequest {
    pub actor: Actor,
    pub order_id: OrderId,
    pub status: String,
    pub reason: Option<String>,
}

/// Admin verdict on an uploaded payment proof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentDecisionRequest {
    pub actor: Actor,
    pub order_id: OrderId,
    pub payment_status: String,
    pub reason: Option<String>,
}

/// Owner upload of a payment proof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentProofRequest {
    pub actor: Actor,
    pub order_id: OrderId,
    pub url: DocumentUrl,
}

/// Admin upload of invoice and proforma invoice documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceDocumentsRequest {
    pub actor: Actor,
    pub order_id: OrderId,
    pub invoice_url: Option<DocumentUrl>,
    pub pi_url: Option<DocumentUrl>,
}

/// Operator comment on an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddCommentRequest {
    pub actor: Actor,
    pub order_id: OrderId,
    pub text: String,
}

/// Admin upsert of print-job details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveLabelJobRequest {
    pub actor: Actor,
    pub order_id: OrderId,
    pub draft: LabelJobDraft,
}

/// Driving port for order write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderCommand: Send + Sync {
    async fn create_order(&self, request: CreateOrderRequest) -> Result<Order, OrderRejection>;

    async fn transition_status(
        &self,
        request: StatusTransitionRequest,
    ) -> Result<Order, OrderRejection>;

    async fn decide_payment(&self, request: PaymentDecisionRequest)
    -> Result<Order, OrderRejection>;

    async fn record_payment_proof(
        &self,
        request: PaymentProofRequest,
    ) -> Result<Order, OrderRejection>;

    async fn record_documents(
        &self,
        request: InvoiceDocumentsRequest,
    ) -> Result<Order, OrderRejection>;

    async fn add_comment(&self, request: AddCommentRequest)
    -> Result<OrderComment, OrderRejection>;

    async fn save_label_job(
        &self,
        request: SaveLabelJobRequest,
    ) -> Result<LabelJobDetails, OrderRejection>;
}
