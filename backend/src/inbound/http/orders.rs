//! Order lifecycle HTTP handlers.
//!
//! ```text
//! POST /api/v1/orders                      {"labelId":"…","variant":"matte",…}
//! GET  /api/v1/orders?limit=10&offset=0
//! GET  /api/v1/orders/{id}
//! PUT  /api/v1/orders/{id}/status          {"status":"printing","reason":null}
//! PUT  /api/v1/orders/{id}/payment-status  {"paymentStatus":"payment_verified"}
//! PUT  /api/v1/orders/{id}/payment-proof   {"url":"https://…"}
//! PUT  /api/v1/orders/{id}/documents       {"invoiceUrl":"https://…"}
//! GET  /api/v1/orders/{id}/history
//! POST /api/v1/orders/{id}/comments        {"text":"…"}
//! GET  /api/v1/orders/{id}/comments
//! PUT  /api/v1/orders/{id}/label-job       {"noOfSheets":10,…}
//! GET  /api/v1/orders/{id}/label-job
//! ```
//!
//! Handlers resolve the actor from the session, parse wire fields, and call
//! the driving ports. Every business decision happens behind the port.

use actix_web::{HttpResponse, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::orders::{
    DocumentUrl, HistoryEntry, LabelId, LabelJobDetails, LabelJobDraft, Order, OrderComment,
    OrderDraft, OrderPage, OrderStatus, Page, PaymentStatus,
};
use crate::domain::ports::{
    AddCommentRequest, CreateOrderRequest, InvoiceDocumentsRequest, ListOrdersRequest,
    OrderLookup, PaymentDecisionRequest, PaymentProofRequest, SaveLabelJobRequest,
    StatusTransitionRequest,
};
use crate::domain::{Actor, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_document_url, parse_optional_document_url, parse_order_id, parse_uuid,
};

/// Request body for `POST /api/v1/orders`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderBody {
    #[schema(format = "uuid")]
    pub label_id: String,
    pub variant: String,
    pub quantity: i64,
    pub cap_color: String,
    pub volume: i64,
}

/// Pagination query for `GET /api/v1/orders`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListOrdersQuery {
    /// Page size; non-positive values fall back to 10, capped at 100.
    pub limit: Option<i64>,
    /// Rows to skip; negative values count as zero.
    pub offset: Option<i64>,
}

/// Request body for `PUT /api/v1/orders/{id}/status`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateBody {
    #[schema(example = "printing")]
    pub status: String,
    pub reason: Option<String>,
}

/// Request body for `PUT /api/v1/orders/{id}/payment-status`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusBody {
    #[schema(example = "payment_verified")]
    pub payment_status: String,
    pub reason: Option<String>,
}

/// Request body for `PUT /api/v1/orders/{id}/payment-proof`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct PaymentProofBody {
    #[schema(format = "uri")]
    pub url: String,
}

/// Request body for `PUT /api/v1/orders/{id}/documents`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentsBody {
    #[schema(format = "uri")]
    pub invoice_url: Option<String>,
    #[schema(format = "uri")]
    pub pi_url: Option<String>,
}

/// Request body for `POST /api/v1/orders/{id}/comments`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CommentBody {
    pub text: String,
}

/// Request body for `PUT /api/v1/orders/{id}/label-job`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LabelJobBody {
    pub no_of_sheets: i64,
    pub cutting_type: String,
    pub labels_per_sheet: i64,
    pub description: Option<String>,
}

/// Order as returned to clients.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub owner_id: String,
    #[schema(format = "uuid")]
    pub label_id: String,
    pub variant: String,
    pub quantity: u32,
    pub cap_color: String,
    pub volume: u32,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub decline_reason: Option<String>,
    pub payment_proof_url: Option<String>,
    pub invoice_url: Option<String>,
    pub pi_url: Option<String>,
    pub expected_delivery: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderBody {
    fn from(order: Order) -> Self {
        let url = |value: Option<&DocumentUrl>| value.map(|url| url.as_str().to_owned());
        Self {
            id: order.id().to_string(),
            owner_id: order.owner_id().to_string(),
            label_id: order.label_id().to_string(),
            variant: order.variant().to_owned(),
            quantity: order.quantity(),
            cap_color: order.cap_color().to_owned(),
            volume: order.volume(),
            status: order.status(),
            payment_status: order.payment_status(),
            decline_reason: order.decline_reason().map(|reason| reason.as_str().to_owned()),
            payment_proof_url: url(order.payment_proof_url()),
            invoice_url: url(order.invoice_url()),
            pi_url: url(order.pi_url()),
            expected_delivery: order.expected_delivery(),
            created_at: order.created_at(),
            updated_at: order.updated_at(),
        }
    }
}

/// One page of orders plus the scope total.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderPageBody {
    pub orders: Vec<OrderBody>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

impl OrderPageBody {
    fn new(page: OrderPage, window: Page) -> Self {
        Self {
            orders: page.orders.into_iter().map(OrderBody::from).collect(),
            total: page.total,
            limit: window.limit(),
            offset: window.offset(),
        }
    }
}

fn lookup(actor: Actor, id: &str) -> Result<OrderLookup, Error> {
    Ok(OrderLookup {
        actor,
        order_id: parse_order_id(id)?,
    })
}

fn parse_create_body(body: CreateOrderBody) -> Result<OrderDraft, Error> {
    Ok(OrderDraft {
        label_id: LabelId::from_uuid(parse_uuid(&body.label_id, FieldName::new("labelId"))?),
        variant: body.variant,
        quantity: body.quantity,
        cap_color: body.cap_color,
        volume: body.volume,
    })
}

/// Place an order for one of the owner's labels.
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = CreateOrderBody,
    responses(
        (status = 201, description = "Order placed", body = OrderBody),
        (status = 400, description = "Invalid order details", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Not a business owner or label not owned", body = Error),
        (status = 404, description = "No company for user", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["orders"],
    operation_id = "createOrder",
    security(("SessionCookie" = []))
)]
#[post("/orders")]
pub async fn create_order(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateOrderBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor()?;
    let draft = parse_create_body(payload.into_inner())?;
    let order = state
        .orders
        .create_order(CreateOrderRequest { actor, draft })
        .await?;
    Ok(HttpResponse::Created().json(OrderBody::from(order)))
}

/// List the orders visible to the caller, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    params(ListOrdersQuery),
    responses(
        (status = 200, description = "Orders in the caller's scope", body = OrderPageBody),
        (status = 401, description = "Login required", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["orders"],
    operation_id = "listOrders",
    security(("SessionCookie" = []))
)]
#[get("/orders")]
pub async fn list_orders(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ListOrdersQuery>,
) -> ApiResult<web::Json<OrderPageBody>> {
    let actor = session.require_actor()?;
    let ListOrdersQuery { limit, offset } = query.into_inner();
    let page = Page::new(limit, offset);
    let orders = state
        .orders_query
        .list_orders(ListOrdersRequest { actor, page })
        .await?;
    Ok(web::Json(OrderPageBody::new(orders, page)))
}

/// Fetch one order.
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    params(("id" = String, Path, description = "Order identifier")),
    responses(
        (status = 200, description = "Order", body = OrderBody),
        (status = 400, description = "Malformed identifier", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Order outside the caller's scope", body = Error),
        (status = 404, description = "Order not found", body = Error)
    ),
    tags = ["orders"],
    operation_id = "getOrder",
    security(("SessionCookie" = []))
)]
#[get("/orders/{id}")]
pub async fn get_order(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<OrderBody>> {
    let actor = session.require_actor()?;
    let order = state.orders_query.get_order(lookup(actor, &path)?).await?;
    Ok(web::Json(OrderBody::from(order)))
}

/// Move an order along its lifecycle.
#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}/status",
    params(("id" = String, Path, description = "Order identifier")),
    request_body = StatusUpdateBody,
    responses(
        (status = 200, description = "Order after the transition", body = OrderBody),
        (status = 400, description = "Reason required", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Role or assignment refused", body = Error),
        (status = 404, description = "Order not found", body = Error),
        (status = 409, description = "Transition not allowed from the current state", body = Error)
    ),
    tags = ["orders"],
    operation_id = "updateOrderStatus",
    security(("SessionCookie" = []))
)]
#[put("/orders/{id}/status")]
pub async fn update_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<StatusUpdateBody>,
) -> ApiResult<web::Json<OrderBody>> {
    let actor = session.require_actor()?;
    let order_id = parse_order_id(&path)?;
    let StatusUpdateBody { status, reason } = payload.into_inner();
    let order = state
        .orders
        .transition_status(StatusTransitionRequest {
            actor,
            order_id,
            status,
            reason,
        })
        .await?;
    Ok(web::Json(OrderBody::from(order)))
}

/// Record an administrator's payment decision.
#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}/payment-status",
    params(("id" = String, Path, description = "Order identifier")),
    request_body = PaymentStatusBody,
    responses(
        (status = 200, description = "Order after the decision", body = OrderBody),
        (status = 400, description = "Unknown decision or missing reason", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Administrators only", body = Error),
        (status = 404, description = "Order not found", body = Error),
        (status = 409, description = "Payment not uploaded", body = Error)
    ),
    tags = ["orders"],
    operation_id = "updatePaymentStatus",
    security(("SessionCookie" = []))
)]
#[put("/orders/{id}/payment-status")]
pub async fn update_payment_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<PaymentStatusBody>,
) -> ApiResult<web::Json<OrderBody>> {
    let actor = session.require_actor()?;
    let order_id = parse_order_id(&path)?;
    let PaymentStatusBody {
        payment_status,
        reason,
    } = payload.into_inner();
    let order = state
        .orders
        .decide_payment(PaymentDecisionRequest {
            actor,
            order_id,
            payment_status,
            reason,
        })
        .await?;
    Ok(web::Json(OrderBody::from(order)))
}

/// Attach the owner's uploaded payment proof.
#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}/payment-proof",
    params(("id" = String, Path, description = "Order identifier")),
    request_body = PaymentProofBody,
    responses(
        (status = 200, description = "Order awaiting payment review", body = OrderBody),
        (status = 400, description = "Invalid URL", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Not the order owner", body = Error),
        (status = 404, description = "Order not found", body = Error),
        (status = 409, description = "Payment already verified", body = Error)
    ),
    tags = ["orders"],
    operation_id = "uploadPaymentProof",
    security(("SessionCookie" = []))
)]
#[put("/orders/{id}/payment-proof")]
pub async fn upload_payment_proof(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<PaymentProofBody>,
) -> ApiResult<web::Json<OrderBody>> {
    let actor = session.require_actor()?;
    let order_id = parse_order_id(&path)?;
    let url = parse_document_url(&payload.url, FieldName::new("url"))?;
    let order = state
        .orders
        .record_payment_proof(PaymentProofRequest {
            actor,
            order_id,
            url,
        })
        .await?;
    Ok(web::Json(OrderBody::from(order)))
}

/// Attach invoice and proforma-invoice documents.
#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}/documents",
    params(("id" = String, Path, description = "Order identifier")),
    request_body = DocumentsBody,
    responses(
        (status = 200, description = "Order with updated documents", body = OrderBody),
        (status = 400, description = "No documents or invalid URL", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Administrators only", body = Error),
        (status = 404, description = "Order not found", body = Error)
    ),
    tags = ["orders"],
    operation_id = "updateOrderDocuments",
    security(("SessionCookie" = []))
)]
#[put("/orders/{id}/documents")]
pub async fn update_documents(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<DocumentsBody>,
) -> ApiResult<web::Json<OrderBody>> {
    let actor = session.require_actor()?;
    let order_id = parse_order_id(&path)?;
    let invoice_url =
        parse_optional_document_url(payload.invoice_url.as_deref(), FieldName::new("invoiceUrl"))?;
    let pi_url = parse_optional_document_url(payload.pi_url.as_deref(), FieldName::new("piUrl"))?;
    let order = state
        .orders
        .record_documents(InvoiceDocumentsRequest {
            actor,
            order_id,
            invoice_url,
            pi_url,
        })
        .await?;
    Ok(web::Json(OrderBody::from(order)))
}

/// Status and payment history, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/history",
    params(("id" = String, Path, description = "Order identifier")),
    responses(
        (status = 200, description = "History rows", body = [HistoryEntry]),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Order outside the caller's scope", body = Error),
        (status = 404, description = "Order not found", body = Error)
    ),
    tags = ["orders"],
    operation_id = "getOrderHistory",
    security(("SessionCookie" = []))
)]
#[get("/orders/{id}/history")]
pub async fn get_history(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<HistoryEntry>>> {
    let actor = session.require_actor()?;
    let history = state
        .orders_query
        .order_history(lookup(actor, &path)?)
        .await?;
    Ok(web::Json(history))
}

/// Leave a note on an order the caller works on.
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/comments",
    params(("id" = String, Path, description = "Order identifier")),
    request_body = CommentBody,
    responses(
        (status = 201, description = "Comment stored", body = OrderComment),
        (status = 400, description = "Empty comment", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Role or assignment refused", body = Error),
        (status = 404, description = "Order not found", body = Error),
        (status = 409, description = "Order is at another stage", body = Error)
    ),
    tags = ["orders"],
    operation_id = "addOrderComment",
    security(("SessionCookie" = []))
)]
#[post("/orders/{id}/comments")]
pub async fn add_comment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<CommentBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor()?;
    let order_id = parse_order_id(&path)?;
    let comment = state
        .orders
        .add_comment(AddCommentRequest {
            actor,
            order_id,
            text: payload.into_inner().text,
        })
        .await?;
    Ok(HttpResponse::Created().json(comment))
}

/// Every comment on an order, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/comments",
    params(("id" = String, Path, description = "Order identifier")),
    responses(
        (status = 200, description = "Comments", body = [OrderComment]),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Administrators only", body = Error),
        (status = 404, description = "Order not found", body = Error)
    ),
    tags = ["orders"],
    operation_id = "listOrderComments",
    security(("SessionCookie" = []))
)]
#[get("/orders/{id}/comments")]
pub async fn list_comments(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<OrderComment>>> {
    let actor = session.require_actor()?;
    let comments = state
        .orders_query
        .list_comments(lookup(actor, &path)?)
        .await?;
    Ok(web::Json(comments))
}

/// Create or replace the print-job details for an order.
#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}/label-job",
    params(("id" = String, Path, description = "Order identifier")),
    request_body = LabelJobBody,
    responses(
        (status = 200, description = "Stored details", body = LabelJobDetails),
        (status = 400, description = "Invalid details", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Administrators only", body = Error),
        (status = 404, description = "Order not found", body = Error)
    ),
    tags = ["orders"],
    operation_id = "saveLabelJob",
    security(("SessionCookie" = []))
)]
#[put("/orders/{id}/label-job")]
pub async fn save_label_job(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<LabelJobBody>,
) -> ApiResult<web::Json<LabelJobDetails>> {
    let actor = session.require_actor()?;
    let order_id = parse_order_id(&path)?;
    let LabelJobBody {
        no_of_sheets,
        cutting_type,
        labels_per_sheet,
        description,
    } = payload.into_inner();
    let details = state
        .orders
        .save_label_job(SaveLabelJobRequest {
            actor,
            order_id,
            draft: LabelJobDraft {
                no_of_sheets,
                cutting_type,
                labels_per_sheet,
                description,
            },
        })
        .await?;
    Ok(web::Json(details))
}

/// Print-job details for the admin or the assigned printer.
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/label-job",
    params(("id" = String, Path, description = "Order identifier")),
    responses(
        (status = 200, description = "Print-job details", body = LabelJobDetails),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Not an administrator or the assigned printer", body = Error),
        (status = 404, description = "Order or details not found", body = Error)
    ),
    tags = ["orders"],
    operation_id = "getLabelJob",
    security(("SessionCookie" = []))
)]
#[get("/orders/{id}/label-job")]
pub async fn get_label_job(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<LabelJobDetails>> {
    let actor = session.require_actor()?;
    let details = state.orders_query.label_job(lookup(actor, &path)?).await?;
    Ok(web::Json(details))
}

/// Register every order route on a scope.
///
/// ```
/// use actix_web::{App, web};
/// use labelflow::inbound::http::orders;
///
/// let _app = App::new().service(web::scope("/api/v1").configure(orders::configure));
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_order)
        .service(list_orders)
        .service(get_order)
        .service(update_status)
        .service(update_payment_status)
        .service(upload_payment_proof)
        .service(update_documents)
        .service(get_history)
        .service(add_comment)
        .service(list_comments)
        .service(save_label_job)
        .service(get_label_job);
}

#[cfg(test)]
#[path = "orders_tests.rs"]
mod tests;
