//! OpenAPI document for the order service.
//!
//! Registers every order and health path, the request and response bodies,
//! and the session cookie security scheme. Swagger UI serves it in debug
//! builds; `cargo run --bin openapi-dump` prints it for external tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::orders::{
    HistoryEntry, HistoryStatus, LabelJobDetails, OrderComment, OrderStatus, PaymentStatus, Stage,
};
use crate::domain::{Error, ErrorCode, Role};
use crate::inbound::http::orders::{
    CommentBody, CreateOrderBody, DocumentsBody, LabelJobBody, OrderBody, OrderPageBody,
    PaymentProofBody, PaymentStatusBody, StatusUpdateBody,
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Private cookie session carrying the actor id and role.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "LabelFlow order service API",
        description = "Label orders moving from placement through printing and plant dispatch."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::orders::create_order,
        crate::inbound::http::orders::list_orders,
        crate::inbound::http::orders::get_order,
        crate::inbound::http::orders::update_status,
        crate::inbound::http::orders::update_payment_status,
        crate::inbound::http::orders::upload_payment_proof,
        crate::inbound::http::orders::update_documents,
        crate::inbound::http::orders::get_history,
        crate::inbound::http::orders::add_comment,
        crate::inbound::http::orders::list_comments,
        crate::inbound::http::orders::save_label_job,
        crate::inbound::http::orders::get_label_job,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Role,
        Stage,
        OrderStatus,
        PaymentStatus,
        HistoryStatus,
        HistoryEntry,
        OrderComment,
        LabelJobDetails,
        CreateOrderBody,
        StatusUpdateBody,
        PaymentStatusBody,
        PaymentProofBody,
        DocumentsBody,
        CommentBody,
        LabelJobBody,
        OrderBody,
        OrderPageBody,
    )),
    tags(
        (name = "orders", description = "Order lifecycle operations"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("Error", "message")]
    #[case("Error", "code")]
    #[case("OrderBody", "paymentStatus")]
    #[case("OrderBody", "expectedDelivery")]
    #[case("OrderPageBody", "total")]
    #[case("HistoryEntry", "changedBy")]
    fn schemas_expose_wire_fields(#[case] schema: &str, #[case] field: &str) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let found = schemas.get(schema).expect("schema registered");

        assert_object_schema_has_field(found, field);
    }

    #[rstest]
    #[case("/api/v1/orders")]
    #[case("/api/v1/orders/{id}/status")]
    #[case("/api/v1/orders/{id}/label-job")]
    #[case("/health/ready")]
    fn paths_are_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();

        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }
}
