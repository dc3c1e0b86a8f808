//! Request field parsing shared by the order handlers.
//!
//! Failures become `400 invalid_request` errors whose details name the
//! offending field, echo its value, and carry a stable `code`.

use serde_json::json;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::orders::{DocumentUrl, OrderId};

/// Field-level validation codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    InvalidUrl,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidUrl => "invalid_url",
        }
    }
}

/// Wire name of a request field, as clients spell it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, message: String, code: ErrorCode, value: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| {
        field_error(
            field,
            format!("{} must be a valid UUID", field.as_str()),
            ErrorCode::InvalidUuid,
            value,
        )
    })
}

/// Parse the `{id}` path segment of an order route.
pub(crate) fn parse_order_id(value: &str) -> Result<OrderId, Error> {
    parse_uuid(value, FieldName::new("id")).map(OrderId::from_uuid)
}

pub(crate) fn parse_document_url(value: &str, field: FieldName) -> Result<DocumentUrl, Error> {
    DocumentUrl::parse(value).map_err(|err| {
        field_error(
            field,
            format!("{}: {err}", field.as_str()),
            ErrorCode::InvalidUrl,
            value,
        )
    })
}

pub(crate) fn parse_optional_document_url(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<DocumentUrl>, Error> {
    value
        .map(|raw| parse_document_url(raw, field))
        .transpose()
}
