//! Order rejections and other domain errors as HTTP responses.
//!
//! Every [`OrderRejection`](crate::domain::orders::OrderRejection) reaches the
//! handlers as a domain [`Error`] whose `details.code` names the rejection
//! kind. Statuses follow the [`ErrorCode`]:
//!
//! | `ErrorCode` | Status | Rejection kinds |
//! | --- | --- | --- |
//! | `invalid_request` | 400 | `reason_required`, `empty_comment`, `invalid_*`, `no_documents` |
//! | `unauthorized` | 401 | missing or tampered session |
//! | `forbidden` | 403 | `unauthorized_role`, `not_order_owner`, `order_not_visible`, `not_assigned`, `label_not_owned` |
//! | `not_found` | 404 | `order_not_found`, `company_not_found`, `label_job_details_not_found` |
//! | `conflict` | 409 | lifecycle and assignment conflicts |
//! | `internal_error` | 500 | `persistence_failure` |
//!
//! Internal failures reach the client as a bare "Internal server error" with
//! the trace id; the store message only goes to the log.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use tracing::error;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Result alias for order handlers.
pub type ApiResult<T> = Result<T, Error>;

const REDACTED_MESSAGE: &str = "Internal server error";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Payload sent to the client. Internal failures keep their trace id and
/// `details.code` but lose the message and any other detail.
fn client_payload(error: &Error) -> Error {
    if error.code() != ErrorCode::InternalError {
        return error.clone();
    }
    error!(
        trace_id = error.trace_id().unwrap_or("-"),
        message = error.message(),
        "order request failed"
    );
    let mut redacted = Error::internal(REDACTED_MESSAGE);
    if let Some(kind) = error.details().and_then(|details| details.get("code")) {
        redacted = redacted.with_details(json!({ "code": kind }));
    }
    match error.trace_id() {
        Some(id) => redacted.with_trace_id(id.to_owned()),
        None => redacted,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(client_payload(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Error::internal(REDACTED_MESSAGE)
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
