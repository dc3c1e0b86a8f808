//! Domain primitives, the order lifecycle, and its ports.
//!
//! Purpose: keep every authorization and transition decision free of
//! transport and storage concerns. Inbound adapters translate requests into
//! driving-port calls; outbound adapters implement the driven ports.
//!
//! Public surface:
//! - Error / ErrorCode: transport agnostic error payload.
//! - Actor / ActorId / Role: authenticated identity context.
//! - TraceId: per-request correlation identifier.
//! - OrderLifecycleService: the transition engine behind `OrderCommand`
//!   and `OrderQuery`.

pub mod actor;
pub mod error;
pub mod order_service;
pub mod orders;
pub mod ports;
pub mod trace_id;

pub use self::actor::{Actor, ActorId, Role, RoleParseError};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::order_service::OrderLifecycleService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use labelflow::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
