//! Port resolving the company behind a business owner and its labels.

use async_trait::async_trait;

use crate::domain::ActorId;
use crate::domain::orders::{CompanyId, LabelId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by company directory adapters.
    pub enum CompanyDirectoryError {
        /// Directory connection could not be established.
        Connection { message: String } =>
            "company directory connection failed: {message}",
        /// Lookup failed during execution.
        Query { message: String } =>
            "company directory query failed: {message}",
    }
}

/// Read-only view of companies and their labels.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompanyDirectory: Send + Sync {
    /// Company owned by the given user, if any.
    async fn company_for_owner(
        &self,
        owner_id: &ActorId,
    ) -> Result<Option<CompanyId>, CompanyDirectoryError>;

    /// Whether `label_id` is registered to `company_id`.
    async fn label_belongs_to(
        &self,
        company_id: &CompanyId,
        label_id: &LabelId,
    ) -> Result<bool, CompanyDirectoryError>;
}
