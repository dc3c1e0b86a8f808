//! PostgreSQL-backed company directory using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ActorId;
use crate::domain::orders::{CompanyId, LabelId};
use crate::domain::ports::{CompanyDirectory, CompanyDirectoryError};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::pool::{DbPool, PoolError};
use super::schema::{companies, labels};

/// Diesel-backed implementation of [`CompanyDirectory`].
#[derive(Clone)]
pub struct DieselCompanyDirectory {
    pool: DbPool,
}

impl DieselCompanyDirectory {
    /// Create a new directory with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CompanyDirectoryError {
    map_basic_pool_error(error, |message| CompanyDirectoryError::connection(message))
}

fn map_diesel_error(error: diesel::result::Error) -> CompanyDirectoryError {
    map_basic_diesel_error(
        error,
        CompanyDirectoryError::query,
        CompanyDirectoryError::connection,
    )
}

#[async_trait]
impl CompanyDirectory for DieselCompanyDirectory {
    async fn company_for_owner(
        &self,
        owner_id: &ActorId,
    ) -> Result<Option<CompanyId>, CompanyDirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        companies::table
            .filter(companies::owner_id.eq(owner_id.as_uuid()))
            .select(companies::id)
            .first::<uuid::Uuid>(&mut conn)
            .await
            .optional()
            .map(|id| id.map(CompanyId::from_uuid))
            .map_err(map_diesel_error)
    }

    async fn label_belongs_to(
        &self,
        company_id: &CompanyId,
        label_id: &LabelId,
    ) -> Result<bool, CompanyDirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            labels::table
                .filter(labels::id.eq(label_id.as_uuid()))
                .filter(labels::company_id.eq(company_id.as_uuid())),
        ))
        .get_result::<bool>(&mut conn)
        .await
        .map_err(map_diesel_error)
    }
}
