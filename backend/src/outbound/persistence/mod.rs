//! PostgreSQL adapters built on Diesel, `diesel-async`, and bb8.
//!
//! Adapters translate between row structs (`models.rs`) and domain types and
//! hold no business rules. Row structs and the `table!` schema stay private
//! to this module.
//!
//! ```no_run
//! # async fn wire() -> Result<(), Box<dyn std::error::Error>> {
//! use labelflow::outbound::persistence::{
//!     DbPool, DieselOrderRepository, PoolConfig, run_pending_migrations,
//! };
//!
//! let url = "postgres://localhost/labelflow";
//! run_pending_migrations(url).await?;
//! let pool = DbPool::new(PoolConfig::new(url)).await?;
//! let _orders = DieselOrderRepository::new(pool);
//! # Ok(())
//! # }
//! ```

mod diesel_basic_error_mapping;
mod diesel_company_directory;
mod diesel_order_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_company_directory::DieselCompanyDirectory;
pub use diesel_order_repository::DieselOrderRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
