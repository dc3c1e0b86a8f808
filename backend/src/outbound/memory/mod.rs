//! In-process adapters for running without PostgreSQL.
//!
//! They honour the same unit-of-work contract as the Diesel adapters: the
//! decider runs while the store lock is held and either every write of the
//! mutation lands or none does.

mod company_directory;
mod order_store;

pub use company_directory::InMemoryCompanyDirectory;
pub use order_store::InMemoryOrderStore;
