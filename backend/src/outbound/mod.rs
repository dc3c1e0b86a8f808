//! Outbound adapters implementing the domain's driven ports.
//!
//! - **persistence**: PostgreSQL stores built on Diesel
//! - **memory**: process-local stores for tests and database-less runs
//!
//! Adapters translate between domain types and storage representations and
//! contain no business rules.

pub mod memory;
pub mod persistence;
