//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (`OrderRepository` and its ledgers, `CompanyDirectory`) are
//! implemented by outbound adapters; driving ports (`OrderCommand`,
//! `OrderQuery`) are implemented by the lifecycle service and consumed by
//! inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod assignment_ledger;
mod company_directory;
mod order_command;
mod order_notes_repository;
mod order_query;
mod order_repository;
mod status_history_ledger;

#[cfg(test)]
pub use assignment_ledger::MockAssignmentLedger;
pub use assignment_ledger::AssignmentLedger;
#[cfg(test)]
pub use company_directory::MockCompanyDirectory;
pub use company_directory::{CompanyDirectory, CompanyDirectoryError};
#[cfg(test)]
pub use order_command::MockOrderCommand;
pub use order_command::{
    AddCommentRequest, CreateOrderRequest, InvoiceDocumentsRequest, OrderCommand,
    PaymentDecisionRequest, PaymentProofRequest, SaveLabelJobRequest, StatusTransitionRequest,
};
#[cfg(test)]
pub use order_notes_repository::MockOrderNotesRepository;
pub use order_notes_repository::OrderNotesRepository;
#[cfg(test)]
pub use order_query::MockOrderQuery;
pub use order_query::{ListOrdersRequest, OrderLookup, OrderQuery};
#[cfg(test)]
pub use order_repository::MockOrderRepository;
pub use order_repository::{
    OrderDecider, OrderRepository, OrderRepositoryError, OrderStore, decider,
};
#[cfg(test)]
pub use status_history_ledger::MockStatusHistoryLedger;
pub use status_history_ledger::StatusHistoryLedger;
