//! Order lifecycle domain: the aggregate, its ledgers, and the rules that
//! move it through the printing and plant pipeline.

mod assignment;
mod history;
mod mutation;
mod notes;
mod order;
mod reason;
mod rejection;
pub mod rules;
mod status;
mod visibility;

pub use assignment::{AssignmentClosure, OrderAssignment, Stage};
pub use history::HistoryEntry;
pub use mutation::{LockedOrder, OrderChanges, OrderMutation};
pub use notes::{LabelJobDetails, LabelJobDraft, LabelJobValidationError, OrderComment};
pub use order::{
    CompanyId, DELIVERY_LEAD_DAYS, DocumentUrl, DocumentUrlError, LabelId, MAX_COUNT, Order,
    OrderDetails, OrderDraft, OrderId, OrderRecord, OrderValidationError,
};
pub use reason::Reason;
pub use rejection::OrderRejection;
pub use status::{HistoryStatus, OrderStatus, PaymentStatus, StatusParseError, TransitionTarget};
pub use visibility::{DEFAULT_PAGE_LIMIT, ListingScope, MAX_PAGE_LIMIT, OrderPage, Page};
