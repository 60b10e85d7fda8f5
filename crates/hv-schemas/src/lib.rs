//! hv-schemas
//!
//! Shared vocabulary for the HerdVest back-office core: orders, transactions,
//! investors, approval history, the operator identity, and the list-view
//! filter/count types. Wire names match the backend JSON (camelCase fields,
//! SCREAMING_SNAKE_CASE enum values).
//!
//! All money fields are integer paise (1 INR = 100 paise). No `f64` appears
//! on the core surface.

mod filters;
mod order;
mod status;

pub use filters::{BucketCounts, OrderPage, QueryFilters, StatusCounts, DEFAULT_PAGE_SIZE};
pub use order::{
    AdminIdentity, ApprovalChecks, ApprovalHistoryEntry, CheckKind, Farm, Investor, Order,
    Transaction,
};
pub use status::{DecisionAction, PaymentStatus, PaymentType, Role, RoleSet, TransferMode};
