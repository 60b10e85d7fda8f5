//! hv-gateway
//!
//! The single boundary between the back-office client and the order API.
//! This crate owns:
//!
//! - the [`OrderApi`] trait every backend (real or stub) implements,
//! - the typed wire schema, including the one-time normalization of the
//!   list endpoint's heterogeneous response shape (bare array vs. object
//!   with counts) into [`hv_schemas::OrderPage`],
//! - soft-error detection for HTTP-200 error envelopes,
//! - the blocking HTTP implementation ([`HttpOrderApi`]).
//!
//! It does **not**:
//! - hold list state (that is `hv-store`)
//! - evaluate gating predicates (that is `hv-approval`)

mod api;
mod http;
mod wire;

pub use api::{ApiError, DecisionRequest, OrderApi, OrderQuery};
pub use http::{HttpOrderApi, ADMIN_MOBILE_HEADER};
pub use wire::{detect_soft_error, normalize_order_list, OrderListResponse};
