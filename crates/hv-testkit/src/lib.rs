//! hv-testkit
//!
//! Deterministic in-memory backend for scenario tests: a [`StubOrderApi`]
//! that behaves like the real order service (server-owned transitions,
//! history append, bucket counts recomputed per query) plus builders for
//! orders and operator identities. No randomness, no network I/O.

mod builders;
mod stub;

pub use builders::{admin_identity, order, super_admin_identity, OrderBuilder};
pub use stub::{RecordedDecision, StubOrderApi};
