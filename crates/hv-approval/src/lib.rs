//! hv-approval
//!
//! Verification rule engine for the two-stage order approval workflow.
//! Pure deterministic logic, no I/O and no network wiring:
//!
//! - the status state machine ([`transition`]) with role authorization,
//! - the single owned status derivation ([`derive_status`]) every consumer
//!   reads instead of trusting `payment_status` in isolation,
//! - per-payment-type check relevance ([`relevant_checks`]),
//! - the approve/reject gating predicates ([`evaluate_gate`]).
//!
//! Callers enforce the gate **before** any API call; a refused action is a
//! client-side validation failure and must never reach the server.

mod gate;
mod state_machine;

pub use gate::{evaluate_gate, evaluate_gate_parts, ActionGate, GateDecision, GateRefusal};
pub use state_machine::{derive_status, relevant_checks, transition, TransitionError};
