//! Approve/reject gating predicates.
//!
//! The gate answers one question for the UI and the command executor: given
//! the order as it currently stands, the operator's roles, and the check
//! flags plus remarks the operator has entered so far, which actions are
//! enabled right now?
//!
//! Asymmetry is intentional and load-bearing:
//! - **Admin approve** requires every relevant check explicitly `true`.
//! - **SuperAdmin approve** requires no checks at all (terminal authority may
//!   approve on holistic judgement).
//! - **Reject** is the same for both roles: at least one relevant check
//!   explicitly `false` AND a non-empty justification. A check left unset
//!   blocks approval but never, by itself, enables rejection.

use std::fmt;

use hv_schemas::{
    ApprovalChecks, CheckKind, DecisionAction, Order, PaymentStatus, PaymentType, Role, RoleSet,
};

use crate::state_machine::{derive_status, relevant_checks, transition};

// ---------------------------------------------------------------------------
// GateRefusal
// ---------------------------------------------------------------------------

/// Why an action is currently disabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateRefusal {
    /// The order is not in a reviewable stage.
    NotReviewable { status: PaymentStatus },
    /// The operator's roles do not cover this stage.
    RoleNotPermitted { status: PaymentStatus },
    /// Approve only: relevant checks not yet explicitly `true`.
    ChecksIncomplete { unsatisfied: Vec<CheckKind> },
    /// Reject only: no relevant check has been explicitly marked `false`.
    NoFailedCheck,
    /// Reject only: a documented reason is mandatory.
    RemarksRequired,
}

impl fmt::Display for GateRefusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateRefusal::NotReviewable { status } => {
                write!(f, "GATE_REFUSED: no action permitted in status {status}")
            }
            GateRefusal::RoleNotPermitted { status } => {
                write!(f, "GATE_REFUSED: role not permitted to act in {status}")
            }
            GateRefusal::ChecksIncomplete { unsatisfied } => {
                let names: Vec<&str> = unsatisfied.iter().map(|c| c.as_str()).collect();
                write!(f, "GATE_REFUSED: checks not verified: {}", names.join(", "))
            }
            GateRefusal::NoFailedCheck => {
                write!(f, "GATE_REFUSED: rejection requires a failed check")
            }
            GateRefusal::RemarksRequired => {
                write!(f, "GATE_REFUSED: rejection requires a justification")
            }
        }
    }
}

impl std::error::Error for GateRefusal {}

// ---------------------------------------------------------------------------
// GateDecision / ActionGate
// ---------------------------------------------------------------------------

/// Whether a single action is currently enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allowed,
    Refused(GateRefusal),
}

impl GateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GateDecision::Allowed)
    }

    pub fn refusal(&self) -> Option<&GateRefusal> {
        match self {
            GateDecision::Allowed => None,
            GateDecision::Refused(r) => Some(r),
        }
    }
}

/// The gate verdict for both actions at once, as the UI renders them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionGate {
    pub approve: GateDecision,
    pub reject: GateDecision,
}

// ---------------------------------------------------------------------------
// evaluate_gate
// ---------------------------------------------------------------------------

/// Evaluate the gate for an order using the single owned status derivation.
pub fn evaluate_gate(
    order: &Order,
    roles: RoleSet,
    checks: &ApprovalChecks,
    remarks: &str,
) -> ActionGate {
    evaluate_gate_parts(
        derive_status(order),
        order.payment_type(),
        order.coins_redeemed,
        roles,
        checks,
        remarks,
    )
}

/// Evaluate the gate from already-derived parts.
pub fn evaluate_gate_parts(
    status: PaymentStatus,
    payment_type: PaymentType,
    coins_redeemed: i64,
    roles: RoleSet,
    checks: &ApprovalChecks,
    remarks: &str,
) -> ActionGate {
    let relevant = relevant_checks(payment_type, coins_redeemed);

    ActionGate {
        approve: approve_decision(status, roles, &relevant, checks),
        reject: reject_decision(status, roles, &relevant, checks, remarks),
    }
}

fn stage_refusal(
    status: PaymentStatus,
    roles: RoleSet,
    action: DecisionAction,
) -> Option<GateRefusal> {
    match transition(status, roles, action) {
        Ok(_) => None,
        Err(crate::TransitionError::NotReviewable { status }) => {
            Some(GateRefusal::NotReviewable { status })
        }
        Err(crate::TransitionError::RoleNotPermitted { status, .. }) => {
            Some(GateRefusal::RoleNotPermitted { status })
        }
    }
}

fn approve_decision(
    status: PaymentStatus,
    roles: RoleSet,
    relevant: &[CheckKind],
    checks: &ApprovalChecks,
) -> GateDecision {
    if let Some(refusal) = stage_refusal(status, roles, DecisionAction::Approve) {
        return GateDecision::Refused(refusal);
    }

    // Terminal authority: a super-admin needs no per-field checks.
    if roles.contains(Role::SuperAdmin) {
        return GateDecision::Allowed;
    }

    let unsatisfied: Vec<CheckKind> = relevant
        .iter()
        .copied()
        .filter(|kind| checks.get(*kind) != Some(true))
        .collect();

    if unsatisfied.is_empty() {
        GateDecision::Allowed
    } else {
        GateDecision::Refused(GateRefusal::ChecksIncomplete { unsatisfied })
    }
}

fn reject_decision(
    status: PaymentStatus,
    roles: RoleSet,
    relevant: &[CheckKind],
    checks: &ApprovalChecks,
    remarks: &str,
) -> GateDecision {
    if let Some(refusal) = stage_refusal(status, roles, DecisionAction::Reject) {
        return GateDecision::Refused(refusal);
    }

    // Unset is not a failure; only an explicit `false` enables rejection.
    let any_failed = relevant
        .iter()
        .any(|kind| checks.get(*kind) == Some(false));
    if !any_failed {
        return GateDecision::Refused(GateRefusal::NoFailedCheck);
    }

    if remarks.trim().is_empty() {
        return GateDecision::Refused(GateRefusal::RemarksRequired);
    }

    GateDecision::Allowed
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
