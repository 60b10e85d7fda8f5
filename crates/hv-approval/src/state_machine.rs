//! Order approval state machine.
//!
//! # State diagram
//!
//! ```text
//! PENDING_PAYMENT ──► PENDING_ADMIN_VERIFICATION
//!                          │ approve (Admin | SuperAdmin)
//!                          ▼
//!              PENDING_SUPER_ADMIN_VERIFICATION ◄──┐
//!                   │ approve (SuperAdmin)          │ re-review flag
//!                   ▼                               │ (server side channel)
//!                 PAID (term.)      PENDING_SUPER_ADMIN_REJECTION
//!                                        │ approve (SuperAdmin) ──► PAID
//!                                        │ reject  (SuperAdmin) ──► REJECTED
//!                          reject at either stage ──► REJECTED (term.)
//! ```
//!
//! Both super-admin stages gate identically. `PAID` and `REJECTED` are
//! terminal for this workflow; delivery tracking is a separate lifecycle.

use std::fmt;

use hv_schemas::{
    CheckKind, DecisionAction, Order, PaymentStatus, PaymentType, Role, RoleSet,
};

// ---------------------------------------------------------------------------
// TransitionError
// ---------------------------------------------------------------------------

/// Returned when a decision cannot legally be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// The order is not in a reviewable stage; no action is exposed.
    NotReviewable { status: PaymentStatus },
    /// The acting role set does not include the role the stage requires.
    RoleNotPermitted {
        status: PaymentStatus,
        required: Role,
    },
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionError::NotReviewable { status } => {
                write!(f, "no action permitted in status {status}")
            }
            TransitionError::RoleNotPermitted { status, required } => {
                write!(f, "status {status} requires role {required}")
            }
        }
    }
}

impl std::error::Error for TransitionError {}

// ---------------------------------------------------------------------------
// transition
// ---------------------------------------------------------------------------

/// Apply a decision to a status under a role set.
///
/// Authorization table:
///
/// | Current status                     | Permitted actor      | approve → / reject → |
/// |------------------------------------|----------------------|----------------------|
/// | `PENDING_ADMIN_VERIFICATION`       | Admin or SuperAdmin  | super-admin stage / REJECTED |
/// | `PENDING_SUPER_ADMIN_VERIFICATION` | SuperAdmin only      | PAID / REJECTED      |
/// | `PENDING_SUPER_ADMIN_REJECTION`    | SuperAdmin only      | PAID / REJECTED      |
/// | anything else                      | none                 | error                |
///
/// # Errors
/// [`TransitionError`] when the status is not reviewable or the role set
/// lacks the required role. Check-level gating is **not** evaluated here;
/// see [`crate::evaluate_gate`].
pub fn transition(
    status: PaymentStatus,
    roles: RoleSet,
    action: DecisionAction,
) -> Result<PaymentStatus, TransitionError> {
    use PaymentStatus::*;

    match status {
        PendingAdminVerification => {
            if !roles.contains(Role::Admin) && !roles.contains(Role::SuperAdmin) {
                return Err(TransitionError::RoleNotPermitted {
                    status,
                    required: Role::Admin,
                });
            }
            Ok(match action {
                DecisionAction::Approve => PendingSuperAdminVerification,
                DecisionAction::Reject => Rejected,
            })
        }
        PendingSuperAdminVerification | PendingSuperAdminRejection => {
            if !roles.contains(Role::SuperAdmin) {
                return Err(TransitionError::RoleNotPermitted {
                    status,
                    required: Role::SuperAdmin,
                });
            }
            Ok(match action {
                DecisionAction::Approve => Paid,
                DecisionAction::Reject => Rejected,
            })
        }
        PendingPayment | Paid | Rejected => Err(TransitionError::NotReviewable { status }),
    }
}

// ---------------------------------------------------------------------------
// derive_status
// ---------------------------------------------------------------------------

/// Derive the effective status of an order from its approval history.
///
/// The latest history entry wins:
/// - `REJECT` by anyone ⇒ `REJECTED`
/// - `APPROVE` by a super-admin ⇒ `PAID`
/// - `APPROVE` by an admin ⇒ the super-admin stage
///
/// With no history, the server-reported `payment_status` is the only source.
///
/// The re-review flag appends no history entry, so an order whose latest
/// entry is an admin approve may legitimately sit in
/// `PENDING_SUPER_ADMIN_REJECTION`; the server status is preserved in that
/// one case. Both super-admin stages gate identically, so no permission
/// decision depends on the distinction.
pub fn derive_status(order: &Order) -> PaymentStatus {
    let Some(latest) = order.history.last() else {
        return order.payment_status;
    };

    match (latest.action, latest.role) {
        (DecisionAction::Reject, _) => PaymentStatus::Rejected,
        (DecisionAction::Approve, Role::SuperAdmin) => PaymentStatus::Paid,
        (DecisionAction::Approve, Role::Admin) => {
            if order.payment_status == PaymentStatus::PendingSuperAdminRejection {
                PaymentStatus::PendingSuperAdminRejection
            } else {
                PaymentStatus::PendingSuperAdminVerification
            }
        }
    }
}

// ---------------------------------------------------------------------------
// relevant_checks
// ---------------------------------------------------------------------------

/// The verification dimensions that apply to an order.
///
/// - Coins-redemption orders: only `coinsChecked`.
/// - Everything else: `unitsChecked`, `paymentProof`, `paymentReceived`,
///   plus `coinsChecked` when the order also redeemed coins (mixed payment).
pub fn relevant_checks(payment_type: PaymentType, coins_redeemed: i64) -> Vec<CheckKind> {
    if payment_type.is_coins_redeem() {
        return vec![CheckKind::CoinsChecked];
    }
    let mut checks = vec![
        CheckKind::UnitsChecked,
        CheckKind::PaymentProof,
        CheckKind::PaymentReceived,
    ];
    if coins_redeemed > 0 {
        checks.push(CheckKind::CoinsChecked);
    }
    checks
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
