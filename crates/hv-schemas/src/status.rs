//! Lifecycle, payment and role enums.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// PaymentStatus
// ---------------------------------------------------------------------------

/// Order lifecycle status. Doubles as the status-tab filter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Investor has not completed payment; no verification is possible yet.
    PendingPayment,
    /// First verification stage: awaiting an admin (or super-admin) decision.
    PendingAdminVerification,
    /// Second verification stage: awaiting the super-admin decision.
    PendingSuperAdminVerification,
    /// A previously admin-approved order flagged by a super-admin for
    /// re-review. Gates identically to the second verification stage.
    PendingSuperAdminRejection,
    /// Fully verified and settled. **Terminal** for this workflow.
    Paid,
    /// Rejected at either stage. **Terminal** for this workflow.
    Rejected,
}

impl PaymentStatus {
    /// Returns `true` if no approve/reject action can ever apply again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Paid | Self::Rejected)
    }

    /// Returns `true` when the order sits in a stage where some actor may act.
    pub fn is_reviewable(&self) -> bool {
        matches!(
            self,
            Self::PendingAdminVerification
                | Self::PendingSuperAdminVerification
                | Self::PendingSuperAdminRejection
        )
    }

    /// Wire name, e.g. `"PENDING_ADMIN_VERIFICATION"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingPayment => "PENDING_PAYMENT",
            Self::PendingAdminVerification => "PENDING_ADMIN_VERIFICATION",
            Self::PendingSuperAdminVerification => "PENDING_SUPER_ADMIN_VERIFICATION",
            Self::PendingSuperAdminRejection => "PENDING_SUPER_ADMIN_REJECTION",
            Self::Paid => "PAID",
            Self::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// PaymentType
// ---------------------------------------------------------------------------

/// How the investor paid for the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentType {
    BankTransfer,
    Cheque,
    Online,
    CashPayment,
    Cash,
    CoinsRedeem,
}

impl PaymentType {
    /// Coins-redemption orders carry no money proof; only the coin ledger
    /// is verified.
    pub fn is_coins_redeem(&self) -> bool {
        matches!(self, Self::CoinsRedeem)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BankTransfer => "BANK_TRANSFER",
            Self::Cheque => "CHEQUE",
            Self::Online => "ONLINE",
            Self::CashPayment => "CASH_PAYMENT",
            Self::Cash => "CASH",
            Self::CoinsRedeem => "COINS_REDEEM",
        }
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TransferMode
// ---------------------------------------------------------------------------

/// Bank transfer rail. The backend vocabulary is open-ended, so unknown wire
/// strings round-trip through `Other` instead of failing the page decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransferMode {
    Neft,
    Rtgs,
    Imps,
    Upi,
    Other(String),
}

impl TransferMode {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Neft => "NEFT",
            Self::Rtgs => "RTGS",
            Self::Imps => "IMPS",
            Self::Upi => "UPI",
            Self::Other(s) => s.as_str(),
        }
    }
}

impl From<String> for TransferMode {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "NEFT" => Self::Neft,
            "RTGS" => Self::Rtgs,
            "IMPS" => Self::Imps,
            "UPI" => Self::Upi,
            _ => Self::Other(s),
        }
    }
}

impl From<TransferMode> for String {
    fn from(m: TransferMode) -> Self {
        m.as_str().to_string()
    }
}

impl fmt::Display for TransferMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DecisionAction
// ---------------------------------------------------------------------------

/// The two operator decisions recorded in approval history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionAction {
    Approve,
    Reject,
}

impl fmt::Display for DecisionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Approve => f.write_str("APPROVE"),
            Self::Reject => f.write_str("REJECT"),
        }
    }
}

// ---------------------------------------------------------------------------
// Role / RoleSet
// ---------------------------------------------------------------------------

/// Operator privilege role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::SuperAdmin => "SUPER_ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed set of [`Role`]s held by one operator.
///
/// The backend represents multi-role operators as a comma-joined string
/// (`"ADMIN,SUPER_ADMIN"`); that representation is resolved here, once, at
/// the edge. Every authorization predicate downstream works against this set,
/// never against strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleSet {
    admin: bool,
    super_admin: bool,
}

impl RoleSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn admin() -> Self {
        Self {
            admin: true,
            super_admin: false,
        }
    }

    pub fn super_admin() -> Self {
        Self {
            admin: false,
            super_admin: true,
        }
    }

    /// Parse the backend's comma-joined role string. Unknown tokens are
    /// skipped with a warning rather than failing the login.
    pub fn parse_csv(raw: &str) -> Self {
        let mut set = Self::empty();
        for token in raw.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            match token.to_ascii_uppercase().as_str() {
                "ADMIN" => set.admin = true,
                "SUPER_ADMIN" | "SUPERADMIN" => set.super_admin = true,
                other => {
                    tracing::warn!(role = other, "ignoring unknown role token");
                }
            }
        }
        set
    }

    pub fn insert(&mut self, role: Role) {
        match role {
            Role::Admin => self.admin = true,
            Role::SuperAdmin => self.super_admin = true,
        }
    }

    pub fn contains(&self, role: Role) -> bool {
        match role {
            Role::Admin => self.admin,
            Role::SuperAdmin => self.super_admin,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.admin && !self.super_admin
    }

    /// The highest privilege in the set, used when recording who acted.
    pub fn acting_role(&self) -> Option<Role> {
        if self.super_admin {
            Some(Role::SuperAdmin)
        } else if self.admin {
            Some(Role::Admin)
        } else {
            None
        }
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        let mut set = Self::empty();
        for role in iter {
            set.insert(role);
        }
        set
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
