//! Order, transaction, investor and approval-history records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::{DecisionAction, PaymentStatus, PaymentType, Role, RoleSet, TransferMode};

// ---------------------------------------------------------------------------
// Order
// ---------------------------------------------------------------------------

/// One livestock-unit investment order as returned by the list endpoint.
///
/// `history` is append-only, oldest first. `payment_status` is the
/// server-reported status; consumers derive the effective status through
/// `hv-approval` rather than trusting this field in isolation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub farm_id: String,
    #[serde(default)]
    pub farm_location: Option<String>,
    pub placed_at: DateTime<Utc>,
    pub unit_count: u32,
    #[serde(default)]
    pub buffalo_count: u32,
    #[serde(default)]
    pub calf_count: u32,
    /// Integer paise.
    pub unit_cost: i64,
    /// Integer paise.
    pub total_cost: i64,
    #[serde(default)]
    pub coins_redeemed: i64,
    pub payment_status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction: Option<Transaction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investor: Option<Investor>,
    /// Lookup key for lazy investor aggregation when the snapshot is not
    /// embedded in the list response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investor_mobile: Option<String>,
    #[serde(default)]
    pub history: Vec<ApprovalHistoryEntry>,
}

impl Order {
    /// Effective payment type. Orders settled purely in coins may omit the
    /// transaction sub-object; they are treated as coins-redemption.
    pub fn payment_type(&self) -> PaymentType {
        self.transaction
            .as_ref()
            .map(|t| t.payment_type)
            .unwrap_or(PaymentType::CoinsRedeem)
    }
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// Payment record owned by the order for its lifetime. Never mutated by this
/// subsystem; the approval pipeline only records verification metadata in the
/// order's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub payment_type: PaymentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_mode: Option<TransferMode>,
    /// Integer paise.
    pub amount: i64,
    // Proof-image presence varies by payment type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cheque_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cheque_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cashier_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transacted_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Investor
// ---------------------------------------------------------------------------

/// Identity snapshot of the investor at order time. Read-only here; fetched
/// lazily when not embedded in the list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Investor {
    pub name: String,
    pub mobile: String,
    #[serde(default)]
    pub kyc_verified: bool,
    #[serde(default)]
    pub documents: Vec<String>,
}

// ---------------------------------------------------------------------------
// ApprovalChecks / CheckKind
// ---------------------------------------------------------------------------

/// One verification dimension of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckKind {
    UnitsChecked,
    PaymentProof,
    PaymentReceived,
    CoinsChecked,
}

impl CheckKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnitsChecked => "unitsChecked",
            Self::PaymentProof => "paymentProof",
            Self::PaymentReceived => "paymentReceived",
            Self::CoinsChecked => "coinsChecked",
        }
    }
}

/// Tri-state verification flags.
///
/// `None` means the operator never looked at that dimension; it is a
/// different value than `Some(false)` and is **absent** from any serialized
/// payload. This prevents silently asserting "verified: false" for a
/// dimension that was never inspected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalChecks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units_checked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_proof: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_received: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coins_checked: Option<bool>,
}

impl ApprovalChecks {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: CheckKind) -> Option<bool> {
        match kind {
            CheckKind::UnitsChecked => self.units_checked,
            CheckKind::PaymentProof => self.payment_proof,
            CheckKind::PaymentReceived => self.payment_received,
            CheckKind::CoinsChecked => self.coins_checked,
        }
    }

    pub fn set(&mut self, kind: CheckKind, value: bool) {
        match kind {
            CheckKind::UnitsChecked => self.units_checked = Some(value),
            CheckKind::PaymentProof => self.payment_proof = Some(value),
            CheckKind::PaymentReceived => self.payment_received = Some(value),
            CheckKind::CoinsChecked => self.coins_checked = Some(value),
        }
    }

    pub fn with(mut self, kind: CheckKind, value: bool) -> Self {
        self.set(kind, value);
        self
    }

    /// True when no check has been explicitly set.
    pub fn is_unset(&self) -> bool {
        self.units_checked.is_none()
            && self.payment_proof.is_none()
            && self.payment_received.is_none()
            && self.coins_checked.is_none()
    }
}

// ---------------------------------------------------------------------------
// ApprovalHistoryEntry
// ---------------------------------------------------------------------------

/// One approve/reject decision taken on an order. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalHistoryEntry {
    pub action: DecisionAction,
    pub role: Role,
    pub actor_name: String,
    pub actor_mobile: String,
    pub at: DateTime<Utc>,
    #[serde(default)]
    pub comments: String,
    #[serde(default)]
    pub checks: ApprovalChecks,
}

// ---------------------------------------------------------------------------
// Farm (collaborator boundary)
// ---------------------------------------------------------------------------

/// Farm summary used only to populate the farm filter dropdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Farm {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub active: bool,
}

// ---------------------------------------------------------------------------
// AdminIdentity
// ---------------------------------------------------------------------------

/// The acting operator. The mobile number is the backend's operator key and
/// rides a header on every API call.
#[derive(Debug, Clone)]
pub struct AdminIdentity {
    pub mobile: String,
    pub name: String,
    pub roles: RoleSet,
}

impl AdminIdentity {
    pub fn new(mobile: impl Into<String>, name: impl Into<String>, roles: RoleSet) -> Self {
        Self {
            mobile: mobile.into(),
            name: name.into(),
            roles,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::PaymentType;

    fn order_json() -> &'static str {
        r#"{
            "id": "ord-1",
            "farmId": "farm-7",
            "farmLocation": "Hisar",
            "placedAt": "2026-05-04T10:00:00Z",
            "unitCount": 2,
            "buffaloCount": 2,
            "calfCount": 1,
            "unitCost": 7500000,
            "totalCost": 15000000,
            "coinsRedeemed": 0,
            "paymentStatus": "PENDING_ADMIN_VERIFICATION",
            "transaction": {
                "paymentType": "BANK_TRANSFER",
                "transferMode": "NEFT",
                "amount": 15000000,
                "utr": "UTR123456"
            }
        }"#
    }

    #[test]
    fn order_decodes_with_defaults_for_absent_fields() {
        let order: Order = serde_json::from_str(order_json()).unwrap();
        assert_eq!(order.id, "ord-1");
        assert_eq!(order.payment_status, PaymentStatus::PendingAdminVerification);
        assert!(order.history.is_empty());
        assert!(order.investor.is_none());
        assert!(order.rejected_reason.is_none());
        assert_eq!(order.payment_type(), PaymentType::BankTransfer);
    }

    #[test]
    fn order_without_transaction_is_coins_redeem() {
        let raw = r#"{
            "id": "ord-2",
            "farmId": "farm-7",
            "placedAt": "2026-05-04T10:00:00Z",
            "unitCount": 1,
            "unitCost": 7500000,
            "totalCost": 0,
            "coinsRedeemed": 7500000,
            "paymentStatus": "PENDING_ADMIN_VERIFICATION"
        }"#;
        let order: Order = serde_json::from_str(raw).unwrap();
        assert_eq!(order.payment_type(), PaymentType::CoinsRedeem);
    }

    #[test]
    fn unset_checks_serialize_to_empty_object() {
        let checks = ApprovalChecks::none();
        assert!(checks.is_unset());
        assert_eq!(serde_json::to_string(&checks).unwrap(), "{}");
    }

    #[test]
    fn only_set_checks_appear_in_json() {
        let checks = ApprovalChecks::none()
            .with(CheckKind::UnitsChecked, true)
            .with(CheckKind::PaymentReceived, false);
        let value = serde_json::to_value(checks).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(obj["unitsChecked"], true);
        assert_eq!(obj["paymentReceived"], false);
        assert!(!obj.contains_key("paymentProof"));
        assert!(!obj.contains_key("coinsChecked"));
    }

    #[test]
    fn history_entry_round_trips() {
        let raw = r#"{
            "action": "REJECT",
            "role": "ADMIN",
            "actorName": "Asha",
            "actorMobile": "9876500000",
            "at": "2026-05-05T09:30:00Z",
            "comments": "amount mismatch",
            "checks": { "unitsChecked": true, "paymentReceived": false }
        }"#;
        let entry: ApprovalHistoryEntry = serde_json::from_str(raw).unwrap();
        assert_eq!(entry.action, DecisionAction::Reject);
        assert_eq!(entry.role, Role::Admin);
        assert_eq!(entry.checks.get(CheckKind::UnitsChecked), Some(true));
        assert_eq!(entry.checks.get(CheckKind::PaymentReceived), Some(false));
        assert_eq!(entry.checks.get(CheckKind::PaymentProof), None);
    }
}
