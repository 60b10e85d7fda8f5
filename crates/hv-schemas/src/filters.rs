//! List-view filter criteria and status-bucket counts.

use serde::{Deserialize, Serialize};

use crate::status::{PaymentStatus, PaymentType, TransferMode};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

// ---------------------------------------------------------------------------
// QueryFilters
// ---------------------------------------------------------------------------

/// The active list-view query. Pure value object; persisted across
/// navigation through the filter-persistence port so operators resume where
/// they left off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryFilters {
    #[serde(default)]
    pub search: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PaymentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_type: Option<PaymentType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_mode: Option<TransferMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub farm_id: Option<String>,
    /// 1-based.
    pub page: u32,
    pub page_size: u32,
}

impl Default for QueryFilters {
    fn default() -> Self {
        Self {
            search: String::new(),
            status: None,
            payment_type: None,
            transfer_mode: None,
            farm_id: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

// ---------------------------------------------------------------------------
// StatusCounts / BucketCounts
// ---------------------------------------------------------------------------

/// Per-bucket counts reported by the server alongside each query result.
/// Any field may be absent; see [`StatusCounts::absorb`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCounts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_due: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_admin_approval: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_super_admin_approval: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_super_admin_rejection: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected: Option<u64>,
}

/// Resolved tab-badge counts held by the query store. Reflects the
/// unfiltered-by-status counts for the active non-status filters, so
/// switching the status tab needs no extra round trip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub payment_due: u64,
    pub pending_admin_approval: u64,
    pub pending_super_admin_approval: u64,
    pub pending_super_admin_rejection: u64,
    pub paid: u64,
    pub rejected: u64,
}

impl StatusCounts {
    /// Merge a server report into the known counts. An absent field keeps
    /// the previously known value; it is never treated as zero.
    pub fn absorb(&mut self, update: &BucketCounts) {
        if let Some(v) = update.payment_due {
            self.payment_due = v;
        }
        if let Some(v) = update.pending_admin_approval {
            self.pending_admin_approval = v;
        }
        if let Some(v) = update.pending_super_admin_approval {
            self.pending_super_admin_approval = v;
        }
        if let Some(v) = update.pending_super_admin_rejection {
            self.pending_super_admin_rejection = v;
        }
        if let Some(v) = update.paid {
            self.paid = v;
        }
        if let Some(v) = update.rejected {
            self.rejected = v;
        }
    }

    /// Badge count for a status tab.
    pub fn for_status(&self, status: PaymentStatus) -> u64 {
        match status {
            PaymentStatus::PendingPayment => self.payment_due,
            PaymentStatus::PendingAdminVerification => self.pending_admin_approval,
            PaymentStatus::PendingSuperAdminVerification => self.pending_super_admin_approval,
            PaymentStatus::PendingSuperAdminRejection => self.pending_super_admin_rejection,
            PaymentStatus::Paid => self.paid,
            PaymentStatus::Rejected => self.rejected,
        }
    }
}

// ---------------------------------------------------------------------------
// OrderPage
// ---------------------------------------------------------------------------

/// One normalized page of query results, as handed to the query store by the
/// fetch gateway. The heterogeneous wire shape is resolved into this struct
/// once, at the gateway boundary.
#[derive(Debug, Clone, Default)]
pub struct OrderPage {
    pub orders: Vec<crate::order::Order>,
    /// Total rows matching the active filters, when the server reports it.
    pub total_filtered: Option<u64>,
    /// Total orders in the system regardless of filters.
    pub total_all_orders: Option<u64>,
    pub counts: BucketCounts,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filters_start_on_page_one() {
        let f = QueryFilters::default();
        assert_eq!(f.page, 1);
        assert_eq!(f.page_size, DEFAULT_PAGE_SIZE);
        assert!(f.status.is_none());
        assert!(f.search.is_empty());
    }

    #[test]
    fn filters_round_trip_through_json() {
        let f = QueryFilters {
            search: "ravi".to_string(),
            status: Some(PaymentStatus::Paid),
            payment_type: Some(PaymentType::Cheque),
            transfer_mode: None,
            farm_id: Some("farm-3".to_string()),
            page: 4,
            page_size: 25,
        };
        let json = serde_json::to_string(&f).unwrap();
        let back: QueryFilters = serde_json::from_str(&json).unwrap();
        assert_eq!(back, f);
    }

    #[test]
    fn absorb_keeps_previous_value_for_absent_buckets() {
        let mut counts = StatusCounts {
            paid: 5,
            rejected: 2,
            ..StatusCounts::default()
        };
        counts.absorb(&BucketCounts {
            rejected: Some(3),
            ..BucketCounts::default()
        });
        assert_eq!(counts.paid, 5, "absent paid count must not reset to zero");
        assert_eq!(counts.rejected, 3);
    }

    #[test]
    fn absorb_applies_every_present_bucket() {
        let mut counts = StatusCounts::default();
        counts.absorb(&BucketCounts {
            payment_due: Some(1),
            pending_admin_approval: Some(2),
            pending_super_admin_approval: Some(3),
            pending_super_admin_rejection: Some(4),
            paid: Some(5),
            rejected: Some(6),
        });
        assert_eq!(counts.for_status(PaymentStatus::PendingPayment), 1);
        assert_eq!(counts.for_status(PaymentStatus::PendingAdminVerification), 2);
        assert_eq!(
            counts.for_status(PaymentStatus::PendingSuperAdminVerification),
            3
        );
        assert_eq!(
            counts.for_status(PaymentStatus::PendingSuperAdminRejection),
            4
        );
        assert_eq!(counts.for_status(PaymentStatus::Paid), 5);
        assert_eq!(counts.for_status(PaymentStatus::Rejected), 6);
    }
}
