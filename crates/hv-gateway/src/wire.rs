//! Wire-shape normalization for the list endpoint.
//!
//! The backend answers the order query in one of two shapes: a bare array of
//! orders (older deployments) or an object carrying the orders plus totals
//! and per-bucket counts. The difference is resolved exactly once, here,
//! into [`OrderPage`]; nothing downstream ever re-detects the shape.

use serde::Deserialize;
use serde_json::Value;

use hv_schemas::{BucketCounts, Order, OrderPage};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// The counted object shape. Every count may be absent; absent counts must
/// not zero previously known badge values, so they stay `Option` all the way
/// into the store's merge.
#[derive(Debug, Deserialize)]
pub struct CountedOrderList {
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub total_filtered: Option<u64>,
    #[serde(default)]
    pub total_all_orders: Option<u64>,
    #[serde(default)]
    pub payment_due_count: Option<u64>,
    #[serde(default)]
    pub pending_admin_approval_count: Option<u64>,
    #[serde(default)]
    pub pending_super_admin_approval_count: Option<u64>,
    #[serde(default)]
    pub pending_super_admin_rejection_count: Option<u64>,
    #[serde(default)]
    pub paid_count: Option<u64>,
    #[serde(default)]
    pub rejected_count: Option<u64>,
}

/// Both accepted wire shapes of the list endpoint.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OrderListResponse {
    Counted(CountedOrderList),
    Bare(Vec<Order>),
}

/// Resolve a wire response into the store's shape.
pub fn normalize_order_list(response: OrderListResponse) -> OrderPage {
    match response {
        OrderListResponse::Bare(orders) => OrderPage {
            orders,
            total_filtered: None,
            total_all_orders: None,
            counts: BucketCounts::default(),
        },
        OrderListResponse::Counted(counted) => OrderPage {
            orders: counted.orders,
            total_filtered: counted.total_filtered,
            total_all_orders: counted.total_all_orders,
            counts: BucketCounts {
                payment_due: counted.payment_due_count,
                pending_admin_approval: counted.pending_admin_approval_count,
                pending_super_admin_approval: counted.pending_super_admin_approval_count,
                pending_super_admin_rejection: counted.pending_super_admin_rejection_count,
                paid: counted.paid_count,
                rejected: counted.rejected_count,
            },
        },
    }
}

// ---------------------------------------------------------------------------
// Soft-error envelopes
// ---------------------------------------------------------------------------

/// Detect an HTTP-200 error envelope.
///
/// The backend sometimes reports failures inside a 200 body, either as
/// `{"error": "..."}` or `{"status": "ERROR", "message": "..."}`. Callers
/// treat these exactly like transport failures.
pub fn detect_soft_error(body: &Value) -> Option<String> {
    let obj = body.as_object()?;

    if let Some(err) = obj.get("error").and_then(Value::as_str) {
        return Some(err.to_string());
    }
    if obj.get("status").and_then(Value::as_str) == Some("ERROR") {
        let message = obj
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unspecified server error");
        return Some(message.to_string());
    }
    None
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
