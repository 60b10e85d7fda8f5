//! Deterministic in-memory order service.
//!
//! Behaves like the real backend at the `OrderApi` boundary: it owns the
//! transition on approve/reject, appends history, and reports bucket counts
//! computed over the non-status filters (so switching the status tab does
//! not change the other tabs' badges). Failures are scripted, never random.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, TimeZone, Utc};

use hv_gateway::{ApiError, DecisionRequest, OrderApi, OrderQuery};
use hv_schemas::{
    AdminIdentity, ApprovalHistoryEntry, BucketCounts, DecisionAction, Farm, Investor, Order,
    OrderPage, PaymentStatus,
};

// ---------------------------------------------------------------------------
// RecordedDecision
// ---------------------------------------------------------------------------

/// One decision call captured for assertions, including the exact wire body.
#[derive(Debug, Clone)]
pub struct RecordedDecision {
    pub action: DecisionAction,
    pub order_id: String,
    pub actor_mobile: String,
    pub body: serde_json::Value,
}

// ---------------------------------------------------------------------------
// StubOrderApi
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct StubState {
    orders: Vec<Order>,
    investors: HashMap<String, Investor>,
    farms: Vec<Farm>,
    fail_next_fetch: Option<String>,
    fail_next_decision: Option<String>,
    decisions: Vec<RecordedDecision>,
    queries: Vec<OrderQuery>,
    decision_seq: i64,
}

/// In-memory [`OrderApi`]. Interior mutability so the shared-reference
/// trait surface can mutate the scripted world.
#[derive(Debug, Default)]
pub struct StubOrderApi {
    state: Mutex<StubState>,
}

impl StubOrderApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_orders(orders: Vec<Order>) -> Self {
        let stub = Self::new();
        {
            let mut state = stub.lock();
            state.orders = orders;
        }
        stub
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StubState> {
        self.state.lock().expect("stub state poisoned")
    }

    pub fn push_order(&self, order: Order) {
        self.lock().orders.push(order);
    }

    pub fn insert_investor(&self, investor: Investor) {
        self.lock()
            .investors
            .insert(investor.mobile.clone(), investor);
    }

    pub fn set_farms(&self, farms: Vec<Farm>) {
        self.lock().farms = farms;
    }

    /// Fail the next `fetch_orders` call with an api error, then recover.
    pub fn fail_next_fetch(&self, message: &str) {
        self.lock().fail_next_fetch = Some(message.to_string());
    }

    /// Fail the next approve/reject call with an api error, then recover.
    pub fn fail_next_decision(&self, message: &str) {
        self.lock().fail_next_decision = Some(message.to_string());
    }

    /// Every decision recorded so far, oldest first.
    pub fn decisions(&self) -> Vec<RecordedDecision> {
        self.lock().decisions.clone()
    }

    /// Every list query served so far, oldest first.
    pub fn queries(&self) -> Vec<OrderQuery> {
        self.lock().queries.clone()
    }

    pub fn last_query(&self) -> Option<OrderQuery> {
        self.lock().queries.last().cloned()
    }

    /// Current server-side snapshot of one order.
    pub fn order_snapshot(&self, order_id: &str) -> Option<Order> {
        self.lock().orders.iter().find(|o| o.id == order_id).cloned()
    }

    fn decision_timestamp(seq: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 6, 12, 0, 0).unwrap() + Duration::minutes(seq)
    }

    fn apply_decision(
        &self,
        identity: &AdminIdentity,
        request: &DecisionRequest,
        action: DecisionAction,
    ) -> Result<(), ApiError> {
        let mut state = self.lock();
        if let Some(message) = state.fail_next_decision.take() {
            return Err(ApiError::Api {
                code: None,
                message,
            });
        }

        let body = serde_json::to_value(request)
            .map_err(|err| ApiError::Decode(err.to_string()))?;

        state.decision_seq += 1;
        let at = Self::decision_timestamp(state.decision_seq);

        let Some(role) = identity.roles.acting_role() else {
            return Err(ApiError::Api {
                code: None,
                message: "operator holds no role".to_string(),
            });
        };

        let actor_name = identity.name.clone();
        let actor_mobile = identity.mobile.clone();
        let roles = identity.roles;

        let order = state
            .orders
            .iter_mut()
            .find(|o| o.id == request.order_id)
            .ok_or_else(|| ApiError::Api {
                code: None,
                message: format!("order {} not found", request.order_id),
            })?;

        // The server owns the transition; an illegal one is its error.
        let next = hv_approval::transition(order.payment_status, roles, action).map_err(
            |err| ApiError::Api {
                code: None,
                message: err.to_string(),
            },
        )?;

        order.payment_status = next;
        if action == DecisionAction::Reject {
            order.rejected_reason = request.comments.clone();
        }
        order.history.push(ApprovalHistoryEntry {
            action,
            role,
            actor_name,
            actor_mobile: actor_mobile.clone(),
            at,
            comments: request.comments.clone().unwrap_or_default(),
            checks: request.checks,
        });

        let order_id = request.order_id.clone();
        state.decisions.push(RecordedDecision {
            action,
            order_id,
            actor_mobile,
            body,
        });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Query matching
// ---------------------------------------------------------------------------

/// Everything except the status filter; counts are computed over this match.
fn matches_non_status(order: &Order, query: &OrderQuery) -> bool {
    if let Some(payment_type) = query.payment_type {
        if order.payment_type() != payment_type {
            return false;
        }
    }
    if let Some(mode) = &query.transfer_mode {
        let order_mode = order
            .transaction
            .as_ref()
            .and_then(|t| t.transfer_mode.as_ref());
        if order_mode != Some(mode) {
            return false;
        }
    }
    if let Some(farm_id) = &query.farm_id {
        if &order.farm_id != farm_id {
            return false;
        }
    }
    if let Some(search) = &query.search {
        let needle = search.to_ascii_lowercase();
        let mut haystacks = vec![order.id.to_ascii_lowercase()];
        if let Some(mobile) = &order.investor_mobile {
            haystacks.push(mobile.clone());
        }
        if let Some(investor) = &order.investor {
            haystacks.push(investor.name.to_ascii_lowercase());
            haystacks.push(investor.mobile.clone());
        }
        if !haystacks.iter().any(|h| h.contains(&needle)) {
            return false;
        }
    }
    true
}

fn bucket_counts(orders: &[Order], query: &OrderQuery) -> BucketCounts {
    let count = |status: PaymentStatus| -> Option<u64> {
        Some(
            orders
                .iter()
                .filter(|o| o.payment_status == status && matches_non_status(o, query))
                .count() as u64,
        )
    };
    BucketCounts {
        payment_due: count(PaymentStatus::PendingPayment),
        pending_admin_approval: count(PaymentStatus::PendingAdminVerification),
        pending_super_admin_approval: count(PaymentStatus::PendingSuperAdminVerification),
        pending_super_admin_rejection: count(PaymentStatus::PendingSuperAdminRejection),
        paid: count(PaymentStatus::Paid),
        rejected: count(PaymentStatus::Rejected),
    }
}

impl OrderApi for StubOrderApi {
    fn fetch_orders(
        &self,
        _identity: &AdminIdentity,
        query: &OrderQuery,
    ) -> Result<OrderPage, ApiError> {
        let mut state = self.lock();
        state.queries.push(query.clone());
        if let Some(message) = state.fail_next_fetch.take() {
            return Err(ApiError::Transport(message));
        }

        let matching: Vec<&Order> = state
            .orders
            .iter()
            .filter(|o| matches_non_status(o, query))
            .filter(|o| match query.payment_status {
                Some(status) => o.payment_status == status,
                None => true,
            })
            .collect();

        let total_filtered = matching.len() as u64;
        let start = ((query.page.max(1) - 1) * query.page_size) as usize;
        let page_orders: Vec<Order> = matching
            .into_iter()
            .skip(start)
            .take(query.page_size as usize)
            .cloned()
            .collect();

        Ok(OrderPage {
            orders: page_orders,
            total_filtered: Some(total_filtered),
            total_all_orders: Some(state.orders.len() as u64),
            counts: bucket_counts(&state.orders, query),
        })
    }

    fn approve_order(
        &self,
        identity: &AdminIdentity,
        request: &DecisionRequest,
    ) -> Result<(), ApiError> {
        self.apply_decision(identity, request, DecisionAction::Approve)
    }

    fn reject_order(
        &self,
        identity: &AdminIdentity,
        request: &DecisionRequest,
    ) -> Result<(), ApiError> {
        self.apply_decision(identity, request, DecisionAction::Reject)
    }

    fn fetch_order(&self, _identity: &AdminIdentity, order_id: &str) -> Result<Order, ApiError> {
        self.order_snapshot(order_id).ok_or_else(|| ApiError::Api {
            code: None,
            message: format!("order {order_id} not found"),
        })
    }

    fn fetch_investor(
        &self,
        _identity: &AdminIdentity,
        mobile: &str,
    ) -> Result<Investor, ApiError> {
        self.lock()
            .investors
            .get(mobile)
            .cloned()
            .ok_or_else(|| ApiError::Api {
                code: None,
                message: format!("investor {mobile} not found"),
            })
    }

    fn list_active_farms(&self, _identity: &AdminIdentity) -> Result<Vec<Farm>, ApiError> {
        Ok(self
            .lock()
            .farms
            .iter()
            .filter(|f| f.active)
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
