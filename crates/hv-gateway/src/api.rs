//! API contract: trait, request types, error taxonomy.

use std::fmt;

use serde::Serialize;

use hv_schemas::{
    AdminIdentity, ApprovalChecks, Farm, Investor, Order, OrderPage, PaymentStatus, PaymentType,
    QueryFilters, TransferMode,
};

// ---------------------------------------------------------------------------
// ApiError
// ---------------------------------------------------------------------------

/// Errors an [`OrderApi`] implementation may return.
#[derive(Debug)]
pub enum ApiError {
    /// Network or transport failure.
    Transport(String),
    /// The backend returned an application-level error, whether as a non-2xx
    /// status or as an HTTP-200 error envelope.
    Api { code: Option<i64>, message: String },
    /// A response payload could not be decoded.
    Decode(String),
    /// A required configuration value (e.g. base URL) is missing or invalid.
    Config(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport(msg) => write!(f, "transport error: {msg}"),
            ApiError::Api {
                code: Some(c),
                message,
            } => write!(f, "api error code={c}: {message}"),
            ApiError::Api {
                code: None,
                message,
            } => write!(f, "api error: {message}"),
            ApiError::Decode(msg) => write!(f, "decode error: {msg}"),
            ApiError::Config(msg) => write!(f, "config error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

// ---------------------------------------------------------------------------
// OrderQuery
// ---------------------------------------------------------------------------

/// Wire query derived from the store's [`QueryFilters`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderQuery {
    pub page: u32,
    pub page_size: u32,
    pub payment_status: Option<PaymentStatus>,
    pub payment_type: Option<PaymentType>,
    pub transfer_mode: Option<TransferMode>,
    pub search: Option<String>,
    pub farm_id: Option<String>,
}

impl OrderQuery {
    pub fn from_filters(filters: &QueryFilters) -> Self {
        let search = filters.search.trim();
        Self {
            page: filters.page,
            page_size: filters.page_size,
            payment_status: filters.status,
            payment_type: filters.payment_type,
            transfer_mode: filters.transfer_mode.clone(),
            search: if search.is_empty() {
                None
            } else {
                Some(search.to_string())
            },
            farm_id: filters.farm_id.clone(),
        }
    }

    /// Query parameters in wire naming. Unset filters are omitted entirely.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("page_size", self.page_size.to_string()),
        ];
        if let Some(status) = self.payment_status {
            params.push(("paymentStatus", status.as_str().to_string()));
        }
        if let Some(payment_type) = self.payment_type {
            params.push(("paymentType", payment_type.as_str().to_string()));
        }
        if let Some(mode) = &self.transfer_mode {
            params.push(("transferMode", mode.as_str().to_string()));
        }
        if let Some(search) = &self.search {
            params.push(("search", search.clone()));
        }
        if let Some(farm_id) = &self.farm_id {
            params.push(("farmId", farm_id.clone()));
        }
        params
    }
}

// ---------------------------------------------------------------------------
// DecisionRequest
// ---------------------------------------------------------------------------

/// Body of an approve/reject call.
///
/// Checks the operator never set are absent from the serialized body; the
/// backend must not receive `"paymentProof": false` for a dimension nobody
/// inspected.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    pub order_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(flatten)]
    pub checks: ApprovalChecks,
}

impl DecisionRequest {
    pub fn new(order_id: impl Into<String>, checks: ApprovalChecks, remarks: &str) -> Self {
        let remarks = remarks.trim();
        Self {
            order_id: order_id.into(),
            comments: if remarks.is_empty() {
                None
            } else {
                Some(remarks.to_string())
            },
            checks,
        }
    }
}

// ---------------------------------------------------------------------------
// OrderApi
// ---------------------------------------------------------------------------

/// Backend contract. Object-safe so callers can hold a `Box<dyn OrderApi>`;
/// `Send + Sync` so a handle can cross thread boundaries.
pub trait OrderApi: Send + Sync {
    /// Fetch one filtered, paginated slice of orders plus bucket counts.
    fn fetch_orders(
        &self,
        identity: &AdminIdentity,
        query: &OrderQuery,
    ) -> Result<OrderPage, ApiError>;

    /// Record an approval. The server owns the transition; callers re-fetch
    /// rather than trusting an optimistic outcome.
    fn approve_order(
        &self,
        identity: &AdminIdentity,
        request: &DecisionRequest,
    ) -> Result<(), ApiError>;

    /// Record a rejection. Same shape as approval.
    fn reject_order(
        &self,
        identity: &AdminIdentity,
        request: &DecisionRequest,
    ) -> Result<(), ApiError>;

    /// Fetch a single order, for deep links not present in the current page.
    fn fetch_order(&self, identity: &AdminIdentity, order_id: &str) -> Result<Order, ApiError>;

    /// Investor lookup for detail aggregation.
    fn fetch_investor(
        &self,
        identity: &AdminIdentity,
        mobile: &str,
    ) -> Result<Investor, ApiError>;

    /// Active farms for the farm filter dropdown (collaborator boundary).
    fn list_active_farms(&self, identity: &AdminIdentity) -> Result<Vec<Farm>, ApiError>;
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use hv_schemas::CheckKind;

    #[test]
    fn query_params_omit_unset_filters() {
        let query = OrderQuery::from_filters(&QueryFilters::default());
        let params = query.to_params();
        assert_eq!(
            params,
            vec![("page", "1".to_string()), ("page_size", "10".to_string())]
        );
    }

    #[test]
    fn query_params_carry_every_set_filter() {
        let filters = QueryFilters {
            search: "  ravi  ".to_string(),
            status: Some(PaymentStatus::PendingAdminVerification),
            payment_type: Some(PaymentType::BankTransfer),
            transfer_mode: Some(TransferMode::Neft),
            farm_id: Some("farm-3".to_string()),
            page: 2,
            page_size: 25,
        };
        let params = OrderQuery::from_filters(&filters).to_params();
        assert!(params.contains(&("paymentStatus", "PENDING_ADMIN_VERIFICATION".to_string())));
        assert!(params.contains(&("paymentType", "BANK_TRANSFER".to_string())));
        assert!(params.contains(&("transferMode", "NEFT".to_string())));
        assert!(params.contains(&("search", "ravi".to_string())));
        assert!(params.contains(&("farmId", "farm-3".to_string())));
        assert!(params.contains(&("page", "2".to_string())));
    }

    #[test]
    fn blank_search_is_omitted() {
        let filters = QueryFilters {
            search: "   ".to_string(),
            ..QueryFilters::default()
        };
        let params = OrderQuery::from_filters(&filters).to_params();
        assert!(params.iter().all(|(k, _)| *k != "search"));
    }

    #[test]
    fn decision_body_contains_only_set_checks() {
        let checks = ApprovalChecks::none()
            .with(CheckKind::UnitsChecked, true)
            .with(CheckKind::PaymentProof, true)
            .with(CheckKind::PaymentReceived, false);
        let req = DecisionRequest::new("ord-9", checks, "amount mismatch");
        let body = serde_json::to_value(&req).unwrap();
        let obj = body.as_object().unwrap();
        assert_eq!(obj["orderId"], "ord-9");
        assert_eq!(obj["comments"], "amount mismatch");
        assert_eq!(obj["unitsChecked"], true);
        assert_eq!(obj["paymentProof"], true);
        assert_eq!(obj["paymentReceived"], false);
        assert!(
            !obj.contains_key("coinsChecked"),
            "unset check must be absent, not false"
        );
    }

    #[test]
    fn decision_body_omits_blank_remarks() {
        let req = DecisionRequest::new("ord-9", ApprovalChecks::none(), "   ");
        let body = serde_json::to_value(&req).unwrap();
        let obj = body.as_object().unwrap();
        assert_eq!(obj.len(), 1, "only orderId expected, got {obj:?}");
    }

    #[test]
    fn api_error_display() {
        assert_eq!(
            ApiError::Transport("connection refused".to_string()).to_string(),
            "transport error: connection refused"
        );
        assert_eq!(
            ApiError::Api {
                code: Some(503),
                message: "unavailable".to_string()
            }
            .to_string(),
            "api error code=503: unavailable"
        );
        assert_eq!(
            ApiError::Api {
                code: None,
                message: "rejected".to_string()
            }
            .to_string(),
            "api error: rejected"
        );
        assert_eq!(
            ApiError::Decode("bad json".to_string()).to_string(),
            "decode error: bad json"
        );
    }
}
