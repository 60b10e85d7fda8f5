//! Blocking HTTP implementation of [`OrderApi`].

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use serde_json::Value;

use hv_schemas::{AdminIdentity, Farm, Investor, Order, OrderPage};

use crate::api::{ApiError, DecisionRequest, OrderApi, OrderQuery};
use crate::wire::{detect_soft_error, normalize_order_list, OrderListResponse};

/// Header carrying the acting operator's mobile number, the backend's
/// operator key.
pub const ADMIN_MOBILE_HEADER: &str = "x-admin-mobile";

const ERROR_BODY_PREVIEW: usize = 300;

// ---------------------------------------------------------------------------
// HttpOrderApi
// ---------------------------------------------------------------------------

/// Order API over HTTP. One client, one base URL; every call carries the
/// operator identity header.
pub struct HttpOrderApi {
    client: Client,
    base_url: String,
}

impl HttpOrderApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = base_url.into();
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ApiError::Config("api base URL is empty".to_string()));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ApiError::Config(format!("http client: {err}")))?;
        Ok(Self {
            client,
            base_url: trimmed.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Shared response handling: non-2xx statuses and HTTP-200 error
    /// envelopes both land in [`ApiError::Api`].
    fn read_json(response: Response) -> Result<Value, ApiError> {
        let status = response.status();
        let text = response
            .text()
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        if !status.is_success() {
            return Err(ApiError::Api {
                code: Some(i64::from(status.as_u16())),
                message: preview(&text),
            });
        }
        let value: Value =
            serde_json::from_str(&text).map_err(|err| ApiError::Decode(err.to_string()))?;
        if let Some(message) = detect_soft_error(&value) {
            return Err(ApiError::Api {
                code: None,
                message,
            });
        }
        Ok(value)
    }

    fn post_decision(
        &self,
        path: &str,
        identity: &AdminIdentity,
        request: &DecisionRequest,
    ) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url(path))
            .header(ADMIN_MOBILE_HEADER, &identity.mobile)
            .json(request)
            .send()
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        Self::read_json(response)?;
        tracing::info!(order_id = %request.order_id, path, "decision recorded");
        Ok(())
    }
}

fn preview(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }
    let mut out: String = trimmed.chars().take(ERROR_BODY_PREVIEW).collect();
    if trimmed.chars().count() > ERROR_BODY_PREVIEW {
        out.push('…');
    }
    out
}

/// Farm listing arrives either wrapped or bare depending on deployment.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FarmListResponse {
    Wrapped { farms: Vec<Farm> },
    Bare(Vec<Farm>),
}

impl OrderApi for HttpOrderApi {
    fn fetch_orders(
        &self,
        identity: &AdminIdentity,
        query: &OrderQuery,
    ) -> Result<OrderPage, ApiError> {
        let response = self
            .client
            .get(self.url("pending-units"))
            .query(&query.to_params())
            .header(ADMIN_MOBILE_HEADER, &identity.mobile)
            .send()
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        let value = Self::read_json(response)?;
        let wire: OrderListResponse =
            serde_json::from_value(value).map_err(|err| ApiError::Decode(err.to_string()))?;
        let page = normalize_order_list(wire);
        tracing::debug!(
            orders = page.orders.len(),
            page = query.page,
            "order page fetched"
        );
        Ok(page)
    }

    fn approve_order(
        &self,
        identity: &AdminIdentity,
        request: &DecisionRequest,
    ) -> Result<(), ApiError> {
        self.post_decision("approve-unit", identity, request)
    }

    fn reject_order(
        &self,
        identity: &AdminIdentity,
        request: &DecisionRequest,
    ) -> Result<(), ApiError> {
        self.post_decision("reject-unit", identity, request)
    }

    fn fetch_order(&self, identity: &AdminIdentity, order_id: &str) -> Result<Order, ApiError> {
        let response = self
            .client
            .get(self.url(&format!("pending-units/{order_id}")))
            .header(ADMIN_MOBILE_HEADER, &identity.mobile)
            .send()
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        let value = Self::read_json(response)?;
        serde_json::from_value(value).map_err(|err| ApiError::Decode(err.to_string()))
    }

    fn fetch_investor(
        &self,
        identity: &AdminIdentity,
        mobile: &str,
    ) -> Result<Investor, ApiError> {
        let response = self
            .client
            .get(self.url(&format!("user/{mobile}")))
            .header(ADMIN_MOBILE_HEADER, &identity.mobile)
            .send()
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        let value = Self::read_json(response)?;
        serde_json::from_value(value).map_err(|err| ApiError::Decode(err.to_string()))
    }

    fn list_active_farms(&self, identity: &AdminIdentity) -> Result<Vec<Farm>, ApiError> {
        let response = self
            .client
            .get(self.url("farms"))
            .query(&[("status", "ACTIVE")])
            .header(ADMIN_MOBILE_HEADER, &identity.mobile)
            .send()
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        let value = Self::read_json(response)?;
        let wire: FarmListResponse =
            serde_json::from_value(value).map_err(|err| ApiError::Decode(err.to_string()))?;
        Ok(match wire {
            FarmListResponse::Wrapped { farms } => farms,
            FarmListResponse::Bare(farms) => farms,
        })
    }
}

// ---------------------------------------------------------------------------
// Unit tests (httpmock)
// ---------------------------------------------------------------------------
