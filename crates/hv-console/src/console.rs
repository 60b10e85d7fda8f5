//! The operator console: single choke-point for every list mutation and
//! every approve/reject command.
//!
//! Ordering inside a command is the contract:
//!
//! 1. gate evaluation (a refused action never reaches the API),
//! 2. single-flight lock per order id,
//! 3. the API call, with **no** optimistic status flip,
//! 4. on success, a list refresh using the filters active at call time.
//!
//! A refresh failure after a successful decision leaves stale rows plus a
//! visible store error; the decision itself still reports success because
//! the server committed the transition.

use std::fmt;
use std::time::{Duration, Instant};

use hv_approval::{evaluate_gate, ActionGate, GateDecision, GateRefusal};
use hv_gateway::{ApiError, DecisionRequest, OrderApi, OrderQuery};
use hv_schemas::{
    AdminIdentity, ApprovalChecks, DecisionAction, Farm, Order, PaymentStatus, PaymentType,
    QueryFilters, TransferMode, DEFAULT_PAGE_SIZE,
};
use hv_store::{FilterOutcome, FilterStore, OrderStore, PersistedView};

use crate::debounce::SearchDebounce;
use crate::presenter::OrderDetail;
use crate::single_flight::SingleFlight;

// ---------------------------------------------------------------------------
// ConsoleOptions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ConsoleOptions {
    pub page_size: u32,
    pub search_debounce: Duration,
}

impl Default for ConsoleOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce: Duration::from_millis(400),
        }
    }
}

// ---------------------------------------------------------------------------
// CommandError
// ---------------------------------------------------------------------------

/// Why an approve/reject command did not take effect.
#[derive(Debug)]
pub enum CommandError {
    /// The gate refused the action; nothing was sent to the server.
    Refused(GateRefusal),
    /// A command for this order is already in flight.
    InFlight { order_id: String },
    /// The API call failed; local state is unchanged.
    Api(ApiError),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Refused(refusal) => write!(f, "{refusal}"),
            CommandError::InFlight { order_id } => {
                write!(f, "a command is already in flight for order {order_id}")
            }
            CommandError::Api(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommandError::Refused(refusal) => Some(refusal),
            CommandError::Api(err) => Some(err),
            CommandError::InFlight { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// OrderConsole
// ---------------------------------------------------------------------------

/// One operator session over the order list.
pub struct OrderConsole<A: OrderApi, F: FilterStore> {
    api: A,
    view_store: F,
    identity: AdminIdentity,
    store: OrderStore,
    locks: SingleFlight,
    debounce: SearchDebounce,
    expanded: Option<String>,
}

impl<A: OrderApi, F: FilterStore> OrderConsole<A, F> {
    /// Restore the persisted view (filters + expanded row) and build the
    /// session. The persisted view is a convenience cache; load failures
    /// degrade to defaults.
    pub fn new(api: A, view_store: F, identity: AdminIdentity, options: ConsoleOptions) -> Self {
        let persisted = match view_store.load() {
            Ok(view) => view,
            Err(err) => {
                tracing::warn!(%err, "failed to load persisted view, starting fresh");
                None
            }
        };
        let (filters, expanded) = match persisted {
            Some(view) => (
                view.filters.unwrap_or_else(|| QueryFilters {
                    page_size: options.page_size,
                    ..QueryFilters::default()
                }),
                view.expanded_order_id,
            ),
            None => (
                QueryFilters {
                    page_size: options.page_size,
                    ..QueryFilters::default()
                },
                None,
            ),
        };

        Self {
            api,
            view_store,
            identity,
            store: OrderStore::new(filters),
            locks: SingleFlight::new(),
            debounce: SearchDebounce::new(options.search_debounce),
            expanded,
        }
    }

    pub fn store(&self) -> &OrderStore {
        &self.store
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn identity(&self) -> &AdminIdentity {
        &self.identity
    }

    pub fn expanded(&self) -> Option<&str> {
        self.expanded.as_deref()
    }

    fn save_view(&self) {
        let view = PersistedView {
            filters: Some(self.store.filters().clone()),
            expanded_order_id: self.expanded.clone(),
        };
        if let Err(err) = self.view_store.save(&view) {
            // The cache is not the source of truth; losing it is survivable.
            tracing::warn!(%err, "failed to persist view");
        }
    }

    // -- fetching ------------------------------------------------------------

    /// Fetch with the currently active filters and apply under a ticket.
    pub fn refresh(&mut self) {
        let query = OrderQuery::from_filters(self.store.filters());
        let ticket = self.store.begin_fetch();
        match self.api.fetch_orders(&self.identity, &query) {
            Ok(page) => {
                self.store.apply_success(&ticket, page);
            }
            Err(err) => {
                tracing::warn!(%err, "order fetch failed");
                self.store.apply_failure(&ticket, err.to_string());
            }
        }
    }

    fn after_filter_change(&mut self, outcome: FilterOutcome, now: Instant) {
        match outcome {
            FilterOutcome::FetchNow => {
                // Any pending search fetch is covered by this one.
                self.debounce.cancel();
                self.save_view();
                self.refresh();
            }
            FilterOutcome::Debounced => {
                self.debounce.arm(now);
                self.save_view();
            }
            FilterOutcome::Unchanged => {}
        }
    }

    pub fn set_status(&mut self, status: Option<PaymentStatus>, now: Instant) {
        let outcome = self.store.set_status(status);
        self.after_filter_change(outcome, now);
    }

    pub fn set_payment_type(&mut self, payment_type: Option<PaymentType>, now: Instant) {
        let outcome = self.store.set_payment_type(payment_type);
        self.after_filter_change(outcome, now);
    }

    pub fn set_transfer_mode(&mut self, transfer_mode: Option<TransferMode>, now: Instant) {
        let outcome = self.store.set_transfer_mode(transfer_mode);
        self.after_filter_change(outcome, now);
    }

    pub fn set_farm(&mut self, farm_id: Option<String>, now: Instant) {
        let outcome = self.store.set_farm(farm_id);
        self.after_filter_change(outcome, now);
    }

    pub fn set_page(&mut self, page: u32, now: Instant) {
        let outcome = self.store.set_page(page);
        self.after_filter_change(outcome, now);
    }

    pub fn set_page_size(&mut self, page_size: u32, now: Instant) {
        let outcome = self.store.set_page_size(page_size);
        self.after_filter_change(outcome, now);
    }

    pub fn set_search(&mut self, search: impl Into<String>, now: Instant) {
        let outcome = self.store.set_search(search);
        self.after_filter_change(outcome, now);
    }

    /// Pump the debounce clock. Returns `true` when a search fetch fired.
    pub fn poll_search(&mut self, now: Instant) -> bool {
        if self.debounce.poll(now) {
            self.refresh();
            return true;
        }
        false
    }

    pub fn set_expanded(&mut self, order_id: Option<String>) {
        self.expanded = order_id;
        self.save_view();
    }

    /// Farms for the filter dropdown (collaborator boundary).
    pub fn farms(&self) -> Result<Vec<Farm>, ApiError> {
        self.api.list_active_farms(&self.identity)
    }

    // -- commands ------------------------------------------------------------

    /// Preview which actions the gate currently enables for an order.
    pub fn gate_for(
        &self,
        order_id: &str,
        checks: &ApprovalChecks,
        remarks: &str,
    ) -> Option<ActionGate> {
        self.store
            .order(order_id)
            .map(|order| evaluate_gate(order, self.identity.roles, checks, remarks))
    }

    pub fn approve(
        &mut self,
        order_id: &str,
        checks: ApprovalChecks,
        remarks: &str,
    ) -> Result<(), CommandError> {
        self.decide(order_id, checks, remarks, DecisionAction::Approve)
    }

    pub fn reject(
        &mut self,
        order_id: &str,
        checks: ApprovalChecks,
        remarks: &str,
    ) -> Result<(), CommandError> {
        self.decide(order_id, checks, remarks, DecisionAction::Reject)
    }

    fn locate_order(&self, order_id: &str) -> Result<Order, CommandError> {
        if let Some(order) = self.store.order(order_id) {
            return Ok(order.clone());
        }
        // Deep link: the order is not on the current page.
        self.api
            .fetch_order(&self.identity, order_id)
            .map_err(CommandError::Api)
    }

    fn decide(
        &mut self,
        order_id: &str,
        checks: ApprovalChecks,
        remarks: &str,
        action: DecisionAction,
    ) -> Result<(), CommandError> {
        let order = self.locate_order(order_id)?;

        let gate = evaluate_gate(&order, self.identity.roles, &checks, remarks);
        let decision = match action {
            DecisionAction::Approve => gate.approve,
            DecisionAction::Reject => gate.reject,
        };
        if let GateDecision::Refused(refusal) = decision {
            return Err(CommandError::Refused(refusal));
        }

        self.locks
            .acquire(order_id)
            .map_err(|err| CommandError::InFlight {
                order_id: err.order_id,
            })?;

        let request = DecisionRequest::new(order_id, checks, remarks);
        let result = match action {
            DecisionAction::Approve => self.api.approve_order(&self.identity, &request),
            DecisionAction::Reject => self.api.reject_order(&self.identity, &request),
        };
        self.locks.release(order_id);

        match result {
            Ok(()) => {
                tracing::info!(order_id, %action, "decision accepted");
                // Displayed status only changes once the server confirms and
                // the refreshed list reflects it.
                self.refresh();
                Ok(())
            }
            Err(err) => {
                tracing::warn!(order_id, %action, %err, "decision failed");
                Err(CommandError::Api(err))
            }
        }
    }

    // -- detail --------------------------------------------------------------

    /// Aggregate order + transaction + investor + history for display.
    /// Tolerates partial data: a failed investor lookup renders as a
    /// placeholder instead of failing the whole detail view.
    pub fn detail(&self, order_id: &str) -> Result<OrderDetail, CommandError> {
        let order = self.locate_order(order_id)?;

        let investor = match (&order.investor, &order.investor_mobile) {
            (Some(investor), _) => Some(investor.clone()),
            (None, Some(mobile)) => match self.api.fetch_investor(&self.identity, mobile) {
                Ok(investor) => Some(investor),
                Err(err) => {
                    tracing::warn!(order_id, %err, "investor lookup failed");
                    None
                }
            },
            (None, None) => None,
        };

        Ok(OrderDetail::assemble(order, investor))
    }

    // -- test hooks ----------------------------------------------------------

    /// Hold the single-flight lock for an order, simulating an in-flight
    /// command. Test-only by feature gate.
    #[cfg(feature = "testkit")]
    pub fn lock_order_for_test(&mut self, order_id: &str) {
        self.locks
            .acquire(order_id)
            .expect("lock already held in test");
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use hv_schemas::CheckKind;
    use hv_store::InMemoryFilterStore;
    use hv_testkit::{admin_identity, order, StubOrderApi};

    fn console_with(
        orders: Vec<Order>,
    ) -> OrderConsole<StubOrderApi, InMemoryFilterStore> {
        OrderConsole::new(
            StubOrderApi::with_orders(orders),
            InMemoryFilterStore::new(),
            admin_identity(),
            ConsoleOptions::default(),
        )
    }

    fn all_true() -> ApprovalChecks {
        ApprovalChecks::none()
            .with(CheckKind::UnitsChecked, true)
            .with(CheckKind::PaymentProof, true)
            .with(CheckKind::PaymentReceived, true)
    }

    #[test]
    fn refresh_populates_the_store() {
        let mut console = console_with(vec![order("ord-1").build()]);
        console.refresh();
        assert_eq!(console.store().items.len(), 1);
        assert!(console.store().error.is_none());
    }

    #[test]
    fn filter_change_fetches_and_resets_page() {
        let mut console = console_with(vec![order("ord-1").build()]);
        let now = Instant::now();
        console.set_page(3, now);
        console.set_status(Some(PaymentStatus::PendingAdminVerification), now);
        assert_eq!(console.store().filters().page, 1);
        assert_eq!(console.store().items.len(), 1);
    }

    #[test]
    fn search_does_not_fetch_until_polled_after_the_window() {
        let mut console = console_with(vec![order("ord-1").build()]);
        let start = Instant::now();
        console.set_search("ord", start);
        assert!(
            console.store().items.is_empty(),
            "no fetch before the debounce window"
        );
        assert!(!console.poll_search(start + Duration::from_millis(100)));
        assert!(console.poll_search(start + Duration::from_millis(400)));
        assert_eq!(console.store().items.len(), 1);
    }

    #[test]
    fn gate_refusal_never_reaches_the_api() {
        let mut console = console_with(vec![order("ord-1").build()]);
        console.refresh();

        let err = console
            .approve("ord-1", ApprovalChecks::none(), "")
            .unwrap_err();
        assert!(matches!(err, CommandError::Refused(_)));
        assert!(
            console.api().decisions().is_empty(),
            "a refused action must never reach the server"
        );
    }

    #[test]
    fn approve_refreshes_and_list_reflects_server_state() {
        let mut console = console_with(vec![order("ord-1").build()]);
        console.refresh();
        console.approve("ord-1", all_true(), "").unwrap();
        let listed = console.store().order("ord-1").unwrap();
        assert_eq!(
            listed.payment_status,
            PaymentStatus::PendingSuperAdminVerification
        );
        assert_eq!(listed.history.len(), 1);
    }

    #[test]
    fn detail_uses_embedded_investor_without_lookup() {
        let mut console =
            console_with(vec![order("ord-1").investor("Ravi", "9000011111").build()]);
        console.refresh();
        let detail = console.detail("ord-1").unwrap();
        assert_eq!(detail.investor.as_ref().unwrap().name, "Ravi");
    }

    #[test]
    fn detail_tolerates_missing_investor() {
        // investor_mobile points nowhere; the lookup fails and the detail
        // still renders with a placeholder.
        let mut console = console_with(vec![order("ord-1").build()]);
        console.refresh();
        let detail = console.detail("ord-1").unwrap();
        assert!(detail.investor.is_none());
        assert_eq!(detail.investor_label(), "—");
    }

    #[test]
    fn persisted_filters_are_restored() {
        let view_store = InMemoryFilterStore::new();
        view_store
            .save(&PersistedView {
                filters: Some(QueryFilters {
                    status: Some(PaymentStatus::Paid),
                    page: 7,
                    ..QueryFilters::default()
                }),
                expanded_order_id: Some("ord-9".to_string()),
            })
            .unwrap();

        let console = OrderConsole::new(
            StubOrderApi::new(),
            view_store,
            admin_identity(),
            ConsoleOptions::default(),
        );
        assert_eq!(console.store().filters().status, Some(PaymentStatus::Paid));
        assert_eq!(console.store().filters().page, 7);
        assert_eq!(console.expanded(), Some("ord-9"));
    }
}
