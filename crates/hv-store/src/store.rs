//! List-view state container and fetch bracketing.

use hv_schemas::{
    Order, OrderPage, PaymentStatus, PaymentType, QueryFilters, StatusCounts, TransferMode,
};

// ---------------------------------------------------------------------------
// FilterOutcome
// ---------------------------------------------------------------------------

/// What a filter mutation implies for fetching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOutcome {
    /// The filter changed; issue a fetch immediately.
    FetchNow,
    /// Free-text search changed; fetch only after the debounce window.
    Debounced,
    /// The value was already set; nothing to do.
    Unchanged,
}

// ---------------------------------------------------------------------------
// FetchTicket
// ---------------------------------------------------------------------------

/// Proof that a fetch was issued through [`OrderStore::begin_fetch`].
///
/// The `_priv` field keeps construction inside this crate, so a caller
/// cannot forge a sequence number or replay a stale ticket as fresh.
#[derive(Debug)]
pub struct FetchTicket {
    seq: u64,
    pub(crate) _priv: (),
}

impl FetchTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

// ---------------------------------------------------------------------------
// OrderStore
// ---------------------------------------------------------------------------

/// Query-store state. Data fields are readable directly; all mutation goes
/// through the methods so the page-reset and last-issued-wins rules hold.
#[derive(Debug, Default)]
pub struct OrderStore {
    pub items: Vec<Order>,
    pub loading: bool,
    pub error: Option<String>,
    /// Rows matching the active filters, as last reported.
    pub total_count: u64,
    /// All orders in the system regardless of filters.
    pub total_all_orders: u64,
    pub counts: StatusCounts,
    filters: QueryFilters,
    issued_seq: u64,
}

impl OrderStore {
    pub fn new(filters: QueryFilters) -> Self {
        Self {
            filters,
            ..Self::default()
        }
    }

    pub fn filters(&self) -> &QueryFilters {
        &self.filters
    }

    // -- filter reducer ------------------------------------------------------

    pub fn set_status(&mut self, status: Option<PaymentStatus>) -> FilterOutcome {
        if self.filters.status == status {
            return FilterOutcome::Unchanged;
        }
        self.filters.status = status;
        self.filters.page = 1;
        FilterOutcome::FetchNow
    }

    pub fn set_payment_type(&mut self, payment_type: Option<PaymentType>) -> FilterOutcome {
        if self.filters.payment_type == payment_type {
            return FilterOutcome::Unchanged;
        }
        self.filters.payment_type = payment_type;
        self.filters.page = 1;
        FilterOutcome::FetchNow
    }

    pub fn set_transfer_mode(&mut self, transfer_mode: Option<TransferMode>) -> FilterOutcome {
        if self.filters.transfer_mode == transfer_mode {
            return FilterOutcome::Unchanged;
        }
        self.filters.transfer_mode = transfer_mode;
        self.filters.page = 1;
        FilterOutcome::FetchNow
    }

    pub fn set_farm(&mut self, farm_id: Option<String>) -> FilterOutcome {
        if self.filters.farm_id == farm_id {
            return FilterOutcome::Unchanged;
        }
        self.filters.farm_id = farm_id;
        self.filters.page = 1;
        FilterOutcome::FetchNow
    }

    /// Free-text search. Still resets the page (a new search starts at the
    /// top) but the fetch itself is debounced by the caller.
    pub fn set_search(&mut self, search: impl Into<String>) -> FilterOutcome {
        let search = search.into();
        if self.filters.search == search {
            return FilterOutcome::Unchanged;
        }
        self.filters.search = search;
        self.filters.page = 1;
        FilterOutcome::Debounced
    }

    /// The one mutation that leaves every other filter untouched.
    pub fn set_page(&mut self, page: u32) -> FilterOutcome {
        let page = page.max(1);
        if self.filters.page == page {
            return FilterOutcome::Unchanged;
        }
        self.filters.page = page;
        FilterOutcome::FetchNow
    }

    pub fn set_page_size(&mut self, page_size: u32) -> FilterOutcome {
        let page_size = page_size.max(1);
        if self.filters.page_size == page_size {
            return FilterOutcome::Unchanged;
        }
        self.filters.page_size = page_size;
        self.filters.page = 1;
        FilterOutcome::FetchNow
    }

    // -- fetch lifecycle -----------------------------------------------------

    /// Bracket a fetch. The returned ticket must accompany the response.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued_seq += 1;
        self.loading = true;
        FetchTicket {
            seq: self.issued_seq,
            _priv: (),
        }
    }

    fn is_latest(&self, ticket: &FetchTicket) -> bool {
        ticket.seq == self.issued_seq
    }

    /// Apply a successful page. Returns `false` (and changes nothing) when a
    /// newer fetch has been issued since this ticket.
    pub fn apply_success(&mut self, ticket: &FetchTicket, page: OrderPage) -> bool {
        if !self.is_latest(ticket) {
            tracing::debug!(
                stale_seq = ticket.seq,
                latest_seq = self.issued_seq,
                "discarding stale fetch response"
            );
            return false;
        }
        self.loading = false;
        self.error = None;
        self.items = page.orders;
        if let Some(total) = page.total_filtered {
            self.total_count = total;
        } else {
            self.total_count = self.items.len() as u64;
        }
        if let Some(total) = page.total_all_orders {
            self.total_all_orders = total;
        }
        // Absent buckets keep their previous values.
        self.counts.absorb(&page.counts);
        true
    }

    /// Record a fetch failure. Previous items stay visible; stale data with
    /// an error beats a blank screen.
    pub fn apply_failure(&mut self, ticket: &FetchTicket, message: impl Into<String>) -> bool {
        if !self.is_latest(ticket) {
            tracing::debug!(
                stale_seq = ticket.seq,
                latest_seq = self.issued_seq,
                "discarding stale fetch failure"
            );
            return false;
        }
        self.loading = false;
        self.error = Some(message.into());
        true
    }

    /// Find an already-fetched order by id.
    pub fn order(&self, order_id: &str) -> Option<&Order> {
        self.items.iter().find(|o| o.id == order_id)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use hv_schemas::BucketCounts;

    fn order(id: &str) -> Order {
        Order {
            id: id.to_string(),
            farm_id: "farm-1".to_string(),
            farm_location: None,
            placed_at: Utc.with_ymd_and_hms(2026, 5, 4, 10, 0, 0).unwrap(),
            unit_count: 1,
            buffalo_count: 1,
            calf_count: 0,
            unit_cost: 7_500_000,
            total_cost: 7_500_000,
            coins_redeemed: 0,
            payment_status: PaymentStatus::PendingAdminVerification,
            rejected_reason: None,
            transaction: None,
            investor: None,
            investor_mobile: None,
            history: vec![],
        }
    }

    fn page(ids: &[&str]) -> OrderPage {
        OrderPage {
            orders: ids.iter().map(|id| order(id)).collect(),
            total_filtered: Some(ids.len() as u64),
            total_all_orders: Some(100),
            counts: BucketCounts::default(),
        }
    }

    fn store_on_page_three() -> OrderStore {
        let mut store = OrderStore::new(QueryFilters::default());
        store.set_page(3);
        store
    }

    // -- page reset ----------------------------------------------------------

    #[test]
    fn status_change_resets_page() {
        let mut store = store_on_page_three();
        assert_eq!(
            store.set_status(Some(PaymentStatus::Paid)),
            FilterOutcome::FetchNow
        );
        assert_eq!(store.filters().page, 1);
    }

    #[test]
    fn payment_type_change_resets_page() {
        let mut store = store_on_page_three();
        store.set_payment_type(Some(PaymentType::Cheque));
        assert_eq!(store.filters().page, 1);
    }

    #[test]
    fn farm_change_resets_page() {
        let mut store = store_on_page_three();
        store.set_farm(Some("farm-9".to_string()));
        assert_eq!(store.filters().page, 1);
    }

    #[test]
    fn search_change_resets_page_but_debounces_fetch() {
        let mut store = store_on_page_three();
        assert_eq!(store.set_search("ravi"), FilterOutcome::Debounced);
        assert_eq!(store.filters().page, 1);
    }

    #[test]
    fn set_page_touches_only_the_page() {
        let mut store = OrderStore::new(QueryFilters::default());
        store.set_status(Some(PaymentStatus::Paid));
        store.set_page(5);
        assert_eq!(store.filters().page, 5);
        assert_eq!(store.filters().status, Some(PaymentStatus::Paid));
    }

    #[test]
    fn unchanged_values_do_not_fetch() {
        let mut store = OrderStore::new(QueryFilters::default());
        assert_eq!(store.set_status(None), FilterOutcome::Unchanged);
        store.set_search("ravi");
        assert_eq!(store.set_search("ravi"), FilterOutcome::Unchanged);
    }

    #[test]
    fn page_size_change_resets_page() {
        let mut store = store_on_page_three();
        assert_eq!(store.set_page_size(25), FilterOutcome::FetchNow);
        assert_eq!(store.filters().page, 1);
        assert_eq!(store.filters().page_size, 25);
    }

    #[test]
    fn page_is_clamped_to_one() {
        let mut store = OrderStore::new(QueryFilters::default());
        store.set_page(0);
        assert_eq!(store.filters().page, 1);
    }

    // -- fetch lifecycle -----------------------------------------------------

    #[test]
    fn successful_fetch_replaces_items() {
        let mut store = OrderStore::new(QueryFilters::default());
        let t = store.begin_fetch();
        assert!(store.loading);
        assert!(store.apply_success(&t, page(&["a", "b"])));
        assert!(!store.loading);
        assert_eq!(store.items.len(), 2);
        assert_eq!(store.total_count, 2);
        assert_eq!(store.total_all_orders, 100);
        assert!(store.error.is_none());
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut store = OrderStore::new(QueryFilters::default());
        let stale = store.begin_fetch();
        let fresh = store.begin_fetch();

        // Fresh response lands first; the stale one must not clobber it.
        assert!(store.apply_success(&fresh, page(&["new"])));
        assert!(!store.apply_success(&stale, page(&["old"])));
        assert_eq!(store.items[0].id, "new");
    }

    #[test]
    fn stale_failure_is_discarded() {
        let mut store = OrderStore::new(QueryFilters::default());
        let stale = store.begin_fetch();
        let fresh = store.begin_fetch();
        assert!(store.apply_success(&fresh, page(&["a"])));
        assert!(!store.apply_failure(&stale, "timeout"));
        assert!(store.error.is_none());
    }

    #[test]
    fn failure_keeps_previous_items() {
        let mut store = OrderStore::new(QueryFilters::default());
        let t = store.begin_fetch();
        store.apply_success(&t, page(&["a"]));

        let t = store.begin_fetch();
        assert!(store.apply_failure(&t, "connection refused"));
        assert_eq!(store.items.len(), 1, "stale-but-visible beats blank");
        assert_eq!(store.error.as_deref(), Some("connection refused"));
        assert!(!store.loading);
    }

    #[test]
    fn success_clears_a_previous_error() {
        let mut store = OrderStore::new(QueryFilters::default());
        let t = store.begin_fetch();
        store.apply_failure(&t, "boom");
        let t = store.begin_fetch();
        store.apply_success(&t, page(&["a"]));
        assert!(store.error.is_none());
    }

    #[test]
    fn counts_survive_responses_without_count_fields() {
        let mut store = OrderStore::new(QueryFilters::default());

        let t = store.begin_fetch();
        let mut first = page(&["a"]);
        first.counts.paid = Some(5);
        store.apply_success(&t, first);
        assert_eq!(store.counts.paid, 5);

        // Next response carries no paid count at all.
        let t = store.begin_fetch();
        store.apply_success(&t, page(&["b"]));
        assert_eq!(store.counts.paid, 5, "absent count must not zero the badge");
    }

    #[test]
    fn missing_total_falls_back_to_page_length() {
        let mut store = OrderStore::new(QueryFilters::default());
        let t = store.begin_fetch();
        let mut p = page(&["a", "b", "c"]);
        p.total_filtered = None;
        store.apply_success(&t, p);
        assert_eq!(store.total_count, 3);
    }

    #[test]
    fn order_lookup_by_id() {
        let mut store = OrderStore::new(QueryFilters::default());
        let t = store.begin_fetch();
        store.apply_success(&t, page(&["a", "b"]));
        assert!(store.order("b").is_some());
        assert!(store.order("zzz").is_none());
    }
}
