//! hv-store
//!
//! The order query store: the single writer for list-view state. Holds the
//! active filters, the last fetched page, and the server-reported
//! status-bucket counts.
//!
//! Two rules are enforced here and nowhere else:
//!
//! 1. **Page reset.** Every filter mutation except `set_page` resets the page
//!    to 1.
//! 2. **Last-issued wins.** Fetches are bracketed by a [`FetchTicket`] with a
//!    monotonic sequence number; a response whose ticket is not the most
//!    recently issued is discarded, so a slow stale response can never
//!    overwrite a newer one regardless of completion order.
//!
//! The store performs no I/O. Filter persistence goes through the
//! constructor-injected [`FilterStore`] port owned by the caller.

mod persist;
mod store;

pub use persist::{FilterStore, InMemoryFilterStore, JsonFileFilterStore, PersistedView};
pub use store::{FetchTicket, FilterOutcome, OrderStore};
