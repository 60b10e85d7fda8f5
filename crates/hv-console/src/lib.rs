//! hv-console
//!
//! The operator session: composes the query store, the rule engine and the
//! API gateway into the approve/reject command executor and the order detail
//! presenter.
//!
//! Execution model is single-writer and event-driven: every mutation flows
//! through [`OrderConsole`] in response to a discrete user action or a timer
//! tick. There are no background workers; debounce deadlines are checked by
//! the caller pumping [`OrderConsole::poll_search`] with an injected clock.

mod console;
mod debounce;
mod presenter;
mod single_flight;

pub use console::{CommandError, ConsoleOptions, OrderConsole};
pub use debounce::SearchDebounce;
pub use presenter::OrderDetail;
pub use single_flight::{AlreadyInFlight, SingleFlight};
