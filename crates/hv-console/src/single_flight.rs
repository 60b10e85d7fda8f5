//! Per-order command lock.
//!
//! At most one approve/reject may be in flight per order id; a duplicate
//! submission is suppressed at this boundary. Commands for distinct orders
//! are independent. The server is NOT assumed idempotent; this guard is the
//! only thing standing between a double-click and a double submission.

use std::collections::HashSet;
use std::fmt;

/// Returned when the order already has a command in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlreadyInFlight {
    pub order_id: String,
}

impl fmt::Display for AlreadyInFlight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a command is already in flight for order {}", self.order_id)
    }
}

impl std::error::Error for AlreadyInFlight {}

/// Set of order ids with a command currently in flight.
#[derive(Debug, Default)]
pub struct SingleFlight {
    in_flight: HashSet<String>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the lock for an order. Fails if already held.
    pub fn acquire(&mut self, order_id: &str) -> Result<(), AlreadyInFlight> {
        if !self.in_flight.insert(order_id.to_string()) {
            return Err(AlreadyInFlight {
                order_id: order_id.to_string(),
            });
        }
        Ok(())
    }

    /// Release the lock. Releasing an unheld lock is a no-op.
    pub fn release(&mut self, order_id: &str) {
        self.in_flight.remove(order_id);
    }

    pub fn is_held(&self, order_id: &str) -> bool {
        self.in_flight.contains(order_id)
    }
}
