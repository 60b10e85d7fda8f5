//! Read-only detail aggregation for a single order.

use hv_approval::derive_status;
use hv_schemas::{ApprovalHistoryEntry, Investor, Order, PaymentStatus, PaymentType};

/// Display-ready aggregation of order + transaction + investor + history.
///
/// Missing sub-objects are represented as `None` and rendered as
/// placeholders; a partially loaded order never fails the detail view.
#[derive(Debug, Clone)]
pub struct OrderDetail {
    pub order: Order,
    /// Status per the owned derivation, not the raw `payment_status` field.
    pub derived_status: PaymentStatus,
    pub investor: Option<Investor>,
}

const PLACEHOLDER: &str = "—";

impl OrderDetail {
    pub(crate) fn assemble(order: Order, investor: Option<Investor>) -> Self {
        let derived_status = derive_status(&order);
        Self {
            order,
            derived_status,
            investor,
        }
    }

    /// History oldest first, exactly as recorded.
    pub fn history(&self) -> &[ApprovalHistoryEntry] {
        &self.order.history
    }

    pub fn investor_label(&self) -> String {
        match &self.investor {
            Some(investor) => format!("{} ({})", investor.name, investor.mobile),
            None => PLACEHOLDER.to_string(),
        }
    }

    pub fn payment_label(&self) -> String {
        match &self.order.transaction {
            Some(t) => {
                let mut label = format!("{} {}", t.payment_type, fmt_inr(t.amount));
                if let Some(mode) = &t.transfer_mode {
                    label.push_str(&format!(" via {mode}"));
                }
                label
            }
            None if self.order.payment_type() == PaymentType::CoinsRedeem => {
                format!("COINS_REDEEM {} coins", self.order.coins_redeemed)
            }
            None => PLACEHOLDER.to_string(),
        }
    }

    /// The payment reference an operator verifies against: UTR, cheque
    /// number, or cashier, whichever the payment type carries.
    pub fn reference_label(&self) -> String {
        let Some(t) = &self.order.transaction else {
            return PLACEHOLDER.to_string();
        };
        t.utr
            .clone()
            .or_else(|| t.cheque_number.clone())
            .or_else(|| t.cashier_name.clone())
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    }
}

/// Integer paise to a display string.
fn fmt_inr(paise: i64) -> String {
    let sign = if paise < 0 { "-" } else { "" };
    let abs = paise.unsigned_abs();
    format!("{sign}₹{}.{:02}", abs / 100, abs % 100)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
