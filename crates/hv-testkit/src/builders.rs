//! Builders with minimal boilerplate for scenario tests.

use chrono::{TimeZone, Utc};

use hv_schemas::{
    AdminIdentity, ApprovalChecks, ApprovalHistoryEntry, DecisionAction, Investor, Order,
    PaymentStatus, PaymentType, Role, RoleSet, Transaction,
};

pub fn admin_identity() -> AdminIdentity {
    AdminIdentity::new("9876500000", "Asha", RoleSet::admin())
}

pub fn super_admin_identity() -> AdminIdentity {
    AdminIdentity::new("9876511111", "Vikram", RoleSet::super_admin())
}

/// Start building an order in `PENDING_ADMIN_VERIFICATION` paid by bank
/// transfer, the most common scenario shape.
pub fn order(id: &str) -> OrderBuilder {
    OrderBuilder::new(id)
}

pub struct OrderBuilder {
    order: Order,
}

impl OrderBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            order: Order {
                id: id.to_string(),
                farm_id: "farm-1".to_string(),
                farm_location: Some("Hisar".to_string()),
                placed_at: Utc.with_ymd_and_hms(2026, 5, 4, 10, 0, 0).unwrap(),
                unit_count: 2,
                buffalo_count: 2,
                calf_count: 0,
                unit_cost: 7_500_000,
                total_cost: 15_000_000,
                coins_redeemed: 0,
                payment_status: PaymentStatus::PendingAdminVerification,
                rejected_reason: None,
                transaction: Some(Transaction {
                    payment_type: PaymentType::BankTransfer,
                    transfer_mode: None,
                    amount: 15_000_000,
                    front_image: None,
                    back_image: None,
                    cheque_image: None,
                    screenshot: Some("proof-1.jpg".to_string()),
                    utr: Some("UTR0001".to_string()),
                    cheque_number: None,
                    cashier_name: None,
                    transacted_at: None,
                }),
                investor: None,
                investor_mobile: Some("9000011111".to_string()),
                history: vec![],
            },
        }
    }

    pub fn status(mut self, status: PaymentStatus) -> Self {
        self.order.payment_status = status;
        self
    }

    pub fn farm(mut self, farm_id: &str) -> Self {
        self.order.farm_id = farm_id.to_string();
        self
    }

    pub fn payment_type(mut self, payment_type: PaymentType) -> Self {
        match &mut self.order.transaction {
            Some(t) => t.payment_type = payment_type,
            None => {
                self.order.transaction = Some(Transaction {
                    payment_type,
                    transfer_mode: None,
                    amount: self.order.total_cost,
                    front_image: None,
                    back_image: None,
                    cheque_image: None,
                    screenshot: None,
                    utr: None,
                    cheque_number: None,
                    cashier_name: None,
                    transacted_at: None,
                });
            }
        }
        self
    }

    /// Pure coins-redemption order: drops the transaction sub-object the way
    /// the backend does for coin settlements.
    pub fn coins_only(mut self, coins_redeemed: i64) -> Self {
        self.order.transaction = None;
        self.order.coins_redeemed = coins_redeemed;
        self.order.total_cost = 0;
        self
    }

    pub fn coins_redeemed(mut self, coins_redeemed: i64) -> Self {
        self.order.coins_redeemed = coins_redeemed;
        self
    }

    pub fn investor(mut self, name: &str, mobile: &str) -> Self {
        self.order.investor = Some(Investor {
            name: name.to_string(),
            mobile: mobile.to_string(),
            kyc_verified: true,
            documents: vec![],
        });
        self.order.investor_mobile = Some(mobile.to_string());
        self
    }

    pub fn investor_mobile(mut self, mobile: Option<&str>) -> Self {
        self.order.investor_mobile = mobile.map(str::to_string);
        self
    }

    pub fn history_entry(
        mut self,
        action: DecisionAction,
        role: Role,
        checks: ApprovalChecks,
        comments: &str,
    ) -> Self {
        let at = Utc
            .with_ymd_and_hms(2026, 5, 5, 9, 0, 0)
            .unwrap()
            + chrono::Duration::minutes(self.order.history.len() as i64);
        self.order.history.push(ApprovalHistoryEntry {
            action,
            role,
            actor_name: "Asha".to_string(),
            actor_mobile: "9876500000".to_string(),
            at,
            comments: comments.to_string(),
            checks,
        });
        self
    }

    pub fn build(self) -> Order {
        self.order
    }
}
