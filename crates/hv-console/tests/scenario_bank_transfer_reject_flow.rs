use hv_console::{CommandError, ConsoleOptions, OrderConsole};
use hv_schemas::{ApprovalChecks, CheckKind, PaymentStatus};
use hv_store::InMemoryFilterStore;
use hv_testkit::{admin_identity, order, StubOrderApi};

fn console_with_bank_order() -> OrderConsole<StubOrderApi, InMemoryFilterStore> {
    let api = StubOrderApi::with_orders(vec![order("ord-77").build()]);
    let mut console = OrderConsole::new(
        api,
        InMemoryFilterStore::new(),
        admin_identity(),
        ConsoleOptions::default(),
    );
    console.refresh();
    console
}

#[test]
fn scenario_amount_mismatch_reject_sends_exact_payload_and_terminates_order() {
    // GIVEN a BANK_TRANSFER order with no coins, checks set to
    // units=true, proof=true, received=false, remarks "amount mismatch"
    let mut console = console_with_bank_order();
    let checks = ApprovalChecks::none()
        .with(CheckKind::UnitsChecked, true)
        .with(CheckKind::PaymentProof, true)
        .with(CheckKind::PaymentReceived, false);

    // approve must be disabled, reject enabled
    let gate = console
        .gate_for("ord-77", &checks, "amount mismatch")
        .unwrap();
    assert!(!gate.approve.is_allowed());
    assert!(gate.reject.is_allowed());

    console.reject("ord-77", checks, "amount mismatch").unwrap();

    // THEN the payload carried exactly the three set checks, no coinsChecked
    let decisions = console.api().decisions();
    assert_eq!(decisions.len(), 1);
    let body = decisions[0].body.as_object().unwrap();
    assert_eq!(body["orderId"], "ord-77");
    assert_eq!(body["comments"], "amount mismatch");
    assert_eq!(body["unitsChecked"], true);
    assert_eq!(body["paymentProof"], true);
    assert_eq!(body["paymentReceived"], false);
    assert!(!body.contains_key("coinsChecked"));

    // AND the refreshed list reflects the terminal status
    let listed = console.store().order("ord-77").unwrap();
    assert_eq!(listed.payment_status, PaymentStatus::Rejected);
    assert_eq!(listed.rejected_reason.as_deref(), Some("amount mismatch"));
}

#[test]
fn scenario_all_checks_true_enables_approve_and_blocks_reject() {
    let mut console = console_with_bank_order();
    let checks = ApprovalChecks::none()
        .with(CheckKind::UnitsChecked, true)
        .with(CheckKind::PaymentProof, true)
        .with(CheckKind::PaymentReceived, true);

    let gate = console.gate_for("ord-77", &checks, "").unwrap();
    assert!(gate.approve.is_allowed());
    assert!(!gate.reject.is_allowed());

    console.approve("ord-77", checks, "").unwrap();
    assert_eq!(
        console.store().order("ord-77").unwrap().payment_status,
        PaymentStatus::PendingSuperAdminVerification
    );

    // Rejecting now would need a failed check; the gate refuses client-side.
    let err = console
        .reject("ord-77", ApprovalChecks::none(), "because")
        .unwrap_err();
    assert!(matches!(err, CommandError::Refused(_)));
    assert_eq!(console.api().decisions().len(), 1);
}
