// Requires the `testkit` feature for OrderConsole::lock_order_for_test.

use hv_console::{CommandError, ConsoleOptions, OrderConsole};
use hv_schemas::{ApprovalChecks, CheckKind, PaymentStatus};
use hv_store::InMemoryFilterStore;
use hv_testkit::{admin_identity, order, StubOrderApi};

fn all_true() -> ApprovalChecks {
    ApprovalChecks::none()
        .with(CheckKind::UnitsChecked, true)
        .with(CheckKind::PaymentProof, true)
        .with(CheckKind::PaymentReceived, true)
}

#[test]
fn scenario_duplicate_submission_for_same_order_is_suppressed() {
    let api = StubOrderApi::with_orders(vec![
        order("ord-1").build(),
        order("ord-2").build(),
    ]);
    let mut console = OrderConsole::new(
        api,
        InMemoryFilterStore::new(),
        admin_identity(),
        ConsoleOptions::default(),
    );
    console.refresh();

    // Simulate a command already in flight for ord-1.
    console.lock_order_for_test("ord-1");

    let err = console.approve("ord-1", all_true(), "").unwrap_err();
    assert!(matches!(err, CommandError::InFlight { .. }));
    assert!(
        console.api().decisions().is_empty(),
        "suppressed client-side, never sent"
    );

    // Commands on other orders are unaffected.
    console.approve("ord-2", all_true(), "").unwrap();
    assert_eq!(
        console.store().order("ord-2").unwrap().payment_status,
        PaymentStatus::PendingSuperAdminVerification
    );
}
