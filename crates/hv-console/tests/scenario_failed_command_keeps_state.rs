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

fn console() -> OrderConsole<StubOrderApi, InMemoryFilterStore> {
    let api = StubOrderApi::with_orders(vec![order("ord-1").build()]);
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
fn scenario_failed_decision_leaves_order_untouched() {
    let mut console = console();
    console.api().fail_next_decision("ledger write failed");

    let err = console.approve("ord-1", all_true(), "").unwrap_err();
    assert!(matches!(err, CommandError::Api(_)));

    // No optimistic flip: both the displayed row and the server snapshot
    // still sit at the first stage.
    assert_eq!(
        console.store().order("ord-1").unwrap().payment_status,
        PaymentStatus::PendingAdminVerification
    );
    let snapshot = console.api().order_snapshot("ord-1").unwrap();
    assert_eq!(
        snapshot.payment_status,
        PaymentStatus::PendingAdminVerification
    );
    assert!(snapshot.history.is_empty());

    // A retry is permitted: the single-flight lock was released on failure.
    console.approve("ord-1", all_true(), "").unwrap();
    assert_eq!(
        console.store().order("ord-1").unwrap().payment_status,
        PaymentStatus::PendingSuperAdminVerification
    );
}

#[test]
fn scenario_failed_refresh_after_success_keeps_stale_rows_with_error() {
    let mut console = console();

    // The decision will succeed but the follow-up list refresh will fail.
    console.api().fail_next_fetch("gateway timeout");

    console.approve("ord-1", all_true(), "").unwrap();

    // Stale-but-visible: the old row is still shown, with a visible error.
    assert_eq!(console.store().items.len(), 1);
    assert_eq!(
        console.store().order("ord-1").unwrap().payment_status,
        PaymentStatus::PendingAdminVerification,
        "stale row until a refresh succeeds"
    );
    assert!(console.store().error.is_some());

    // The server did commit; the next successful refresh shows it.
    console.refresh();
    assert!(console.store().error.is_none());
    assert_eq!(
        console.store().order("ord-1").unwrap().payment_status,
        PaymentStatus::PendingSuperAdminVerification
    );
}
