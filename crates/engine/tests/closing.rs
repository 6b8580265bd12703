mod common;

use common::{closing_row, date, engine, open_shift_row, seeded};
use engine::{
    ClosingField, ClosingPresence, ClosingStep, EngineError, LeaveDecision, Money,
    api_types::{
        rpc::{ExecuteDailyClosing, Procedure, RpcErrorCode},
        service::ServiceKind,
        snapshot::VirtualSnapshotRow,
    },
};
use uuid::Uuid;

fn snapshot(service: ServiceKind, current_balance_minor: i64) -> VirtualSnapshotRow {
    VirtualSnapshotRow {
        id: Uuid::new_v4(),
        service,
        closing_id: None,
        previous_balance_minor: 0,
        current_balance_minor,
        sales_minor: 0,
        created_at: common::at(2024, 1, 1, 0),
    }
}

/// Store with an open shift today and previous virtual balances of
/// 1,000.00 (cellphone) and 500.00 (bus).
fn store_with_open_shift() -> (common::FakeBackend, Uuid) {
    let backend = seeded();
    let shift = open_shift_row(date(2026, 10, 19), 1);
    let shift_id = shift.id;
    backend.with(|state| {
        state.shifts.push(shift);
        state.snapshots.push(snapshot(ServiceKind::Cellphone, 100_000));
        state.snapshots.push(snapshot(ServiceKind::Bus, 50_000));
    });
    (backend, shift_id)
}

#[tokio::test]
async fn closing_happy_path_commits_once() {
    let (backend, shift_id) = store_with_open_shift();
    let engine = engine(backend);
    let today = date(2026, 10, 19);

    let mut wizard = engine.closing_wizard(today).await.unwrap();
    assert_eq!(wizard.shift_id(), shift_id);
    assert_eq!(wizard.request_leave(), LeaveDecision::Allow);

    wizard.set_field(ClosingField::FinalCellphone, "700").unwrap();
    wizard.set_field(ClosingField::FinalBus, "400").unwrap();
    wizard.set_field(ClosingField::CollectedCash, "$ 400.00").unwrap();
    assert_eq!(wizard.request_leave(), LeaveDecision::ConfirmDiscard);

    let preview = wizard.preview();
    assert_eq!(preview.sales_cellphone, Money::new(30_000));
    assert_eq!(preview.sales_bus, Money::new(10_000));
    assert_eq!(preview.cash_for_cellphone, Money::new(30_000));
    assert_eq!(preview.cash_for_bus, Money::new(10_000));
    assert_eq!(preview.main_till_ending, Money::new(48_000));
    assert_eq!(preview.petty_cash_ending, Money::new(12_000));
    assert_eq!(preview.cellphone_till_ending, Money::new(50_000));
    assert_eq!(preview.bus_till_ending, Money::new(13_000));

    wizard.next().unwrap();
    assert_eq!(wizard.step(), ClosingStep::Review);
    let committed = engine.submit_closing(&mut wizard).await.unwrap();
    assert_eq!(wizard.step(), ClosingStep::Done);
    assert!(!wizard.is_dirty());
    assert_eq!(wizard.request_leave(), LeaveDecision::Allow);

    let calls = engine.backend().calls_to(ExecuteDailyClosing::NAME);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0]["collected_cash_minor"], 40_000);
    assert_eq!(calls[0]["previous_cellphone_minor"], 100_000);
    assert_eq!(calls[0]["final_bus_minor"], 40_000);

    engine.backend().with(|state| {
        assert_eq!(state.closings.len(), 1);
        assert_eq!(state.closings[0].id, committed.closing_id);
    });

    // The new snapshots are the baseline of the next closing.
    let previous = engine.previous_virtual_balances().await.unwrap();
    assert_eq!(previous.cellphone, Money::new(70_000));
    assert_eq!(previous.bus, Money::new(40_000));

    // One closing per shift: the same shift cannot be closed out again.
    assert_eq!(
        engine.closing_presence(shift_id).await,
        ClosingPresence::Present
    );
    assert!(matches!(
        engine.closing_wizard(today).await,
        Err(EngineError::StalePrecondition(_))
    ));

    wizard.reset();
    wizard.set_field(ClosingField::FinalCellphone, "600").unwrap();
    wizard.set_field(ClosingField::FinalBus, "300").unwrap();
    wizard.set_field(ClosingField::CollectedCash, "100").unwrap();
    wizard.next().unwrap();
    let err = engine.submit_closing(&mut wizard).await.unwrap_err();
    assert!(matches!(err, EngineError::StalePrecondition(_)));
    assert_eq!(wizard.step(), ClosingStep::Review);
    assert_eq!(engine.backend().calls_to(ExecuteDailyClosing::NAME).len(), 1);
    engine.backend().with(|state| assert_eq!(state.closings.len(), 1));
}

#[tokio::test]
async fn invalid_fields_block_review() {
    let (backend, _) = store_with_open_shift();
    let engine = engine(backend);
    let mut wizard = engine.closing_wizard(date(2026, 10, 19)).await.unwrap();

    wizard.set_field(ClosingField::FinalCellphone, "-5").unwrap();
    assert!(matches!(wizard.next(), Err(EngineError::Validation(_))));
    assert_eq!(wizard.step(), ClosingStep::Input);
    assert!(wizard.visible_error(ClosingField::FinalBus).is_some());
    assert!(wizard.visible_error(ClosingField::CollectedCash).is_some());
    assert!(engine.backend().calls_to(ExecuteDailyClosing::NAME).is_empty());
}

#[tokio::test]
async fn closing_refused_when_shift_already_closed_out() {
    let (backend, shift_id) = store_with_open_shift();
    backend.with(|state| state.closings.push(closing_row(shift_id, 0, 40_000)));
    let engine = engine(backend);

    let err = engine.closing_wizard(date(2026, 10, 19)).await.unwrap_err();
    assert!(matches!(err, EngineError::StalePrecondition(_)));
}

#[tokio::test]
async fn closing_blocked_when_presence_is_unknown() {
    let (backend, _) = store_with_open_shift();
    backend.with(|state| {
        state.offline.insert("closing_for_shift");
    });
    let engine = engine(backend);

    let err = engine.closing_wizard(date(2026, 10, 19)).await.unwrap_err();
    assert!(matches!(err, EngineError::Indeterminate(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn closing_requires_open_shift() {
    let engine = engine(seeded());
    let err = engine.closing_wizard(date(2026, 10, 19)).await.unwrap_err();
    assert!(matches!(err, EngineError::StalePrecondition(_)));
}

#[tokio::test]
async fn closing_from_another_session_is_caught_at_submit() {
    let (backend, shift_id) = store_with_open_shift();
    let engine = engine(backend);
    let mut wizard = engine.closing_wizard(date(2026, 10, 19)).await.unwrap();
    for (field, raw) in [
        (ClosingField::FinalCellphone, "900"),
        (ClosingField::FinalBus, "450"),
        (ClosingField::CollectedCash, "150"),
    ] {
        wizard.set_field(field, raw).unwrap();
    }
    wizard.next().unwrap();

    engine
        .backend()
        .with(|state| state.closings.push(closing_row(shift_id, 0, 15_000)));

    let err = engine.submit_closing(&mut wizard).await.unwrap_err();
    assert!(matches!(err, EngineError::StalePrecondition(_)));
    assert_eq!(wizard.step(), ClosingStep::Review);
    assert!(wizard.error().is_some());
    assert!(engine.backend().calls_to(ExecuteDailyClosing::NAME).is_empty());
}

#[tokio::test]
async fn rejected_submission_keeps_the_form() {
    let (backend, _) = store_with_open_shift();
    backend.with(|state| {
        state.rejections.insert(
            ExecuteDailyClosing::NAME,
            (
                Some(RpcErrorCode::CategoriesMissing),
                "categoria no encontrada".to_string(),
            ),
        );
    });
    let engine = engine(backend);
    let mut wizard = engine.closing_wizard(date(2026, 10, 19)).await.unwrap();
    for field in ClosingField::ALL {
        wizard.set_field(field, "100").unwrap();
    }
    wizard.next().unwrap();

    let err = engine.submit_closing(&mut wizard).await.unwrap_err();
    assert!(matches!(err, EngineError::StalePrecondition(_)));
    assert_eq!(wizard.step(), ClosingStep::Review);
    assert!(wizard.is_dirty());
    assert_eq!(wizard.raw(ClosingField::CollectedCash), "100");
    engine.backend().with(|state| assert!(state.closings.is_empty()));

    wizard.back().unwrap();
    assert_eq!(wizard.step(), ClosingStep::Input);
}

#[tokio::test]
async fn submission_needs_the_review_step() {
    let (backend, _) = store_with_open_shift();
    let engine = engine(backend);
    let mut wizard = engine.closing_wizard(date(2026, 10, 19)).await.unwrap();

    let err = engine.submit_closing(&mut wizard).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));
}

#[tokio::test]
async fn deficit_recorded_by_closing_carries_to_next_opening() {
    let (backend, shift_id) = store_with_open_shift();
    backend.with(|state| state.deficit_on_closing = 1_500);
    let engine = engine(backend);
    let today = date(2026, 10, 19);

    let mut wizard = engine.closing_wizard(today).await.unwrap();
    wizard.set_field(ClosingField::FinalCellphone, "1000").unwrap();
    wizard.set_field(ClosingField::FinalBus, "500").unwrap();
    wizard.set_field(ClosingField::CollectedCash, "25").unwrap();
    wizard.next().unwrap();
    let committed = engine.submit_closing(&mut wizard).await.unwrap();
    assert_eq!(committed.deficit_minor, 1_500);
    wizard.reset();
    assert_eq!(wizard.step(), ClosingStep::Input);

    engine.close_shift(shift_id, common::at(2026, 10, 19, 21)).await.unwrap();
    assert_eq!(
        engine.last_closing_date().await.unwrap(),
        Some(today)
    );

    let deficit = engine.deficit_wizard().await.unwrap();
    assert_eq!(deficit.plan().closing_id, Some(committed.closing_id));
    assert_eq!(deficit.plan().deficit_carried, Money::new(1_500));
    assert_eq!(deficit.plan().fund_shortfall, Money::new(1_500));
    assert_eq!(deficit.plan().total_to_withdraw, Money::new(3_000));
}
