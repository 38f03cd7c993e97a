use bigdecimal::BigDecimal;
use chrono::{DateTime, Duration, TimeZone, Utc};
use payment_notes::adapters::MemoryStore;
use payment_notes::domain::{PaymentNote, PaymentNoteStatus, Transaction, TransactionStatus};
use payment_notes::error::AppError;
use payment_notes::ports::{PaymentNoteRepository, TransactionLedger};
use payment_notes::services::{SettlementService, TransactionService};
use std::str::FromStr;

struct Fixture {
    store: MemoryStore,
    settlement: SettlementService<MemoryStore, MemoryStore>,
    transactions: TransactionService<MemoryStore>,
}

fn fixture() -> Fixture {
    let store = MemoryStore::new();
    Fixture {
        settlement: SettlementService::new(store.clone(), store.clone()),
        transactions: TransactionService::new(store.clone()),
        store,
    }
}

fn at(month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, month, day, 12, 0, 0).unwrap()
}

fn dec(value: &str) -> BigDecimal {
    BigDecimal::from_str(value).unwrap()
}

fn january() -> (DateTime<Utc>, DateTime<Utc>) {
    (
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap(),
    )
}

async fn record(f: &Fixture, value: &str, occurred_at: DateTime<Utc>) -> Transaction {
    f.transactions
        .record_transaction(dec(value), occurred_at)
        .await
        .unwrap()
}

async fn stored(f: &Fixture, tx: &Transaction) -> Transaction {
    TransactionLedger::get_by_id(&f.store, tx.id).await.unwrap()
}

#[tokio::test]
async fn test_claims_pending_transactions_inside_window() {
    let f = fixture();
    let inside = vec![
        record(&f, "10.00", at(1, 5)).await,
        record(&f, "20.00", at(1, 15)).await,
        record(&f, "-5.00", at(1, 25)).await,
    ];
    let outside = record(&f, "100.00", at(2, 15)).await;

    let (from, to) = january();
    let (note, settlement) = f.settlement.create_payment_note(from, to).await.unwrap();
    let settled = settlement.wait().await.unwrap();

    assert_eq!(settled.id, note.id);
    assert_eq!(settled.status, PaymentNoteStatus::Completed);
    assert_eq!(settled.transactions_count, 3);
    assert_eq!(settled.value, dec("25.00"));

    for tx in &inside {
        let tx = stored(&f, tx).await;
        assert_eq!(tx.status, TransactionStatus::Paid);
        assert_eq!(tx.payment_note_id, Some(note.id));
    }

    let outside = stored(&f, &outside).await;
    assert_eq!(outside.status, TransactionStatus::Pending);
    assert!(outside.payment_note_id.is_none());

    let owned = f.settlement.get_payment_note_transactions(note.id).await.unwrap();
    let owned_ids: Vec<_> = owned.iter().map(|tx| tx.id).collect();
    let inside_ids: Vec<_> = inside.iter().map(|tx| tx.id).collect();
    assert_eq!(owned_ids, inside_ids);
}

#[tokio::test]
async fn test_window_bounds_are_inclusive() {
    let f = fixture();
    let (from, to) = january();
    record(&f, "1.00", from).await;
    record(&f, "2.00", to).await;
    record(&f, "4.00", from - Duration::seconds(1)).await;
    record(&f, "8.00", to + Duration::seconds(1)).await;

    let (_, settlement) = f.settlement.create_payment_note(from, to).await.unwrap();
    let settled = settlement.wait().await.unwrap();

    assert_eq!(settled.transactions_count, 2);
    assert_eq!(settled.value, dec("3.00"));
}

#[tokio::test]
async fn test_empty_window_completes_with_zero_aggregates() {
    let f = fixture();
    record(&f, "100.00", at(3, 1)).await;

    let (from, to) = january();
    let (note, settlement) = f.settlement.create_payment_note(from, to).await.unwrap();
    let settled = settlement.wait().await.unwrap();

    assert_eq!(note.status, PaymentNoteStatus::Creating);
    assert_eq!(settled.status, PaymentNoteStatus::Completed);
    assert_eq!(settled.transactions_count, 0);
    assert_eq!(settled.value, BigDecimal::from(0));
    assert!(f
        .settlement
        .get_payment_note_transactions(note.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_paid_transactions_are_never_reclaimed() {
    let f = fixture();
    record(&f, "10.00", at(1, 5)).await;
    record(&f, "20.00", at(1, 6)).await;
    let (from, to) = january();

    let (first, settlement) = f.settlement.create_payment_note(from, to).await.unwrap();
    assert_eq!(settlement.wait().await.unwrap().transactions_count, 2);

    let late = record(&f, "7.50", at(1, 7)).await;

    let (second, settlement) = f.settlement.create_payment_note(from, to).await.unwrap();
    let settled = settlement.wait().await.unwrap();
    assert_eq!(settled.transactions_count, 1);
    assert_eq!(settled.value, dec("7.50"));
    assert_eq!(stored(&f, &late).await.payment_note_id, Some(second.id));

    let (_, settlement) = f.settlement.create_payment_note(from, to).await.unwrap();
    let exhausted = settlement.wait().await.unwrap();
    assert_eq!(exhausted.transactions_count, 0);
    assert_eq!(exhausted.value, BigDecimal::from(0));

    let first_owned = f.settlement.get_payment_note_transactions(first.id).await.unwrap();
    assert_eq!(first_owned.len(), 2);
}

#[tokio::test]
async fn test_creation_returns_before_settlement_completes() {
    let f = fixture();
    record(&f, "10.00", at(1, 5)).await;
    f.store.hold_units_of_work(true);

    let (from, to) = january();
    let (note, settlement) = f.settlement.create_payment_note(from, to).await.unwrap();

    assert_eq!(note.status, PaymentNoteStatus::Creating);
    assert_eq!(note.transactions_count, 0);
    assert_eq!(note.value, BigDecimal::from(0));

    let observed = f.settlement.get_payment_note(note.id).await.unwrap();
    assert_eq!(observed.status, PaymentNoteStatus::Creating);
    assert!(!settlement.is_finished());

    f.store.hold_units_of_work(false);
    let settled = settlement.wait().await.unwrap();
    assert_eq!(settled.status, PaymentNoteStatus::Completed);
    assert_eq!(
        f.settlement.get_payment_note(note.id).await.unwrap().status,
        PaymentNoteStatus::Completed
    );
}

#[tokio::test]
async fn test_failed_settlement_rolls_back_claim_and_marks_note_failed() {
    let f = fixture();
    let tx = record(&f, "10.00", at(1, 5)).await;
    f.store.fail_completions(true);

    let (from, to) = january();
    let (note, settlement) = f.settlement.create_payment_note(from, to).await.unwrap();
    let result = settlement.wait().await;

    assert!(matches!(result, Err(AppError::DatabaseError(_))));

    let failed = f.settlement.get_payment_note(note.id).await.unwrap();
    assert_eq!(failed.status, PaymentNoteStatus::Failed);
    assert!(failed
        .failure_reason
        .as_deref()
        .unwrap_or_default()
        .contains("write failed"));
    assert_eq!(failed.transactions_count, 0);

    let tx = stored(&f, &tx).await;
    assert_eq!(tx.status, TransactionStatus::Pending);
    assert!(tx.payment_note_id.is_none());
}

#[tokio::test]
async fn test_retry_completes_failed_note() {
    let f = fixture();
    record(&f, "10.00", at(1, 5)).await;
    f.store.fail_completions(true);

    let (from, to) = january();
    let (note, settlement) = f.settlement.create_payment_note(from, to).await.unwrap();
    assert!(settlement.wait().await.is_err());

    f.store.fail_completions(false);
    let (reopened, settlement) = f.settlement.retry_payment_note(note.id).await.unwrap();
    assert_eq!(reopened.status, PaymentNoteStatus::Creating);
    assert!(reopened.failure_reason.is_none());

    let settled = settlement.wait().await.unwrap();
    assert_eq!(settled.status, PaymentNoteStatus::Completed);
    assert_eq!(settled.transactions_count, 1);
    assert_eq!(settled.value, dec("10.00"));
}

#[tokio::test]
async fn test_retry_of_completed_note_is_conflict() {
    let f = fixture();
    let (from, to) = january();
    let (note, settlement) = f.settlement.create_payment_note(from, to).await.unwrap();
    settlement.wait().await.unwrap();

    let result = f.settlement.retry_payment_note(note.id).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_retry_of_unknown_note_is_not_found() {
    let f = fixture();
    let result = f.settlement.retry_payment_note(uuid::Uuid::new_v4()).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_resume_settles_notes_left_creating() {
    let f = fixture();
    record(&f, "12.34", at(1, 5)).await;
    let (from, to) = january();
    let orphan = PaymentNote::new(from, to).unwrap();
    PaymentNoteRepository::insert(&f.store, &orphan).await.unwrap();

    let handles = f.settlement.resume_pending_settlements().await.unwrap();
    assert_eq!(handles.len(), 1);
    assert_eq!(handles[0].note_id(), orphan.id);

    for handle in handles {
        let settled = handle.wait().await.unwrap();
        assert_eq!(settled.status, PaymentNoteStatus::Completed);
        assert_eq!(settled.value, dec("12.34"));
    }

    assert!(f.settlement.resume_pending_settlements().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_notes_are_listed_oldest_first() {
    let f = fixture();
    let (from, to) = january();
    let base = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();

    let mut expected = Vec::new();
    for offset in [3, 1, 2] {
        let mut note = PaymentNote::new(from, to).unwrap();
        note.created_at = base + Duration::minutes(offset);
        PaymentNoteRepository::insert(&f.store, &note).await.unwrap();
        expected.push((offset, note.id));
    }
    expected.sort();

    let listed: Vec<_> = f
        .settlement
        .list_payment_notes()
        .await
        .unwrap()
        .into_iter()
        .map(|note| note.id)
        .collect();
    let expected: Vec<_> = expected.into_iter().map(|(_, id)| id).collect();
    assert_eq!(listed, expected);
}
