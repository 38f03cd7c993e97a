use sqlx::types::BigDecimal;
use sqlx::{PgExecutor, PgPool, Postgres, Result, Transaction as SqlxTransaction};
use uuid::Uuid;

use crate::db::models::{PaymentNoteRow, TransactionRow};
use crate::domain::{PaymentNote, Transaction};

const TRANSACTION_COLUMNS: &str = "id, status, value, occurred_at, payment_note_id, created_at";
const PAYMENT_NOTE_COLUMNS: &str = "id, period_from, period_to, status, transactions_count, value, \
     failure_reason, created_at, completed_at";

// --- Transaction Queries ---

pub async fn insert_transaction(pool: &PgPool, tx: &Transaction) -> Result<TransactionRow> {
    sqlx::query_as::<_, TransactionRow>(&format!(
        r#"
        INSERT INTO transactions (id, status, value, occurred_at, payment_note_id, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {TRANSACTION_COLUMNS}
        "#
    ))
    .bind(tx.id)
    .bind(tx.status.as_str())
    .bind(&tx.value)
    .bind(tx.occurred_at)
    .bind(tx.payment_note_id)
    .bind(tx.created_at)
    .fetch_one(pool)
    .await
}

pub async fn get_transaction(pool: &PgPool, id: Uuid) -> Result<Option<TransactionRow>> {
    sqlx::query_as::<_, TransactionRow>(&format!(
        "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn list_transactions(
    pool: &PgPool,
    status: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<TransactionRow>> {
    sqlx::query_as::<_, TransactionRow>(&format!(
        r#"
        SELECT {TRANSACTION_COLUMNS} FROM transactions
        WHERE ($1::TEXT IS NULL OR status = $1)
        ORDER BY occurred_at DESC, id
        LIMIT $2 OFFSET $3
        "#
    ))
    .bind(status)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn list_transactions_by_note(pool: &PgPool, note_id: Uuid) -> Result<Vec<TransactionRow>> {
    sqlx::query_as::<_, TransactionRow>(&format!(
        r#"
        SELECT {TRANSACTION_COLUMNS} FROM transactions
        WHERE payment_note_id = $1
        ORDER BY occurred_at ASC, id
        "#
    ))
    .bind(note_id)
    .fetch_all(pool)
    .await
}

/// Locks the pending rows of the window. A concurrent claim blocks on these
/// rows and re-checks `status` once this transaction commits, so it never
/// sees them as pending again.
pub async fn lock_pending_in_window(
    executor: &mut SqlxTransaction<'_, Postgres>,
    from: chrono::DateTime<chrono::Utc>,
    to: chrono::DateTime<chrono::Utc>,
) -> Result<Vec<(Uuid, BigDecimal)>> {
    sqlx::query_as::<_, (Uuid, BigDecimal)>(
        r#"
        SELECT id, value FROM transactions
        WHERE status = 'PENDING'
        AND occurred_at BETWEEN $1 AND $2
        ORDER BY occurred_at ASC, id
        FOR UPDATE
        "#,
    )
    .bind(from)
    .bind(to)
    .fetch_all(&mut **executor)
    .await
}

/// Returns the number of rows moved to PAID.
pub async fn mark_transactions_paid(
    executor: &mut SqlxTransaction<'_, Postgres>,
    tx_ids: &[Uuid],
    note_id: Uuid,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE transactions SET status = 'PAID', payment_note_id = $1
        WHERE id = ANY($2) AND status = 'PENDING'
        "#,
    )
    .bind(note_id)
    .bind(tx_ids)
    .execute(&mut **executor)
    .await?;

    Ok(result.rows_affected())
}

// --- Payment Note Queries ---

pub async fn insert_payment_note(pool: &PgPool, note: &PaymentNote) -> Result<PaymentNoteRow> {
    sqlx::query_as::<_, PaymentNoteRow>(&format!(
        r#"
        INSERT INTO payment_notes (
            id, period_from, period_to, status, transactions_count, value,
            failure_reason, created_at, completed_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {PAYMENT_NOTE_COLUMNS}
        "#
    ))
    .bind(note.id)
    .bind(note.period_from)
    .bind(note.period_to)
    .bind(note.status.as_str())
    .bind(note.transactions_count)
    .bind(&note.value)
    .bind(&note.failure_reason)
    .bind(note.created_at)
    .bind(note.completed_at)
    .fetch_one(pool)
    .await
}

/// Runs on the pool or inside an open transaction.
pub async fn get_payment_note<'e, E>(executor: E, id: Uuid) -> Result<Option<PaymentNoteRow>>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, PaymentNoteRow>(&format!(
        "SELECT {PAYMENT_NOTE_COLUMNS} FROM payment_notes WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn list_payment_notes(pool: &PgPool, status: Option<&str>) -> Result<Vec<PaymentNoteRow>> {
    sqlx::query_as::<_, PaymentNoteRow>(&format!(
        r#"
        SELECT {PAYMENT_NOTE_COLUMNS} FROM payment_notes
        WHERE ($1::TEXT IS NULL OR status = $1)
        ORDER BY created_at ASC, id
        "#
    ))
    .bind(status)
    .fetch_all(pool)
    .await
}

pub async fn complete_payment_note(
    executor: &mut SqlxTransaction<'_, Postgres>,
    id: Uuid,
    transactions_count: i64,
    value: &BigDecimal,
) -> Result<Option<PaymentNoteRow>> {
    sqlx::query_as::<_, PaymentNoteRow>(&format!(
        r#"
        UPDATE payment_notes
        SET status = 'COMPLETED', transactions_count = $2, value = $3,
            failure_reason = NULL, completed_at = NOW()
        WHERE id = $1 AND status = 'CREATING'
        RETURNING {PAYMENT_NOTE_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(transactions_count)
    .bind(value)
    .fetch_optional(&mut **executor)
    .await
}

pub async fn fail_payment_note(pool: &PgPool, id: Uuid, reason: &str) -> Result<Option<PaymentNoteRow>> {
    sqlx::query_as::<_, PaymentNoteRow>(&format!(
        r#"
        UPDATE payment_notes SET status = 'FAILED', failure_reason = $2
        WHERE id = $1 AND status = 'CREATING'
        RETURNING {PAYMENT_NOTE_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(reason)
    .fetch_optional(pool)
    .await
}

pub async fn reopen_payment_note(pool: &PgPool, id: Uuid) -> Result<Option<PaymentNoteRow>> {
    sqlx::query_as::<_, PaymentNoteRow>(&format!(
        r#"
        UPDATE payment_notes SET status = 'CREATING', failure_reason = NULL
        WHERE id = $1 AND status = 'FAILED'
        RETURNING {PAYMENT_NOTE_COLUMNS}
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}
