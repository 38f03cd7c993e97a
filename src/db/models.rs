//! Row types as stored in Postgres. Statuses are TEXT columns and are
//! checked when converted into domain entities.

use chrono::{DateTime, Utc};
use sqlx::types::BigDecimal;
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::{PaymentNote, Transaction};
use crate::ports::RepositoryError;

#[derive(Debug, FromRow)]
pub struct TransactionRow {
    pub id: Uuid,
    pub status: String,
    pub value: BigDecimal,
    pub occurred_at: DateTime<Utc>,
    pub payment_note_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = RepositoryError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        Ok(Transaction {
            id: row.id,
            status: row.status.parse().map_err(RepositoryError::Corrupt)?,
            value: row.value,
            occurred_at: row.occurred_at,
            payment_note_id: row.payment_note_id,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct PaymentNoteRow {
    pub id: Uuid,
    pub period_from: DateTime<Utc>,
    pub period_to: DateTime<Utc>,
    pub status: String,
    pub transactions_count: i64,
    pub value: BigDecimal,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<PaymentNoteRow> for PaymentNote {
    type Error = RepositoryError;

    fn try_from(row: PaymentNoteRow) -> Result<Self, Self::Error> {
        Ok(PaymentNote {
            id: row.id,
            period_from: row.period_from,
            period_to: row.period_to,
            status: row.status.parse().map_err(RepositoryError::Corrupt)?,
            transactions_count: row.transactions_count,
            value: row.value,
            failure_reason: row.failure_reason,
            created_at: row.created_at,
            completed_at: row.completed_at,
        })
    }
}

pub fn into_domain<R, T>(rows: Vec<R>) -> Result<Vec<T>, RepositoryError>
where
    T: TryFrom<R, Error = RepositoryError>,
{
    rows.into_iter().map(T::try_from).collect()
}
