//! Postgres implementation of TransactionLedger.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::postgres::PgUnitOfWork;
use crate::db::models::into_domain;
use crate::db::queries;
use crate::domain::{ClaimOutcome, SettlementWindow, Transaction, TransactionStatus};
use crate::ports::{RepositoryError, RepositoryResult, TransactionLedger};

/// Postgres-backed transaction ledger.
#[derive(Clone)]
pub struct PostgresTransactionLedger {
    pool: PgPool,
}

impl PostgresTransactionLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionLedger for PostgresTransactionLedger {
    type Uow = PgUnitOfWork;

    async fn begin(&self) -> RepositoryResult<PgUnitOfWork> {
        PgUnitOfWork::begin(&self.pool).await
    }

    async fn insert(&self, tx: &Transaction) -> RepositoryResult<Transaction> {
        let row = queries::insert_transaction(&self.pool, tx).await?;
        row.try_into()
    }

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Transaction> {
        queries::get_transaction(&self.pool, id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("transaction {}", id)))?
            .try_into()
    }

    async fn list_by_note(&self, note_id: Uuid) -> RepositoryResult<Vec<Transaction>> {
        let rows = queries::list_transactions_by_note(&self.pool, note_id).await?;
        into_domain(rows)
    }

    async fn list(
        &self,
        status: Option<TransactionStatus>,
        limit: i64,
        offset: i64,
    ) -> RepositoryResult<Vec<Transaction>> {
        let rows = queries::list_transactions(
            &self.pool,
            status.as_ref().map(TransactionStatus::as_str),
            limit,
            offset,
        )
        .await?;
        into_domain(rows)
    }

    async fn claim_pending_in_window(
        &self,
        uow: &mut PgUnitOfWork,
        window: &SettlementWindow,
        note_id: Uuid,
    ) -> RepositoryResult<ClaimOutcome> {
        let locked = queries::lock_pending_in_window(uow.tx(), window.from(), window.to()).await?;
        if locked.is_empty() {
            return Ok(ClaimOutcome::empty());
        }

        let outcome = ClaimOutcome::from_values(locked.iter().map(|(_, value)| value));
        let ids: Vec<Uuid> = locked.iter().map(|(id, _)| *id).collect();

        let updated = queries::mark_transactions_paid(uow.tx(), &ids, note_id).await?;
        if updated != ids.len() as u64 {
            return Err(RepositoryError::Conflict(format!(
                "claimed {} of {} locked transactions for payment note {}",
                updated,
                ids.len(),
                note_id
            )));
        }

        tracing::debug!(
            note_id = %note_id,
            claimed = outcome.claimed_count,
            total = %outcome.total_value,
            "Claimed pending transactions"
        );

        Ok(outcome)
    }
}
