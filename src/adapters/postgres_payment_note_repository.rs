//! Postgres implementation of PaymentNoteRepository.

use async_trait::async_trait;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::postgres::PgUnitOfWork;
use crate::db::models::into_domain;
use crate::db::queries;
use crate::domain::{ClaimOutcome, PaymentNote, PaymentNoteStatus};
use crate::ports::{PaymentNoteRepository, RepositoryError, RepositoryResult};

#[derive(Clone)]
pub struct PostgresPaymentNoteRepository {
    pool: PgPool,
}

impl PostgresPaymentNoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Distinguishes a missing note from one in the wrong state after a
    /// guarded update matched nothing.
    async fn transition_error<'e, E>(
        executor: E,
        id: Uuid,
        expected: PaymentNoteStatus,
    ) -> RepositoryError
    where
        E: PgExecutor<'e>,
    {
        match queries::get_payment_note(executor, id).await {
            Ok(Some(row)) => RepositoryError::Conflict(format!(
                "payment note {} is {}, expected {}",
                id,
                row.status,
                expected
            )),
            Ok(None) => RepositoryError::NotFound(format!("payment note {}", id)),
            Err(e) => e.into(),
        }
    }
}

#[async_trait]
impl PaymentNoteRepository for PostgresPaymentNoteRepository {
    type Uow = PgUnitOfWork;

    async fn insert(&self, note: &PaymentNote) -> RepositoryResult<PaymentNote> {
        queries::insert_payment_note(&self.pool, note).await?.try_into()
    }

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<PaymentNote> {
        queries::get_payment_note(&self.pool, id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("payment note {}", id)))?
            .try_into()
    }

    async fn list(&self) -> RepositoryResult<Vec<PaymentNote>> {
        into_domain(queries::list_payment_notes(&self.pool, None).await?)
    }

    async fn list_creating(&self) -> RepositoryResult<Vec<PaymentNote>> {
        let rows =
            queries::list_payment_notes(&self.pool, Some(PaymentNoteStatus::Creating.as_str())).await?;
        into_domain(rows)
    }

    async fn complete(
        &self,
        uow: &mut PgUnitOfWork,
        id: Uuid,
        outcome: &ClaimOutcome,
    ) -> RepositoryResult<PaymentNote> {
        let row = queries::complete_payment_note(
            uow.tx(),
            id,
            outcome.claimed_count,
            &outcome.total_value,
        )
        .await?;

        match row {
            Some(row) => row.try_into(),
            // Same connection as the unit of work, which already holds one.
            None => {
                let expected = PaymentNoteStatus::Creating;
                Err(Self::transition_error(&mut **uow.tx(), id, expected).await)
            }
        }
    }

    async fn fail(&self, id: Uuid, reason: &str) -> RepositoryResult<PaymentNote> {
        match queries::fail_payment_note(&self.pool, id, reason).await? {
            Some(row) => row.try_into(),
            None => Err(Self::transition_error(&self.pool, id, PaymentNoteStatus::Creating).await),
        }
    }

    async fn reopen(&self, id: Uuid) -> RepositoryResult<PaymentNote> {
        match queries::reopen_payment_note(&self.pool, id).await? {
            Some(row) => row.try_into(),
            None => Err(Self::transition_error(&self.pool, id, PaymentNoteStatus::Failed).await),
        }
    }
}
