//! Persistence ports for the ledger and payment notes.
//!
//! Writes that must commit together run inside a [`UnitOfWork`] handed out by
//! [`TransactionLedger::begin`]. Dropping a unit of work without committing
//! rolls it back.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{ClaimOutcome, PaymentNote, SettlementWindow, Transaction, TransactionStatus};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("corrupt row: {0}")]
    Corrupt(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[async_trait]
pub trait UnitOfWork: Send + Sized {
    async fn commit(self) -> RepositoryResult<()>;

    async fn rollback(self) -> RepositoryResult<()>;
}

#[async_trait]
pub trait TransactionLedger: Send + Sync {
    type Uow: UnitOfWork;

    async fn begin(&self) -> RepositoryResult<Self::Uow>;

    async fn insert(&self, tx: &Transaction) -> RepositoryResult<Transaction>;

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Transaction>;

    /// Transactions owned by `note_id`, oldest first.
    async fn list_by_note(&self, note_id: Uuid) -> RepositoryResult<Vec<Transaction>>;

    async fn list(
        &self,
        status: Option<TransactionStatus>,
        limit: i64,
        offset: i64,
    ) -> RepositoryResult<Vec<Transaction>>;

    /// Marks every PENDING transaction inside `window` as PAID under
    /// `note_id` and returns the exact aggregate of what was marked. The
    /// rows read and the rows written are the same set.
    async fn claim_pending_in_window(
        &self,
        uow: &mut Self::Uow,
        window: &SettlementWindow,
        note_id: Uuid,
    ) -> RepositoryResult<ClaimOutcome>;
}

#[async_trait]
pub trait PaymentNoteRepository: Send + Sync {
    type Uow: UnitOfWork;

    async fn insert(&self, note: &PaymentNote) -> RepositoryResult<PaymentNote>;

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<PaymentNote>;

    /// All notes ordered by creation time, oldest first.
    async fn list(&self) -> RepositoryResult<Vec<PaymentNote>>;

    async fn list_creating(&self) -> RepositoryResult<Vec<PaymentNote>>;

    /// CREATING -> COMPLETED with the claim aggregate, inside `uow`.
    async fn complete(
        &self,
        uow: &mut Self::Uow,
        id: Uuid,
        outcome: &ClaimOutcome,
    ) -> RepositoryResult<PaymentNote>;

    /// CREATING -> FAILED.
    async fn fail(&self, id: Uuid, reason: &str) -> RepositoryResult<PaymentNote>;

    /// FAILED -> CREATING.
    async fn reopen(&self, id: Uuid) -> RepositoryResult<PaymentNote>;
}
