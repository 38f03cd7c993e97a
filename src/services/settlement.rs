use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::domain::{PaymentNote, SettlementWindow, Transaction};
use crate::error::AppError;
use crate::ports::{PaymentNoteRepository, RepositoryError, TransactionLedger, UnitOfWork};

/// The settlement task spawned for one payment note.
///
/// Dropping the handle detaches the task; it still runs to completion and
/// records its outcome on the note.
pub struct SettlementHandle {
    note_id: Uuid,
    task: JoinHandle<Result<PaymentNote, AppError>>,
}

impl SettlementHandle {
    pub fn note_id(&self) -> Uuid {
        self.note_id
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the note to reach COMPLETED, or returns the error that moved
    /// it to FAILED.
    pub async fn wait(self) -> Result<PaymentNote, AppError> {
        let note_id = self.note_id;
        self.task.await.map_err(|e| {
            AppError::Internal(format!("settlement task for {} aborted: {}", note_id, e))
        })?
    }
}

/// Creates payment notes and settles them against the transaction ledger.
#[derive(Clone)]
pub struct SettlementService<L, R> {
    ledger: L,
    notes: R,
}

impl<L, R> SettlementService<L, R>
where
    L: TransactionLedger + Clone + 'static,
    R: PaymentNoteRepository<Uow = L::Uow> + Clone + 'static,
{
    pub fn new(ledger: L, notes: R) -> Self {
        Self { ledger, notes }
    }

    /// Persists a CREATING note and starts its settlement without waiting
    /// for it. The returned note is the CREATING snapshot.
    pub async fn create_payment_note(
        &self,
        period_from: DateTime<Utc>,
        period_to: DateTime<Utc>,
    ) -> Result<(PaymentNote, SettlementHandle), AppError> {
        let note = PaymentNote::new(period_from, period_to)?;
        let note = self.notes.insert(&note).await?;

        tracing::info!(
            note_id = %note.id,
            period_from = %note.period_from,
            period_to = %note.period_to,
            "Payment note created"
        );

        let handle = self.spawn_settlement(&note)?;
        Ok((note, handle))
    }

    /// Moves a FAILED note back to CREATING and settles it again.
    pub async fn retry_payment_note(
        &self,
        id: Uuid,
    ) -> Result<(PaymentNote, SettlementHandle), AppError> {
        let note = self.notes.reopen(id).await?;
        tracing::info!(note_id = %note.id, "Retrying payment note settlement");

        let handle = self.spawn_settlement(&note)?;
        Ok((note, handle))
    }

    /// Restarts settlement for notes left in CREATING, e.g. by a crash
    /// between note creation and settlement.
    pub async fn resume_pending_settlements(&self) -> Result<Vec<SettlementHandle>, AppError> {
        let pending = self.notes.list_creating().await?;
        if !pending.is_empty() {
            tracing::info!("Resuming settlement for {} payment note(s)", pending.len());
        }

        pending.iter().map(|note| self.spawn_settlement(note)).collect()
    }

    pub async fn list_payment_notes(&self) -> Result<Vec<PaymentNote>, AppError> {
        Ok(self.notes.list().await?)
    }

    pub async fn get_payment_note(&self, id: Uuid) -> Result<PaymentNote, AppError> {
        Ok(self.notes.get_by_id(id).await?)
    }

    pub async fn get_payment_note_transactions(&self, id: Uuid) -> Result<Vec<Transaction>, AppError> {
        // Surface a missing note as NotFound rather than an empty list.
        self.notes.get_by_id(id).await?;
        Ok(self.ledger.list_by_note(id).await?)
    }

    fn spawn_settlement(&self, note: &PaymentNote) -> Result<SettlementHandle, AppError> {
        let window = note.window()?;
        let note_id = note.id;
        let ledger = self.ledger.clone();
        let notes = self.notes.clone();

        let task = tokio::spawn(async move { settle(&ledger, &notes, note_id, &window).await });

        Ok(SettlementHandle { note_id, task })
    }
}

/// Runs one settlement and records a failure on the note when it errors.
async fn settle<L, R>(
    ledger: &L,
    notes: &R,
    note_id: Uuid,
    window: &SettlementWindow,
) -> Result<PaymentNote, AppError>
where
    L: TransactionLedger,
    R: PaymentNoteRepository<Uow = L::Uow>,
{
    match claim_and_complete(ledger, notes, note_id, window).await {
        Ok(note) => {
            tracing::info!(
                note_id = %note.id,
                transactions = note.transactions_count,
                value = %note.value,
                "Payment note settled"
            );
            Ok(note)
        }
        Err(e) => {
            tracing::error!(note_id = %note_id, error = %e, "Payment note settlement failed");
            if let Err(record_err) = notes.fail(note_id, &e.to_string()).await {
                tracing::error!(
                    note_id = %note_id,
                    error = %record_err,
                    "Failed to record settlement failure"
                );
            }
            Err(e.into())
        }
    }
}

/// Claim and completion commit together. Any early return drops the unit of
/// work, which rolls the claim back.
async fn claim_and_complete<L, R>(
    ledger: &L,
    notes: &R,
    note_id: Uuid,
    window: &SettlementWindow,
) -> Result<PaymentNote, RepositoryError>
where
    L: TransactionLedger,
    R: PaymentNoteRepository<Uow = L::Uow>,
{
    let mut uow = ledger.begin().await?;
    let outcome = ledger.claim_pending_in_window(&mut uow, window, note_id).await?;
    let note = notes.complete(&mut uow, note_id, &outcome).await?;
    uow.commit().await?;
    Ok(note)
}
