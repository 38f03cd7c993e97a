//! In-process store implementing both ports.
//!
//! Units of work hold the store lock for their whole lifetime and stage their
//! writes on a copy of the state, so they are serialised and all-or-nothing
//! exactly like a Postgres transaction that locks the claimed rows. Used by
//! the service tests and for running settlements without a database.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::domain::{
    ClaimOutcome, PaymentNote, PaymentNoteStatus, SettlementWindow, Transaction, TransactionStatus,
};
use crate::ports::{
    PaymentNoteRepository, RepositoryError, RepositoryResult, TransactionLedger, UnitOfWork,
};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    transactions: Vec<Transaction>,
    notes: Vec<PaymentNote>,
}

impl MemoryState {
    fn note_mut(&mut self, id: Uuid) -> RepositoryResult<&mut PaymentNote> {
        self.notes
            .iter_mut()
            .find(|note| note.id == id)
            .ok_or_else(|| RepositoryError::NotFound(format!("payment note {}", id)))
    }
}

struct Faults {
    fail_completion: AtomicBool,
    hold_units_of_work: watch::Sender<bool>,
}

#[derive(Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    faults: Arc<Faults>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let (hold_units_of_work, _) = watch::channel(false);
        Self {
            state: Arc::new(Mutex::new(MemoryState::default())),
            faults: Arc::new(Faults {
                fail_completion: AtomicBool::new(false),
                hold_units_of_work,
            }),
        }
    }

    /// Makes every subsequent note completion fail until cleared.
    pub fn fail_completions(&self, fail: bool) {
        self.faults.fail_completion.store(fail, Ordering::SeqCst);
    }

    /// While held, `begin` waits before taking the store lock.
    pub fn hold_units_of_work(&self, hold: bool) {
        self.faults.hold_units_of_work.send_replace(hold);
    }

    async fn wait_until_released(&self) -> RepositoryResult<()> {
        let mut released = self.faults.hold_units_of_work.subscribe();
        released
            .wait_for(|held| !*held)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        Ok(())
    }
}

pub struct MemoryUnitOfWork {
    committed: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn commit(self) -> RepositoryResult<()> {
        let MemoryUnitOfWork { mut committed, staged } = self;
        *committed = staged;
        Ok(())
    }

    async fn rollback(self) -> RepositoryResult<()> {
        Ok(())
    }
}

#[async_trait]
impl TransactionLedger for MemoryStore {
    type Uow = MemoryUnitOfWork;

    async fn begin(&self) -> RepositoryResult<MemoryUnitOfWork> {
        self.wait_until_released().await?;
        let committed = self.state.clone().lock_owned().await;
        let staged = committed.clone();
        Ok(MemoryUnitOfWork { committed, staged })
    }

    async fn insert(&self, tx: &Transaction) -> RepositoryResult<Transaction> {
        let mut state = self.state.lock().await;
        if state.transactions.iter().any(|existing| existing.id == tx.id) {
            return Err(RepositoryError::Conflict(format!("transaction {} exists", tx.id)));
        }
        state.transactions.push(tx.clone());
        Ok(tx.clone())
    }

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Transaction> {
        let state = self.state.lock().await;
        state
            .transactions
            .iter()
            .find(|tx| tx.id == id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("transaction {}", id)))
    }

    async fn list_by_note(&self, note_id: Uuid) -> RepositoryResult<Vec<Transaction>> {
        let state = self.state.lock().await;
        let mut owned: Vec<Transaction> = state
            .transactions
            .iter()
            .filter(|tx| tx.payment_note_id == Some(note_id))
            .cloned()
            .collect();
        owned.sort_by(|a, b| a.occurred_at.cmp(&b.occurred_at).then(a.id.cmp(&b.id)));
        Ok(owned)
    }

    async fn list(
        &self,
        status: Option<TransactionStatus>,
        limit: i64,
        offset: i64,
    ) -> RepositoryResult<Vec<Transaction>> {
        let state = self.state.lock().await;
        let mut matching: Vec<Transaction> = state
            .transactions
            .iter()
            .filter(|tx| status.map_or(true, |s| tx.status == s))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at).then(a.id.cmp(&b.id)));
        Ok(matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn claim_pending_in_window(
        &self,
        uow: &mut MemoryUnitOfWork,
        window: &SettlementWindow,
        note_id: Uuid,
    ) -> RepositoryResult<ClaimOutcome> {
        let mut claimed = Vec::new();
        for tx in uow.staged.transactions.iter_mut() {
            if tx.is_pending() && window.contains(tx.occurred_at) && tx.mark_paid(note_id) {
                claimed.push(tx.value.clone());
            }
        }
        Ok(ClaimOutcome::from_values(&claimed))
    }
}

#[async_trait]
impl PaymentNoteRepository for MemoryStore {
    type Uow = MemoryUnitOfWork;

    async fn insert(&self, note: &PaymentNote) -> RepositoryResult<PaymentNote> {
        let mut state = self.state.lock().await;
        if state.notes.iter().any(|existing| existing.id == note.id) {
            return Err(RepositoryError::Conflict(format!("payment note {} exists", note.id)));
        }
        state.notes.push(note.clone());
        Ok(note.clone())
    }

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<PaymentNote> {
        let mut state = self.state.lock().await;
        state.note_mut(id).map(|note| note.clone())
    }

    async fn list(&self) -> RepositoryResult<Vec<PaymentNote>> {
        let state = self.state.lock().await;
        let mut notes = state.notes.clone();
        notes.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(notes)
    }

    async fn list_creating(&self) -> RepositoryResult<Vec<PaymentNote>> {
        let notes = PaymentNoteRepository::list(self).await?;
        Ok(notes
            .into_iter()
            .filter(|note| note.status == PaymentNoteStatus::Creating)
            .collect())
    }

    async fn complete(
        &self,
        uow: &mut MemoryUnitOfWork,
        id: Uuid,
        outcome: &ClaimOutcome,
    ) -> RepositoryResult<PaymentNote> {
        if self.faults.fail_completion.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database(format!(
                "write failed while completing payment note {}",
                id
            )));
        }
        let note = uow.staged.note_mut(id)?;
        note.complete(outcome).map_err(RepositoryError::Conflict)?;
        Ok(note.clone())
    }

    async fn fail(&self, id: Uuid, reason: &str) -> RepositoryResult<PaymentNote> {
        let mut state = self.state.lock().await;
        let note = state.note_mut(id)?;
        note.fail(reason).map_err(RepositoryError::Conflict)?;
        Ok(note.clone())
    }

    async fn reopen(&self, id: Uuid) -> RepositoryResult<PaymentNote> {
        let mut state = self.state.lock().await;
        let note = state.note_mut(id)?;
        note.reopen().map_err(RepositoryError::Conflict)?;
        Ok(note.clone())
    }
}
