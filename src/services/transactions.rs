use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Transaction, TransactionStatus};
use crate::error::AppError;
use crate::ports::TransactionLedger;
use crate::validation::validate_value;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Records and reads ledger transactions.
#[derive(Clone)]
pub struct TransactionService<L> {
    ledger: L,
}

impl<L: TransactionLedger> TransactionService<L> {
    pub fn new(ledger: L) -> Self {
        Self { ledger }
    }

    pub async fn record_transaction(
        &self,
        value: BigDecimal,
        occurred_at: DateTime<Utc>,
    ) -> Result<Transaction, AppError> {
        validate_value(&value)?;

        let tx = self.ledger.insert(&Transaction::new(value, occurred_at)).await?;
        tracing::info!(
            transaction_id = %tx.id,
            value = %tx.value,
            occurred_at = %tx.occurred_at,
            "Transaction recorded"
        );
        Ok(tx)
    }

    pub async fn get_transaction(&self, id: Uuid) -> Result<Transaction, AppError> {
        Ok(self.ledger.get_by_id(id).await?)
    }

    pub async fn list_transactions(
        &self,
        status: Option<TransactionStatus>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Transaction>, AppError> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let offset = offset.unwrap_or(0);
        if offset < 0 {
            return Err(AppError::BadRequest(format!(
                "offset must not be negative, got {}",
                offset
            )));
        }
        Ok(self.ledger.list(status, limit, offset).await?)
    }
}
