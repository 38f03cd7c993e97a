//! Transaction domain entity.
//! Framework-agnostic representation of a ledger entry waiting to be settled.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Settlement state of a single transaction. `Paid` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Paid,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Paid => "PAID",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(TransactionStatus::Pending),
            "PAID" => Ok(TransactionStatus::Paid),
            other => Err(format!("unknown transaction status '{}'", other)),
        }
    }
}

/// Domain entity representing a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub status: TransactionStatus,
    pub value: BigDecimal,
    pub occurred_at: DateTime<Utc>,
    /// Set exactly once, when a payment note claims the transaction.
    pub payment_note_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(value: BigDecimal, occurred_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            status: TransactionStatus::Pending,
            value,
            occurred_at,
            payment_note_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == TransactionStatus::Pending
    }

    /// Marks the transaction paid under `note_id`. Returns false when it was
    /// already claimed, leaving it untouched.
    pub fn mark_paid(&mut self, note_id: Uuid) -> bool {
        if !self.is_pending() {
            return false;
        }
        self.status = TransactionStatus::Paid;
        self.payment_note_id = Some(note_id);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_transaction_is_pending_and_unowned() {
        let tx = Transaction::new(BigDecimal::from(10), Utc::now());
        assert_eq!(tx.status, TransactionStatus::Pending);
        assert!(tx.payment_note_id.is_none());
    }

    #[test]
    fn test_mark_paid_only_once() {
        let mut tx = Transaction::new(BigDecimal::from(10), Utc::now());
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        assert!(tx.mark_paid(first));
        assert!(!tx.mark_paid(second));
        assert_eq!(tx.status, TransactionStatus::Paid);
        assert_eq!(tx.payment_note_id, Some(first));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("PAID".parse::<TransactionStatus>(), Ok(TransactionStatus::Paid));
        assert!("paid".parse::<TransactionStatus>().is_err());
    }
}
