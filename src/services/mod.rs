pub mod settlement;
pub mod transactions;

pub use settlement::{SettlementHandle, SettlementService};
pub use transactions::TransactionService;

use crate::adapters::{PostgresPaymentNoteRepository, PostgresTransactionLedger};

pub type PgSettlementService = SettlementService<PostgresTransactionLedger, PostgresPaymentNoteRepository>;
pub type PgTransactionService = TransactionService<PostgresTransactionLedger>;
