pub mod memory;
pub mod postgres;
pub mod postgres_payment_note_repository;
pub mod postgres_transaction_ledger;

pub use memory::MemoryStore;
pub use postgres::PgUnitOfWork;
pub use postgres_payment_note_repository::PostgresPaymentNoteRepository;
pub use postgres_transaction_ledger::PostgresTransactionLedger;
