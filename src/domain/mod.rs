//! Framework-agnostic settlement domain.

pub mod payment_note;
pub mod transaction;
pub mod window;

pub use payment_note::{PaymentNote, PaymentNoteStatus};
pub use transaction::{Transaction, TransactionStatus};
pub use window::{ClaimOutcome, SettlementWindow};
