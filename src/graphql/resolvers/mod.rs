pub mod payment_note;
pub mod transaction;

pub use payment_note::{PaymentNoteMutation, PaymentNoteQuery};
pub use transaction::{TransactionMutation, TransactionQuery};

use async_graphql::MergedObject;

#[derive(MergedObject, Default)]
pub struct Query(PaymentNoteQuery, TransactionQuery);

#[derive(MergedObject, Default)]
pub struct Mutation(PaymentNoteMutation, TransactionMutation);
