//! GraphQL views over the domain entities. Decimal values are exposed as
//! strings with two fractional digits so no precision is lost in transit.

use async_graphql::{Context, Enum, InputObject, Object, Result, SimpleObject};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{PaymentNote, PaymentNoteStatus, Transaction, TransactionStatus};
use crate::services::PgSettlementService;
use crate::validation::VALUE_SCALE;

pub fn format_value(value: &BigDecimal) -> String {
    value.with_scale(VALUE_SCALE).to_string()
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
#[graphql(name = "PaymentNoteStatusCode")]
pub enum PaymentNoteStatusCode {
    Creating,
    Completed,
    Failed,
}

impl From<PaymentNoteStatus> for PaymentNoteStatusCode {
    fn from(status: PaymentNoteStatus) -> Self {
        match status {
            PaymentNoteStatus::Creating => PaymentNoteStatusCode::Creating,
            PaymentNoteStatus::Completed => PaymentNoteStatusCode::Completed,
            PaymentNoteStatus::Failed => PaymentNoteStatusCode::Failed,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
#[graphql(name = "TransactionStatusCode")]
pub enum TransactionStatusCode {
    Pending,
    Paid,
}

impl From<TransactionStatus> for TransactionStatusCode {
    fn from(status: TransactionStatus) -> Self {
        match status {
            TransactionStatus::Pending => TransactionStatusCode::Pending,
            TransactionStatus::Paid => TransactionStatusCode::Paid,
        }
    }
}

impl From<TransactionStatusCode> for TransactionStatus {
    fn from(code: TransactionStatusCode) -> Self {
        match code {
            TransactionStatusCode::Pending => TransactionStatus::Pending,
            TransactionStatusCode::Paid => TransactionStatus::Paid,
        }
    }
}

pub struct PaymentNoteObject(pub PaymentNote);

#[Object(name = "PaymentNote")]
impl PaymentNoteObject {
    async fn id(&self) -> Uuid {
        self.0.id
    }

    async fn period_from(&self) -> DateTime<Utc> {
        self.0.period_from
    }

    async fn period_to(&self) -> DateTime<Utc> {
        self.0.period_to
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }

    async fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.0.completed_at
    }

    async fn status(&self) -> PaymentNoteStatusCode {
        self.0.status.into()
    }

    async fn transactions_count(&self) -> i64 {
        self.0.transactions_count
    }

    async fn value(&self) -> String {
        format_value(&self.0.value)
    }

    async fn failure_reason(&self) -> Option<String> {
        self.0.failure_reason.clone()
    }

    /// Transactions claimed by this note.
    async fn transactions(&self, ctx: &Context<'_>) -> Result<Vec<TransactionObject>> {
        let service = ctx.data::<PgSettlementService>()?;
        let transactions = service.get_payment_note_transactions(self.0.id).await?;
        Ok(transactions.into_iter().map(TransactionObject).collect())
    }
}

pub struct TransactionObject(pub Transaction);

#[Object(name = "Transaction")]
impl TransactionObject {
    async fn id(&self) -> Uuid {
        self.0.id
    }

    async fn status(&self) -> TransactionStatusCode {
        self.0.status.into()
    }

    async fn value(&self) -> String {
        format_value(&self.0.value)
    }

    async fn occurred_at(&self) -> DateTime<Utc> {
        self.0.occurred_at
    }

    async fn payment_note_id(&self) -> Option<Uuid> {
        self.0.payment_note_id
    }
}

#[derive(InputObject)]
pub struct CreatePaymentNoteInput {
    pub period_from: DateTime<Utc>,
    pub period_to: DateTime<Utc>,
}

#[derive(InputObject)]
pub struct RecordTransactionInput {
    /// Decimal string, at most two fractional digits.
    pub value: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(SimpleObject)]
pub struct PaymentNoteResponse {
    pub success: bool,
    pub error: Option<String>,
    pub payment_note: Option<PaymentNoteObject>,
}

impl PaymentNoteResponse {
    pub fn ok(note: PaymentNote) -> Self {
        Self {
            success: true,
            error: None,
            payment_note: Some(PaymentNoteObject(note)),
        }
    }

    pub fn err(error: impl ToString) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            payment_note: None,
        }
    }
}
