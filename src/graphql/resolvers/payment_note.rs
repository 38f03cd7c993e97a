use async_graphql::{Context, Object, Result};
use uuid::Uuid;

use crate::graphql::types::{
    CreatePaymentNoteInput, PaymentNoteObject, PaymentNoteResponse, TransactionObject,
};
use crate::services::PgSettlementService;

#[derive(Default)]
pub struct PaymentNoteQuery;

#[Object]
impl PaymentNoteQuery {
    /// All payment notes, oldest first.
    async fn get_payment_notes(&self, ctx: &Context<'_>) -> Result<Vec<PaymentNoteObject>> {
        let service = ctx.data::<PgSettlementService>()?;
        let notes = service.list_payment_notes().await?;
        Ok(notes.into_iter().map(PaymentNoteObject).collect())
    }

    async fn get_payment_note(&self, ctx: &Context<'_>, id: Uuid) -> Result<PaymentNoteObject> {
        let service = ctx.data::<PgSettlementService>()?;
        Ok(PaymentNoteObject(service.get_payment_note(id).await?))
    }

    async fn get_payment_note_transactions(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
    ) -> Result<Vec<TransactionObject>> {
        let service = ctx.data::<PgSettlementService>()?;
        let transactions = service.get_payment_note_transactions(id).await?;
        Ok(transactions.into_iter().map(TransactionObject).collect())
    }
}

#[derive(Default)]
pub struct PaymentNoteMutation;

#[Object]
impl PaymentNoteMutation {
    /// Returns as soon as the note is stored; settlement continues in the
    /// background and the note flips to COMPLETED or FAILED.
    async fn create_payment_note(
        &self,
        ctx: &Context<'_>,
        input: CreatePaymentNoteInput,
    ) -> Result<PaymentNoteResponse> {
        let service = ctx.data::<PgSettlementService>()?;

        match service
            .create_payment_note(input.period_from, input.period_to)
            .await
        {
            Ok((note, _settlement)) => Ok(PaymentNoteResponse::ok(note)),
            Err(e) => {
                tracing::warn!(error = %e, "createPaymentNote rejected");
                Ok(PaymentNoteResponse::err(e))
            }
        }
    }

    async fn retry_payment_note(&self, ctx: &Context<'_>, id: Uuid) -> Result<PaymentNoteResponse> {
        let service = ctx.data::<PgSettlementService>()?;

        match service.retry_payment_note(id).await {
            Ok((note, _settlement)) => Ok(PaymentNoteResponse::ok(note)),
            Err(e) => {
                tracing::warn!(note_id = %id, error = %e, "retryPaymentNote rejected");
                Ok(PaymentNoteResponse::err(e))
            }
        }
    }
}
