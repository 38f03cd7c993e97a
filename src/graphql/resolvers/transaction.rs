use async_graphql::{Context, Object, Result};
use uuid::Uuid;

use crate::graphql::types::{RecordTransactionInput, TransactionObject, TransactionStatusCode};
use crate::services::PgTransactionService;
use crate::validation::parse_value;

#[derive(Default)]
pub struct TransactionQuery;

#[Object]
impl TransactionQuery {
    async fn transaction(&self, ctx: &Context<'_>, id: Uuid) -> Result<TransactionObject> {
        let service = ctx.data::<PgTransactionService>()?;
        Ok(TransactionObject(service.get_transaction(id).await?))
    }

    async fn transactions(
        &self,
        ctx: &Context<'_>,
        status: Option<TransactionStatusCode>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<TransactionObject>> {
        let service = ctx.data::<PgTransactionService>()?;
        let transactions = service
            .list_transactions(status.map(Into::into), limit, offset)
            .await?;
        Ok(transactions.into_iter().map(TransactionObject).collect())
    }
}

#[derive(Default)]
pub struct TransactionMutation;

#[Object]
impl TransactionMutation {
    async fn record_transaction(
        &self,
        ctx: &Context<'_>,
        input: RecordTransactionInput,
    ) -> Result<TransactionObject> {
        let service = ctx.data::<PgTransactionService>()?;
        let value = parse_value(&input.value)?;
        let tx = service.record_transaction(value, input.occurred_at).await?;
        Ok(TransactionObject(tx))
    }
}
