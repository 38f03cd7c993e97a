use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Transaction, TransactionStatus};
use crate::error::AppError;
use crate::graphql::types::format_value;
use crate::validation::parse_value;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RecordTransactionRequest {
    /// Decimal string to avoid float rounding on the wire.
    pub value: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct TransactionView {
    pub id: Uuid,
    pub status: TransactionStatus,
    pub value: String,
    pub occurred_at: DateTime<Utc>,
    pub payment_note_id: Option<Uuid>,
}

impl From<Transaction> for TransactionView {
    fn from(tx: Transaction) -> Self {
        Self {
            value: format_value(&tx.value),
            id: tx.id,
            status: tx.status,
            occurred_at: tx.occurred_at,
            payment_note_id: tx.payment_note_id,
        }
    }
}

pub async fn record_transaction(
    State(state): State<AppState>,
    Json(payload): Json<RecordTransactionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let value = parse_value(&payload.value)?;
    let tx = state
        .transactions
        .record_transaction(value, payload.occurred_at)
        .await?;

    Ok((StatusCode::CREATED, Json(TransactionView::from(tx))))
}

pub async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let tx = state.transactions.get_transaction(id).await?;
    Ok(Json(TransactionView::from(tx)))
}
