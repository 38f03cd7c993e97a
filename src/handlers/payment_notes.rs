use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{PaymentNote, PaymentNoteStatus, Transaction};
use crate::error::AppError;
use crate::graphql::types::format_value;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreatePaymentNoteRequest {
    pub period_from: DateTime<Utc>,
    pub period_to: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct PaymentNoteView {
    pub id: Uuid,
    pub period_from: DateTime<Utc>,
    pub period_to: DateTime<Utc>,
    pub status: PaymentNoteStatus,
    pub transactions_count: i64,
    pub value: String,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<PaymentNote> for PaymentNoteView {
    fn from(note: PaymentNote) -> Self {
        Self {
            value: format_value(&note.value),
            id: note.id,
            period_from: note.period_from,
            period_to: note.period_to,
            status: note.status,
            transactions_count: note.transactions_count,
            failure_reason: note.failure_reason,
            created_at: note.created_at,
            completed_at: note.completed_at,
        }
    }
}

pub async fn list_payment_notes(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let notes = state.settlement.list_payment_notes().await?;
    Ok(Json(notes.into_iter().map(PaymentNoteView::from).collect::<Vec<_>>()))
}

/// Responds 202: the note is CREATING and settles in the background.
pub async fn create_payment_note(
    State(state): State<AppState>,
    Json(payload): Json<CreatePaymentNoteRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (note, _settlement) = state
        .settlement
        .create_payment_note(payload.period_from, payload.period_to)
        .await?;

    Ok((StatusCode::ACCEPTED, Json(PaymentNoteView::from(note))))
}

pub async fn get_payment_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let note = state.settlement.get_payment_note(id).await?;
    Ok(Json(PaymentNoteView::from(note)))
}

pub async fn get_payment_note_transactions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let transactions: Vec<Transaction> = state.settlement.get_payment_note_transactions(id).await?;
    Ok(Json(
        transactions
            .into_iter()
            .map(super::transactions::TransactionView::from)
            .collect::<Vec<_>>(),
    ))
}

pub async fn retry_payment_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let (note, _settlement) = state.settlement.retry_payment_note(id).await?;
    Ok((StatusCode::ACCEPTED, Json(PaymentNoteView::from(note))))
}
