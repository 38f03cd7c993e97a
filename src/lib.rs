pub mod adapters;
pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod graphql;
pub mod handlers;
pub mod middleware;
pub mod ports;
pub mod services;
pub mod validation;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::adapters::{PostgresPaymentNoteRepository, PostgresTransactionLedger};
use crate::graphql::{build_schema, AppSchema};
use crate::services::{PgSettlementService, PgTransactionService};

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub settlement: PgSettlementService,
    pub transactions: PgTransactionService,
    pub schema: AppSchema,
}

impl AppState {
    pub fn new(db: sqlx::PgPool) -> Self {
        let ledger = PostgresTransactionLedger::new(db.clone());
        let notes = PostgresPaymentNoteRepository::new(db.clone());
        let settlement = PgSettlementService::new(ledger.clone(), notes);
        let transactions = PgTransactionService::new(ledger);
        let schema = build_schema(settlement.clone(), transactions.clone());

        Self {
            db,
            settlement,
            transactions,
            schema,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/graphql",
            get(handlers::graphql::graphiql).post(handlers::graphql::graphql_handler),
        )
        .route(
            "/payment-notes",
            get(handlers::payment_notes::list_payment_notes)
                .post(handlers::payment_notes::create_payment_note),
        )
        .route("/payment-notes/:id", get(handlers::payment_notes::get_payment_note))
        .route(
            "/payment-notes/:id/transactions",
            get(handlers::payment_notes::get_payment_note_transactions),
        )
        .route(
            "/payment-notes/:id/retry",
            post(handlers::payment_notes::retry_payment_note),
        )
        .route("/transactions", post(handlers::transactions::record_transaction))
        .route("/transactions/:id", get(handlers::transactions::get_transaction))
        .layer(axum::middleware::from_fn(
            middleware::request_logger::request_logger_middleware,
        ))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
