use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::{mask_password, Config};
use crate::graphql::types::format_value;
use crate::validation::parse_value;
use crate::AppState;

#[derive(Parser)]
#[command(name = "payment-notes")]
#[command(about = "Payment note settlement service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Payment note management commands
    #[command(subcommand)]
    Notes(NoteCommands),

    /// Transaction ledger commands
    #[command(subcommand)]
    Tx(TxCommands),

    /// Database management commands
    #[command(subcommand)]
    Db(DbCommands),

    /// Configuration validation
    Config,
}

#[derive(Subcommand)]
pub enum NoteCommands {
    /// Create a payment note and wait for its settlement
    Create {
        /// Start of the period (RFC 3339, inclusive)
        #[arg(long)]
        from: DateTime<Utc>,
        /// End of the period (RFC 3339, inclusive)
        #[arg(long)]
        to: DateTime<Utc>,
    },

    /// List all payment notes, oldest first
    List,

    /// Retry the settlement of a FAILED payment note
    Retry {
        #[arg(value_name = "NOTE_ID")]
        id: Uuid,
    },
}

#[derive(Subcommand)]
pub enum TxCommands {
    /// Record a pending transaction
    Record {
        /// Decimal value, at most two fractional digits
        #[arg(long, allow_hyphen_values = true)]
        value: String,
        /// When the transaction occurred (RFC 3339)
        #[arg(long)]
        at: DateTime<Utc>,
    },
}

#[derive(Subcommand)]
pub enum DbCommands {
    /// Run database migrations
    Migrate,
}

pub async fn handle_notes_create(
    pool: PgPool,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> anyhow::Result<()> {
    let state = AppState::new(pool);
    let (note, settlement) = state.settlement.create_payment_note(from, to).await?;
    println!("Created payment note {} ({})", note.id, note.status);

    let settled = settlement.wait().await?;
    println!(
        "✓ Payment note {} {}: {} transaction(s), value {}",
        settled.id,
        settled.status,
        settled.transactions_count,
        format_value(&settled.value)
    );
    Ok(())
}

pub async fn handle_notes_list(pool: PgPool) -> anyhow::Result<()> {
    let state = AppState::new(pool);
    let notes = state.settlement.list_payment_notes().await?;

    if notes.is_empty() {
        println!("No payment notes");
    }
    for note in notes {
        println!(
            "{}  {}  {} .. {}  {:>6} tx  {:>14}{}",
            note.id,
            note.status,
            note.period_from.to_rfc3339(),
            note.period_to.to_rfc3339(),
            note.transactions_count,
            format_value(&note.value),
            note.failure_reason
                .map(|reason| format!("  ({})", reason))
                .unwrap_or_default()
        );
    }
    Ok(())
}

pub async fn handle_notes_retry(pool: PgPool, id: Uuid) -> anyhow::Result<()> {
    let state = AppState::new(pool);
    let (_, settlement) = state.settlement.retry_payment_note(id).await?;

    let settled = settlement.wait().await?;
    println!(
        "✓ Payment note {} {}: {} transaction(s), value {}",
        settled.id,
        settled.status,
        settled.transactions_count,
        format_value(&settled.value)
    );
    Ok(())
}

pub async fn handle_tx_record(pool: PgPool, value: &str, at: DateTime<Utc>) -> anyhow::Result<()> {
    let state = AppState::new(pool);
    let value = parse_value(value)?;
    let tx = state.transactions.record_transaction(value, at).await?;

    println!("✓ Recorded transaction {} ({})", tx.id, format_value(&tx.value));
    Ok(())
}

pub async fn handle_db_migrate(config: &Config) -> anyhow::Result<()> {
    let pool = crate::db::create_pool(config).await?;

    tracing::info!("Running database migrations...");
    crate::db::run_migrations(&pool).await?;

    println!("✓ Database migrations completed");
    Ok(())
}

pub fn handle_config_validate(config: &Config) -> anyhow::Result<()> {
    tracing::info!("Validating configuration...");

    println!("Configuration:");
    println!("  Server Port: {}", config.server_port);
    println!("  Database URL: {}", mask_password(&config.database_url));
    println!("  Database Max Connections: {}", config.database_max_connections);
    println!("  Log Format: {:?}", config.log_format);

    println!("✓ Configuration is valid");
    Ok(())
}
