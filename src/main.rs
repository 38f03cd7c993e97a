use clap::Parser;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use payment_notes::cli::{self, Cli, Commands, DbCommands, NoteCommands, TxCommands};
use payment_notes::config::{Config, LogFormat};
use payment_notes::{create_app, db, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    init_tracing(config.log_format);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(&config).await,
        Commands::Config => cli::handle_config_validate(&config),
        Commands::Db(DbCommands::Migrate) => cli::handle_db_migrate(&config).await,
        Commands::Notes(command) => {
            let pool = db::create_pool(&config).await?;
            match command {
                NoteCommands::Create { from, to } => cli::handle_notes_create(pool, from, to).await,
                NoteCommands::List => cli::handle_notes_list(pool).await,
                NoteCommands::Retry { id } => cli::handle_notes_retry(pool, id).await,
            }
        }
        Commands::Tx(TxCommands::Record { value, at }) => {
            let pool = db::create_pool(&config).await?;
            cli::handle_tx_record(pool, &value, at).await
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn serve(config: &Config) -> anyhow::Result<()> {
    let pool = db::create_pool(config).await?;
    db::run_migrations(&pool).await?;

    let app_state = AppState::new(pool);

    // Notes left CREATING by a previous run settle again; their handles are
    // detached and record the outcome on the note.
    let resumed = app_state.settlement.resume_pending_settlements().await?;
    if !resumed.is_empty() {
        tracing::info!("Resumed {} pending settlement(s)", resumed.len());
    }

    let app = create_app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
