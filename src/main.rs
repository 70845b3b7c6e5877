use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use transactor::adapters::{HttpSignalClient, PostgresStore, RouterClient};
use transactor::config::{AppConfig, DispatchMode};
use transactor::error::{Result, TransactorError};
use transactor::services::{
    trigger, DirectDispatcher, Dispatch, Orchestrator, ReadinessGate, RouterDispatcher,
};

#[derive(Parser)]
#[command(name = "transactor", version, about = "Signal-driven transaction orchestration service")]
struct Cli {
    /// Configuration directory
    #[arg(long, default_value = "config")]
    config: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the trigger endpoint and run on demand (default)
    Serve,
    /// Execute one run immediately and exit
    Run,
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::load_from(&cli.config)?;
    init_logging(&config);

    if let Err(errors) = config.validate() {
        for e in &errors {
            error!("Invalid configuration: {e}");
        }
        return Err(TransactorError::Other(anyhow::anyhow!(
            "configuration validation failed"
        )));
    }

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Migrate => {
            let store =
                PostgresStore::connect(&config.database.url, config.database.max_connections)
                    .await?;
            store.migrate().await?;
        }
        Commands::Run => {
            let orchestrator = build_orchestrator(&config).await?;
            let summary = orchestrator.run().await?;
            info!(
                dispatched = summary.dispatched,
                skipped = summary.skipped,
                failed = summary.failed,
                "Run complete"
            );
        }
        Commands::Serve => {
            let orchestrator = Arc::new(build_orchestrator(&config).await?);
            info!(mode = ?config.dispatch.mode, "Transactor starting");

            tokio::select! {
                result = trigger::serve(orchestrator, config.listen_port) => result?,
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                }
            }
        }
    }

    Ok(())
}

fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn build_orchestrator(config: &AppConfig) -> Result<Orchestrator> {
    let store =
        PostgresStore::connect(&config.database.url, config.database.max_connections).await?;
    let signals = HttpSignalClient::new(&config.signal_service.base_url)?;

    let dispatcher: Arc<dyn Dispatch> = match config.dispatch.mode {
        DispatchMode::Router => Arc::new(RouterDispatcher::new(RouterClient::new(
            &config.router.base_url,
        )?)),
        DispatchMode::Direct => Arc::new(DirectDispatcher::new()),
    };

    Ok(Orchestrator::new(
        Arc::new(store),
        Arc::new(signals),
        dispatcher,
        ReadinessGate::new()?,
        config.router.clone(),
        config.dispatch.mode,
        config.orchestrator.max_concurrent_accounts,
    ))
}
