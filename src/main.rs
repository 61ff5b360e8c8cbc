use clap::Parser;
use sqlx::migrate::Migrator;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use rizzpay_core::adapters::{
    PostgresLedgerRepository, PostgresMerchantRepository, PostgresTransactionRepository,
    PostgresUtrLogRepository,
};
use rizzpay_core::cli::{self, Cli, Commands, DbCommands, TxCommands, WalletCommands};
use rizzpay_core::config::Config;
use rizzpay_core::health::PostgresChecker;
use rizzpay_core::services::{ReconciliationService, WalletService};
use rizzpay_core::{AppState, create_app, db, startup};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    // Setup logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Tx(TxCommands::Show { tx_id }) => cli::handle_tx_show(&config, &tx_id).await,
        Commands::Wallet(WalletCommands::Balance { merchant_id }) => {
            cli::handle_wallet_balance(&config, &merchant_id).await
        }
        Commands::Db(DbCommands::Migrate) => cli::handle_db_migrate(&config).await,
        Commands::Config => cli::handle_config_validate(&config),
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let pool = db::create_pool(&config).await?;

    let migrator = Migrator::new(Path::new("./migrations")).await?;
    migrator.run(&pool).await?;
    tracing::info!("Database migrations completed");

    let report = startup::validate_environment(&config, &pool).await?;
    report.print();
    if !report.is_valid() {
        anyhow::bail!("Startup validation failed");
    }

    let transactions = Arc::new(PostgresTransactionRepository::new(pool.clone()));
    let utr_logs = Arc::new(PostgresUtrLogRepository::new(pool.clone()));
    let ledger = Arc::new(PostgresLedgerRepository::new(pool.clone()));
    let merchants = Arc::new(PostgresMerchantRepository::new(pool.clone()));

    let state = AppState {
        config: Arc::new(config.clone()),
        reconciliation: Arc::new(ReconciliationService::new(transactions.clone(), utr_logs)),
        wallet: Arc::new(WalletService::new(ledger, merchants)),
        transactions,
        health: Arc::new(PostgresChecker::new(pool.clone())),
    };

    let app = create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
