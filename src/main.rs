use checkout_connect::application::registry::ProcessorRegistry;
use checkout_connect::application::replay::LedgerReplay;
use checkout_connect::config::AppConfig;
use checkout_connect::domain::ports::{GatewayClientRef, TransactionStoreRef};
use checkout_connect::infrastructure::http_gateway::{HttpGatewayClient, build_client};
use checkout_connect::infrastructure::in_memory::InMemoryTransactionStore;
#[cfg(feature = "storage-rocksdb")]
use checkout_connect::infrastructure::rocksdb::RocksDbTransactionStore;
use checkout_connect::interfaces::csv::ledger_reader::LedgerReader;
use checkout_connect::interfaces::csv::report_writer::ReportWriter;
use checkout_connect::interfaces::http::{AppState, serve};
use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{self, IsTerminal};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON configuration file. `CHECKOUT_*` environment variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the checkout and gateway callback HTTP server
    Serve {
        #[arg(long)]
        listen: Option<SocketAddr>,

        /// Path to persistent database (optional). If provided, uses RocksDB.
        #[arg(long)]
        db_path: Option<PathBuf>,
    },
    /// Print the payment method catalog as CSV
    Variants,
    /// Replay a ledger CSV through reconciliation and print the resulting transactions
    Replay {
        /// Input ledger CSV file
        input: PathBuf,

        /// Path to persistent database (optional). If provided, uses RocksDB.
        #[arg(long)]
        db_path: Option<PathBuf>,
    },
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal());
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn open_store(db_path: Option<PathBuf>) -> Result<TransactionStoreRef> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            let store = RocksDbTransactionStore::open(&path).into_diagnostic()?;
            info!(path = %path.display(), "using RocksDB storage");
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(path) => {
            warn!(
                path = %path.display(),
                "persistent storage requested via --db-path, but the storage-rocksdb feature is not enabled; falling back to in-memory storage"
            );
            Ok(Arc::new(InMemoryTransactionStore::new()))
        }
        None => Ok(Arc::new(InMemoryTransactionStore::new())),
    }
}

fn build_registry(config: &AppConfig, store: TransactionStoreRef) -> Result<ProcessorRegistry> {
    let client = build_client(Duration::from_secs(config.gateway_timeout_secs)).into_diagnostic()?;
    ProcessorRegistry::build(config, store, |settings| {
        let gateway: GatewayClientRef = Arc::new(HttpGatewayClient::new(client.clone(), settings));
        Ok(gateway)
    })
    .into_diagnostic()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let mut config = AppConfig::load(cli.config.as_deref()).into_diagnostic()?;

    match cli.command {
        Command::Serve { listen, db_path } => {
            if let Some(listen) = listen {
                config.listen_addr = listen;
            }
            let store = open_store(db_path.or_else(|| config.db_path.clone()))?;
            let registry = build_registry(&config, store)?;
            let state = Arc::new(AppState::new(registry));

            let listener = tokio::net::TcpListener::bind(config.listen_addr)
                .await
                .into_diagnostic()?;
            serve(listener, state, async {
                let _ = tokio::signal::ctrl_c().await;
                info!("shutting down");
            })
            .await
            .into_diagnostic()?;
        }
        Command::Variants => {
            let registry = build_registry(&config, Arc::new(InMemoryTransactionStore::new()))?;
            let stdout = io::stdout();
            let mut writer = ReportWriter::new(stdout.lock());
            writer.write_variants(registry.iter()).into_diagnostic()?;
        }
        Command::Replay { input, db_path } => {
            let store = open_store(db_path.or_else(|| config.db_path.clone()))?;
            let replay = LedgerReplay::new(store);

            let file = File::open(input).into_diagnostic()?;
            let reader = LedgerReader::new(file);
            for (index, event) in reader.events().enumerate() {
                // Header is line 1.
                let line = index + 2;
                match event {
                    Ok(event) => {
                        if let Err(e) = replay.apply(event).await {
                            warn!(line, error = %e, "error processing ledger event");
                        }
                    }
                    Err(e) => {
                        warn!(line, error = %e, "error reading ledger event");
                    }
                }
            }

            let transactions = replay.into_results().await.into_diagnostic()?;
            let stdout = io::stdout();
            let mut writer = ReportWriter::new(stdout.lock());
            writer.write_transactions(&transactions).into_diagnostic()?;
        }
    }

    Ok(())
}
