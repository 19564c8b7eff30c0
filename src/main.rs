//! Gearshift -- car rental backend server.
//!
//! SIGTERM/SIGINT stop accepting connections; in-flight requests get
//! `server.shutdown_timeout` seconds to finish.

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use gearshift::config::{Config, LoggingConfig};
use gearshift::storage::backend::StorageBackend;
use gearshift::store::rental::RentalStore;

/// Command-line arguments for the Gearshift server.
#[derive(Parser, Debug)]
#[command(name = "gearshift", version, about = "Car rental backend server")]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, default_value = "gearshift.yaml")]
    config: String,

    /// Override the bind address (host:port).
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine.
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = gearshift::config::load_or_default(&cli.config)?;

    init_logging(&config.logging);
    match dotenv {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("Ignoring unreadable .env file: {}", e),
    }
    info!("Configuration loaded from {} (defaults if absent)", cli.config);

    let bind_addr = cli
        .bind
        .unwrap_or_else(|| format!("{}:{}", config.server.host, config.server.port));

    if config.observability.metrics {
        gearshift::metrics::init_metrics();
        gearshift::metrics::describe_metrics();
        info!("Prometheus metrics initialized");
    }

    let store = open_store(&config)?;
    let storage = open_storage(&config).await?;

    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout);
    let state = Arc::new(gearshift::AppState::new(config, store, storage));
    let app = gearshift::server::app(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Gearshift listening on {}", bind_addr);

    let (stop_tx, mut stop_rx) = tokio::sync::watch::channel(false);
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = stop_tx.send(true);
        })
        .into_future();
    let deadline = async move {
        let _ = stop_rx.wait_for(|stopped| *stopped).await;
        tokio::time::sleep(shutdown_timeout).await;
    };

    tokio::select! {
        result = server => result?,
        _ = deadline => warn!(
            "In-flight requests still running after {}s, exiting",
            shutdown_timeout.as_secs()
        ),
    }

    info!("Gearshift shut down");
    Ok(())
}

/// Text or JSON logs; `RUST_LOG` wins over `logging.level`.
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));

    if logging.format.eq_ignore_ascii_case("json") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn open_store(config: &Config) -> anyhow::Result<Arc<dyn RentalStore>> {
    match config.database.engine.as_str() {
        "memory" => {
            info!("In-memory rental store initialized (nothing is persisted)");
            Ok(Arc::new(gearshift::store::memory::MemoryRentalStore::new()))
        }
        "sqlite" => {
            let path = &config.database.path;
            // Ensure parent directory exists for the SQLite file.
            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let store = gearshift::store::sqlite::SqliteRentalStore::new(path)?;
            info!("SQLite rental store initialized at {}", path);
            Ok(Arc::new(store))
        }
        other => anyhow::bail!("Unknown database.engine {:?} (expected sqlite or memory)", other),
    }
}

async fn open_storage(config: &Config) -> anyhow::Result<Arc<dyn StorageBackend>> {
    match config.storage.backend.as_str() {
        "aws" => {
            let aws_config = config.storage.aws.as_ref().ok_or_else(|| {
                anyhow::anyhow!("storage.backend is 'aws' but storage.aws config section is missing")
            })?;
            let backend = gearshift::storage::aws::AwsGatewayBackend::new(aws_config).await?;
            Ok(Arc::new(backend))
        }
        "memory" => {
            let max = config.storage.memory.max_size_bytes;
            info!("In-memory storage backend initialized (limit {} bytes, 0 = none)", max);
            Ok(Arc::new(gearshift::storage::memory::MemoryBackend::new(max)))
        }
        "local" => {
            let root = &config.storage.local.root_dir;
            let backend = gearshift::storage::local::LocalBackend::new(root)?;
            info!("Local storage backend initialized at {}", root);
            Ok(Arc::new(backend))
        }
        other => anyhow::bail!(
            "Unknown storage.backend {:?} (expected local, memory or aws)",
            other
        ),
    }
}

/// Wait for SIGTERM or SIGINT (Ctrl+C), then return to trigger graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        },
    }
}
