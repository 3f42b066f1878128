//! why-server: HTTP log viewer with a "why?" endpoint for every relation.
//!
//! Opens the trace database read-only and serves:
//!
//! - `GET  /`: the deducer log
//! - `POST /why`: plain-text proof trace (`id_1`, `id_2`, `name` form fields)
//! - `GET  /why/{sub}/{super}`: proof trace as an HTML page
//! - `GET  /health`: server status
//!
//! Bind address, port, store and log locations come from the config file and
//! `WHY_*` environment variables.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use isgci_why::config::WhyConfig;
use isgci_why::explain::Explainer;
use isgci_why::paths::WhyPaths;
use isgci_why::server::{AppState, router};
use isgci_why::store::{DurableStore, TraceStore};

#[derive(Parser)]
#[command(name = "why-server", version, about = "Deducer log viewer")]
struct Args {
    /// Config file (default: $XDG_CONFIG_HOME/isgci-why/config.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Trace database, overriding the config file and WHY_STORE.
    #[arg(long)]
    store: Option<PathBuf>,

    /// Deducer log to display.
    #[arg(long)]
    log: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let paths = WhyPaths::resolve()
        .inspect_err(|e| tracing::warn!("failed to resolve XDG paths: {e}"))
        .ok();
    let mut config = WhyConfig::load(args.config.as_deref(), paths.as_ref()).unwrap_or_else(|e| {
        tracing::error!("failed to load configuration: {e}");
        std::process::exit(1);
    });
    if let Some(store) = args.store {
        config.store_path = Some(store);
    }
    if let Some(log) = args.log {
        config.log_path = log;
    }

    let store_path = config.store_path().unwrap_or_else(|e| {
        tracing::error!("{e}");
        std::process::exit(1);
    });
    let store = DurableStore::open(store_path).unwrap_or_else(|e| {
        tracing::error!("{e}");
        std::process::exit(1);
    });
    match store.counts() {
        Ok((relations, names)) => {
            tracing::info!(path = %store_path.display(), relations, names, "trace store opened");
        }
        Err(e) => tracing::warn!("could not count trace records: {e}"),
    }

    let store: Arc<dyn TraceStore> = Arc::new(store);
    let explainer = Explainer::new(store).with_max_depth(config.max_depth);
    let state = Arc::new(AppState::new(explainer, config.log_path.clone()));
    let app = router(state, config.request_timeout());

    let addr = config.addr();
    tracing::info!(log = %config.log_path.display(), "why-server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("failed to bind {addr}: {e}");
            std::process::exit(1);
        });
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server error: {e}");
        std::process::exit(1);
    }
}
