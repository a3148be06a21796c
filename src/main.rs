//! Sidebet - friendly wagers inside private groups
//! Mission: Track who bet what, who won, and who owes whom

use anyhow::{Context, Result};
use axum::middleware;
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::{net::TcpListener, time::interval};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sidebet_backend::{
    api::{create_router, AppState},
    config::Config,
    middleware::request_logging,
    wager::{demo::seed_demo, SystemClock, WagerStore},
};

#[derive(Parser, Debug)]
#[command(name = "sidebet")]
#[command(about = "Sidebet API server - bets between friends, settled on an IOU ledger")]
struct Cli {
    /// Bind address (overrides HOST)
    #[arg(long, env = "HOST")]
    host: Option<String>,

    /// Listen port (overrides PORT)
    #[arg(long, env = "PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    init_tracing();

    let cli = Cli::parse();
    let mut config = Config::from_env().context("Invalid configuration")?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    info!("🎲 Sidebet starting");
    let mut store = WagerStore::new(config.policy(), Arc::new(SystemClock));
    let policy = store.policy();
    info!(
        one_per_side = policy.one_per_side,
        invite_code_len = policy.invite_code_len,
        progress_interval_secs = config.progress_interval_secs,
        "⚙️  Wager policy loaded"
    );
    if config.seed_demo {
        let seed = seed_demo(&mut store).context("Failed to seed demo data")?;
        info!(invite_code = %seed.invite_code, "🌱 Join the demo group with this code");
    }
    let state = AppState::new(store);

    if config.progress_interval_secs > 0 {
        tokio::spawn(progress_sweeper(
            state.clone(),
            config.progress_interval_secs,
        ));
    } else {
        warn!("⚠️  Event-date sweeper disabled (PROGRESS_INTERVAL_SECS=0)");
    }

    let app = create_router(state)
        .layer(middleware::from_fn(request_logging))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Moves bets whose event date has passed without waiting for a client to ask.
async fn progress_sweeper(state: AppState, every_secs: u64) {
    info!("⏰ Starting event-date sweeper (every {}s)", every_secs);
    let mut ticker = interval(Duration::from_secs(every_secs));

    loop {
        ticker.tick().await;
        let changed = state.store.write().progress_all();
        if changed.is_empty() {
            debug!("Sweep found nothing to progress");
        } else {
            info!(count = changed.len(), "⏭️  Sweep progressed bets");
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sidebet_backend=info,sidebet=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_env() {
    // Standard dotenv search (cwd + parents)
    let _ = dotenv::dotenv();

    // Crate-root .env when launched from elsewhere
    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if manifest_env.exists() {
        let _ = dotenv::from_path(&manifest_env);
    }
}
