//! Gig-Lead Harvester — Binary Entrypoint
//! Boots the harvest scheduler and the Axum read surface, wiring the
//! configured store backend, metrics, and shared state.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gig_lead_harvester::api::{self, AppState};
use gig_lead_harvester::config::HarvestConfig;
use gig_lead_harvester::harvest::scheduler::Harvester;
use gig_lead_harvester::harvest::sources::SourceClient;
use gig_lead_harvester::metrics::Metrics;
use gig_lead_harvester::store::{LeadStore, PostgresStore, SqliteStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();

    let cfg = HarvestConfig::from_env();

    // Backend selected once at startup; the pool lives for the process.
    let store: Arc<dyn LeadStore> = if cfg.wants_postgres() {
        Arc::new(PostgresStore::new(&cfg.database_url).await?)
    } else {
        Arc::new(SqliteStore::new(&cfg.database_url).await?)
    };
    store.init_schema().await.context("initializing schema")?;

    let metrics = Metrics::init(cfg.interval_ms);

    let client = SourceClient::new(cfg.http_timeout_secs)?;
    let harvester = Harvester::new(
        Arc::new(client),
        store.clone(),
        cfg.sources_csv.clone(),
        cfg.min_score,
    );
    harvester.spawn_scheduler(cfg.interval_ms);

    let state = AppState {
        store,
        harvester,
    };
    let router = api::create_router(state).merge(metrics.router());

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr)
        .await
        .with_context(|| format!("binding {}", cfg.bind_addr))?;
    info!(addr = %cfg.bind_addr, sources = %cfg.sources_csv, "listening");
    axum::serve(listener, router).await.context("serving http")?;

    Ok(())
}
