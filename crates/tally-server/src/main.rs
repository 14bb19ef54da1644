//! tally server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens
//! the SQLite ledger and the in-process counter cache, starts the view
//! flush scheduler, and serves the JSON API over HTTP.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::Context as _;
use clap::Parser;
use serde::Deserialize;
use tally_cache_mem::MemoryCounterStore;
use tally_engine::{Engagement, SchedulerHandle};
use tally_store_sqlite::SqliteLedger;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `TALLY_`-prefixed environment variables.
#[derive(Deserialize, Clone)]
struct ServerConfig {
  host:       String,
  port:       u16,
  store_path: PathBuf,
  /// Seconds between view flush passes.
  #[serde(default = "default_flush_interval_secs")]
  flush_interval_secs: u64,
  /// Per-subject ledger-operation timeout inside a flush pass, in ms.
  #[serde(default = "default_op_timeout_ms")]
  op_timeout_ms: u64,
}

fn default_flush_interval_secs() -> u64 {
  60
}

fn default_op_timeout_ms() -> u64 {
  5_000
}

#[derive(Parser)]
#[command(author, version, about = "tally engagement server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("TALLY"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);

  // Open the ledger and the ephemeral counter cache.
  let ledger = SqliteLedger::open(&store_path)
    .await
    .with_context(|| format!("failed to open ledger at {store_path:?}"))?;
  let counters = MemoryCounterStore::new();

  let engagement = Engagement::new(Arc::new(ledger), Arc::new(counters))
    .with_op_timeout(Duration::from_millis(server_cfg.op_timeout_ms));

  // Background view flush.
  let scheduler = SchedulerHandle::spawn(
    engagement.clone(),
    Duration::from_secs(server_cfg.flush_interval_secs),
  );

  let app = tally_api::api_router(engagement)
    .layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(async {
      tokio::signal::ctrl_c().await.ok();
      tracing::info!("shutdown signal received");
    })
    .await
    .context("server error")?;

  // Unflushed view deltas die with the cache; the next run starts from
  // the ledger values.
  scheduler.shutdown();
  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
