//! Entry point. Loads environment configuration, initialises the
//! per-run log file, wires the node client into the report service,
//! and serves the HTTP endpoint.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use auction_scout::config::AppConfig;
use auction_scout::logging;
use auction_scout::report::AuctionReportService;
use auction_scout::server::{self, ServerState};
use auction_scout::source::rpc::DefichainRpc;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    // Missing required configuration terminates before serving traffic.
    let cfg = AppConfig::from_env()?;
    let log_path = logging::init(&cfg.log_dir)?;
    println!("auction-scout logging to {}", log_path.display());

    info!(
        rpc_url = %cfg.rpc_url,
        port = cfg.port,
        cooldown_ms = cfg.cooldown.as_millis() as u64,
        min_diff = ?cfg.min_diff,
        max_bid = ?cfg.max_bid,
        "auction-scout starting up"
    );

    let source = Arc::new(DefichainRpc::new(cfg.rpc_url.clone(), cfg.rpc_auth.clone())?);
    let service = AuctionReportService::new(source, &cfg);
    let state = Arc::new(ServerState { service });

    server::serve(state, cfg.port).await?;
    Ok(())
}
