//! Licensegate license server.
//!
//! You deploy this. Apps call `/check` to get an access token, their backend
//! calls `/validate` on every request, and the operator toggles clients with
//! `/admin/enable` and `/admin/disable` when payment is received or lapses.
//!
//! Usage:
//!   licensegate --port 3333
//!
//! Set `UPSTASH_REDIS_REST_URL` and `UPSTASH_REDIS_REST_TOKEN` to keep the
//! entitlement set in Redis; otherwise it lives in memory and in `DATA_FILE`.

use anyhow::{Context, Result};
use clap::Parser;
use licensegate_server::{Config, build_router};
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    let log_level = if config.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    info!("Licensegate starting...");
    for name in config.default_secrets_in_use() {
        warn!("{} is using its built-in default; set it before going to production", name);
    }

    let state = config
        .build_state()
        .await
        .context("Failed to initialise entitlement backend")?;
    let backend = state.service.store().backend_name();
    let app = build_router(state);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    println!("\n========================================");
    println!("  Licensegate Running");
    println!("========================================");
    println!("  Listening: http://{}", addr);
    println!("  Backend:   {}", backend);
    println!("\n  Endpoints:");
    println!("  GET  /check?client=ID");
    println!("  GET  /validate?token=TOKEN");
    println!("  POST /admin/enable");
    println!("  POST /admin/disable");
    println!("  GET  /admin/status");
    println!("========================================\n");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Licensegate stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
