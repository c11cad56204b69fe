//! Application entrypoint and state wiring.

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use book_ledger::report::spawn_chain_report;
use book_ledger::{create_router, AppState, Config, Ledger, LogFormat, SharedLedger};

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    init_tracing(config.log_format);

    // 1) ledger with its genesis block
    let ledger = SharedLedger::new(Ledger::new().context("create genesis block")?);
    let genesis = ledger.tail();
    tracing::info!(hash = %genesis.hash(), timestamp = %genesis.timestamp(), "genesis block created");

    // 2) startup report
    if !config.no_report {
        spawn_chain_report(ledger.clone());
    }

    // 3) router
    let app = create_router(AppState::new(ledger));

    // 4) serve
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
