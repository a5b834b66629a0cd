use agrichain::config::{self, Config, LogFormat};
use agrichain::http;
use agrichain::ledger::Ledger;
use agrichain::service::Provenance;
use clap::Parser;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let env_file = config::load_dotenv();
    let config = Config::parse();
    init_tracing(config.log_format);
    if let Some(path) = env_file {
        info!(path = %path.display(), "loaded environment file");
    }

    if let Err(e) = run(config).await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.socket_addr()?;

    // The ledger, genesis included, exists before anything can reach it.
    let ledger = Arc::new(Ledger::new());
    let genesis = ledger.tail();
    info!(hash = %genesis.hash, timestamp = %genesis.timestamp, "genesis block created");
    debug!(block = ?genesis, "genesis");

    let provenance = Provenance::new(ledger).with_chain_dump(config.dump_chain);
    let app = http::router(provenance);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("shut down");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
