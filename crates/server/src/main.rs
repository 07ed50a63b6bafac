use anyhow::Context;
use fivedraw_server::{bind, serve, service_from_config, ServerConfig};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = ServerConfig::from_env_and_args(&args);
    let server = bind(&config.addr).with_context(|| format!("start server on {}", config.addr))?;
    info!(
        addr = %config.addr,
        ttl_secs = config.deck_ttl.as_secs(),
        "deck service listening"
    );
    let service = Arc::new(service_from_config(&config));
    serve(&server, service);
    Ok(())
}
