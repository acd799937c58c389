use std::sync::Arc;

use spa_serve::config::{self, Config};
use spa_serve::logger::{self, LogEvents};
use spa_serve::server::{self, Server};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional first argument: config file path without extension
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    // Tokio runtime, worker threads from config
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers.filter(|&w| w > 0) {
        runtime_builder.worker_threads(workers);
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let events = Arc::new(LogEvents::new(&cfg.logging));
    let server = Server::bind(cfg.clone(), events)?;

    logger::log_server_start(&server.local_addr()?, &cfg);

    server.run_until(server::shutdown_signal()).await?;
    Ok(())
}
