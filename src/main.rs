use clap::Parser;
use std::sync::Arc;
use tokio::sync::Notify;

mod cache;
mod cli;
mod config;
mod handler;
mod http;
mod logger;
mod origin;
mod server;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = cli::Cli::parse();
    let cfg = config::Config::load(&cli)?;

    // The cache directory must exist before anything binds
    if let Err(e) = cfg.validate_cache_dir() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    logger::init(&cfg.logging)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let origin = origin::HttpOrigin::new(&cfg.origin.base_url)?;
    let listener = server::create_listener(addr)?;

    logger::log_server_start(&addr, &cfg);

    let shutdown = Arc::new(Notify::new());
    server::start_signal_handler(Arc::clone(&shutdown))?;

    let state = Arc::new(config::AppState::new(cfg, Arc::new(origin)));
    server::run(listener, state, shutdown).await
}
