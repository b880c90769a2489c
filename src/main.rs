use std::{net::SocketAddr, sync::Arc};

use crowdjuke::{
    catalog::Catalog,
    common::{logger, types::AnyResult},
    configs::Config,
    party::PartyService,
    server::{self, AppState},
    store::MemoryVoteStore,
    transport,
};
use tracing::info;

#[tokio::main]
async fn main() -> AnyResult<()> {
    let config_path = Config::locate()?;
    let config = Config::load_from(config_path)?;
    logger::init(&config.logging);
    info!("Loaded configuration from {}", config_path);

    let catalog = Catalog::load(&config.catalog.path)?;
    info!("Loaded {} tracks from {}", catalog.len(), config.catalog.path);

    let service = Arc::new(PartyService::new(
        Arc::new(catalog),
        Arc::new(MemoryVoteStore::new()),
        config.party.clone(),
    ));
    let janitor = server::spawn_eviction(service.clone());

    let address: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let shared_state = Arc::new(AppState::new(service, config));
    let app = transport::http_server::router(shared_state);

    info!("Party server listening on {}", address);
    let listener = tokio::net::TcpListener::bind(address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(janitor) = janitor {
        janitor.abort();
    }
    info!("Party server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
