use std::sync::Arc;

use pantry_chef::{
    config::Config,
    db::{create_redis_client, KeyValueStore, MemoryStore, RedisStore},
    routes::{create_router, AppState},
    services::{GeminiGateway, GenerationGateway, HistoryStore},
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pantry_chef=debug,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn KeyValueStore> = match &config.redis_url {
        Some(url) => Arc::new(RedisStore::new(create_redis_client(url)?)),
        None => {
            tracing::warn!("REDIS_URL not set, history will not survive restarts");
            Arc::new(MemoryStore::new())
        }
    };
    let history = HistoryStore::load(store, config.history_key.clone()).await;

    let gateway: Arc<dyn GenerationGateway> = Arc::new(GeminiGateway::from_config(&config));
    tracing::info!(
        gateway = gateway.name(),
        text_model = %config.text_model,
        image_model = %config.image_model,
        "Generation gateway ready"
    );

    let state = Arc::new(AppState::new(
        gateway,
        history,
        config.geolocation_timeout(),
    ));
    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
