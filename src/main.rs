use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gitlab_relay::chat::OneBotClient;
use gitlab_relay::config::Config;
use gitlab_relay::registry::{ListenerKey, ListenerRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gitlab_relay=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path =
        std::env::var("GITLAB_RELAY_CONFIG").unwrap_or_else(|_| "config.toml".into());
    let config = Config::load(&config_path)
        .with_context(|| format!("loading configuration from {config_path}"))?;

    let dispatcher = OneBotClient::new(
        config.chat.api_url.clone(),
        config.chat.access_token.clone(),
    );
    let registry = ListenerRegistry::new(dispatcher);

    let routes = config.routing_table();
    if routes.is_empty() {
        tracing::warn!("No projects in [routing]; every incoming event will be dropped");
    }

    let key = ListenerKey::new(config.port, config.path.clone(), config.secret.clone());
    registry
        .register(key, routes)
        .await
        .context("starting webhook listener")?;

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;
    tracing::info!("Shutting down");
    registry.shutdown().await;

    Ok(())
}
