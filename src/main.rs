use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use cofounder_relay::agent::RigCompletionProvider;
use cofounder_relay::config::{AppConfig, ProviderConfig};
use cofounder_relay::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (development convenience)
    dotenvy::dotenv().ok();

    // Initialise tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cofounder_relay=debug,tower_http=debug".into()),
        )
        .init();

    let config = AppConfig::from_env()?;

    // ── Completion provider ───────────────────────────────────────────────────
    let provider = RigCompletionProvider::from_config(&config.provider)
        .context("Failed to build completion provider")?;
    match &config.provider {
        ProviderConfig::OpenAi { model, .. } => info!("Using OpenAI model {model}"),
        ProviderConfig::Ollama { base_url, model } => {
            info!("Using Ollama model {model} at {base_url}")
        }
    }

    let app = build_router(AppState::new(Arc::new(provider), &config.jwt_secret));

    // ── Listen ────────────────────────────────────────────────────────────────
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{addr}/");

    axum::serve(listener, app).await?;
    Ok(())
}
