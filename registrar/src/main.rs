//! Registration Authority binary: publishes group parameters, hands out
//! per-election voter keypairs, and stages each voter's B0 ballot (§4.2).

mod bootstrap;
mod config;
mod error;
mod keystore;
mod routes;
mod state;

use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "registrar=info,tower_http=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();
    tracing::info!(listen = %config.listen, "starting registration authority");

    let state = AppState::new(config.clone());
    bootstrap::run(&state).await?;

    let app = routes::router(state);
    let listener = tokio::net::TcpListener::bind(&config.listen).await?;
    axum::serve(listener, app.layer(TraceLayer::new_for_http())).await?;

    Ok(())
}
