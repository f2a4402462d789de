//! Tallying Server binary: waits out each election's end-plus-grace-period,
//! aggregates the last ballot per voter per candidate, recovers the vote
//! count by discrete-log search, and publishes a verifiable result (§4.5).

mod bb_client;
mod config;
mod error;
mod routes;
mod scheduler;
mod state;
mod tally;

use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "tallyserver=info,tower_http=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();
    tracing::info!(listen = %config.listen, "starting tallying server");

    let state = AppState::new(config.clone())?;

    let app = routes::router(state);
    let listener = tokio::net::TcpListener::bind(&config.listen).await?;
    axum::serve(listener, app.layer(TraceLayer::new_for_http())).await?;

    Ok(())
}
