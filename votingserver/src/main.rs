//! Voting Server binary: schedules and emits each voter's ballot stream,
//! obfuscating ticks with no real submission so a coercer watching the
//! Bulletin Board cannot tell a real vote from a decoy (§4.3/§4.4).

mod bb_client;
mod clock;
mod config;
mod error;
mod local_store;
mod obfuscate;
mod routes;
mod schedule;
mod scheduler;
mod state;
mod validate;

use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "votingserver=info,tower_http=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();
    tracing::info!(listen = %config.listen, "starting voting server");

    let state = AppState::new(config.clone())?;

    let app = routes::router(state);
    let listener = tokio::net::TcpListener::bind(&config.listen).await?;
    axum::serve(listener, app.layer(TraceLayer::new_for_http())).await?;

    Ok(())
}
