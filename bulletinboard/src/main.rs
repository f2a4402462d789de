//! Bulletin Board binary: the single source of truth for elections,
//! ballots, keys and results. Following `mef-api::main`'s shape of
//! tracing-init, config-load, router-merge, `axum::serve`.

mod config;
mod error;
mod routes;
mod state;
mod store;

use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "bulletinboard=info,tower_http=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();
    tracing::info!(listen = %config.listen, "starting bulletin board");

    let state = AppState::new(config.clone())?;

    let app = routes::router(state);
    let listener = tokio::net::TcpListener::bind(&config.listen).await?;
    axum::serve(listener, app.layer(TraceLayer::new_for_http())).await?;

    Ok(())
}
