//! Shared application state, following `mef-api::state::AppState`'s shape:
//! config plus the service's core data, wrapped for cheap `Clone` across
//! axum handlers.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::Config;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<RwLock<Store>>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let store = if config.snapshot_path().exists() {
            let bytes = util::file::read(&config.snapshot_path())?;
            let snapshot = serde_json::from_slice(&bytes)?;
            Store::from_snapshot(snapshot)
        } else {
            Store::default()
        };
        Ok(AppState {
            config: Arc::new(config),
            store: Arc::new(RwLock::new(store)),
            http: reqwest::Client::new(),
        })
    }

    /// Persists the current store to `DATA_DIR`. Called after every mutating
    /// request; failures are logged, not propagated -- a missed snapshot
    /// write does not fail the triggering HTTP request.
    pub async fn persist(&self) {
        let snapshot = self.store.read().await.snapshot();
        let path = self.config.snapshot_path();
        let result = tokio::task::spawn_blocking(move || {
            let bytes = serde_json::to_vec_pretty(&snapshot)?;
            util::file::write_atomic(&path, &bytes)
        })
        .await;
        match result {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::warn!(%err, "failed to persist bulletin board snapshot"),
            Err(err) => tracing::warn!(%err, "snapshot persist task panicked"),
        }
    }

    /// Fire-and-forget notification, per §4.1: failures are logged and never
    /// fail the triggering request.
    pub fn notify(&self, url: String) {
        let http = self.http.clone();
        tokio::spawn(async move {
            if let Err(err) = http.get(&url).send().await {
                tracing::warn!(%err, %url, "notification delivery failed");
            }
        });
    }
}
