use std::collections::HashMap;
use std::sync::Arc;

use cryptocore::group::GroupParameters;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::keystore::Keystore;

/// Tracks which services have confirmed their public key has landed on BB,
/// per §4.2 step 1 and Design Notes §9's "replace the global mutable cache
/// with an explicit state struct".
#[derive(Default, Clone, Copy)]
pub struct ReceivedKeys {
    pub vs: bool,
    pub ts: bool,
}

impl ReceivedKeys {
    pub fn ready(&self) -> bool {
        self.vs && self.ts
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub http: reqwest::Client,
    pub group: Arc<RwLock<Option<GroupParameters>>>,
    pub received_keys: Arc<RwLock<ReceivedKeys>>,
    pub keystores: Arc<RwLock<HashMap<String, Keystore>>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        AppState {
            config: Arc::new(config),
            http: reqwest::Client::new(),
            group: Arc::new(RwLock::new(None)),
            received_keys: Arc::new(RwLock::new(ReceivedKeys::default())),
            keystores: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Loads (or lazily creates) the on-disk keystore for `election_id`,
    /// caching it in memory for the rest of the process lifetime.
    pub async fn keystore_for(&self, election_id: &str) -> anyhow::Result<()> {
        let mut keystores = self.keystores.write().await;
        if !keystores.contains_key(election_id) {
            let path = self.config.keystore_path(election_id);
            keystores.insert(election_id.to_string(), Keystore::load(&path)?);
        }
        Ok(())
    }
}
