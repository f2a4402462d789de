use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use cryptocore::el_gamal::{PublicKey, SecretKey};
use cryptocore::group::GroupParameters;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::clock::{CachedClock, Clock};
use crate::config::Config;
use crate::local_store::LocalStore;

#[derive(Serialize, Deserialize)]
struct KeyFile {
    secret_key: SecretKey,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub http: reqwest::Client,
    pub local_store: Arc<LocalStore>,
    pub clock: Arc<dyn Clock>,
    pub group: Arc<RwLock<Option<GroupParameters>>>,
    pub secret_key: Arc<SecretKey>,
    pub public_key: PublicKey,
    /// Election windows, cached from each `/ballot0list` payload so the
    /// ballot-receiving endpoint can gate on `start <= now <= end` without a
    /// round trip to BB on every submission.
    pub election_windows: Arc<RwLock<HashMap<String, (DateTime<Utc>, DateTime<Utc>)>>>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        let secret_key = load_or_create_key(&config.secret_key_path())?;
        let public_key = secret_key.public_key();
        let cached_clock = CachedClock::new();
        cached_clock.spawn_updater();
        Ok(AppState {
            config: Arc::new(config),
            http: reqwest::Client::new(),
            local_store: Arc::new(LocalStore::new()),
            clock: cached_clock,
            group: Arc::new(RwLock::new(None)),
            secret_key: Arc::new(secret_key),
            public_key,
            election_windows: Arc::new(RwLock::new(HashMap::new())),
        })
    }
}

fn load_or_create_key(path: &Path) -> anyhow::Result<SecretKey> {
    if path.exists() {
        let bytes = util::file::read(path)?;
        let file: KeyFile = serde_json::from_slice(&bytes)?;
        return Ok(file.secret_key);
    }
    let mut rng = rand::rngs::OsRng;
    let secret_key = SecretKey::random(&mut rng);
    let file = KeyFile { secret_key: secret_key.clone() };
    util::file::write_atomic(path, &serde_json::to_vec_pretty(&file)?)?;
    Ok(secret_key)
}
