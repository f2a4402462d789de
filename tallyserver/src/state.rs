//! Shared application state, following `votingserver::state::AppState`'s
//! shape: a persisted service keypair plus a shared `reqwest::Client`, no
//! local relational store of its own (TS only reads BB, and writes back
//! exactly one `ElectionResult` per election at the end).

use std::path::Path;
use std::sync::Arc;

use cryptocore::el_gamal::{PublicKey, SecretKey};
use serde::{Deserialize, Serialize};

use crate::config::Config;

#[derive(Serialize, Deserialize)]
struct KeyFile {
    secret_key: SecretKey,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub http: reqwest::Client,
    pub secret_key: Arc<SecretKey>,
    pub public_key: PublicKey,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        let secret_key = load_or_create_key(&config.secret_key_path())?;
        let public_key = secret_key.public_key();
        Ok(AppState { config: Arc::new(config), http: reqwest::Client::new(), secret_key: Arc::new(secret_key), public_key })
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
