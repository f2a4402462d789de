//! Configuration loaded via `clap::Parser` with environment fallback,
//! following the sibling services' `Config` shape (§6's `BB_API_URL` and
//! per-service `DATA_DIR`/listen address).

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "tallyserver", about = "Tallying Server")]
pub struct Config {
    #[arg(long, env = "TS_LISTEN", default_value = "0.0.0.0:8083")]
    pub listen: String,

    #[arg(long, env = "BB_API_URL")]
    pub bb_api_url: String,

    /// Where `sk_ts` is persisted as base64 JSON, per §6's "one JSON file
    /// per TS/VS holding the private key".
    #[arg(long, env = "DATA_DIR", default_value = "./data/tallyserver")]
    pub data_dir: PathBuf,

    /// Grace period after an election's `end` before tallying begins, an
    /// §9 Open Question resolved as a configuration knob (default 60s,
    /// matching the larger of the two hardcoded values the upstream
    /// reference used).
    #[arg(long, env = "TS_GRACE_PERIOD_SECONDS", default_value_t = 60)]
    pub grace_period_seconds: u64,
}

impl Config {
    pub fn secret_key_path(&self) -> PathBuf {
        self.data_dir.join("sk_ts.json")
    }
}
