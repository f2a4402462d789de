//! Configuration loaded via `clap::Parser` with environment fallback,
//! following the teacher's `electionguard` CLI's derive-based argument
//! parsing.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "bulletinboard", about = "Bulletin Board service")]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "BB_LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: String,

    /// This service's own base URL, used only for logging.
    #[arg(long, env = "BB_API_URL", default_value = "http://127.0.0.1:8080")]
    pub self_url: String,

    /// Voting Server base URL, notified on `/receive-params` and key receipt.
    #[arg(long, env = "VS_API_URL")]
    pub vs_api_url: String,

    /// Tallying Server base URL, notified on `/receive-params` and key receipt.
    #[arg(long, env = "TS_API_URL")]
    pub ts_api_url: String,

    /// Registration Authority base URL, notified on key receipt.
    #[arg(long, env = "RA_API_URL")]
    pub ra_api_url: String,

    /// Directory the store snapshot is written to and loaded from.
    #[arg(long, env = "DATA_DIR", default_value = "./data/bulletinboard")]
    pub data_dir: PathBuf,
}

impl Config {
    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join("store.json")
    }
}
