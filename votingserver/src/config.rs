use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "votingserver", about = "Voting Server")]
pub struct Config {
    #[arg(long, env = "VS_LISTEN", default_value = "0.0.0.0:8082")]
    pub listen: String,

    #[arg(long, env = "BB_API_URL")]
    pub bb_api_url: String,

    /// Where `sk_vs` is persisted as base64 JSON, per §6's "one JSON file per
    /// TS/VS holding the private key".
    #[arg(long, env = "DATA_DIR", default_value = "./data/votingserver")]
    pub data_dir: PathBuf,

    /// Lower/upper bound of the `DiscreteUniform[low, high]` vote-count draw
    /// used to calibrate each voter's schedule (§4.3).
    #[arg(long, env = "VS_SCHEDULE_VOTES_LOW", default_value_t = 8)]
    pub schedule_votes_low: u32,

    #[arg(long, env = "VS_SCHEDULE_VOTES_HIGH", default_value_t = 24)]
    pub schedule_votes_high: u32,
}

impl Config {
    pub fn secret_key_path(&self) -> PathBuf {
        self.data_dir.join("sk_vs.json")
    }
}

/// Pool of memorable image filenames a voter is assigned one-per-slot from,
/// independently shuffled per voter (§4.3).
pub const IMAGE_POOL: &[&str] = &[
    "lighthouse.png",
    "compass.png",
    "anchor.png",
    "harbor.png",
    "sextant.png",
    "tide.png",
    "beacon.png",
    "schooner.png",
    "driftwood.png",
    "starfish.png",
];
