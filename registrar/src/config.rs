use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "registrar", about = "Registration Authority service")]
pub struct Config {
    #[arg(long, env = "RA_LISTEN", default_value = "0.0.0.0:8081")]
    pub listen: String,

    #[arg(long, env = "BB_API_URL")]
    pub bb_api_url: String,

    #[arg(long, env = "VS_API_URL")]
    pub vs_api_url: String,

    #[arg(long, env = "TS_API_URL")]
    pub ts_api_url: String,

    /// Directory holding per-voter secret keys and election description
    /// files to load (`elections/load-file?name` resolves `name` under here).
    #[arg(long, env = "DATA_DIR", default_value = "./data/registrar")]
    pub data_dir: PathBuf,
}

impl Config {
    pub fn keystore_path(&self, election_id: &str) -> PathBuf {
        self.data_dir.join("keys").join(format!("{election_id}.json"))
    }

    pub fn election_file_path(&self, name: &str) -> PathBuf {
        self.data_dir.join("elections").join(name)
    }
}
