//! The per-election local key-value store named in spec §4.2/§6: one JSON
//! file under `DATA_DIR` holding every voter's `(publicKey, secretKey)` for
//! that election, written with `util::file::write_atomic`.

use std::collections::HashMap;
use std::path::Path;

use cryptocore::el_gamal::{PublicKey, SecretKey};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
struct VoterKeyRecord {
    voter_id: String,
    public_key: PublicKey,
    secret_key: SecretKey,
}

#[derive(Default)]
pub struct Keystore {
    entries: HashMap<String, (PublicKey, SecretKey)>,
}

impl Keystore {
    pub fn load(path: &Path) -> anyhow::Result<Keystore> {
        if !path.exists() {
            return Ok(Keystore::default());
        }
        let bytes = util::file::read(path)?;
        let records: Vec<VoterKeyRecord> = serde_json::from_slice(&bytes)?;
        let entries = records.into_iter().map(|r| (r.voter_id, (r.public_key, r.secret_key))).collect();
        Ok(Keystore { entries })
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let records: Vec<VoterKeyRecord> = self
            .entries
            .iter()
            .map(|(voter_id, (public_key, secret_key))| VoterKeyRecord {
                voter_id: voter_id.clone(),
                public_key: *public_key,
                secret_key: secret_key.clone(),
            })
            .collect();
        let bytes = serde_json::to_vec_pretty(&records)?;
        util::file::write_atomic(path, &bytes)
    }

    pub fn insert(&mut self, voter_id: String, public_key: PublicKey, secret_key: SecretKey) {
        self.entries.insert(voter_id, (public_key, secret_key));
    }

    pub fn get(&self, voter_id: &str) -> Option<&(PublicKey, SecretKey)> {
        self.entries.get(voter_id)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("election-1.json");

        let mut rng = rand::rngs::OsRng;
        let mut store = Keystore::default();
        let sk = SecretKey::random(&mut rng);
        store.insert("voter-1".into(), sk.public_key(), sk.clone());
        store.save(&path).expect("save");

        let loaded = Keystore::load(&path).expect("load");
        let (pk, loaded_sk) = loaded.get("voter-1").expect("entry present");
        assert_eq!(*pk, sk.public_key());
        assert_eq!(loaded_sk.scalar().to_bytes(), sk.scalar().to_bytes());
    }
}
