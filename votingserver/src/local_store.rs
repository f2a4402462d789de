//! The two local tables named in §4.3, behind one process-wide
//! `async_lock::Mutex` per the concurrency discipline in §5: every
//! read-modify-write on either table happens inside a single critical
//! section.

use std::collections::HashMap;

use async_lock::Mutex;
use cryptocore::el_gamal::{Ciphertext, PublicKey};

use crate::schedule::ScheduleEntry;

pub type VoterKey = (String, String);

/// A voter-submitted ballot buffered until the next scheduled slot emits it.
#[derive(Clone, Debug)]
pub struct PendingVote {
    pub public_key: PublicKey,
    pub ctv: Vec<Ciphertext>,
    pub ctlv: Ciphertext,
    pub ctlid: Ciphertext,
    pub proof: String,
}

#[derive(Default)]
struct Tables {
    schedules: HashMap<VoterKey, Vec<ScheduleEntry>>,
    pending: HashMap<VoterKey, PendingVote>,
}

#[derive(Default)]
pub struct LocalStore {
    tables: Mutex<Tables>,
}

impl LocalStore {
    pub fn new() -> Self {
        LocalStore::default()
    }

    pub async fn insert_schedule(&self, key: VoterKey, schedule: Vec<ScheduleEntry>) {
        self.tables.lock().await.schedules.insert(key, schedule);
    }

    /// Index (not a copy) of the earliest unprocessed row for `key`, if any.
    pub async fn next_unprocessed(&self, key: &VoterKey) -> Option<ScheduleEntry> {
        let tables = self.tables.lock().await;
        tables
            .schedules
            .get(key)
            .and_then(|rows| rows.iter().find(|r| !r.processed))
            .cloned()
    }

    /// Marks the earliest unprocessed row processed and returns it, or
    /// `None` if the schedule is exhausted.
    pub async fn take_next_unprocessed(&self, key: &VoterKey) -> Option<ScheduleEntry> {
        let mut tables = self.tables.lock().await;
        let rows = tables.schedules.get_mut(key)?;
        let entry = rows.iter_mut().find(|r| !r.processed)?;
        entry.processed = true;
        Some(entry.clone())
    }

    pub async fn set_pending(&self, key: VoterKey, vote: PendingVote) {
        self.tables.lock().await.pending.insert(key, vote);
    }

    /// Atomically reads and removes any pending vote for `key` (§4.3 step 4's
    /// "atomically read and then delete").
    pub async fn take_pending(&self, key: &VoterKey) -> Option<PendingVote> {
        self.tables.lock().await.pending.remove(key)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::Utc;

    fn entry(processed: bool) -> ScheduleEntry {
        ScheduleEntry { timestamp: Utc::now(), image_path: "x.png".into(), processed }
    }

    #[tokio::test]
    async fn take_next_unprocessed_marks_it_processed() {
        let store = LocalStore::new();
        let key = ("voter-1".to_string(), "election-1".to_string());
        store.insert_schedule(key.clone(), vec![entry(true), entry(false), entry(false)]).await;

        let first = store.take_next_unprocessed(&key).await.expect("entry");
        assert!(first.processed); // returned clone reflects the mutation just applied
        assert!(store.next_unprocessed(&key).await.is_some());

        store.take_next_unprocessed(&key).await;
        assert!(store.next_unprocessed(&key).await.is_none());
    }

    #[tokio::test]
    async fn pending_vote_round_trips_once() {
        let store = LocalStore::new();
        let key = ("voter-1".to_string(), "election-1".to_string());
        assert!(store.take_pending(&key).await.is_none());

        let mut rng = rand::rngs::OsRng;
        let sk = cryptocore::el_gamal::SecretKey::random(&mut rng);
        let ct = cryptocore::el_gamal::encrypt(sk.public_key(), 0, cryptocore::group::Scalar::random(&mut rng));
        store
            .set_pending(
                key.clone(),
                PendingVote { public_key: sk.public_key(), ctv: vec![ct], ctlv: ct, ctlid: ct, proof: "{}".into() },
            )
            .await;

        assert!(store.take_pending(&key).await.is_some());
        assert!(store.take_pending(&key).await.is_none());
    }

    /// A second submission before the scheduled tick consumes it overwrites
    /// the first: only the most recent voter-submitted choice survives.
    #[tokio::test]
    async fn set_pending_overwrites_an_earlier_unconsumed_submission() {
        let store = LocalStore::new();
        let key = ("voter-1".to_string(), "election-1".to_string());

        let mut rng = rand::rngs::OsRng;
        let sk = cryptocore::el_gamal::SecretKey::random(&mut rng);
        let ct_first = cryptocore::el_gamal::encrypt(sk.public_key(), 0, cryptocore::group::Scalar::random(&mut rng));
        let ct_second = cryptocore::el_gamal::encrypt(sk.public_key(), 1, cryptocore::group::Scalar::random(&mut rng));

        store
            .set_pending(key.clone(), PendingVote { public_key: sk.public_key(), ctv: vec![ct_first], ctlv: ct_first, ctlid: ct_first, proof: "first".into() })
            .await;
        store
            .set_pending(key.clone(), PendingVote { public_key: sk.public_key(), ctv: vec![ct_second], ctlv: ct_second, ctlid: ct_second, proof: "second".into() })
            .await;

        let consumed = store.take_pending(&key).await.expect("pending present");
        assert_eq!(consumed.proof, "second");
        assert!(store.take_pending(&key).await.is_none());
    }
}
