//! The Bulletin Board's durable store: a relational-shaped structure held
//! entirely in memory behind a single `RwLock`, snapshotted to disk after
//! every mutation. Grounded on the absence of any SQL crate anywhere in the
//! retrieval pack (see SPEC_FULL.md's ambient-stack section): rather than
//! introduce an ungrounded database dependency, the schema in spec §4.1 is
//! realised directly as Rust collections, one per table, with the same
//! idempotent-insert and hash-uniqueness guarantees a real schema would give
//! for free.

use std::collections::{HashMap, HashSet};

use cryptocore::ballot::Ballot;
use cryptocore::el_gamal::{Ciphertext, PublicKey};
use cryptocore::model::{Election, ElectionResult, GlobalInfo, ServiceKind, Voter};
use serde::{Deserialize, Serialize};

/// `(voterId, electionId)` -- the key every per-voter table in §4.1 is keyed on.
pub type VoterElectionKey = (String, String);

#[derive(Default)]
pub struct Store {
    elections: HashMap<String, Election>,
    /// `VoterParticipatesInElection(voterId, electionId, publicKey)`.
    voter_keys: HashMap<VoterElectionKey, PublicKey>,
    /// `VoterCastsBallot` joined with `Ballots`, ordered by timestamp per CBR.
    cbrs: HashMap<VoterElectionKey, Vec<Ballot>>,
    /// Ballot hash uniqueness, enforced independently of per-CBR storage
    /// since a hash collision must be caught even across voters.
    ballot_hashes: HashSet<String>,
    /// `CandidateRunsInElection.result/tallyProof`, keyed by electionId.
    results: HashMap<String, ElectionResult>,
    global_info: GlobalInfo,
}

impl Store {
    pub fn global_info(&self) -> GlobalInfo {
        self.global_info.clone()
    }

    pub fn receive_params(&mut self, group: cryptocore::group::GroupParameters) {
        self.global_info.group = Some(group);
    }

    pub fn receive_public_key(&mut self, service: ServiceKind, key: PublicKey) {
        match service {
            ServiceKind::TallyingServer => self.global_info.public_key_tallying_server = Some(key),
            ServiceKind::VotingServer => self.global_info.public_key_voting_server = Some(key),
        }
    }

    pub fn receive_election(&mut self, election: Election) {
        // ON CONFLICT DO NOTHING: an election id already on BB keeps its
        // original row -- RA retries are idempotent, not overwriting.
        self.elections.entry(election.id.clone()).or_insert(election);
    }

    pub fn election(&self, election_id: &str) -> Option<&Election> {
        self.elections.get(election_id)
    }

    pub fn candidates(&self, election_id: &str) -> Option<&[cryptocore::model::Candidate]> {
        self.elections.get(election_id).map(|e| e.candidates.as_slice())
    }

    pub fn voters(&self, election_id: &str) -> Option<&[Voter]> {
        self.elections.get(election_id).map(|e| e.voters.as_slice())
    }

    pub fn elections_for_voter(&self, voter_id: &str) -> Vec<&Election> {
        self.elections
            .values()
            .filter(|e| e.voters.iter().any(|v| v.id == voter_id))
            .collect()
    }

    pub fn receive_voter_keys(&mut self, election_id: &str, entries: Vec<cryptocore::model::VoterKeyEntry>) {
        for entry in entries {
            self.voter_keys
                .entry((entry.voter_id, election_id.to_string()))
                .or_insert(entry.public_key);
        }
    }

    pub fn voter_public_key(&self, voter_id: &str, election_id: &str) -> Option<PublicKey> {
        self.voter_keys.get(&(voter_id.to_string(), election_id.to_string())).copied()
    }

    fn cbr_key(voter_id: &str, election_id: &str) -> VoterElectionKey {
        (voter_id.to_string(), election_id.to_string())
    }

    pub fn cbr(&self, voter_id: &str, election_id: &str) -> &[Ballot] {
        static EMPTY: &[Ballot] = &[];
        self.cbrs.get(&Self::cbr_key(voter_id, election_id)).map_or(EMPTY, |v| v.as_slice())
    }

    pub fn cbr_length(&self, voter_id: &str, election_id: &str) -> usize {
        self.cbr(voter_id, election_id).len()
    }

    /// Inserts a ballot, idempotently (a duplicate hash is silently
    /// absorbed, per §7's integrity-error handling) and keeps each CBR
    /// sorted by timestamp as it accumulates, matching BB's `(voterId,
    /// timestamp)` ordering guarantee.
    pub fn receive_ballot(&mut self, ballot: Ballot) {
        if self.ballot_hashes.contains(&ballot.hash) {
            return;
        }
        self.ballot_hashes.insert(ballot.hash.clone());
        let key = Self::cbr_key(&ballot.voter_id, &ballot.election_id);
        let cbr = self.cbrs.entry(key).or_default();
        let pos = cbr.partition_point(|b| b.timestamp <= ballot.timestamp);
        cbr.insert(pos, ballot);
    }

    /// The two most recent CBR rows, or the single row duplicated when only
    /// `B0` exists.
    pub fn last_previous_last_ballot(&self, voter_id: &str, election_id: &str) -> Option<(&Ballot, &Ballot)> {
        let cbr = self.cbr(voter_id, election_id);
        let last = cbr.last()?;
        let previous_last = if cbr.len() >= 2 { &cbr[cbr.len() - 2] } else { last };
        Some((last, previous_last))
    }

    /// The two rows immediately preceding `t` (strictly less than), or the
    /// single preceding row duplicated, matching `last_previous_last_ballot`'s
    /// B0-duplication behaviour for the analogous "as of a point in time" query.
    pub fn preceding_ballots(&self, voter_id: &str, election_id: &str, t: chrono::DateTime<chrono::Utc>) -> Option<(&Ballot, &Ballot)> {
        let cbr = self.cbr(voter_id, election_id);
        let before: Vec<&Ballot> = cbr.iter().filter(|b| b.timestamp < t).collect();
        let last = *before.last()?;
        let previous_last = if before.len() >= 2 { before[before.len() - 2] } else { last };
        Some((last, previous_last))
    }

    pub fn ballot_hashes(&self, election_id: &str) -> Vec<String> {
        self.cbrs
            .iter()
            .filter(|((_, eid), _)| eid == election_id)
            .flat_map(|(_, cbr)| cbr.iter().map(|b| b.hash.clone()))
            .collect()
    }

    pub fn ballot_by_image(&self, election_id: &str, voter_id: &str, image_filename: &str) -> Option<&Ballot> {
        self.cbr(voter_id, election_id)
            .iter()
            .find(|b| b.image_path.as_deref() == Some(image_filename))
    }

    /// The input to tallying: each distinct voter's most recent ballot's `ctv`.
    pub fn fetch_last_ballot_ctvs(&self, election_id: &str) -> Vec<(String, Vec<Ciphertext>)> {
        self.cbrs
            .iter()
            .filter(|((_, eid), _)| eid == election_id)
            .filter_map(|((voter_id, _), cbr)| cbr.last().map(|b| (voter_id.clone(), b.ctv.clone())))
            .collect()
    }

    pub fn receive_election_result(&mut self, result: ElectionResult) {
        self.results.entry(result.election_id.clone()).or_insert(result);
    }

    pub fn election_result(&self, election_id: &str) -> Option<&ElectionResult> {
        self.results.get(election_id)
    }

    /// Flattens the map-keyed tables into JSON-friendly record lists for
    /// disk persistence (a `HashMap` keyed on a tuple has no JSON object
    /// representation) and rebuilds them symmetrically on load.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            elections: self.elections.values().cloned().collect(),
            voter_keys: self
                .voter_keys
                .iter()
                .map(|((voter_id, election_id), public_key)| VoterKeyRecord {
                    voter_id: voter_id.clone(),
                    election_id: election_id.clone(),
                    public_key: *public_key,
                })
                .collect(),
            cbrs: self
                .cbrs
                .iter()
                .map(|((voter_id, election_id), ballots)| CbrRecord {
                    voter_id: voter_id.clone(),
                    election_id: election_id.clone(),
                    ballots: ballots.clone(),
                })
                .collect(),
            results: self.results.values().cloned().collect(),
            global_info: self.global_info.clone(),
        }
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Store {
        let mut store = Store {
            elections: snapshot.elections.into_iter().map(|e| (e.id.clone(), e)).collect(),
            voter_keys: snapshot
                .voter_keys
                .into_iter()
                .map(|r| ((r.voter_id, r.election_id), r.public_key))
                .collect(),
            ballot_hashes: HashSet::new(),
            cbrs: HashMap::new(),
            results: snapshot.results.into_iter().map(|r| (r.election_id.clone(), r)).collect(),
            global_info: snapshot.global_info,
        };
        for record in snapshot.cbrs {
            for ballot in &record.ballots {
                store.ballot_hashes.insert(ballot.hash.clone());
            }
            store.cbrs.insert((record.voter_id, record.election_id), record.ballots);
        }
        store
    }
}

#[derive(Serialize, Deserialize)]
pub struct Snapshot {
    elections: Vec<Election>,
    voter_keys: Vec<VoterKeyRecord>,
    cbrs: Vec<CbrRecord>,
    results: Vec<ElectionResult>,
    global_info: GlobalInfo,
}

#[derive(Serialize, Deserialize)]
struct VoterKeyRecord {
    voter_id: String,
    election_id: String,
    public_key: PublicKey,
}

#[derive(Serialize, Deserialize)]
struct CbrRecord {
    voter_id: String,
    election_id: String,
    ballots: Vec<Ballot>,
}

#[cfg(test)]
mod test {
    use super::*;
    use cryptocore::ballot::BallotKind;
    use cryptocore::el_gamal::SecretKey;
    use cryptocore::group::Scalar;
    use rand_core::CryptoRngCore;

    fn ballot(voter_id: &str, election_id: &str, kind: BallotKind, seconds: i64, rng: &mut impl CryptoRngCore) -> Ballot {
        let sk = SecretKey::random(rng);
        let ct = cryptocore::el_gamal::encrypt(sk.public_key(), 0, Scalar::random(rng));
        let mut b = Ballot {
            voter_id: voter_id.to_string(),
            election_id: election_id.to_string(),
            kind,
            upk: sk.public_key().0,
            ctv: vec![ct],
            ctlv: ct,
            ctlid: ct,
            proof: "{}".to_string(),
            timestamp: chrono::Utc::now() + chrono::Duration::seconds(seconds),
            hash: String::new(),
            image_path: None,
        };
        b.hash = cryptocore::hash::ballot_hash(&b).expect("hash");
        b
    }

    #[test]
    fn replayed_ballot_hash_is_rejected() {
        let mut rng = rand::rngs::OsRng;
        let mut store = Store::default();
        let b0 = ballot("v1", "e1", BallotKind::Initialization, 0, &mut rng);
        store.receive_ballot(b0.clone());
        assert_eq!(store.cbr_length("v1", "e1"), 1);

        // same hash posted again: CBR length must not change.
        store.receive_ballot(b0);
        assert_eq!(store.cbr_length("v1", "e1"), 1);
    }

    #[test]
    fn cbr_stays_sorted_by_timestamp_regardless_of_insertion_order() {
        let mut rng = rand::rngs::OsRng;
        let mut store = Store::default();
        let b0 = ballot("v1", "e1", BallotKind::Initialization, 0, &mut rng);
        let b1 = ballot("v1", "e1", BallotKind::RealVote, 60, &mut rng);
        let b2 = ballot("v1", "e1", BallotKind::Obfuscation, 120, &mut rng);

        store.receive_ballot(b2.clone());
        store.receive_ballot(b0.clone());
        store.receive_ballot(b1.clone());

        let cbr = store.cbr("v1", "e1");
        assert_eq!(cbr.len(), 3);
        assert_eq!(cbr[0].hash, b0.hash);
        assert_eq!(cbr[1].hash, b1.hash);
        assert_eq!(cbr[2].hash, b2.hash);
    }

    #[test]
    fn last_previous_last_duplicates_b0_until_a_second_ballot_exists() {
        let mut rng = rand::rngs::OsRng;
        let mut store = Store::default();
        let b0 = ballot("v1", "e1", BallotKind::Initialization, 0, &mut rng);
        store.receive_ballot(b0.clone());

        let (last, previous_last) = store.last_previous_last_ballot("v1", "e1").expect("b0 present");
        assert_eq!(last.hash, b0.hash);
        assert_eq!(previous_last.hash, b0.hash);

        let b1 = ballot("v1", "e1", BallotKind::RealVote, 60, &mut rng);
        store.receive_ballot(b1.clone());
        let (last, previous_last) = store.last_previous_last_ballot("v1", "e1").expect("two rows");
        assert_eq!(last.hash, b1.hash);
        assert_eq!(previous_last.hash, b0.hash);
    }

    #[test]
    fn fetch_last_ballot_ctvs_takes_only_the_newest_row_per_voter() {
        let mut rng = rand::rngs::OsRng;
        let mut store = Store::default();
        store.receive_ballot(ballot("v1", "e1", BallotKind::Initialization, 0, &mut rng));
        let newest = ballot("v1", "e1", BallotKind::RealVote, 60, &mut rng);
        store.receive_ballot(newest.clone());
        store.receive_ballot(ballot("v2", "e1", BallotKind::Initialization, 0, &mut rng));

        let ctvs = store.fetch_last_ballot_ctvs("e1");
        assert_eq!(ctvs.len(), 2);
        let v1_ctv = ctvs.iter().find(|(v, _)| v == "v1").expect("v1 present").1.clone();
        assert_eq!(v1_ctv.len(), newest.ctv.len());
    }

    #[test]
    fn receive_election_does_not_overwrite_an_existing_row() {
        let mut store = Store::default();
        let original = Election {
            id: "e1".into(),
            name: "Original".into(),
            start: chrono::Utc::now(),
            end: chrono::Utc::now(),
            candidates: vec![],
            voters: vec![],
        };
        let mut retried = original.clone();
        retried.name = "Retried".into();

        store.receive_election(original);
        store.receive_election(retried);

        assert_eq!(store.election("e1").expect("present").name, "Original");
    }

    #[test]
    fn snapshot_round_trips_cbrs_and_hash_uniqueness() {
        let mut rng = rand::rngs::OsRng;
        let mut store = Store::default();
        let b0 = ballot("v1", "e1", BallotKind::Initialization, 0, &mut rng);
        store.receive_ballot(b0.clone());

        let restored = Store::from_snapshot(store.snapshot());
        assert_eq!(restored.cbr_length("v1", "e1"), 1);

        let mut restored = restored;
        restored.receive_ballot(b0);
        assert_eq!(restored.cbr_length("v1", "e1"), 1);
    }
}
