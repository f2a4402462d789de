//! Thin wrapper over the Bulletin Board endpoints the Voting Server reads
//! from and writes to (§6).

use chrono::{DateTime, Utc};
use cryptocore::ballot::Ballot;
use cryptocore::el_gamal::PublicKey;
use cryptocore::model::{Candidate, GlobalInfo};
use serde::Deserialize;

use crate::error::VsResult;

#[derive(Deserialize)]
struct LastPreviousLast {
    last: Ballot,
    previous_last: Ballot,
}

pub async fn global_info(http: &reqwest::Client, bb: &str) -> VsResult<GlobalInfo> {
    Ok(http.get(format!("{bb}/public-keys-tsvs")).send().await?.error_for_status()?.json().await?)
}

pub async fn candidates(http: &reqwest::Client, bb: &str, election_id: &str) -> VsResult<Vec<Candidate>> {
    Ok(http
        .get(format!("{bb}/candidates"))
        .query(&[("election_id", election_id)])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?)
}

pub async fn voter_public_key(http: &reqwest::Client, bb: &str, voter_id: &str, election_id: &str) -> VsResult<PublicKey> {
    Ok(http
        .get(format!("{bb}/voter-public-key"))
        .query(&[("voter_id", voter_id), ("election_id", election_id)])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?)
}

pub async fn last_previous_last(http: &reqwest::Client, bb: &str, voter_id: &str, election_id: &str) -> VsResult<(Ballot, Ballot)> {
    let resp: LastPreviousLast = http
        .get(format!("{bb}/last_previous_last_ballot"))
        .query(&[("voter_id", voter_id), ("election_id", election_id)])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok((resp.last, resp.previous_last))
}

pub async fn ballot_hashes(http: &reqwest::Client, bb: &str, election_id: &str) -> VsResult<Vec<String>> {
    Ok(http
        .get(format!("{bb}/fetch-ballot-hashes"))
        .query(&[("election_id", election_id)])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?)
}

/// POSTs to `/receive-ballot0` for `B0` entries, `/receive-ballot` otherwise.
pub async fn post_ballot(http: &reqwest::Client, bb: &str, ballot: &Ballot) -> VsResult<()> {
    let path = match ballot.kind {
        cryptocore::ballot::BallotKind::Initialization => "receive-ballot0",
        _ => "receive-ballot",
    };
    http.post(format!("{bb}/{path}")).json(ballot).send().await?.error_for_status()?;
    Ok(())
}
