//! Thin wrapper over the Bulletin Board endpoints the Tallying Server reads
//! from and writes to (§6, §4.5).

use cryptocore::el_gamal::Ciphertext;
use cryptocore::model::{Election, ElectionResult, Voter};
use serde::Deserialize;

use crate::error::TsResult;

/// `POST /send-election-startdate {electionid}` per §6. BB's reply carries
/// the full election alongside the literal `start` field (see
/// `bulletinboard::routes::elections::send_election_startdate`), which is
/// what lets TS learn `end` without an endpoint the design never names.
#[derive(Deserialize)]
struct StartdateResponse {
    election: Election,
}

pub async fn election(http: &reqwest::Client, bb: &str, election_id: &str) -> TsResult<Election> {
    Ok(http
        .post(format!("{bb}/send-election-startdate"))
        .json(&serde_json::json!({ "electionid": election_id }))
        .send()
        .await?
        .error_for_status()?
        .json::<StartdateResponse>()
        .await?
        .election)
}

pub async fn candidates(http: &reqwest::Client, bb: &str, election_id: &str) -> TsResult<Vec<cryptocore::model::Candidate>> {
    Ok(http
        .get(format!("{bb}/candidates"))
        .query(&[("election_id", election_id)])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?)
}

pub async fn voters(http: &reqwest::Client, bb: &str, election_id: &str) -> TsResult<Vec<Voter>> {
    Ok(http
        .get(format!("{bb}/voters"))
        .query(&[("election_id", election_id)])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?)
}

#[derive(Deserialize)]
pub struct LastCtv {
    pub voter_id: String,
    pub ctv: Vec<Ciphertext>,
}

pub async fn fetch_last_ballot_ctvs(http: &reqwest::Client, bb: &str, election_id: &str) -> TsResult<Vec<LastCtv>> {
    Ok(http
        .get(format!("{bb}/fetch_last_ballot_ctvs"))
        .query(&[("election_id", election_id)])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?)
}

pub async fn post_election_result(http: &reqwest::Client, bb: &str, result: &ElectionResult) -> TsResult<()> {
    http.post(format!("{bb}/receive-election-result")).json(result).send().await?.error_for_status()?;
    Ok(())
}
