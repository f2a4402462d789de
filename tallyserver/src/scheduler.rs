//! §4.5 step 1: on receipt of an electionId notification, sleep until the
//! election's end plus the grace period, then tally and publish.

use tracing::Instrument;

use crate::bb_client;
use crate::state::AppState;
use crate::tally::tally_election;

pub fn spawn_tally_task(state: AppState, election_id: String) {
    let span = tracing::info_span!("tally_election", election_id = %election_id);
    tokio::spawn(run(state, election_id).instrument(span));
}

async fn run(state: AppState, election_id: String) {
    let bb = state.config.bb_api_url.clone();

    let election = match bb_client::election(&state.http, &bb, &election_id).await {
        Ok(e) => e,
        Err(err) => {
            tracing::error!(error = %err, "could not fetch election, tallying abandoned");
            return;
        }
    };

    let grace = chrono::Duration::seconds(state.config.grace_period_seconds as i64);
    let target = election.end + grace;
    let now = chrono::Utc::now();
    if let Ok(delta) = (target - now).to_std() {
        tokio::time::sleep(delta).await;
    }

    if let Err(err) = tally_and_publish(&state, &bb, &election_id).await {
        tracing::error!(error = %err, "tally failed");
    }
}

async fn tally_and_publish(state: &AppState, bb: &str, election_id: &str) -> anyhow::Result<()> {
    let candidates = bb_client::candidates(&state.http, bb, election_id).await?;
    let voters = bb_client::voters(&state.http, bb, election_id).await?;
    let last_ctvs = bb_client::fetch_last_ballot_ctvs(&state.http, bb, election_id).await?;

    let mut rng = rand::rngs::OsRng;
    let result = tally_election(election_id, &candidates, &last_ctvs, voters.len(), state.secret_key.scalar(), &mut rng)?;

    // Self-check with the same verifier a voter would run, before publishing:
    // a proof that doesn't verify here never should under correct BB data,
    // but publishing an unverifiable result would be worse than refusing to.
    let last_ctv_lists: Vec<Vec<cryptocore::el_gamal::Ciphertext>> = last_ctvs.iter().map(|e| e.ctv.clone()).collect();
    verifier::verify_tally(&last_ctv_lists, &result)?;

    bb_client::post_election_result(&state.http, bb, &result).await?;
    tracing::info!(%election_id, num_candidates = candidates.len(), num_voters = voters.len(), "published election result");
    Ok(())
}
