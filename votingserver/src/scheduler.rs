//! The per-voter scheduler task loop (§4.3) and the bulk bootstrap that
//! kicks it off on receipt of a `B0` batch.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use cryptocore::ballot::Ballot;
use tracing::Instrument;

use crate::bb_client;
use crate::local_store::VoterKey;
use crate::obfuscate::build_obfuscation;
use crate::schedule;
use crate::state::AppState;
use crate::validate::validate_and_build;

/// Step (1)-(3) of §4.3's "Scheduler tasks": computes every voter's
/// schedule, stamps and posts their `B0`, and spawns the long-running
/// per-voter task.
pub async fn on_ballot0_batch(state: AppState, election_id: String, start: DateTime<Utc>, end: DateTime<Utc>, ballots: Vec<Ballot>) {
    for mut b0 in ballots {
        let voter_id = b0.voter_id.clone();
        let key: VoterKey = (voter_id.clone(), election_id.clone());

        let mut rng = rand::rngs::OsRng;
        let schedule = schedule::generate(start, end, state.config.schedule_votes_low, state.config.schedule_votes_high, &mut rng);
        state.local_store.insert_schedule(key.clone(), schedule).await;

        let slot = state.local_store.take_next_unprocessed(&key).await;
        if let Some(slot) = slot {
            b0.timestamp = slot.timestamp;
            b0.image_path = Some(slot.image_path);
        }
        if let Err(err) = bb_client::post_ballot(&state.http, &state.config.bb_api_url, &b0).await {
            tracing::error!(%voter_id, %election_id, error = %err, "failed to post B0");
            continue;
        }

        let task_state = state.clone();
        let task_election = election_id.clone();
        let span = tracing::info_span!("voter_schedule", voter_id = %voter_id, election_id = %election_id);
        tokio::spawn(per_voter_loop(task_state, voter_id, task_election, start, end).instrument(span));
    }
}

async fn sleep_until(state: &AppState, target: DateTime<Utc>) {
    let delta = target - state.clock.now();
    if let Ok(std_delta) = delta.to_std() {
        tokio::time::sleep(std_delta).await;
    }
}

/// §4.3's "Per-voter task loop": sleeps to each scheduled slot in turn,
/// calling `cast_vote` at each one, and finishes with one closing
/// obfuscation using the reserved `end + 60s` slot.
async fn per_voter_loop(state: AppState, voter_id: String, election_id: String, start: DateTime<Utc>, end: DateTime<Utc>) {
    sleep_until(&state, start).await;
    let key: VoterKey = (voter_id.clone(), election_id.clone());

    loop {
        let now = state.clock.now();
        if now > end {
            break;
        }
        let Some(next) = state.local_store.next_unprocessed(&key).await else {
            break;
        };
        if next.timestamp > end {
            sleep_until(&state, end + ChronoDuration::seconds(1)).await;
            break;
        }
        sleep_until(&state, next.timestamp).await;

        if let Err(err) = cast_vote(&state, &voter_id, &election_id).await {
            tracing::warn!(%voter_id, %election_id, error = %err, "tick failed, nothing emitted this round");
        }
    }

    if let Err(err) = cast_closing_obfuscation(&state, &voter_id, &election_id).await {
        tracing::error!(%voter_id, %election_id, error = %err, "failed to post closing obfuscation");
    }
}

/// §4.3 step 4: atomically read-and-delete any pending vote; validate it if
/// present, otherwise fabricate an obfuscation; stamp with the next
/// unprocessed schedule slot either way.
async fn cast_vote(state: &AppState, voter_id: &str, election_id: &str) -> anyhow::Result<()> {
    let key: VoterKey = (voter_id.to_string(), election_id.to_string());
    let mut rng = rand::rngs::OsRng;

    let mut ballot = match state.local_store.take_pending(&key).await {
        Some(pending) => match validate_and_build(state, voter_id, election_id, pending).await {
            Ok(ballot) => ballot,
            Err(err) => {
                tracing::warn!(%voter_id, %election_id, error = %err, "submitted ballot failed validation, discarding");
                return Ok(());
            }
        },
        None => build_obfuscation(state, voter_id, election_id, &mut rng).await?,
    };

    if let Some(slot) = state.local_store.take_next_unprocessed(&key).await {
        ballot.timestamp = slot.timestamp;
        ballot.image_path = Some(slot.image_path);
    }
    bb_client::post_ballot(&state.http, &state.config.bb_api_url, &ballot).await?;
    Ok(())
}

async fn cast_closing_obfuscation(state: &AppState, voter_id: &str, election_id: &str) -> anyhow::Result<()> {
    let key: VoterKey = (voter_id.to_string(), election_id.to_string());
    let mut rng = rand::rngs::OsRng;
    let mut ballot = build_obfuscation(state, voter_id, election_id, &mut rng).await?;
    if let Some(slot) = state.local_store.take_next_unprocessed(&key).await {
        ballot.timestamp = slot.timestamp;
        ballot.image_path = Some(slot.image_path);
    }
    bb_client::post_ballot(&state.http, &state.config.bb_api_url, &ballot).await?;
    Ok(())
}
