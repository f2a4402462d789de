//! Per-voter schedule generation (§4.3): a timeline of (timestamp, image)
//! slots covering `[start, end]`, plus one extra closing slot at `end + 60s`
//! reserved for a final obfuscation.

use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::config::IMAGE_POOL;

#[derive(Clone, Debug)]
pub struct ScheduleEntry {
    pub timestamp: DateTime<Utc>,
    pub image_path: String,
    pub processed: bool,
}

/// Draws a schedule for one voter. `votes_low`/`votes_high` bound the
/// `DiscreteUniform` vote-count draw that calibrates the mean inter-ballot
/// interval; inter-ballot durations are then drawn from `N(mu, mu/3)` and
/// accepted only in `[5s, 2*mu)`, matching §4.3 exactly.
pub fn generate(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    votes_low: u32,
    votes_high: u32,
    rng: &mut impl Rng,
) -> Vec<ScheduleEntry> {
    let window_seconds = (end - start).num_seconds().max(1) as f64;
    let vote_amount = rng.random_range(votes_low..=votes_high).max(1) as f64;
    let mu = (window_seconds / vote_amount).max(1.0);
    let sigma = mu / 3.0;
    let normal = Normal::new(mu, sigma).unwrap_or(Normal::new(mu, 1.0).expect("mu is finite"));

    let mut images: Vec<&str> = IMAGE_POOL.to_vec();
    images.shuffle(rng);
    let mut image_cycle = images.into_iter().cycle();

    let mut entries = Vec::new();
    let mut cursor = start;
    while cursor < end {
        let delta = loop {
            let sample = normal.sample(rng);
            if sample >= 5.0 && sample < 2.0 * mu {
                break sample;
            }
        };
        cursor += Duration::milliseconds((delta * 1000.0) as i64);
        let slot = if cursor > end { end } else { cursor };
        entries.push(ScheduleEntry {
            timestamp: slot,
            #[allow(clippy::unwrap_used)]
            image_path: image_cycle.next().unwrap().to_string(),
            processed: false,
        });
        if slot == end {
            break;
        }
    }

    entries.push(ScheduleEntry {
        timestamp: end + Duration::seconds(60),
        #[allow(clippy::unwrap_used)]
        image_path: image_cycle.next().unwrap().to_string(),
        processed: false,
    });
    entries
}
