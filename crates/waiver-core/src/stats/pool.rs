// Pool construction: left join of season stats with live metrics.

use std::collections::HashMap;

use tracing::{debug, info};

use super::fixtures::FixtureTable;
use super::live::LiveTable;
use super::season::SeasonRow;
use super::{LiveMetrics, PlayerRecord};
use crate::roster::{Owner, OwnershipIndex};

/// Minimum chance-of-playing percentage for a player to count as available.
pub const AVAILABLE_CHANCE_THRESHOLD: f64 = 75.0;

/// News phrases (matched case-insensitively) signalling a return to fitness.
pub const RETURNING_KEYWORDS: &[&str] = &[
    "back in training",
    "returned to training",
    "returning from injury",
    "match fit",
    "fit again",
    "passed fit",
    "recovered",
];

/// Build the player pool.
///
/// Every season-stats row yields one record (left join); rows without a
/// live-metrics match keep empty live fields. Season rows sharing a join key
/// are the same player: the last row's data wins, at the first row's place
/// in pool order. All records start out unowned.
pub fn load(
    season: Vec<SeasonRow>,
    live: Option<&LiveTable>,
    fixtures: Option<&FixtureTable>,
) -> Vec<PlayerRecord> {
    let mut pool: Vec<PlayerRecord> = Vec::with_capacity(season.len());
    let mut slot_by_key: HashMap<String, usize> = HashMap::with_capacity(season.len());
    let mut matched = 0usize;

    for row in season {
        let key = row.key();
        let mut live_metrics = LiveMetrics::default();
        if let Some(live_row) = live.and_then(|t| t.get(&key)) {
            matched += 1;
            live_metrics.status = live_row.status;
            live_metrics.chance_of_playing = live_row.chance_of_playing;
            live_metrics.news = live_row.news.clone();
            live_metrics.form = live_row.form;
            live_metrics.ict_index = live_row.ict_index;
        }
        live_metrics.fixture_ease = fixtures.and_then(|f| f.ease_for_club(&row.club));

        let record = PlayerRecord {
            available_next_round: is_available(&live_metrics),
            returning_from_injury: is_returning(live_metrics.news.as_deref()),
            name: row.name,
            key: key.clone(),
            club: row.club,
            position: row.position,
            season: row.metrics,
            live: live_metrics,
            owner: Owner::Unowned,
        };

        match slot_by_key.get(&key) {
            Some(&idx) => {
                debug!(
                    "duplicate season stats key '{}' ({} then {}); keeping the later row",
                    key, pool[idx].name, record.name
                );
                pool[idx] = record;
            }
            None => {
                slot_by_key.insert(key, pool.len());
                pool.push(record);
            }
        }
    }

    info!(
        "built player pool: {} players, {} with live metrics",
        pool.len(),
        matched
    );
    pool
}

/// Set each record's owner from the ownership index.
pub fn annotate_owners(pool: &mut [PlayerRecord], index: &OwnershipIndex) {
    for record in pool.iter_mut() {
        record.owner = index.owner_of(&record.key);
    }
}

/// Status active/doubtful, and chance of playing at least the threshold
/// (or not published).
fn is_available(live: &LiveMetrics) -> bool {
    let status_ok = live.status.is_some_and(|s| s.may_play());
    let chance_ok = live
        .chance_of_playing
        .map_or(true, |c| c >= AVAILABLE_CHANCE_THRESHOLD);
    status_ok && chance_ok
}

fn is_returning(news: Option<&str>) -> bool {
    let Some(news) = news else {
        return false;
    };
    let news = news.to_lowercase();
    RETURNING_KEYWORDS.iter().any(|kw| news.contains(kw))
}
