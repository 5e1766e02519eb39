// Player pool: season stats joined with live availability/form metrics.

pub mod fixtures;
pub mod live;
pub mod pool;
pub mod season;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::position::Position;
use crate::roster::Owner;

pub use fixtures::{club_short_code, FixtureTable};
pub use live::{Availability, LiveRow, LiveTable};
pub use pool::{annotate_owners, load};
pub use season::SeasonRow;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("season stats have no player name column (headers: {headers})")]
    MissingNameColumn { headers: String },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("payload has no `{field}` list")]
    MissingList { field: &'static str },
}

// ---------------------------------------------------------------------------
// Player record
// ---------------------------------------------------------------------------

/// Live, per-round metrics. Every field is optional: the live feed may be
/// absent entirely, or may have no row matching a season-stats player.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LiveMetrics {
    pub status: Option<Availability>,
    /// Chance of playing next round, in percent.
    pub chance_of_playing: Option<f64>,
    pub news: Option<String>,
    pub form: Option<f64>,
    /// Influence/creativity/threat index.
    pub ict_index: Option<f64>,
    /// `6 - difficulty` of the club's next fixture (1 = hardest, 5 = easiest).
    pub fixture_ease: Option<f64>,
}

/// One player in the unified pool.
///
/// Built once per pool snapshot and read-only afterwards, apart from
/// [`annotate_owners`] which fills in `owner`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub name: String,
    /// Join key: `name_key::normalize(name)`.
    pub key: String,
    pub club: String,
    pub position: Option<Position>,
    /// Season aggregates keyed by the column vocabulary in [`season`].
    pub season: HashMap<String, f64>,
    pub live: LiveMetrics,
    pub available_next_round: bool,
    pub returning_from_injury: bool,
    pub owner: Owner,
}

impl PlayerRecord {
    pub fn season_metric(&self, column: &str) -> Option<f64> {
        self.season.get(column).copied()
    }

    pub fn points_per_game(&self) -> Option<f64> {
        self.season_metric(season::POINTS_PER_GAME)
    }

    pub fn is_unowned(&self) -> bool {
        self.owner.is_unowned()
    }
}
