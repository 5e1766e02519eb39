// Upcoming fixture difficulty per club, and the club-label translation table.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::StatsError;
use crate::name_key::normalize;

/// Season-stats club labels (folded with `normalize`) → fixture-feed short
/// codes. The short codes themselves are accepted as labels too.
const CLUB_CODES: &[(&str, &str)] = &[
    ("arsenal", "ARS"),
    ("aston villa", "AVL"),
    ("villa", "AVL"),
    ("bournemouth", "BOU"),
    ("afc bournemouth", "BOU"),
    ("brentford", "BRE"),
    ("brighton", "BHA"),
    ("brighton hove albion", "BHA"),
    ("brighton and hove albion", "BHA"),
    ("burnley", "BUR"),
    ("chelsea", "CHE"),
    ("crystal palace", "CRY"),
    ("palace", "CRY"),
    ("everton", "EVE"),
    ("fulham", "FUL"),
    ("ipswich", "IPS"),
    ("ipswich town", "IPS"),
    ("leeds", "LEE"),
    ("leeds united", "LEE"),
    ("leicester", "LEI"),
    ("leicester city", "LEI"),
    ("liverpool", "LIV"),
    ("luton", "LUT"),
    ("luton town", "LUT"),
    ("man city", "MCI"),
    ("manchester city", "MCI"),
    ("man utd", "MUN"),
    ("man united", "MUN"),
    ("manchester united", "MUN"),
    ("newcastle", "NEW"),
    ("newcastle united", "NEW"),
    ("nottm forest", "NFO"),
    ("nottingham forest", "NFO"),
    ("forest", "NFO"),
    ("sheffield utd", "SHU"),
    ("sheffield united", "SHU"),
    ("southampton", "SOU"),
    ("sunderland", "SUN"),
    ("spurs", "TOT"),
    ("tottenham", "TOT"),
    ("tottenham hotspur", "TOT"),
    ("west ham", "WHU"),
    ("west ham united", "WHU"),
    ("wolves", "WOL"),
    ("wolverhampton", "WOL"),
    ("wolverhampton wanderers", "WOL"),
];

/// Translate a season-stats club label into the fixture feed's short code.
///
/// Returns `None` for clubs missing from the table; callers treat that as
/// "fixture ease unknown", never as an error.
pub fn club_short_code(label: &str) -> Option<&'static str> {
    let key = normalize(label);
    if key.is_empty() {
        return None;
    }
    CLUB_CODES
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, code)| *code)
        .or_else(|| {
            CLUB_CODES
                .iter()
                .map(|(_, code)| *code)
                .find(|code| code.eq_ignore_ascii_case(&key))
        })
}

// ---------------------------------------------------------------------------
// Fixture difficulty
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawFixture {
    #[serde(default)]
    event: Option<u32>,
    team_h: u32,
    team_a: u32,
    #[serde(default)]
    team_h_difficulty: Option<u8>,
    #[serde(default)]
    team_a_difficulty: Option<u8>,
    #[serde(default)]
    finished: bool,
    #[serde(default)]
    kickoff_time: Option<DateTime<Utc>>,
}

/// Difficulty (1 = easy .. 5 = hard) of each club's next unfinished fixture,
/// keyed by short code.
#[derive(Debug, Clone, Default)]
pub struct FixtureTable {
    next_difficulty: HashMap<String, u8>,
}

impl FixtureTable {
    /// Build from (short code, difficulty) pairs directly.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, u8)>,
        S: Into<String>,
    {
        FixtureTable {
            next_difficulty: pairs
                .into_iter()
                .map(|(code, d)| (code.into().to_uppercase(), d))
                .collect(),
        }
    }

    /// Parse the fixtures feed body (a JSON array of fixtures) using the
    /// team id → short code table from the live feed.
    ///
    /// The next fixture for a team is its unfinished fixture with the lowest
    /// round number, ties broken by kickoff time. Unscheduled fixtures (no
    /// round) and fixtures without a kickoff time sort last. Malformed
    /// fixtures are skipped with a warning.
    pub fn load_from_str(body: &str, team_codes: &HashMap<u32, String>) -> Result<Self, StatsError> {
        let doc: Value = serde_json::from_str(body.trim())?;
        let Value::Array(items) = doc else {
            return Err(StatsError::MissingList { field: "fixtures" });
        };

        let mut fixtures: Vec<RawFixture> = Vec::with_capacity(items.len());
        for item in items {
            match serde_json::from_value::<RawFixture>(item) {
                Ok(f) if !f.finished => fixtures.push(f),
                Ok(_) => {}
                Err(e) => warn!("skipping malformed fixture: {}", e),
            }
        }
        fixtures.sort_by_key(|f| {
            (
                f.event.unwrap_or(u32::MAX),
                f.kickoff_time.unwrap_or(DateTime::<Utc>::MAX_UTC),
            )
        });

        let mut next_difficulty: HashMap<String, u8> = HashMap::new();
        for f in &fixtures {
            let sides = [
                (f.team_h, f.team_h_difficulty),
                (f.team_a, f.team_a_difficulty),
            ];
            for (team_id, difficulty) in sides {
                let (Some(code), Some(difficulty)) = (team_codes.get(&team_id), difficulty) else {
                    continue;
                };
                if !(1..=5).contains(&difficulty) {
                    continue;
                }
                next_difficulty.entry(code.clone()).or_insert(difficulty);
            }
        }

        Ok(FixtureTable { next_difficulty })
    }

    /// Next-fixture difficulty for a short code.
    pub fn difficulty(&self, short_code: &str) -> Option<u8> {
        self.next_difficulty.get(&short_code.to_uppercase()).copied()
    }

    /// `6 - difficulty` for the club behind `club_label`, so that higher is
    /// easier on the same 1..=5 band.
    pub fn ease_for_club(&self, club_label: &str) -> Option<f64> {
        let code = club_short_code(club_label)?;
        self.difficulty(code).map(|d| 6.0 - f64::from(d))
    }

    pub fn is_empty(&self) -> bool {
        self.next_difficulty.is_empty()
    }
}
