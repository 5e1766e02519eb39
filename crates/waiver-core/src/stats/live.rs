// Live metrics feed: availability, form and ICT index per player.
//
// The public game feed publishes an `elements` list (one entry per player,
// keyed by a short display name) and a `teams` table mapping numeric team
// ids to three-letter short codes. Numbers arrive either as JSON numbers or
// as numeric strings ("5.2").

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use super::StatsError;
use crate::name_key::normalize;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Availability status code published by the live feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Availability {
    Available,
    Doubtful,
    Injured,
    Suspended,
    Unavailable,
    NotInSquad,
}

impl Availability {
    /// Parse the single-letter feed code (`a`, `d`, `i`, `s`, `u`, `n`).
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "a" => Some(Availability::Available),
            "d" => Some(Availability::Doubtful),
            "i" => Some(Availability::Injured),
            "s" => Some(Availability::Suspended),
            "u" => Some(Availability::Unavailable),
            "n" => Some(Availability::NotInSquad),
            _ => None,
        }
    }

    /// Whether the status alone allows a player to feature next round.
    pub fn may_play(&self) -> bool {
        matches!(self, Availability::Available | Availability::Doubtful)
    }
}

/// One player row from the live feed.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveRow {
    pub web_name: String,
    /// `first_name second_name`, when both halves were present.
    pub full_name: Option<String>,
    pub team_id: Option<u32>,
    pub status: Option<Availability>,
    pub chance_of_playing: Option<f64>,
    pub news: Option<String>,
    pub form: Option<f64>,
    pub ict_index: Option<f64>,
}

/// The parsed live feed: rows plus the team id → short code table.
#[derive(Debug, Clone, Default)]
pub struct LiveTable {
    pub rows: Vec<LiveRow>,
    pub team_codes: HashMap<u32, String>,
    by_key: HashMap<String, usize>,
}

impl LiveTable {
    /// Build from rows, indexing each under its folded full name and its
    /// folded short name. Full names win when the two collide.
    pub fn new(rows: Vec<LiveRow>, team_codes: HashMap<u32, String>) -> Self {
        let mut by_key = HashMap::with_capacity(rows.len() * 2);
        for (idx, row) in rows.iter().enumerate() {
            if let Some(full) = row.full_name.as_deref() {
                let key = normalize(full);
                if !key.is_empty() {
                    by_key.insert(key, idx);
                }
            }
        }
        for (idx, row) in rows.iter().enumerate() {
            let key = normalize(&row.web_name);
            if !key.is_empty() {
                by_key.entry(key).or_insert(idx);
            }
        }
        LiveTable {
            rows,
            team_codes,
            by_key,
        }
    }

    /// Row whose full or short name folds to `key`.
    pub fn get(&self, key: &str) -> Option<&LiveRow> {
        self.by_key.get(key).map(|&idx| &self.rows[idx])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Raw serde structs (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawElement {
    #[serde(default, deserialize_with = "lenient_string")]
    web_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    second_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    team: Option<u32>,
    #[serde(default, deserialize_with = "lenient_string")]
    status: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    chance_of_playing_next_round: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    news: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    form: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    ict_index: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawTeam {
    #[serde(default, deserialize_with = "lenient_u32")]
    id: Option<u32>,
    #[serde(default, deserialize_with = "lenient_string")]
    short_name: Option<String>,
}

/// Accept a JSON number, a numeric string, or null/garbage (→ `None`).
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(parsed.filter(|v| v.is_finite()))
}

/// Accept a non-negative integer as a JSON number or a numeric string.
pub(crate) fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    Ok(parsed.and_then(|v| u32::try_from(v).ok()))
}

/// Accept a JSON string; any other type becomes `None`.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Parse the live feed body.
///
/// Accepts either `{"elements": [...], "teams": [...]}` or a bare array of
/// elements. Individual malformed elements or teams are skipped with a
/// warning.
pub fn load_from_str(body: &str) -> Result<LiveTable, StatsError> {
    let mut doc: Value = serde_json::from_str(body.trim())?;

    let elements = match &mut doc {
        Value::Array(arr) => std::mem::take(arr),
        other => other
            .get_mut("elements")
            .and_then(Value::as_array_mut)
            .map(std::mem::take)
            .ok_or(StatsError::MissingList { field: "elements" })?,
    };
    let teams = doc
        .get_mut("teams")
        .and_then(Value::as_array_mut)
        .map(std::mem::take)
        .unwrap_or_default();

    let mut rows = Vec::with_capacity(elements.len());
    for element in elements {
        let raw: RawElement = match serde_json::from_value(element) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping malformed live metrics element: {}", e);
                continue;
            }
        };
        if let Some(row) = row_from_raw(raw) {
            rows.push(row);
        }
    }

    let mut team_codes = HashMap::with_capacity(teams.len());
    for team in teams {
        let raw = match serde_json::from_value::<RawTeam>(team) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping malformed live metrics team: {}", e);
                continue;
            }
        };
        match (raw.id, non_empty(raw.short_name)) {
            (Some(id), Some(code)) => {
                team_codes.insert(id, code.to_uppercase());
            }
            _ => warn!("skipping live metrics team without id or short name"),
        }
    }

    Ok(LiveTable::new(rows, team_codes))
}

fn row_from_raw(raw: RawElement) -> Option<LiveRow> {
    let first = non_empty(raw.first_name);
    let second = non_empty(raw.second_name);
    let full_name = match (&first, &second) {
        (Some(f), Some(s)) => Some(format!("{f} {s}")),
        _ => None,
    };
    let web_name = non_empty(raw.web_name)
        .or_else(|| full_name.clone())
        .or(second)?;

    Some(LiveRow {
        web_name,
        full_name,
        team_id: raw.team,
        status: raw.status.as_deref().and_then(Availability::from_code),
        chance_of_playing: raw.chance_of_playing_next_round,
        news: non_empty(raw.news),
        form: raw.form,
        ict_index: raw.ict_index,
    })
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
