// Season statistics CSV loading and column normalization.
//
// The stats export has shipped with two header conventions ("PointsPerGame",
// "Clean Sheets" vs "Point per game", "Clean sheets"). Headers are folded and
// mapped to the fixed vocabulary below; anything unrecognized passes through
// under its original header.

use std::collections::HashMap;
use std::io::Read;

use tracing::warn;

use super::StatsError;
use crate::name_key::normalize;
use crate::position::Position;

// ---------------------------------------------------------------------------
// Column vocabulary
// ---------------------------------------------------------------------------

pub const NAME: &str = "name";
pub const CLUB: &str = "club";
pub const POSITION: &str = "position";
pub const POINTS_PER_GAME: &str = "points_per_game";
pub const TOTAL_POINTS: &str = "total_points";
pub const GOALS: &str = "goals";
pub const ASSISTS: &str = "assists";
pub const CLEAN_SHEETS: &str = "clean_sheets";
pub const GOALS_CONCEDED: &str = "goals_conceded";
pub const YELLOW_CARDS: &str = "yellow_cards";
pub const RED_CARDS: &str = "red_cards";
pub const MINUTES: &str = "minutes";

/// Folded header → internal column name.
const COLUMN_ALIASES: &[(&str, &str)] = &[
    ("name", NAME),
    ("playername", NAME),
    ("player", NAME),
    ("fullname", NAME),
    ("club", CLUB),
    ("team", CLUB),
    ("teamname", CLUB),
    ("position", POSITION),
    ("pos", POSITION),
    ("pointspergame", POINTS_PER_GAME),
    ("pointpergame", POINTS_PER_GAME),
    ("ppg", POINTS_PER_GAME),
    ("totalpoints", TOTAL_POINTS),
    ("points", TOTAL_POINTS),
    ("goals", GOALS),
    ("goalsscored", GOALS),
    ("assists", ASSISTS),
    ("cleansheets", CLEAN_SHEETS),
    ("goalsconceded", GOALS_CONCEDED),
    ("yellowcards", YELLOW_CARDS),
    ("redcards", RED_CARDS),
    ("minutes", MINUTES),
    ("minutesplayed", MINUTES),
];

/// Map a source header to the internal vocabulary. Unrecognized headers
/// come back trimmed but otherwise unchanged.
pub fn canonical_column(header: &str) -> String {
    let folded: String = header
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    COLUMN_ALIASES
        .iter()
        .find(|(alias, _)| *alias == folded)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| header.trim().to_string())
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// One season-stats row after column normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonRow {
    pub name: String,
    pub club: String,
    pub position: Option<Position>,
    /// Numeric columns only; blank or non-numeric cells are left out.
    pub metrics: HashMap<String, f64>,
}

impl SeasonRow {
    pub fn key(&self) -> String {
        normalize(&self.name)
    }
}

/// Load season rows from any reader (the HTTP body or a file).
///
/// Malformed rows and rows without a usable name are skipped with a warning;
/// only an unreadable header line or a missing name column fails the load.
pub fn load_from_reader<R: Read>(rdr: R) -> Result<Vec<SeasonRow>, StatsError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(rdr);

    let columns: Vec<String> = reader.headers()?.iter().map(canonical_column).collect();
    let Some(name_idx) = columns.iter().position(|c| c == NAME) else {
        return Err(StatsError::MissingNameColumn {
            headers: columns.join(","),
        });
    };
    let club_idx = columns.iter().position(|c| c == CLUB);
    let position_idx = columns.iter().position(|c| c == POSITION);

    let mut rows = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("skipping malformed season stats row {}: {}", line + 1, e);
                continue;
            }
        };

        let name = record.get(name_idx).unwrap_or_default().trim().to_string();
        if normalize(&name).is_empty() {
            warn!("skipping season stats row {}: no usable player name", line + 1);
            continue;
        }
        let club = club_idx
            .and_then(|i| record.get(i))
            .unwrap_or_default()
            .to_string();
        let position = position_idx
            .and_then(|i| record.get(i))
            .and_then(Position::from_str_pos);

        let mut metrics = HashMap::new();
        for (idx, cell) in record.iter().enumerate() {
            if Some(idx) == club_idx || Some(idx) == position_idx || idx == name_idx {
                continue;
            }
            let Some(column) = columns.get(idx) else {
                continue;
            };
            if let Ok(value) = cell.parse::<f64>() {
                if value.is_finite() {
                    metrics.insert(column.clone(), value);
                }
            }
        }

        rows.push(SeasonRow {
            name,
            club,
            position,
            metrics,
        });
    }
    Ok(rows)
}

/// Load season rows from an in-memory CSV body.
pub fn load_from_str(body: &str) -> Result<Vec<SeasonRow>, StatsError> {
    load_from_reader(body.as_bytes())
}
