// Roster extraction from payloads without a fixed schema.
//
// The league's roster endpoints are not a stable contract: field names drift
// and nesting levels come and go. Every value is therefore resolved through
// an ordered list of candidate paths, and the first one yielding a non-empty
// value wins. Supporting a new upstream variant means appending one path to
// the relevant list below.

use serde_json::Value;
use tracing::debug;

use super::{RosterEntry, UNNAMED_TEAM};
use crate::position::Position;

/// A sequence of mapping keys applied in order, e.g. `["player", "name"]`.
pub type FieldPath = &'static [&'static str];

// ---------------------------------------------------------------------------
// Candidate paths (tried in declaration order)
// ---------------------------------------------------------------------------

/// Where the team sequence lives: one optional `league` wrapper, or the root.
pub const TEAM_LIST_PATHS: &[FieldPath] = &[&["league", "teams"], &["teams"]];

pub const TEAM_ID_PATHS: &[FieldPath] = &[
    &["teamId"],
    &["id"],
    &["team_id"],
    &["entryId"],
    &["entry_id"],
];

pub const TEAM_NAME_PATHS: &[FieldPath] = &[
    &["teamName"],
    &["name"],
    &["team_name"],
    &["entryName"],
    &["entry_name"],
    &["displayName"],
];

pub const ROSTER_PATHS: &[FieldPath] = &[&["teamPlayers"], &["players"], &["squad"], &["roster"]];

pub const PLAYER_NAME_PATHS: &[FieldPath] = &[
    &["name"],
    &["playerName"],
    &["player_name"],
    &["fullName"],
    &["webName"],
    &["web_name"],
    &["player", "name"],
    &["player", "fullName"],
    &["player", "webName"],
    &["data", "name"],
    &["element", "name"],
    &["element", "web_name"],
];

pub const PLAYER_POSITION_PATHS: &[FieldPath] = &[
    &["playerPosition"],
    &["position"],
    &["element_type"],
    &["positionId"],
    &["player", "position"],
];

/// Player-centric payloads: a flat list of player (or draft pick) records,
/// each naming its owner.
pub const PLAYER_LIST_PATHS: &[FieldPath] = &[&["picks"], &["players"], &["data"], &["entries"]];

pub const OWNER_ID_PATHS: &[FieldPath] = &[
    &["teamId"],
    &["team_id"],
    &["entryId"],
    &["entry_id"],
    &["owner", "id"],
];

/// Only string values count here: `team` is a club id number in some feeds.
pub const OWNER_NAME_PATHS: &[FieldPath] = &[
    &["teamName"],
    &["owner"],
    &["team"],
    &["team_name"],
    &["entryName"],
    &["owner", "name"],
    &["owner", "teamName"],
];

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Parse `text` as JSON and extract roster entries.
///
/// Fails only when the text is not JSON at all; any JSON shape is accepted.
pub fn extract_str(text: &str) -> Result<Vec<RosterEntry>, serde_json::Error> {
    let payload: Value = serde_json::from_str(text.trim())?;
    Ok(extract(&payload))
}

/// Extract `(team, player)` entries from an arbitrary roster payload.
///
/// Team-centric shapes (`{"teams": [{.., "players": [..]}]}`) are tried
/// first. When they yield nothing, player-centric shapes (a flat list of
/// records each carrying its owner, as in draft-pick payloads) are tried.
/// Never fails: unrecognized shapes yield an empty list.
pub fn extract(payload: &Value) -> Vec<RosterEntry> {
    let entries = extract_team_centric(payload);
    if !entries.is_empty() {
        debug!("extracted {} roster entries from team list", entries.len());
        return entries;
    }

    let entries = extract_player_centric(payload);
    debug!("extracted {} roster entries from player list", entries.len());
    entries
}

// ---------------------------------------------------------------------------
// Shape strategies
// ---------------------------------------------------------------------------

fn extract_team_centric(payload: &Value) -> Vec<RosterEntry> {
    let Some(teams) = first_sequence(payload, TEAM_LIST_PATHS) else {
        return Vec::new();
    };

    let mut entries = Vec::new();
    for team in teams {
        let team_id = first_id(team, TEAM_ID_PATHS).unwrap_or_default();
        let team_name =
            first_text(team, TEAM_NAME_PATHS).unwrap_or_else(|| UNNAMED_TEAM.to_string());
        let Some(roster) = first_sequence(team, ROSTER_PATHS) else {
            continue;
        };

        for item in roster {
            let Some(player_name) = player_name(item) else {
                continue;
            };
            entries.push(RosterEntry {
                team_id: team_id.clone(),
                team_name: team_name.clone(),
                player_name,
                position: player_position(item),
            });
        }
    }
    entries
}

fn extract_player_centric(payload: &Value) -> Vec<RosterEntry> {
    let items = match payload.as_array() {
        Some(arr) if !arr.is_empty() => arr,
        _ => match first_sequence(payload, PLAYER_LIST_PATHS) {
            Some(arr) => arr,
            None => return Vec::new(),
        },
    };

    let mut entries = Vec::new();
    for item in items {
        let Some(player_name) = player_name(item) else {
            continue;
        };
        let team_id = first_id(item, OWNER_ID_PATHS);
        let team_name = first_text(item, OWNER_NAME_PATHS);
        if team_id.is_none() && team_name.is_none() {
            // No owner recorded: a free agent, not a roster entry.
            continue;
        }
        entries.push(RosterEntry {
            team_id: team_id.unwrap_or_default(),
            team_name: team_name.unwrap_or_else(|| UNNAMED_TEAM.to_string()),
            player_name,
            position: player_position(item),
        });
    }
    entries
}

fn player_name(item: &Value) -> Option<String> {
    if let Some(s) = item.as_str() {
        let s = s.trim();
        return (!s.is_empty()).then(|| s.to_string());
    }
    first_text(item, PLAYER_NAME_PATHS)
}

fn player_position(item: &Value) -> Option<Position> {
    PLAYER_POSITION_PATHS
        .iter()
        .filter_map(|path| lookup(item, path))
        .find_map(|v| match v {
            Value::Number(n) => n.as_i64().and_then(Position::from_code),
            Value::String(s) => Position::from_str_pos(s)
                .or_else(|| s.trim().parse::<i64>().ok().and_then(Position::from_code)),
            _ => None,
        })
}

// ---------------------------------------------------------------------------
// Path resolution
// ---------------------------------------------------------------------------

/// Follow `path` through nested mappings. Non-mapping intermediates miss.
pub fn lookup<'a>(node: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(node, |cur, key| cur.get(*key))
}

/// First candidate resolving to a non-empty string (trimmed).
pub fn first_text(node: &Value, paths: &[FieldPath]) -> Option<String> {
    paths.iter().find_map(|path| {
        let s = lookup(node, path)?.as_str()?.trim();
        (!s.is_empty()).then(|| s.to_string())
    })
}

/// First candidate resolving to a non-empty string or an integer, rendered
/// as a string.
pub fn first_id(node: &Value, paths: &[FieldPath]) -> Option<String> {
    paths.iter().find_map(|path| match lookup(node, path)? {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
        _ => None,
    })
}

/// First candidate resolving to a non-empty array.
pub fn first_sequence<'a>(node: &'a Value, paths: &[FieldPath]) -> Option<&'a Vec<Value>> {
    paths.iter().find_map(|path| {
        let arr = lookup(node, path)?.as_array()?;
        (!arr.is_empty()).then_some(arr)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn names(entries: &[RosterEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.player_name.as_str()).collect()
    }

    #[test]
    fn flat_team_payload() {
        let payload = json!({
            "teams": [{"id": "t1", "name": "Bob", "players": [{"name": "John Smith"}]}]
        });
        let entries = extract(&payload);
        assert_eq!(
            entries,
            vec![RosterEntry {
                team_id: "t1".into(),
                team_name: "Bob".into(),
                player_name: "John Smith".into(),
                position: None,
            }]
        );
    }

    #[test]
    fn nested_player_name_matches_flat_name() {
        let flat = json!({
            "teams": [{"id": "t1", "name": "Bob", "players": [{"name": "John Smith"}, {"name": "Ann Lee"}]}]
        });
        let nested = json!({
            "teams": [{"id": "t1", "name": "Bob", "players": [
                {"player": {"name": "John Smith"}},
                {"player": {"name": "Ann Lee"}}
            ]}]
        });
        assert_eq!(extract(&flat), extract(&nested));
    }

    #[test]
    fn league_wrapper_is_unwrapped() {
        let payload = json!({
            "league": {"teams": [{"teamId": 7, "teamName": "Rovers", "squad": ["Ann Lee"]}]}
        });
        let entries = extract(&payload);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].team_id, "7");
        assert_eq!(entries[0].team_name, "Rovers");
        assert_eq!(entries[0].player_name, "Ann Lee");
    }

    #[test]
    fn team_fields_resolve_in_declared_order() {
        // teamId outranks id; teamName outranks name.
        let payload = json!({
            "teams": [{
                "id": "second", "teamId": "first",
                "name": "Second", "teamName": "First",
                "players": [{"name": "A"}]
            }]
        });
        let entries = extract(&payload);
        assert_eq!(entries[0].team_id, "first");
        assert_eq!(entries[0].team_name, "First");
    }

    #[test]
    fn empty_values_fall_through_to_next_candidate() {
        let payload = json!({
            "teams": [{
                "teamId": "", "id": "t9",
                "teamName": "  ", "name": "Fallback FC",
                "teamPlayers": [], "players": [{"name": "", "playerName": "Real Name"}]
            }]
        });
        let entries = extract(&payload);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].team_id, "t9");
        assert_eq!(entries[0].team_name, "Fallback FC");
        assert_eq!(entries[0].player_name, "Real Name");
    }

    #[test]
    fn missing_team_fields_use_sentinels() {
        let payload = json!({"teams": [{"players": [{"name": "A"}]}]});
        let entries = extract(&payload);
        assert_eq!(entries[0].team_id, "");
        assert_eq!(entries[0].team_name, UNNAMED_TEAM);
    }

    #[test]
    fn unnamed_items_skipped_silently() {
        let payload = json!({
            "teams": [{"id": "t1", "name": "Bob", "players": [
                {"name": "Keep"},
                {"id": 5},
                null,
                42,
                {"data": {"name": "Also Kept"}}
            ]}]
        });
        assert_eq!(names(&extract(&payload)), vec!["Keep", "Also Kept"]);
    }

    #[test]
    fn team_without_roster_contributes_nothing() {
        let payload = json!({
            "teams": [
                {"id": "t1", "name": "Empty"},
                {"id": "t2", "name": "Full", "roster": [{"name": "A"}]}
            ]
        });
        let entries = extract(&payload);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].team_id, "t2");
    }

    #[test]
    fn draft_pick_list_is_player_centric() {
        let payload = json!([
            {"playerName": "Bukayo Saka", "teamId": "t1", "teamName": "Bob", "playerPosition": 3},
            {"playerName": "David Raya", "teamId": "t2", "teamName": "Sue", "playerPosition": 1}
        ]);
        let entries = extract(&payload);
        assert_eq!(names(&entries), vec!["Bukayo Saka", "David Raya"]);
        assert_eq!(entries[0].position, Some(Position::Midfielder));
        assert_eq!(entries[1].position, Some(Position::Goalkeeper));
        assert_eq!(entries[1].team_name, "Sue");
    }

    #[test]
    fn picks_wrapper_is_player_centric() {
        let payload = json!({"picks": [{"playerName": "A", "team_id": 3}]});
        let entries = extract(&payload);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].team_id, "3");
        assert_eq!(entries[0].team_name, UNNAMED_TEAM);
    }

    #[test]
    fn ownerless_player_records_are_free_agents() {
        let payload = json!({"players": [
            {"name": "Owned", "owner": "Bob"},
            {"name": "Free Agent", "team": 14}
        ]});
        assert_eq!(names(&extract(&payload)), vec!["Owned"]);
    }

    #[test]
    fn unrecognized_shapes_yield_nothing() {
        assert!(extract(&json!(null)).is_empty());
        assert!(extract(&json!("text")).is_empty());
        assert!(extract(&json!({"foo": {"bar": 1}})).is_empty());
        assert!(extract(&json!({"teams": "not a list"})).is_empty());
    }

    #[test]
    fn extract_str_rejects_non_json() {
        assert!(extract_str("<html>not json</html>").is_err());
        assert!(extract_str("  {\"teams\": []}  ").unwrap().is_empty());
    }

    #[test]
    fn position_from_string_label_or_numeric_string() {
        let payload = json!({"teams": [{"id": "t", "players": [
            {"name": "A", "position": "DEF"},
            {"name": "B", "position": "4"},
            {"name": "C", "player": {"position": 1}}
        ]}]});
        let entries = extract(&payload);
        assert_eq!(entries[0].position, Some(Position::Defender));
        assert_eq!(entries[1].position, Some(Position::Forward));
        assert_eq!(entries[2].position, Some(Position::Goalkeeper));
    }

    #[test]
    fn lookup_stops_at_non_mappings() {
        let v = json!({"player": "flat"});
        assert!(lookup(&v, &["player", "name"]).is_none());
        assert_eq!(lookup(&v, &["player"]), Some(&json!("flat")));
    }
}
