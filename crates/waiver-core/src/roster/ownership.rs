// Ownership index: who holds which player, rebuilt wholesale per fetch.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::RosterEntry;
use crate::name_key::normalize;

/// Owner of a player in the league.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Owner {
    /// Held by the team with this display name.
    Team(String),
    /// Nobody in the league holds the player.
    #[default]
    Unowned,
}

impl Owner {
    pub fn is_unowned(&self) -> bool {
        matches!(self, Owner::Unowned)
    }

    /// Team name, or `None` for an unowned player.
    pub fn team_name(&self) -> Option<&str> {
        match self {
            Owner::Team(name) => Some(name),
            Owner::Unowned => None,
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Owner::Team(name) => f.write_str(name),
            Owner::Unowned => f.write_str("Free Agent"),
        }
    }
}

/// Lookup tables derived from one batch of roster entries.
#[derive(Debug, Clone, Default)]
pub struct OwnershipIndex {
    owner_by_key: HashMap<String, String>,
    players_by_team: HashMap<String, Vec<String>>,
    /// Distinct `(team_id, team_name)` pairs in first-seen order.
    teams: Vec<(String, String)>,
    /// Entries carried along for position-aware squad display.
    entries: Vec<RosterEntry>,
}

impl OwnershipIndex {
    /// Build the index in one pass over `entries`.
    ///
    /// A player listed under several teams ends up owned by the last one.
    /// Entries without a team id accumulate under the empty-string id.
    pub fn build(entries: Vec<RosterEntry>) -> Self {
        let mut owner_by_key = HashMap::with_capacity(entries.len());
        let mut players_by_team: HashMap<String, Vec<String>> = HashMap::new();
        let mut teams: Vec<(String, String)> = Vec::new();
        let mut seen_teams: HashSet<(&str, &str)> = HashSet::new();

        for entry in &entries {
            let key = normalize(&entry.player_name);
            if !key.is_empty() {
                owner_by_key.insert(key, entry.team_name.clone());
            }
            players_by_team
                .entry(entry.team_id.clone())
                .or_default()
                .push(entry.player_name.clone());
            if seen_teams.insert((entry.team_id.as_str(), entry.team_name.as_str())) {
                teams.push((entry.team_id.clone(), entry.team_name.clone()));
            }
        }

        OwnershipIndex {
            owner_by_key,
            players_by_team,
            teams,
            entries,
        }
    }

    /// Owner of the named player. The name is folded first, so a raw display
    /// name and an already-normalized key give the same answer.
    pub fn owner_of(&self, name: &str) -> Owner {
        match self.owner_by_key.get(&normalize(name)) {
            Some(team) => Owner::Team(team.clone()),
            None => Owner::Unowned,
        }
    }

    /// Raw player names held by `team_id`. Unknown ids give an empty slice.
    pub fn roster_of(&self, team_id: &str) -> &[String] {
        self.players_by_team
            .get(team_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Resolve a caller-supplied team identifier to a team id.
    ///
    /// Tries an exact id match first, then falls back to a case-insensitive,
    /// whitespace-trimmed exact match on team name. No fuzzy matching.
    pub fn resolve_team(&self, identifier: &str) -> Option<&str> {
        if self.players_by_team.contains_key(identifier) {
            return self
                .teams
                .iter()
                .find(|(id, _)| id == identifier)
                .map(|(id, _)| id.as_str());
        }

        let wanted = identifier.trim().to_lowercase();
        if wanted.is_empty() {
            return None;
        }
        self.teams
            .iter()
            .find(|(_, name)| name.trim().to_lowercase() == wanted)
            .map(|(id, _)| id.as_str())
    }

    /// Roster for an identifier that may be either a team id or a team name.
    pub fn roster_for(&self, identifier: &str) -> &[String] {
        match self.resolve_team(identifier) {
            Some(id) => self.roster_of(id),
            None => &[],
        }
    }

    /// Entries (with positions, when known) for the resolved team.
    pub fn entries_for(&self, identifier: &str) -> Vec<&RosterEntry> {
        let Some(id) = self.resolve_team(identifier) else {
            return Vec::new();
        };
        self.entries.iter().filter(|e| e.team_id == id).collect()
    }

    /// Distinct `(team_id, team_name)` pairs in first-seen order.
    pub fn teams(&self) -> &[(String, String)] {
        &self.teams
    }

    /// Number of distinct owned players.
    pub fn len(&self) -> usize {
        self.owner_by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owner_by_key.is_empty()
    }
}
