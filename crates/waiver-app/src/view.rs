// Plain-text report: the user's squad and the ranked free agents.
//
// Squad: grouped GK, DEF, MID, FWD (unknown positions last), name + club
// Available: #, Name, Club, Pos, PPG, Form, ICT, Ease, Status, Score

use std::collections::HashMap;
use std::fmt::Write;

use waiver_core::name_key::normalize;
use waiver_core::position::Position;
use waiver_core::ranking::ScoredCandidate;
use waiver_core::roster::RosterEntry;
use waiver_core::stats::{Availability, PlayerRecord};

/// Render the squad section.
///
/// Positions come from the roster entry when the payload carried one, else
/// from the matching pool record.
pub fn render_squad(squad: &[&RosterEntry], pool: &[PlayerRecord]) -> String {
    let mut out = String::new();
    if squad.is_empty() {
        out.push_str("My squad: (team not found in league roster)\n");
        return out;
    }

    let by_key: HashMap<&str, &PlayerRecord> = pool.iter().map(|p| (p.key.as_str(), p)).collect();
    let mut groups: Vec<(Option<Position>, Vec<(&str, &str)>)> = Vec::new();
    for entry in squad {
        let record = by_key.get(normalize(&entry.player_name).as_str()).copied();
        let position = entry.position.or_else(|| record.and_then(|r| r.position));
        let club = record.map_or("", |r| r.club.as_str());
        match groups.iter_mut().find(|(pos, _)| *pos == position) {
            Some((_, players)) => players.push((entry.player_name.as_str(), club)),
            None => groups.push((position, vec![(entry.player_name.as_str(), club)])),
        }
    }
    groups.sort_by_key(|(pos, _)| pos.map_or(u8::MAX, |p| p.sort_order()));

    let team_name = squad.first().map_or("", |e| e.team_name.as_str());
    let _ = writeln!(out, "My squad: {} ({} players)", team_name, squad.len());
    for (position, players) in groups {
        let label = position.map_or("?", |p| p.display_str());
        let _ = writeln!(out, "  {label}");
        for (name, club) in players {
            if club.is_empty() {
                let _ = writeln!(out, "    {name}");
            } else {
                let _ = writeln!(out, "    {name:<28} {club}");
            }
        }
    }
    out
}

/// Render the ranked free-agent table.
pub fn render_available(ranked: &[ScoredCandidate<'_>]) -> String {
    let mut out = String::new();
    if ranked.is_empty() {
        out.push_str("Available players: none\n");
        return out;
    }

    let _ = writeln!(out, "Available players (top {})", ranked.len());
    let _ = writeln!(
        out,
        "{:>3}  {:<26} {:<16} {:<3} {:>5} {:>5} {:>6} {:>4}  {:<10} {:>6}",
        "#", "Name", "Club", "Pos", "PPG", "Form", "ICT", "Ease", "Status", "Score"
    );
    for (i, c) in ranked.iter().enumerate() {
        let p = c.record;
        let mut status = status_label(p.live.status, p.live.chance_of_playing);
        if p.returning_from_injury {
            status.push_str(" +ret");
        }
        let _ = writeln!(
            out,
            "{:>3}  {:<26} {:<16} {:<3} {:>5} {:>5} {:>6} {:>4}  {:<10} {:>6.3}",
            i + 1,
            truncate(&p.name, 26),
            truncate(&p.club, 16),
            p.position.map_or("?", |pos| pos.display_str()),
            metric(p.points_per_game(), 1),
            metric(p.live.form, 1),
            metric(p.live.ict_index, 1),
            metric(p.live.fixture_ease, 0),
            status,
            c.composite,
        );
    }
    out
}

fn status_label(status: Option<Availability>, chance: Option<f64>) -> String {
    let base = match status {
        Some(Availability::Available) => "fit",
        Some(Availability::Doubtful) => "doubt",
        Some(Availability::Injured) => "injured",
        Some(Availability::Suspended) => "susp",
        Some(Availability::Unavailable) => "unavail",
        Some(Availability::NotInSquad) => "n/a",
        None => "-",
    };
    match chance {
        Some(c) if status != Some(Availability::Available) => format!("{base} {c:.0}%"),
        _ => base.to_string(),
    }
}

fn metric(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}"),
        None => "-".to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut t: String = s.chars().take(max - 1).collect();
        t.push('…');
        t
    }
}
