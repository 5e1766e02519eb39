// Library root: roster reconciliation and free-agent ranking.
//
// Joins a season-stats table, a schema-less league roster payload and an
// optional live-metrics feed on a folded player-name key, then ranks the
// players nobody in the league owns.

pub mod config;
pub mod name_key;
pub mod pipeline;
pub mod position;
pub mod ranking;
pub mod roster;
pub mod sources;
pub mod stats;
