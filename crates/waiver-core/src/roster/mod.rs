// League rosters: schema-tolerant extraction and the ownership index.

pub mod extract;
pub mod ownership;

use serde::{Deserialize, Serialize};

use crate::position::Position;

pub use extract::{extract, extract_str};
pub use ownership::{Owner, OwnershipIndex};

/// Display name used for a team whose payload carries no usable name.
pub const UNNAMED_TEAM: &str = "-";

/// One (team, player) pair recovered from a roster payload.
///
/// Short-lived: produced by the extractor and folded straight into an
/// [`OwnershipIndex`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// Team identifier; empty when the payload had none.
    pub team_id: String,
    /// Team display name; [`UNNAMED_TEAM`] when the payload had none.
    pub team_name: String,
    /// Player name exactly as the roster payload spelled it.
    pub player_name: String,
    /// Position, when the payload carried a recognizable code.
    #[serde(default)]
    pub position: Option<Position>,
}
