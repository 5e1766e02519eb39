// Football positions shared by the stats table and roster payloads.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outfield/goalkeeper position as used by draft fantasy leagues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl Position {
    /// All positions in squad display order.
    pub const ALL: [Position; 4] = [
        Position::Goalkeeper,
        Position::Defender,
        Position::Midfielder,
        Position::Forward,
    ];

    /// Parse a position label.
    ///
    /// Accepts the short codes ("GK", "DEF", "MID", "FWD"), the common
    /// alternates ("GKP", "FW", "ST"), and full words ("Goalkeeper",
    /// "Defenders", ...). Case-insensitive.
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "GK" | "GKP" | "G" | "GOALKEEPER" | "GOALKEEPERS" | "KEEPER" => {
                Some(Position::Goalkeeper)
            }
            "DEF" | "D" | "DF" | "DEFENDER" | "DEFENDERS" => Some(Position::Defender),
            "MID" | "M" | "MF" | "MIDFIELDER" | "MIDFIELDERS" => Some(Position::Midfielder),
            "FWD" | "F" | "FW" | "ST" | "FORWARD" | "FORWARDS" | "STRIKER" => {
                Some(Position::Forward)
            }
            _ => None,
        }
    }

    /// Map the numeric element type used by draft/FPL payloads (1..=4).
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Position::Goalkeeper),
            2 => Some(Position::Defender),
            3 => Some(Position::Midfielder),
            4 => Some(Position::Forward),
            _ => None,
        }
    }

    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Goalkeeper => "GK",
            Position::Defender => "DEF",
            Position::Midfielder => "MID",
            Position::Forward => "FWD",
        }
    }

    /// Deterministic ordering index for squad display.
    pub fn sort_order(&self) -> u8 {
        match self {
            Position::Goalkeeper => 0,
            Position::Defender => 1,
            Position::Midfielder => 2,
            Position::Forward => 3,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_labels() {
        assert_eq!(Position::from_str_pos("GK"), Some(Position::Goalkeeper));
        assert_eq!(Position::from_str_pos(" def "), Some(Position::Defender));
        assert_eq!(Position::from_str_pos("Midfielder"), Some(Position::Midfielder));
        assert_eq!(Position::from_str_pos("FWD"), Some(Position::Forward));
        assert_eq!(Position::from_str_pos("GKP"), Some(Position::Goalkeeper));
        assert_eq!(Position::from_str_pos("wingback"), None);
        assert_eq!(Position::from_str_pos(""), None);
    }

    #[test]
    fn parses_codes() {
        assert_eq!(Position::from_code(1), Some(Position::Goalkeeper));
        assert_eq!(Position::from_code(4), Some(Position::Forward));
        assert_eq!(Position::from_code(0), None);
        assert_eq!(Position::from_code(5), None);
    }

    #[test]
    fn display_roundtrips_through_parser() {
        for pos in Position::ALL {
            assert_eq!(Position::from_str_pos(&pos.to_string()), Some(pos));
        }
    }
}
