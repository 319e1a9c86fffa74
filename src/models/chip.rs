//! Chip activations.

use serde::{Deserialize, Serialize};

/// The four season chips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChipType {
    BenchBoost,
    TripleCaptain,
    FreeHit,
    Wildcard,
}

impl ChipType {
    pub const ALL: [ChipType; 4] = [
        ChipType::BenchBoost,
        ChipType::TripleCaptain,
        ChipType::FreeHit,
        ChipType::Wildcard,
    ];

    /// Parse the upstream chip code (`bboost`, `3xc`, `freehit`, `wildcard`).
    pub fn from_api_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "bboost" => Some(ChipType::BenchBoost),
            "3xc" => Some(ChipType::TripleCaptain),
            "freehit" => Some(ChipType::FreeHit),
            "wildcard" => Some(ChipType::Wildcard),
            _ => None,
        }
    }

    pub fn api_name(self) -> &'static str {
        match self {
            ChipType::BenchBoost => "bboost",
            ChipType::TripleCaptain => "3xc",
            ChipType::FreeHit => "freehit",
            ChipType::Wildcard => "wildcard",
        }
    }
}

impl std::fmt::Display for ChipType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChipType::BenchBoost => write!(f, "Bench Boost"),
            ChipType::TripleCaptain => write!(f, "Triple Captain"),
            ChipType::FreeHit => write!(f, "Free Hit"),
            ChipType::Wildcard => write!(f, "Wildcard"),
        }
    }
}

/// A raw activation as reported by the history endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipActivation {
    pub chip: ChipType,
    pub event: u32,
}

/// One chip activation, enriched with the gameweek outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChipUsage {
    pub chip: ChipType,

    /// Gameweek the chip was played
    pub event: u32,

    /// Total gameweek points while the chip was active
    pub points: i32,

    /// Bench contribution (bench boost only)
    pub bench_boost_points: Option<u32>,

    /// Captain detail (triple captain only)
    pub captain_name: Option<String>,

    /// Estimated raw captain score
    pub captain_points: Option<i32>,

    /// Estimated captain score after the multiplier
    pub captain_effective_points: Option<i32>,
}

impl ChipUsage {
    pub fn new(chip: ChipType, event: u32, points: i32) -> Self {
        Self {
            chip,
            event,
            points,
            bench_boost_points: None,
            captain_name: None,
            captain_points: None,
            captain_effective_points: None,
        }
    }

    /// The figure a chip record reports for this activation.
    pub fn record_value(&self) -> i32 {
        match self.chip {
            ChipType::BenchBoost => self
                .bench_boost_points
                .map(|p| p as i32)
                .unwrap_or(self.points),
            ChipType::TripleCaptain => self.captain_points.unwrap_or(self.points),
            ChipType::FreeHit | ChipType::Wildcard => self.points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chip_from_api_name() {
        assert_eq!(ChipType::from_api_name("bboost"), Some(ChipType::BenchBoost));
        assert_eq!(ChipType::from_api_name("3xc"), Some(ChipType::TripleCaptain));
        assert_eq!(ChipType::from_api_name("FREEHIT"), Some(ChipType::FreeHit));
        assert_eq!(ChipType::from_api_name("wildcard"), Some(ChipType::Wildcard));
        assert_eq!(ChipType::from_api_name("manager"), None);
    }

    #[test]
    fn test_chip_api_name_round_trips() {
        for chip in ChipType::ALL {
            assert_eq!(ChipType::from_api_name(chip.api_name()), Some(chip));
        }
    }

    #[test]
    fn test_record_value_prefers_chip_specific_figure() {
        let mut bb = ChipUsage::new(ChipType::BenchBoost, 5, 70);
        assert_eq!(bb.record_value(), 70);
        bb.bench_boost_points = Some(18);
        assert_eq!(bb.record_value(), 18);

        let mut tc = ChipUsage::new(ChipType::TripleCaptain, 8, 90);
        assert_eq!(tc.record_value(), 90);
        tc.captain_points = Some(7);
        assert_eq!(tc.record_value(), 7);

        let fh = ChipUsage::new(ChipType::FreeHit, 12, 65);
        assert_eq!(fh.record_value(), 65);
    }

    #[test]
    fn test_chip_type_serialization() {
        let json = serde_json::to_string(&ChipType::TripleCaptain).unwrap();
        assert_eq!(json, "\"triple_captain\"");
    }
}
