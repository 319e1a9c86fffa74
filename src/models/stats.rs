//! Derived statistics models.

use serde::{Deserialize, Serialize};

use super::{ChipType, EntryId, LeagueMember};

/// The fixed set of league superlatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    BestGameweek,
    WorstGameweek,
    BestCaptain,
    BestBenchBoost,
    BestTripleCaptain,
    BestFreeHit,
    BestWildcard,
    BiggestRankRise,
    BiggestRankFall,
    MostConsistent,
}

impl RecordType {
    /// The per-chip record for a chip type.
    pub fn for_chip(chip: ChipType) -> Self {
        match chip {
            ChipType::BenchBoost => RecordType::BestBenchBoost,
            ChipType::TripleCaptain => RecordType::BestTripleCaptain,
            ChipType::FreeHit => RecordType::BestFreeHit,
            ChipType::Wildcard => RecordType::BestWildcard,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            RecordType::BestGameweek => "Best Gameweek",
            RecordType::WorstGameweek => "Worst Gameweek",
            RecordType::BestCaptain => "Best Captain",
            RecordType::BestBenchBoost => "Best Bench Boost",
            RecordType::BestTripleCaptain => "Best Triple Captain",
            RecordType::BestFreeHit => "Best Free Hit",
            RecordType::BestWildcard => "Best Wildcard",
            RecordType::BiggestRankRise => "Biggest Rank Rise",
            RecordType::BiggestRankFall => "Biggest Rank Fall",
            RecordType::MostConsistent => "Most Consistent",
        }
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

/// A single superlative fact about the league.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueRecord {
    pub record_type: RecordType,

    /// Record value (points, rank places or standard deviation)
    pub value: f64,

    /// Owning member
    pub entry_id: EntryId,
    pub entry_name: String,
    pub manager_name: String,

    /// Gameweek the record was set in, where meaningful
    pub gameweek: Option<u32>,

    /// Free-text detail for display
    pub additional_info: Option<String>,

    pub captain_name: Option<String>,
    pub captain_points: Option<i32>,
}

impl LeagueRecord {
    pub fn new(record_type: RecordType, value: f64, member: &LeagueMember) -> Self {
        Self {
            record_type,
            value,
            entry_id: member.entry_id,
            entry_name: member.entry_name.clone(),
            manager_name: member.manager_name.clone(),
            gameweek: None,
            additional_info: None,
            captain_name: None,
            captain_points: None,
        }
    }

    pub fn with_gameweek(mut self, gameweek: u32) -> Self {
        self.gameweek = Some(gameweek);
        self
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.additional_info = Some(info.into());
        self
    }

    pub fn with_captain(mut self, name: Option<String>, points: Option<i32>) -> Self {
        self.captain_name = name;
        self.captain_points = points;
        self
    }
}

/// Consistency classification from the standard deviation of weekly points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyBand {
    VeryConsistent,
    Consistent,
    Moderate,
    Volatile,
    HighlyVolatile,
}

impl ConsistencyBand {
    /// Classify a standard deviation. Breakpoints at 5, 8, 12 and 18.
    pub fn from_std_dev(std_dev: f64) -> Self {
        if std_dev < 5.0 {
            ConsistencyBand::VeryConsistent
        } else if std_dev < 8.0 {
            ConsistencyBand::Consistent
        } else if std_dev < 12.0 {
            ConsistencyBand::Moderate
        } else if std_dev < 18.0 {
            ConsistencyBand::Volatile
        } else {
            ConsistencyBand::HighlyVolatile
        }
    }
}

impl std::fmt::Display for ConsistencyBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsistencyBand::VeryConsistent => write!(f, "Very consistent"),
            ConsistencyBand::Consistent => write!(f, "Consistent"),
            ConsistencyBand::Moderate => write!(f, "Moderately consistent"),
            ConsistencyBand::Volatile => write!(f, "Volatile"),
            ConsistencyBand::HighlyVolatile => write!(f, "Highly volatile"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreakType {
    Rising,
    Falling,
}

/// Run of consecutive rank moves in one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakInfo {
    pub streak_type: StreakType,
    pub count: u32,
    pub start_gameweek: u32,
}

/// A points total tied to the gameweek it was scored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekScore {
    pub event: u32,
    pub points: i32,
}

/// One row of per-manager statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerStatistics {
    pub entry_id: EntryId,
    pub entry_name: String,
    pub manager_name: String,
    pub gameweeks_played: u32,
    pub average_points: f64,

    /// Population standard deviation of weekly points
    pub standard_deviation: f64,
    pub consistency: ConsistencyBand,
    pub best_week: Option<WeekScore>,

    /// Lowest non-zero week
    pub worst_week: Option<WeekScore>,

    /// Streak over the trailing five gameweeks
    pub current_streak: Option<StreakInfo>,

    /// Share of weeks scoring above 1.2x the manager's own average
    pub captain_success_rate: f64,
    pub bench_waste_per_week: f64,
    pub chips_used_count: u32,
    pub total_transfers: u32,
}

/// A gameweek margin in a head-to-head comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Margin {
    pub gameweek: u32,
    pub difference: i32,
}

/// Head-to-head results between two members, from member1's side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadToHeadRecord {
    pub member1: EntryId,
    pub member1_name: String,
    pub member2: EntryId,
    pub member2_name: String,
    pub gameweeks_compared: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub total_points_for: i64,
    pub total_points_against: i64,
    pub biggest_win: Option<Margin>,
    pub biggest_loss: Option<Margin>,
}

/// League-wide usage of one chip type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChipUsageSummary {
    pub chip: ChipType,
    pub times_played: u32,
    pub managers_used: u32,
    pub average_points: f64,
    pub best_points: Option<i32>,
}

/// One point on a manager's cumulative points line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub event: u32,
    pub total_points: i32,
}

/// Cumulative points series for one manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointsTrend {
    pub entry_id: EntryId,
    pub entry_name: String,
    pub points: Vec<TrendPoint>,
}
