//! League member model and per-gameweek results.

use serde::{Deserialize, Serialize};

use super::{ChipUsage, EntryId};

/// One manager's result for one gameweek.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameweekPerformance {
    /// Gameweek number (1-based)
    pub event: u32,

    /// Points scored this gameweek, before transfer hits
    pub points: i32,

    /// Cumulative points through this gameweek
    pub total_points: i32,

    /// Rank at this gameweek (0 when upstream reported none)
    pub rank: u32,

    /// Global overall rank (0 when upstream reported none)
    pub overall_rank: u32,

    /// Points left on the bench
    pub bench_points: u32,

    /// Transfers made this gameweek
    pub transfers: u32,

    /// Points deducted for extra transfers
    pub transfers_cost: u32,

    /// Squad value in tenths of a million
    pub squad_value: u32,
}

impl GameweekPerformance {
    /// Minimal performance row, mostly useful for tests and fixtures.
    pub fn new(event: u32, points: i32, total_points: i32, rank: u32) -> Self {
        Self {
            event,
            points,
            total_points,
            rank,
            overall_rank: 0,
            bench_points: 0,
            transfers: 0,
            transfers_cost: 0,
            squad_value: 0,
        }
    }
}

/// One mini-league participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueMember {
    /// Upstream entry id
    pub entry_id: EntryId,

    /// Team name
    pub entry_name: String,

    /// Manager (person) name
    pub manager_name: String,

    /// Points in the current gameweek
    pub event_total: i32,

    /// Current league rank
    pub rank: u32,

    /// League rank before the current gameweek
    pub last_rank: u32,

    /// Cumulative points
    pub total: i32,

    /// Per-gameweek results, ascending by event. Empty until details are fetched.
    #[serde(default)]
    pub gameweek_history: Vec<GameweekPerformance>,

    /// Chip activations. Empty until details are fetched.
    #[serde(default)]
    pub chips: Vec<ChipUsage>,
}

impl LeagueMember {
    /// Create a member from standings fields only.
    pub fn new(entry_id: EntryId, entry_name: String, manager_name: String) -> Self {
        Self {
            entry_id,
            entry_name,
            manager_name,
            event_total: 0,
            rank: 0,
            last_rank: 0,
            total: 0,
            gameweek_history: Vec::new(),
            chips: Vec::new(),
        }
    }

    /// Positive when the member moved up the table.
    pub fn rank_change(&self) -> i64 {
        i64::from(self.last_rank) - i64::from(self.rank)
    }

    /// Attach fetched detail. History is re-sorted by event.
    pub fn with_details(
        mut self,
        mut history: Vec<GameweekPerformance>,
        chips: Vec<ChipUsage>,
    ) -> Self {
        history.sort_by_key(|gw| gw.event);
        self.gameweek_history = history;
        self.chips = chips;
        self
    }

    /// Look up the performance for a gameweek.
    pub fn gameweek(&self, event: u32) -> Option<&GameweekPerformance> {
        self.gameweek_history.iter().find(|gw| gw.event == event)
    }

    /// Points per gameweek in event order.
    pub fn points_series(&self) -> Vec<i32> {
        self.gameweek_history.iter().map(|gw| gw.points).collect()
    }
}

/// A member the detail fetch gave up on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppedMember {
    pub entry_id: EntryId,
    pub entry_name: String,
    pub reason: String,
}
