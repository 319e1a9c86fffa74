//! Decoded results of the three upstream read operations.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{ChipActivation, EntryId, GameweekPerformance, LeagueId, LeagueMember};

/// One page of league standings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingsPage {
    pub league_id: LeagueId,

    /// Page number (1-based)
    pub page: u32,

    /// League display name, as reported alongside the page
    pub league_name: Option<String>,

    /// Members on this page, standings fields only
    pub members: Vec<LeagueMember>,

    /// Whether another page follows
    pub has_next: bool,
}

/// A manager's season history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManagerHistory {
    pub gameweeks: Vec<GameweekPerformance>,
    pub chips: Vec<ChipActivation>,
}

/// One selected player in a gameweek squad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pick {
    /// Player id
    pub element: u64,
    pub position: u32,
    pub multiplier: u32,
    pub is_captain: bool,
    pub is_vice_captain: bool,
}

/// A manager's squad for one gameweek.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameweekPicks {
    pub entry_id: EntryId,
    pub event: u32,
    pub picks: Vec<Pick>,
    pub active_chip: Option<String>,
}

impl GameweekPicks {
    /// The captained pick, if any.
    pub fn captain(&self) -> Option<&Pick> {
        self.picks.iter().find(|p| p.is_captain)
    }
}

/// Player id to display name, from the bootstrap endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerDirectory {
    names: HashMap<u64, String>,
}

impl PlayerDirectory {
    pub fn new(names: HashMap<u64, String>) -> Self {
        Self { names }
    }

    pub fn name(&self, element: u64) -> Option<&str> {
        self.names.get(&element).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<(u64, String)> for PlayerDirectory {
    fn from_iter<I: IntoIterator<Item = (u64, String)>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}
