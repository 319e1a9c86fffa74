//! Upstream JSON response shapes.
//!
//! Only the fields the pipeline reads are declared; everything else in the
//! payloads is ignored by serde.

use serde::Deserialize;

use crate::models::{
    ChipActivation, ChipType, EntryId, GameweekPerformance, GameweekPicks, LeagueId, LeagueMember,
    ManagerHistory, Pick, PlayerDirectory, StandingsPage,
};

// ── Standings ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct StandingsResponse {
    #[serde(default)]
    league: Option<LeagueInfo>,
    standings: StandingsBlock,
}

#[derive(Debug, Deserialize)]
struct LeagueInfo {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StandingsBlock {
    #[serde(default)]
    has_next: bool,
    #[serde(default)]
    results: Vec<StandingRow>,
}

#[derive(Debug, Deserialize)]
struct StandingRow {
    entry: u64,
    #[serde(default)]
    entry_name: String,
    #[serde(default)]
    player_name: String,
    #[serde(default)]
    event_total: i32,
    #[serde(default)]
    rank: u32,
    #[serde(default)]
    last_rank: u32,
    #[serde(default)]
    total: i32,
}

impl StandingsResponse {
    pub(crate) fn into_page(self, league_id: LeagueId, page: u32) -> StandingsPage {
        let members = self
            .standings
            .results
            .into_iter()
            .map(|row| {
                let mut member =
                    LeagueMember::new(EntryId::new(row.entry), row.entry_name, row.player_name);
                member.event_total = row.event_total;
                member.rank = row.rank;
                member.last_rank = row.last_rank;
                member.total = row.total;
                member
            })
            .collect();

        StandingsPage {
            league_id,
            page,
            league_name: self.league.and_then(|l| l.name),
            members,
            has_next: self.standings.has_next,
        }
    }
}

// ── History ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct HistoryResponse {
    #[serde(default)]
    current: Vec<HistoryRow>,
    #[serde(default)]
    chips: Vec<ChipRow>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HistoryRow {
    event: u32,
    #[serde(default)]
    points: i32,
    #[serde(default)]
    total_points: i32,
    #[serde(default)]
    rank: Option<u32>,
    #[serde(default)]
    overall_rank: Option<u32>,
    #[serde(default)]
    value: u32,
    #[serde(default)]
    event_transfers: u32,
    #[serde(default)]
    event_transfers_cost: u32,
    #[serde(default)]
    points_on_bench: u32,
}

#[derive(Debug, Deserialize)]
struct ChipRow {
    name: String,
    event: u32,
}

impl From<HistoryRow> for GameweekPerformance {
    fn from(row: HistoryRow) -> Self {
        GameweekPerformance {
            event: row.event,
            points: row.points,
            total_points: row.total_points,
            rank: row.rank.unwrap_or(0),
            overall_rank: row.overall_rank.unwrap_or(0),
            bench_points: row.points_on_bench,
            transfers: row.event_transfers,
            transfers_cost: row.event_transfers_cost,
            squad_value: row.value,
        }
    }
}

impl From<HistoryResponse> for ManagerHistory {
    fn from(response: HistoryResponse) -> Self {
        let mut gameweeks: Vec<GameweekPerformance> =
            response.current.into_iter().map(Into::into).collect();
        gameweeks.sort_by_key(|gw| gw.event);

        let chips = response
            .chips
            .into_iter()
            .filter_map(|c| {
                ChipType::from_api_name(&c.name).map(|chip| ChipActivation {
                    chip,
                    event: c.event,
                })
            })
            .collect();

        ManagerHistory { gameweeks, chips }
    }
}

// ── Picks ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct PicksResponse {
    #[serde(default)]
    picks: Vec<PickRow>,
    #[serde(default)]
    active_chip: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PickRow {
    element: u64,
    #[serde(default)]
    position: u32,
    #[serde(default)]
    multiplier: u32,
    #[serde(default)]
    is_captain: bool,
    #[serde(default)]
    is_vice_captain: bool,
}

impl PicksResponse {
    pub(crate) fn into_picks(self, entry_id: EntryId, event: u32) -> GameweekPicks {
        GameweekPicks {
            entry_id,
            event,
            picks: self
                .picks
                .into_iter()
                .map(|p| Pick {
                    element: p.element,
                    position: p.position,
                    multiplier: p.multiplier,
                    is_captain: p.is_captain,
                    is_vice_captain: p.is_vice_captain,
                })
                .collect(),
            active_chip: self.active_chip,
        }
    }
}

// ── Bootstrap ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct BootstrapResponse {
    #[serde(default)]
    elements: Vec<ElementRow>,
}

#[derive(Debug, Deserialize)]
struct ElementRow {
    id: u64,
    web_name: String,
}

impl From<BootstrapResponse> for PlayerDirectory {
    fn from(response: BootstrapResponse) -> Self {
        response
            .elements
            .into_iter()
            .map(|e| (e.id, e.web_name))
            .collect()
    }
}
