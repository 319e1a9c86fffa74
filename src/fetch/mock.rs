//! In-memory league source for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::{FetchError, LeagueSource};
use crate::models::{
    EntryId, GameweekPicks, LeagueId, LeagueMember, ManagerHistory, PlayerDirectory, StandingsPage,
};

/// Canned responses keyed by request, with call accounting.
///
/// Anything not registered answers with `UpstreamError { status: 404 }`.
#[derive(Default)]
pub struct MockLeagueSource {
    pages: HashMap<(LeagueId, u32), Result<StandingsPage, FetchError>>,
    histories: HashMap<EntryId, Result<ManagerHistory, FetchError>>,
    picks: HashMap<(EntryId, u32), Result<GameweekPicks, FetchError>>,
    directory: Option<Result<PlayerDirectory, FetchError>>,
    history_delay: Duration,

    standings_calls: AtomicUsize,
    history_calls: AtomicUsize,
    picks_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

fn not_found() -> FetchError {
    FetchError::UpstreamError { status: 404 }
}

impl MockLeagueSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a single standings page.
    pub fn with_page(mut self, page: StandingsPage) -> Self {
        self.pages.insert((page.league_id, page.page), Ok(page));
        self
    }

    /// Split members into pages of `page_size` and register them all.
    pub fn with_league(
        mut self,
        league_id: LeagueId,
        name: &str,
        members: Vec<LeagueMember>,
        page_size: usize,
    ) -> Self {
        let chunks: Vec<Vec<LeagueMember>> = if members.is_empty() {
            vec![Vec::new()]
        } else {
            members
                .chunks(page_size.max(1))
                .map(|c| c.to_vec())
                .collect()
        };
        let last = chunks.len();

        for (i, chunk) in chunks.into_iter().enumerate() {
            let page = (i + 1) as u32;
            self.pages.insert(
                (league_id, page),
                Ok(StandingsPage {
                    league_id,
                    page,
                    league_name: Some(name.to_string()),
                    members: chunk,
                    has_next: i + 1 < last,
                }),
            );
        }
        self
    }

    /// Make one standings page fail.
    pub fn with_page_error(mut self, league_id: LeagueId, page: u32, err: FetchError) -> Self {
        self.pages.insert((league_id, page), Err(err));
        self
    }

    pub fn with_history(mut self, entry_id: EntryId, history: ManagerHistory) -> Self {
        self.histories.insert(entry_id, Ok(history));
        self
    }

    pub fn with_history_error(mut self, entry_id: EntryId, err: FetchError) -> Self {
        self.histories.insert(entry_id, Err(err));
        self
    }

    pub fn with_picks(mut self, picks: GameweekPicks) -> Self {
        self.picks.insert((picks.entry_id, picks.event), Ok(picks));
        self
    }

    pub fn with_picks_error(mut self, entry_id: EntryId, event: u32, err: FetchError) -> Self {
        self.picks.insert((entry_id, event), Err(err));
        self
    }

    pub fn with_directory(mut self, directory: PlayerDirectory) -> Self {
        self.directory = Some(Ok(directory));
        self
    }

    pub fn with_directory_error(mut self, err: FetchError) -> Self {
        self.directory = Some(Err(err));
        self
    }

    /// Hold each history call open for `delay` so overlap can be observed.
    pub fn with_history_delay(mut self, delay: Duration) -> Self {
        self.history_delay = delay;
        self
    }

    pub fn standings_calls(&self) -> usize {
        self.standings_calls.load(Ordering::SeqCst)
    }

    pub fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    pub fn picks_calls(&self) -> usize {
        self.picks_calls.load(Ordering::SeqCst)
    }

    /// Highest number of history calls observed running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LeagueSource for MockLeagueSource {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn fetch_standings_page(
        &self,
        league_id: LeagueId,
        page: u32,
    ) -> Result<StandingsPage, FetchError> {
        self.standings_calls.fetch_add(1, Ordering::SeqCst);
        self.pages
            .get(&(league_id, page))
            .cloned()
            .unwrap_or_else(|| Err(not_found()))
    }

    async fn fetch_manager_history(&self, entry_id: EntryId) -> Result<ManagerHistory, FetchError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.history_delay.is_zero() {
            tokio::time::sleep(self.history_delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.histories
            .get(&entry_id)
            .cloned()
            .unwrap_or_else(|| Err(not_found()))
    }

    async fn fetch_gameweek_picks(
        &self,
        entry_id: EntryId,
        event: u32,
    ) -> Result<GameweekPicks, FetchError> {
        self.picks_calls.fetch_add(1, Ordering::SeqCst);
        self.picks
            .get(&(entry_id, event))
            .cloned()
            .unwrap_or_else(|| Err(not_found()))
    }

    async fn fetch_player_directory(&self) -> Result<PlayerDirectory, FetchError> {
        self.directory
            .clone()
            .unwrap_or_else(|| Ok(PlayerDirectory::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: u64) -> LeagueMember {
        LeagueMember::new(EntryId::new(id), format!("Team {id}"), format!("Manager {id}"))
    }

    #[tokio::test]
    async fn test_with_league_paginates() {
        let league = LeagueId::new(10);
        let source = MockLeagueSource::new().with_league(
            league,
            "Mates",
            (1..=5).map(member).collect(),
            2,
        );

        let p1 = source.fetch_standings_page(league, 1).await.unwrap();
        let p3 = source.fetch_standings_page(league, 3).await.unwrap();

        assert!(p1.has_next);
        assert_eq!(p1.members.len(), 2);
        assert!(!p3.has_next);
        assert_eq!(p3.members.len(), 1);
        assert_eq!(source.standings_calls(), 2);
    }

    #[tokio::test]
    async fn test_unregistered_requests_are_not_found() {
        let source = MockLeagueSource::new();

        let err = source.fetch_manager_history(EntryId::new(1)).await.unwrap_err();
        assert_eq!(err, FetchError::UpstreamError { status: 404 });
        assert_eq!(source.history_calls(), 1);
        assert!(source.fetch_player_directory().await.unwrap().is_empty());
    }
}
