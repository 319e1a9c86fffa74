//! Per-league load lifecycle.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AssembleError, ProgressSink, StatisticsAssembler};
use crate::models::{LeagueId, LeagueStatisticsSnapshot};

/// What a caller polling a league should show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LoadState {
    #[default]
    NotLoaded,
    Loading {
        progress: f64,
        message: String,
    },
    Loaded {
        league_name: String,
        members: usize,
        generated_at: DateTime<Utc>,
    },
    Failed {
        error: String,
    },
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading { .. })
    }

    fn loaded(snapshot: &LeagueStatisticsSnapshot) -> Self {
        LoadState::Loaded {
            league_name: snapshot.league_name.clone(),
            members: snapshot.members.len(),
            generated_at: snapshot.generated_at,
        }
    }
}

/// Load state for every league seen so far.
#[derive(Debug, Default)]
pub struct LoadTracker {
    states: RwLock<HashMap<LeagueId, LoadState>>,
}

impl LoadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, league_id: LeagueId) -> LoadState {
        self.states
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&league_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_loading(&self, league_id: LeagueId) -> bool {
        self.state(league_id).is_loading()
    }

    /// Move a league into `Loading`. Returns false if it already was.
    pub fn begin(&self, league_id: LeagueId) -> bool {
        let mut states = self.states.write().unwrap_or_else(PoisonError::into_inner);
        if states.get(&league_id).is_some_and(LoadState::is_loading) {
            return false;
        }
        states.insert(
            league_id,
            LoadState::Loading {
                progress: 0.0,
                message: "Starting".to_string(),
            },
        );
        true
    }

    /// A progress sink that writes into this league's `Loading` state.
    pub fn sink(&self, league_id: LeagueId) -> TrackerSink<'_> {
        TrackerSink {
            tracker: self,
            league_id,
        }
    }

    pub fn finish_ok(&self, league_id: LeagueId, snapshot: &LeagueStatisticsSnapshot) {
        self.set(league_id, LoadState::loaded(snapshot));
    }

    pub fn finish_err(&self, league_id: LeagueId, error: &AssembleError) {
        self.set(
            league_id,
            LoadState::Failed {
                error: error.to_string(),
            },
        );
    }

    /// Record a failure that has no `AssembleError`, such as a load task that died.
    pub fn fail(&self, league_id: LeagueId, message: &str) {
        self.set(
            league_id,
            LoadState::Failed {
                error: message.to_string(),
            },
        );
    }

    /// Forget a league; it reads as `NotLoaded` afterwards.
    pub fn reset(&self, league_id: LeagueId) {
        self.states
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&league_id);
    }

    fn set(&self, league_id: LeagueId, state: LoadState) {
        self.states
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(league_id, state);
    }
}

/// Progress sink bound to one league in a [`LoadTracker`].
pub struct TrackerSink<'a> {
    tracker: &'a LoadTracker,
    league_id: LeagueId,
}

impl ProgressSink for TrackerSink<'_> {
    fn report(&self, fraction: f64, message: &str) {
        self.tracker.set(
            self.league_id,
            LoadState::Loading {
                progress: fraction,
                message: message.to_string(),
            },
        );
    }
}

/// Run the assembler for a league, recording every lifecycle transition.
///
/// Callers that need the 409-style "already loading" check should call
/// [`LoadTracker::begin`] first; this function does not check it.
pub async fn run_tracked(
    assembler: &StatisticsAssembler,
    tracker: &LoadTracker,
    league_id: LeagueId,
    force_refresh: bool,
) -> Result<Arc<LeagueStatisticsSnapshot>, AssembleError> {
    let sink = tracker.sink(league_id);
    let result = assembler
        .fetch_league_statistics(league_id, force_refresh, &sink)
        .await;

    match &result {
        Ok(snapshot) => tracker.finish_ok(league_id, snapshot),
        Err(e) => tracker.finish_err(league_id, e),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ResultCache;
    use crate::fetch::{FetchError, MockLeagueSource};
    use crate::models::{EntryId, LeagueMember, ManagerHistory};

    #[test]
    fn test_default_is_not_loaded() {
        let tracker = LoadTracker::new();
        assert_eq!(tracker.state(LeagueId::new(1)), LoadState::NotLoaded);
        assert!(!tracker.is_loading(LeagueId::new(1)));
    }

    #[test]
    fn test_begin_rejects_second_load() {
        let tracker = LoadTracker::new();
        let league = LeagueId::new(1);

        assert!(tracker.begin(league));
        assert!(!tracker.begin(league));
        assert!(tracker.begin(LeagueId::new(2)));

        tracker.reset(league);
        assert!(tracker.begin(league));
    }

    #[test]
    fn test_sink_updates_loading_state() {
        let tracker = LoadTracker::new();
        let league = LeagueId::new(1);
        tracker.begin(league);

        tracker.sink(league).report(0.3, "Found 12 members");

        assert_eq!(
            tracker.state(league),
            LoadState::Loading {
                progress: 0.3,
                message: "Found 12 members".to_string()
            }
        );
    }

    #[test]
    fn test_fail_ends_loading() {
        let tracker = LoadTracker::new();
        let league = LeagueId::new(1);
        tracker.begin(league);

        tracker.fail(league, "load task did not complete");

        assert_eq!(
            tracker.state(league),
            LoadState::Failed {
                error: "load task did not complete".to_string()
            }
        );
        assert!(tracker.begin(league));
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_value(LoadState::Loading {
            progress: 0.5,
            message: "Fetched batch 1 of 2".to_string(),
        })
        .unwrap();
        assert_eq!(json["state"], "loading");
        assert_eq!(json["progress"], 0.5);

        let json = serde_json::to_value(LoadState::NotLoaded).unwrap();
        assert_eq!(json["state"], "not_loaded");
    }

    #[tokio::test]
    async fn test_run_tracked_success() {
        let league = LeagueId::new(5);
        let member = LeagueMember::new(EntryId::new(1), "Team".into(), "Manager".into());
        let source = Arc::new(
            MockLeagueSource::new()
                .with_league(league, "Pub League", vec![member], 50)
                .with_history(EntryId::new(1), ManagerHistory::default()),
        );
        let assembler = StatisticsAssembler::new(source, Arc::new(ResultCache::default()));
        let tracker = LoadTracker::new();

        tracker.begin(league);
        run_tracked(&assembler, &tracker, league, false).await.unwrap();

        match tracker.state(league) {
            LoadState::Loaded {
                league_name,
                members,
                ..
            } => {
                assert_eq!(league_name, "Pub League");
                assert_eq!(members, 1);
            }
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_run_tracked_failure() {
        let league = LeagueId::new(5);
        let source = Arc::new(
            MockLeagueSource::new().with_page_error(
                league,
                1,
                FetchError::NoResponse("down".into()),
            ),
        );
        let assembler = StatisticsAssembler::new(source, Arc::new(ResultCache::default()));
        let tracker = LoadTracker::new();

        let err = run_tracked(&assembler, &tracker, league, false).await.unwrap_err();

        assert_eq!(
            tracker.state(league),
            LoadState::Failed {
                error: err.to_string()
            }
        );
        assert!(!tracker.is_loading(league));
    }
}
