//! League statistics pipeline.
//!
//! Orchestrates a single league load:
//!
//! ```text
//! CheckCache -> (hit) Done
//!            -> (miss) FetchDirectory -> FetchMembers -> FetchDetails
//!                      -> Aggregate -> WriteCache -> Done
//! ```
//!
//! Only the membership stage can fail the run. Nothing is cached unless the
//! whole miss path completes.

mod details;
mod membership;
mod status;

pub use details::*;
pub use membership::*;
pub use status::*;

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::cache::ResultCache;
use crate::calculate::{self, DEFAULT_HEAD_TO_HEAD_LIMIT};
use crate::fetch::{FetchError, LeagueSource};
use crate::models::{LeagueId, LeagueStatisticsSnapshot, PlayerDirectory};

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    CheckCache,
    FetchDirectory,
    FetchMembers,
    FetchDetails,
    Aggregate,
    WriteCache,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::CheckCache => "check cache",
            Stage::FetchDirectory => "fetch player directory",
            Stage::FetchMembers => "fetch members",
            Stage::FetchDetails => "fetch member details",
            Stage::Aggregate => "aggregate",
            Stage::WriteCache => "write cache",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssembleError {
    #[error("Invalid league id: {0}")]
    InvalidLeague(LeagueId),

    #[error("Failed to {stage}: {source}")]
    Fetch { stage: Stage, source: FetchError },
}

impl AssembleError {
    /// The underlying fetch error, if any.
    pub fn fetch_error(&self) -> Option<&FetchError> {
        match self {
            AssembleError::Fetch { source, .. } => Some(source),
            AssembleError::InvalidLeague(_) => None,
        }
    }
}

/// Receives `(fraction, message)` progress updates.
pub trait ProgressSink: Send + Sync {
    fn report(&self, fraction: f64, message: &str);
}

impl<F> ProgressSink for F
where
    F: Fn(f64, &str) + Send + Sync,
{
    fn report(&self, fraction: f64, message: &str) {
        self(fraction, message)
    }
}

/// Discards progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _fraction: f64, _message: &str) {}
}

/// Clamps reported fractions into `[0, 1]` and never lets them go backwards.
struct Progress<'a> {
    sink: &'a dyn ProgressSink,
    last: f64,
}

impl<'a> Progress<'a> {
    fn new(sink: &'a dyn ProgressSink) -> Self {
        Self { sink, last: 0.0 }
    }

    fn report(&mut self, fraction: f64, message: &str) {
        let value = fraction.clamp(0.0, 1.0).max(self.last);
        self.last = value;
        self.sink.report(value, message);
    }
}

/// Tunables for a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Members beyond this many (in standings order) are not detailed
    pub max_members: usize,
    /// Detail fetches per batch, and so the in-flight cap
    pub batch_size: usize,
    /// Leading members compared head-to-head
    pub head_to_head_limit: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_members: DEFAULT_MAX_MEMBERS,
            batch_size: DEFAULT_BATCH_SIZE,
            head_to_head_limit: DEFAULT_HEAD_TO_HEAD_LIMIT,
        }
    }
}

/// Builds league snapshots from a [`LeagueSource`], caching the results.
pub struct StatisticsAssembler {
    source: Arc<dyn LeagueSource>,
    cache: Arc<ResultCache>,
    config: PipelineConfig,
}

impl StatisticsAssembler {
    pub fn new(source: Arc<dyn LeagueSource>, cache: Arc<ResultCache>) -> Self {
        Self {
            source,
            cache,
            config: PipelineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    /// Cached snapshot for a league, without fetching.
    pub async fn cached(&self, league_id: LeagueId) -> Option<Arc<LeagueStatisticsSnapshot>> {
        self.cache.get(league_id).await
    }

    pub async fn invalidate(&self, league_id: LeagueId) -> bool {
        self.cache.invalidate(league_id).await
    }

    /// Load statistics for a league.
    ///
    /// A live cache entry is returned as-is unless `force_refresh` is set.
    /// Otherwise the full fetch and aggregation runs and its result replaces
    /// the cache entry.
    pub async fn fetch_league_statistics(
        &self,
        league_id: LeagueId,
        force_refresh: bool,
        progress: &dyn ProgressSink,
    ) -> Result<Arc<LeagueStatisticsSnapshot>, AssembleError> {
        if !league_id.is_valid() {
            return Err(AssembleError::InvalidLeague(league_id));
        }

        let mut progress = Progress::new(progress);

        if !force_refresh {
            if let Some(snapshot) = self.cache.get(league_id).await {
                info!("League {}: served from cache", league_id);
                progress.report(1.0, "Loaded from cache");
                return Ok(snapshot);
            }
        }

        info!(
            "League {}: loading via {} (force_refresh: {})",
            league_id,
            self.source.name(),
            force_refresh
        );

        let directory = match self.source.fetch_player_directory().await {
            Ok(directory) => directory,
            Err(e) => {
                warn!("Player directory unavailable, captain names omitted: {}", e);
                PlayerDirectory::default()
            }
        };
        progress.report(0.1, "Loaded player directory");

        let membership = MembershipFetcher::new(Arc::clone(&self.source))
            .fetch_all_members(league_id)
            .await
            .map_err(|source| {
                error!("League {}: membership fetch failed: {}", league_id, source);
                AssembleError::Fetch {
                    stage: Stage::FetchMembers,
                    source,
                }
            })?;
        progress.report(
            0.3,
            &format!("Found {} members", membership.members.len()),
        );

        let outcome = DetailFetcher::new(Arc::clone(&self.source))
            .with_limits(self.config.max_members, self.config.batch_size)
            .fetch_details(membership.members, Arc::new(directory), |done, total| {
                progress.report(
                    0.3 + 0.6 * done as f64 / total as f64,
                    &format!("Fetched batch {done} of {total}"),
                );
            })
            .await;

        let aggregates = calculate::aggregate(&outcome.members, self.config.head_to_head_limit);

        let snapshot = Arc::new(LeagueStatisticsSnapshot {
            league_id,
            league_name: membership.league_name,
            generated_at: Utc::now(),
            records: aggregates.records,
            manager_statistics: aggregates.manager_statistics,
            head_to_head_records: aggregates.head_to_head_records,
            chip_summary: aggregates.chip_summary,
            members: outcome.members,
            dropped_members: outcome.dropped,
        });

        self.cache.put(league_id, Arc::clone(&snapshot)).await;
        progress.report(1.0, "Done");

        info!(
            "League {} ({}): {} members analysed, {} dropped, {} records",
            league_id,
            snapshot.league_name,
            snapshot.members.len(),
            snapshot.dropped_members.len(),
            snapshot.records.len()
        );

        Ok(snapshot)
    }
}
