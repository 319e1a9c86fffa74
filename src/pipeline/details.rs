//! Per-member detail fetching.
//!
//! Members are processed in fixed-size batches. Inside a batch every member
//! gets its own task; batches run one after another, so the number of
//! in-flight history requests never exceeds the batch size. A member whose
//! history cannot be fetched is dropped and recorded, never fatal.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::fetch::LeagueSource;
use crate::models::{
    ChipType, ChipUsage, DroppedMember, EntryId, LeagueMember, ManagerHistory, PlayerDirectory,
};

pub const DEFAULT_MAX_MEMBERS: usize = 50;
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Assumed share of a triple-captain week's total that came from the captain.
pub const CAPTAIN_SHARE: f64 = 0.25;

/// Multiplier assumed when picks report none for the captain.
const TRIPLE_CAPTAIN_MULTIPLIER: u32 = 3;

/// Members that made it through, plus the ones that did not.
#[derive(Debug, Clone, Default)]
pub struct DetailOutcome {
    /// Detailed members, in input order
    pub members: Vec<LeagueMember>,
    pub dropped: Vec<DroppedMember>,
}

/// Fetches history and chip detail for league members.
pub struct DetailFetcher {
    source: Arc<dyn LeagueSource>,
    max_members: usize,
    batch_size: usize,
}

impl DetailFetcher {
    pub fn new(source: Arc<dyn LeagueSource>) -> Self {
        Self {
            source,
            max_members: DEFAULT_MAX_MEMBERS,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_limits(mut self, max_members: usize, batch_size: usize) -> Self {
        self.max_members = max_members;
        self.batch_size = batch_size.max(1);
        self
    }

    /// Fetch detail for the first `max_members` members.
    ///
    /// `on_batch(done, total)` is called after each batch completes.
    pub async fn fetch_details<F>(
        &self,
        mut members: Vec<LeagueMember>,
        directory: Arc<PlayerDirectory>,
        mut on_batch: F,
    ) -> DetailOutcome
    where
        F: FnMut(usize, usize) + Send,
    {
        if members.len() > self.max_members {
            debug!(
                "Analysing top {} of {} members",
                self.max_members,
                members.len()
            );
            members.truncate(self.max_members);
        }

        let total_batches = members.len().div_ceil(self.batch_size);
        let mut outcome = DetailOutcome::default();
        let mut position = 0usize;

        for (batch_index, batch) in members.chunks(self.batch_size).enumerate() {
            let mut tasks = JoinSet::new();
            let mut pending: HashMap<usize, (EntryId, String)> = HashMap::new();

            for member in batch {
                let index = position;
                position += 1;
                pending.insert(index, (member.entry_id, member.entry_name.clone()));

                let source = Arc::clone(&self.source);
                let directory = Arc::clone(&directory);
                let member = member.clone();
                tasks.spawn(async move { (index, enrich_member(source, directory, member).await) });
            }

            let mut completed = Vec::with_capacity(batch.len());
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok((index, result)) => {
                        pending.remove(&index);
                        match result {
                            Ok(member) => completed.push((index, member)),
                            Err(dropped) => {
                                warn!(
                                    "Dropping member {} ({}): {}",
                                    dropped.entry_id, dropped.entry_name, dropped.reason
                                );
                                outcome.dropped.push(dropped);
                            }
                        }
                    }
                    Err(e) => warn!("Detail task failed: {}", e),
                }
            }

            // Anything still pending never reported back.
            let mut lost: Vec<(usize, (EntryId, String))> = pending.into_iter().collect();
            lost.sort_by_key(|(index, _)| *index);
            outcome
                .dropped
                .extend(lost.into_iter().map(|(_, (entry_id, entry_name))| DroppedMember {
                    entry_id,
                    entry_name,
                    reason: "detail task did not complete".to_string(),
                }));

            completed.sort_by_key(|(index, _)| *index);
            outcome
                .members
                .extend(completed.into_iter().map(|(_, member)| member));

            on_batch(batch_index + 1, total_batches);
        }

        info!(
            "Fetched detail for {} members ({} dropped)",
            outcome.members.len(),
            outcome.dropped.len()
        );
        outcome
    }
}

async fn enrich_member(
    source: Arc<dyn LeagueSource>,
    directory: Arc<PlayerDirectory>,
    member: LeagueMember,
) -> Result<LeagueMember, DroppedMember> {
    let history = match source.fetch_manager_history(member.entry_id).await {
        Ok(history) => history,
        Err(e) => {
            return Err(DroppedMember {
                entry_id: member.entry_id,
                entry_name: member.entry_name,
                reason: e.to_string(),
            })
        }
    };

    let chips = chip_usages(source.as_ref(), &directory, member.entry_id, &history).await;
    Ok(member.with_details(history.gameweeks, chips))
}

/// Attach gameweek outcomes to each raw chip activation.
async fn chip_usages(
    source: &dyn LeagueSource,
    directory: &PlayerDirectory,
    entry_id: EntryId,
    history: &ManagerHistory,
) -> Vec<ChipUsage> {
    let mut usages = Vec::with_capacity(history.chips.len());

    for activation in &history.chips {
        let gameweek = history
            .gameweeks
            .iter()
            .find(|gw| gw.event == activation.event);

        let mut usage = ChipUsage::new(
            activation.chip,
            activation.event,
            gameweek.map(|gw| gw.points).unwrap_or(0),
        );

        match activation.chip {
            ChipType::BenchBoost => {
                usage.bench_boost_points = gameweek.map(|gw| gw.bench_points);
            }
            ChipType::TripleCaptain => {
                attach_captain(source, directory, entry_id, &mut usage).await;
            }
            ChipType::FreeHit | ChipType::Wildcard => {}
        }

        usages.push(usage);
    }

    usages
}

/// Fill in captain fields for a triple-captain week. Failures leave them empty.
async fn attach_captain(
    source: &dyn LeagueSource,
    directory: &PlayerDirectory,
    entry_id: EntryId,
    usage: &mut ChipUsage,
) {
    let picks = match source.fetch_gameweek_picks(entry_id, usage.event).await {
        Ok(picks) => picks,
        Err(e) => {
            warn!(
                "No captain detail for entry {} GW{}: {}",
                entry_id, usage.event, e
            );
            return;
        }
    };

    let Some(captain) = picks.captain() else {
        debug!("Entry {} GW{} has no captain pick", entry_id, usage.event);
        return;
    };

    let multiplier = if captain.multiplier > 0 {
        captain.multiplier
    } else {
        TRIPLE_CAPTAIN_MULTIPLIER
    };
    let (raw, effective) = estimate_captain_points(usage.points, multiplier);

    usage.captain_name = directory.name(captain.element).map(str::to_string);
    usage.captain_points = Some(raw);
    usage.captain_effective_points = Some(effective);
}

/// Estimate (raw, effective) captain points from a gameweek total.
///
/// Per-player scores are not available here, so the captain is assumed to
/// account for [`CAPTAIN_SHARE`] of the total. This is an approximation.
pub fn estimate_captain_points(gameweek_points: i32, multiplier: u32) -> (i32, i32) {
    let effective = (f64::from(gameweek_points) * CAPTAIN_SHARE).round() as i32;
    let raw = effective / multiplier.max(1) as i32;
    (raw, effective)
}
