//! The assembled league statistics snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    ChipUsageSummary, DroppedMember, EntryId, HeadToHeadRecord, LeagueId, LeagueMember,
    LeagueRecord, ManagerStatistics, RecordType,
};

/// Everything computed for one league. Immutable once built; cached by league id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueStatisticsSnapshot {
    pub league_id: LeagueId,
    pub league_name: String,

    /// When the snapshot was assembled
    pub generated_at: DateTime<Utc>,

    pub records: Vec<LeagueRecord>,
    pub manager_statistics: Vec<ManagerStatistics>,
    pub head_to_head_records: Vec<HeadToHeadRecord>,
    pub chip_summary: Vec<ChipUsageSummary>,

    /// Members with full detail, in standings order
    pub members: Vec<LeagueMember>,

    /// Members whose detail fetch failed
    #[serde(default)]
    pub dropped_members: Vec<DroppedMember>,
}

impl LeagueStatisticsSnapshot {
    pub fn record(&self, record_type: RecordType) -> Option<&LeagueRecord> {
        self.records.iter().find(|r| r.record_type == record_type)
    }

    pub fn member(&self, entry_id: EntryId) -> Option<&LeagueMember> {
        self.members.iter().find(|m| m.entry_id == entry_id)
    }

    pub fn manager_statistics_for(&self, entry_id: EntryId) -> Option<&ManagerStatistics> {
        self.manager_statistics
            .iter()
            .find(|s| s.entry_id == entry_id)
    }
}
