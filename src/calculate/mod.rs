//! Statistics calculation engine.
//!
//! Pure functions over fully-detailed league members:
//! - League records (best/worst gameweek, chips, momentum, consistency)
//! - Per-manager statistics (average, deviation, streaks)
//! - All-pairs head-to-head over a bounded prefix of members
//! - Chip usage summary and cumulative points trends
//!
//! Nothing here fails. Empty or degenerate input yields zeroed or absent values.

mod head_to_head;
mod managers;
mod records;
mod trends;

pub use head_to_head::*;
pub use managers::*;
pub use records::*;
pub use trends::*;

use crate::models::{
    ChipUsageSummary, HeadToHeadRecord, LeagueMember, LeagueRecord, ManagerStatistics,
};

/// Default number of leading members compared head-to-head (190 pairs).
pub const DEFAULT_HEAD_TO_HEAD_LIMIT: usize = 20;

/// Arithmetic mean. Zero for an empty slice.
pub fn mean(values: &[i32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sum: i64 = values.iter().map(|&v| i64::from(v)).sum();
    sum as f64 / values.len() as f64
}

/// Population standard deviation. Zero for an empty slice.
pub fn population_std_dev(values: &[i32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let avg = mean(values);
    let variance = values
        .iter()
        .map(|&v| {
            let d = f64::from(v) - avg;
            d * d
        })
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}

/// Everything the aggregator derives for one league.
#[derive(Debug, Clone, Default)]
pub struct LeagueAggregates {
    pub records: Vec<LeagueRecord>,
    pub manager_statistics: Vec<ManagerStatistics>,
    pub head_to_head_records: Vec<HeadToHeadRecord>,
    pub chip_summary: Vec<ChipUsageSummary>,
}

/// Run every aggregation over the member set.
pub fn aggregate(members: &[LeagueMember], head_to_head_limit: usize) -> LeagueAggregates {
    LeagueAggregates {
        records: league_records(members),
        manager_statistics: members.iter().map(manager_statistics).collect(),
        head_to_head_records: head_to_head_records(members, head_to_head_limit),
        chip_summary: chip_usage_summary(members),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::models::{EntryId, GameweekPerformance, LeagueMember};

    /// A member whose gameweeks are numbered from 1 with the given points.
    pub fn member_with_points(id: u64, points: &[i32]) -> LeagueMember {
        let mut total = 0;
        let history = points
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                total += p;
                GameweekPerformance::new(i as u32 + 1, p, total, 0)
            })
            .collect();
        LeagueMember::new(EntryId::new(id), format!("Team {id}"), format!("Manager {id}"))
            .with_details(history, Vec::new())
    }

    /// A member with the given per-gameweek ranks and flat 50-point weeks.
    pub fn member_with_ranks(id: u64, ranks: &[u32]) -> LeagueMember {
        let history = ranks
            .iter()
            .enumerate()
            .map(|(i, &r)| GameweekPerformance::new(i as u32 + 1, 50, 50 * (i as i32 + 1), r))
            .collect();
        LeagueMember::new(EntryId::new(id), format!("Team {id}"), format!("Manager {id}"))
            .with_details(history, Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::member_with_points;
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[60, 45, 0, 80, 55]), 48.0);
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[-4, 4]), 0.0);
    }

    #[test]
    fn test_population_std_dev() {
        // Population variance of [60, 45, 0, 80, 55] is 3530 / 5 = 706.
        let sd = population_std_dev(&[60, 45, 0, 80, 55]);
        assert!((sd - 706f64.sqrt()).abs() < 1e-9);
        assert!((sd - 26.57).abs() < 0.01);
    }

    #[test]
    fn test_std_dev_zero_iff_identical() {
        assert_eq!(population_std_dev(&[50, 50, 50]), 0.0);
        assert_eq!(population_std_dev(&[50]), 0.0);
        assert_eq!(population_std_dev(&[]), 0.0);
        assert!(population_std_dev(&[50, 51]) > 0.0);
    }

    #[test]
    fn test_std_dev_never_negative() {
        let samples: [&[i32]; 4] = [&[1, 2, 3], &[100, -5, 7], &[0, 0, 90], &[-3, -3, -2]];
        for s in samples {
            assert!(population_std_dev(s) >= 0.0);
        }
    }

    #[test]
    fn test_aggregate_empty_league() {
        let result = aggregate(&[], DEFAULT_HEAD_TO_HEAD_LIMIT);

        assert!(result.records.is_empty());
        assert!(result.manager_statistics.is_empty());
        assert!(result.head_to_head_records.is_empty());
        assert_eq!(result.chip_summary.len(), 4);
    }

    #[test]
    fn test_aggregate_produces_all_sections() {
        let members = vec![
            member_with_points(1, &[60, 45, 70]),
            member_with_points(2, &[50, 55, 40]),
            member_with_points(3, &[30, 65, 62]),
        ];

        let result = aggregate(&members, DEFAULT_HEAD_TO_HEAD_LIMIT);

        assert_eq!(result.manager_statistics.len(), 3);
        assert_eq!(result.head_to_head_records.len(), 3);
        assert!(!result.records.is_empty());
    }
}
