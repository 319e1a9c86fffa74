//! Chip usage summary and cumulative points trends.

use std::collections::HashSet;

use crate::models::{ChipType, ChipUsageSummary, LeagueMember, PointsTrend, TrendPoint};

/// League-wide usage for every chip type, in [`ChipType::ALL`] order.
pub fn chip_usage_summary(members: &[LeagueMember]) -> Vec<ChipUsageSummary> {
    ChipType::ALL
        .iter()
        .map(|&chip| {
            let mut managers = HashSet::new();
            let mut points = Vec::new();

            for member in members {
                for usage in member.chips.iter().filter(|c| c.chip == chip) {
                    managers.insert(member.entry_id);
                    points.push(usage.points);
                }
            }

            ChipUsageSummary {
                chip,
                times_played: points.len() as u32,
                managers_used: managers.len() as u32,
                average_points: super::mean(&points),
                best_points: points.iter().copied().max(),
            }
        })
        .collect()
}

/// Cumulative points per gameweek for one member.
pub fn points_trend(member: &LeagueMember) -> PointsTrend {
    PointsTrend {
        entry_id: member.entry_id,
        entry_name: member.entry_name.clone(),
        points: member
            .gameweek_history
            .iter()
            .map(|gw| TrendPoint {
                event: gw.event,
                total_points: gw.total_points,
            })
            .collect(),
    }
}

/// Trends for every member, in input order.
pub fn points_trends(members: &[LeagueMember]) -> Vec<PointsTrend> {
    members.iter().map(points_trend).collect()
}
