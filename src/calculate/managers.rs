//! Per-manager statistics.

use crate::models::{
    ConsistencyBand, GameweekPerformance, LeagueMember, ManagerStatistics, StreakInfo, StreakType,
    WeekScore,
};

use super::{mean, population_std_dev};

/// Number of trailing gameweeks considered for the current streak.
pub const STREAK_WINDOW: usize = 5;

/// Weeks above this multiple of a manager's own average count as captain hits.
pub const CAPTAIN_SUCCESS_FACTOR: f64 = 1.2;

/// Compute the statistics row for one member.
pub fn manager_statistics(member: &LeagueMember) -> ManagerStatistics {
    let history = &member.gameweek_history;
    let points = member.points_series();
    let weeks = history.len();

    let average_points = mean(&points);
    let standard_deviation = population_std_dev(&points);

    let captain_success_rate = if weeks == 0 {
        0.0
    } else {
        let threshold = average_points * CAPTAIN_SUCCESS_FACTOR;
        let hits = points.iter().filter(|&&p| f64::from(p) > threshold).count();
        hits as f64 / weeks as f64
    };

    let bench_waste_per_week = if weeks == 0 {
        0.0
    } else {
        let bench: u64 = history.iter().map(|gw| u64::from(gw.bench_points)).sum();
        bench as f64 / weeks as f64
    };

    ManagerStatistics {
        entry_id: member.entry_id,
        entry_name: member.entry_name.clone(),
        manager_name: member.manager_name.clone(),
        gameweeks_played: weeks as u32,
        average_points,
        standard_deviation,
        consistency: ConsistencyBand::from_std_dev(standard_deviation),
        best_week: best_week(history),
        worst_week: worst_week(history),
        current_streak: current_streak(history),
        captain_success_rate,
        bench_waste_per_week,
        chips_used_count: member.chips.len() as u32,
        total_transfers: history.iter().map(|gw| gw.transfers).sum(),
    }
}

/// Highest-scoring week; the earliest wins a tie.
pub fn best_week(history: &[GameweekPerformance]) -> Option<WeekScore> {
    let mut best: Option<&GameweekPerformance> = None;
    for gw in history {
        if best.map_or(true, |b| gw.points > b.points) {
            best = Some(gw);
        }
    }
    best.map(|gw| WeekScore {
        event: gw.event,
        points: gw.points,
    })
}

/// Lowest-scoring non-zero week; the earliest wins a tie.
pub fn worst_week(history: &[GameweekPerformance]) -> Option<WeekScore> {
    let mut worst: Option<&GameweekPerformance> = None;
    for gw in history.iter().filter(|gw| gw.points != 0) {
        if worst.map_or(true, |w| gw.points < w.points) {
            worst = Some(gw);
        }
    }
    worst.map(|gw| WeekScore {
        event: gw.event,
        points: gw.points,
    })
}

/// Rank streak over the last [`STREAK_WINDOW`] gameweeks.
///
/// An improving step bumps the rising counter and zeroes the falling one,
/// and vice versa. Unchanged or missing ranks leave both alone.
pub fn current_streak(history: &[GameweekPerformance]) -> Option<StreakInfo> {
    let window = &history[history.len().saturating_sub(STREAK_WINDOW)..];

    let mut rising = 0u32;
    let mut falling = 0u32;
    let mut rising_start = 0usize;
    let mut falling_start = 0usize;

    for (i, pair) in window.windows(2).enumerate() {
        let (prev, cur) = (&pair[0], &pair[1]);
        if prev.rank == 0 || cur.rank == 0 {
            continue;
        }
        if cur.rank < prev.rank {
            if rising == 0 {
                rising_start = i;
            }
            rising += 1;
            falling = 0;
        } else if cur.rank > prev.rank {
            if falling == 0 {
                falling_start = i;
            }
            falling += 1;
            rising = 0;
        }
    }

    if rising == 0 && falling == 0 {
        return None;
    }

    let (streak_type, count, start) = if rising > falling {
        (StreakType::Rising, rising, rising_start)
    } else {
        (StreakType::Falling, falling, falling_start)
    };

    Some(StreakInfo {
        streak_type,
        count,
        start_gameweek: window[start].event,
    })
}
