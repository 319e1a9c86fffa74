//! League-wide records.
//!
//! Ties always go to the first candidate encountered: members in input order,
//! gameweeks ascending, chips in stored order.

use crate::models::{
    ChipType, ChipUsage, ConsistencyBand, GameweekPerformance, LeagueMember, LeagueRecord,
    RecordType,
};

use super::{mean, population_std_dev};

/// All records, in [`RecordType`] declaration order. Records without data are omitted.
pub fn league_records(members: &[LeagueMember]) -> Vec<LeagueRecord> {
    let mut records = Vec::new();

    records.extend(best_gameweek(members));
    records.extend(worst_gameweek(members));
    records.extend(best_captain(members));
    records.extend(chip_records(members));
    records.extend(biggest_rank_rise(members));
    records.extend(biggest_rank_fall(members));
    records.extend(most_consistent(members));

    records
}

fn all_gameweeks(
    members: &[LeagueMember],
) -> impl Iterator<Item = (&LeagueMember, &GameweekPerformance)> {
    members
        .iter()
        .flat_map(|m| m.gameweek_history.iter().map(move |gw| (m, gw)))
}

/// Highest single-gameweek score across the league.
pub fn best_gameweek(members: &[LeagueMember]) -> Option<LeagueRecord> {
    let mut best: Option<(&LeagueMember, &GameweekPerformance)> = None;
    for (member, gw) in all_gameweeks(members) {
        if best.map_or(true, |(_, b)| gw.points > b.points) {
            best = Some((member, gw));
        }
    }

    best.map(|(member, gw)| {
        LeagueRecord::new(RecordType::BestGameweek, f64::from(gw.points), member)
            .with_gameweek(gw.event)
            .with_info(format!("{} points in GW{}", gw.points, gw.event))
    })
}

/// Lowest single-gameweek score, ignoring zero-point weeks.
pub fn worst_gameweek(members: &[LeagueMember]) -> Option<LeagueRecord> {
    let mut worst: Option<(&LeagueMember, &GameweekPerformance)> = None;
    for (member, gw) in all_gameweeks(members).filter(|(_, gw)| gw.points != 0) {
        if worst.map_or(true, |(_, w)| gw.points < w.points) {
            worst = Some((member, gw));
        }
    }

    worst.map(|(member, gw)| {
        LeagueRecord::new(RecordType::WorstGameweek, f64::from(gw.points), member)
            .with_gameweek(gw.event)
            .with_info(format!("{} points in GW{}", gw.points, gw.event))
    })
}

fn best_chip_by<F>(
    members: &[LeagueMember],
    chip: ChipType,
    value: F,
) -> Option<(&LeagueMember, &ChipUsage, i32)>
where
    F: Fn(&ChipUsage) -> Option<i32>,
{
    let mut best: Option<(&LeagueMember, &ChipUsage, i32)> = None;
    for member in members {
        for usage in member.chips.iter().filter(|c| c.chip == chip) {
            let Some(v) = value(usage) else {
                continue;
            };
            if best.map_or(true, |(_, _, b)| v > b) {
                best = Some((member, usage, v));
            }
        }
    }
    best
}

/// Best activation of each chip type, in [`ChipType::ALL`] order.
pub fn chip_records(members: &[LeagueMember]) -> Vec<LeagueRecord> {
    ChipType::ALL
        .iter()
        .filter_map(|&chip| best_chip_record(members, chip))
        .collect()
}

/// Best activation of one chip type, judged by [`ChipUsage::record_value`].
pub fn best_chip_record(members: &[LeagueMember], chip: ChipType) -> Option<LeagueRecord> {
    let (member, usage, value) = best_chip_by(members, chip, |c| Some(c.record_value()))?;

    let record = LeagueRecord::new(RecordType::for_chip(chip), f64::from(value), member)
        .with_gameweek(usage.event);

    let record = match chip {
        ChipType::BenchBoost => match usage.bench_boost_points {
            Some(bench) => record.with_info(format!(
                "{} bench points ({} total) in GW{}",
                bench, usage.points, usage.event
            )),
            None => record.with_info(format!("{} points in GW{}", usage.points, usage.event)),
        },
        ChipType::TripleCaptain => {
            let info = match (&usage.captain_name, usage.captain_points) {
                (Some(name), Some(points)) => {
                    format!("{} captained for {} points in GW{}", name, points, usage.event)
                }
                _ => format!("{} points in GW{}", usage.points, usage.event),
            };
            record
                .with_info(info)
                .with_captain(usage.captain_name.clone(), usage.captain_points)
        }
        ChipType::FreeHit | ChipType::Wildcard => {
            record.with_info(format!("{} points in GW{}", usage.points, usage.event))
        }
    };

    Some(record)
}

/// Triple-captain activation with the highest effective captain score.
pub fn best_captain(members: &[LeagueMember]) -> Option<LeagueRecord> {
    let (member, usage, value) =
        best_chip_by(members, ChipType::TripleCaptain, |c| c.captain_effective_points)?;

    let name = usage
        .captain_name
        .clone()
        .unwrap_or_else(|| "Unknown player".to_string());

    Some(
        LeagueRecord::new(RecordType::BestCaptain, f64::from(value), member)
            .with_gameweek(usage.event)
            .with_info(format!("{} returned {} points in GW{}", name, value, usage.event))
            .with_captain(usage.captain_name.clone(), usage.captain_points),
    )
}

/// Walk adjacent gameweeks and keep the largest positive `delta(prev, cur)`.
fn biggest_rank_move<F>(
    members: &[LeagueMember],
    delta: F,
) -> Option<(&LeagueMember, &GameweekPerformance, i64)>
where
    F: Fn(i64, i64) -> i64,
{
    let mut best: Option<(&LeagueMember, &GameweekPerformance, i64)> = None;
    for member in members {
        for pair in member.gameweek_history.windows(2) {
            let (prev, cur) = (&pair[0], &pair[1]);
            if prev.rank == 0 || cur.rank == 0 {
                continue;
            }
            let change = delta(i64::from(prev.rank), i64::from(cur.rank));
            if change > 0 && best.map_or(true, |(_, _, b)| change > b) {
                best = Some((member, cur, change));
            }
        }
    }
    best
}

/// Largest single-week climb in rank.
pub fn biggest_rank_rise(members: &[LeagueMember]) -> Option<LeagueRecord> {
    biggest_rank_move(members, |prev, cur| prev - cur).map(|(member, gw, change)| {
        LeagueRecord::new(RecordType::BiggestRankRise, change as f64, member)
            .with_gameweek(gw.event)
            .with_info(format!("Up {} places in GW{}", change, gw.event))
    })
}

/// Largest single-week drop in rank.
pub fn biggest_rank_fall(members: &[LeagueMember]) -> Option<LeagueRecord> {
    biggest_rank_move(members, |prev, cur| cur - prev).map(|(member, gw, change)| {
        LeagueRecord::new(RecordType::BiggestRankFall, change as f64, member)
            .with_gameweek(gw.event)
            .with_info(format!("Down {} places in GW{}", change, gw.event))
    })
}

/// Member with the lowest standard deviation among those who have scored.
pub fn most_consistent(members: &[LeagueMember]) -> Option<LeagueRecord> {
    let mut best: Option<(&LeagueMember, f64, f64)> = None;
    for member in members {
        let points = member.points_series();
        let avg = mean(&points);
        if avg == 0.0 {
            continue;
        }
        let sd = population_std_dev(&points);
        if best.map_or(true, |(_, b, _)| sd < b) {
            best = Some((member, sd, avg));
        }
    }

    best.map(|(member, sd, avg)| {
        let band = ConsistencyBand::from_std_dev(sd);
        LeagueRecord::new(RecordType::MostConsistent, sd, member)
            .with_info(format!("{} (σ {:.1}, avg {:.1})", band, sd, avg))
    })
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{member_with_points, member_with_ranks};
    use super::*;
    use crate::models::EntryId;

    fn member_with_chips(id: u64, chips: Vec<ChipUsage>) -> LeagueMember {
        let mut member = member_with_points(id, &[50]);
        member.chips = chips;
        member
    }

    #[test]
    fn test_best_gameweek_picks_highest_triple() {
        let members = vec![
            member_with_points(1, &[60, 72, 41]),
            member_with_points(2, &[55, 48, 101]),
            member_with_points(3, &[80, 66, 59]),
        ];

        let record = best_gameweek(&members).unwrap();
        assert_eq!(record.entry_id, EntryId::new(2));
        assert_eq!(record.value, 101.0);
        assert_eq!(record.gameweek, Some(3));
    }

    #[test]
    fn test_best_gameweek_tie_keeps_first_encountered() {
        let members = vec![
            member_with_points(1, &[60, 90]),
            member_with_points(2, &[90, 40]),
            member_with_points(3, &[90, 90]),
        ];

        let record = best_gameweek(&members).unwrap();
        assert_eq!(record.entry_id, EntryId::new(1));
        assert_eq!(record.gameweek, Some(2));
    }

    #[test]
    fn test_worst_gameweek_ignores_zero_weeks() {
        let members = vec![
            member_with_points(1, &[60, 0, 41]),
            member_with_points(2, &[0, 48, 33]),
        ];

        let record = worst_gameweek(&members).unwrap();
        assert_eq!(record.entry_id, EntryId::new(2));
        assert_eq!(record.value, 33.0);
        assert_eq!(record.gameweek, Some(3));
    }

    #[test]
    fn test_worst_gameweek_all_zero_is_absent() {
        let members = vec![member_with_points(1, &[0, 0])];
        assert!(worst_gameweek(&members).is_none());
    }

    #[test]
    fn test_records_absent_for_empty_history() {
        let members = vec![member_with_points(1, &[])];
        assert!(league_records(&members).is_empty());
    }

    #[test]
    fn test_bench_boost_record_reports_bench_points() {
        let mut big_total = ChipUsage::new(ChipType::BenchBoost, 10, 95);
        big_total.bench_boost_points = Some(8);
        let mut big_bench = ChipUsage::new(ChipType::BenchBoost, 12, 70);
        big_bench.bench_boost_points = Some(24);

        let members = vec![
            member_with_chips(1, vec![big_total]),
            member_with_chips(2, vec![big_bench]),
        ];

        let record = best_chip_record(&members, ChipType::BenchBoost).unwrap();
        assert_eq!(record.entry_id, EntryId::new(2));
        assert_eq!(record.value, 24.0);
        assert_eq!(record.gameweek, Some(12));
    }

    #[test]
    fn test_triple_captain_record_falls_back_to_total_points() {
        let members = vec![member_with_chips(
            1,
            vec![ChipUsage::new(ChipType::TripleCaptain, 7, 88)],
        )];

        let record = best_chip_record(&members, ChipType::TripleCaptain).unwrap();
        assert_eq!(record.value, 88.0);
        assert!(record.captain_name.is_none());
        // No captain detail means no best-captain record either.
        assert!(best_captain(&members).is_none());
    }

    #[test]
    fn test_triple_captain_record_uses_captain_detail() {
        let mut tc = ChipUsage::new(ChipType::TripleCaptain, 7, 88);
        tc.captain_name = Some("Salah".to_string());
        tc.captain_points = Some(7);
        tc.captain_effective_points = Some(22);

        let members = vec![member_with_chips(1, vec![tc])];

        let record = best_chip_record(&members, ChipType::TripleCaptain).unwrap();
        assert_eq!(record.value, 7.0);
        assert_eq!(record.captain_name.as_deref(), Some("Salah"));

        let captain = best_captain(&members).unwrap();
        assert_eq!(captain.value, 22.0);
        assert_eq!(captain.captain_points, Some(7));
    }

    #[test]
    fn test_chip_records_in_fixed_order() {
        let members = vec![member_with_chips(
            1,
            vec![
                ChipUsage::new(ChipType::Wildcard, 3, 61),
                ChipUsage::new(ChipType::FreeHit, 20, 77),
                ChipUsage::new(ChipType::BenchBoost, 25, 90),
            ],
        )];

        let types: Vec<RecordType> = chip_records(&members)
            .into_iter()
            .map(|r| r.record_type)
            .collect();
        assert_eq!(
            types,
            vec![
                RecordType::BestBenchBoost,
                RecordType::BestFreeHit,
                RecordType::BestWildcard
            ]
        );
    }

    #[test]
    fn test_biggest_rank_rise() {
        let members = vec![
            member_with_ranks(1, &[10, 6, 7]),
            member_with_ranks(2, &[12, 12, 3]),
            member_with_ranks(3, &[2, 1, 9]),
        ];

        let rise = biggest_rank_rise(&members).unwrap();
        assert_eq!(rise.entry_id, EntryId::new(2));
        assert_eq!(rise.value, 9.0);
        assert_eq!(rise.gameweek, Some(3));

        let fall = biggest_rank_fall(&members).unwrap();
        assert_eq!(fall.entry_id, EntryId::new(3));
        assert_eq!(fall.value, 8.0);
    }

    #[test]
    fn test_biggest_rank_rise_tie_keeps_first() {
        let members = vec![
            member_with_ranks(1, &[8, 5, 2]),
            member_with_ranks(2, &[9, 6]),
        ];

        let rise = biggest_rank_rise(&members).unwrap();
        assert_eq!(rise.entry_id, EntryId::new(1));
        assert_eq!(rise.gameweek, Some(2));
    }

    #[test]
    fn test_rank_moves_skip_missing_ranks() {
        let members = vec![member_with_ranks(1, &[0, 50, 0])];
        assert!(biggest_rank_rise(&members).is_none());
        assert!(biggest_rank_fall(&members).is_none());
    }

    #[test]
    fn test_most_consistent() {
        let members = vec![
            member_with_points(1, &[20, 80, 50]),
            member_with_points(2, &[48, 52, 50]),
            member_with_points(3, &[0, 0, 0]),
        ];

        let record = most_consistent(&members).unwrap();
        assert_eq!(record.entry_id, EntryId::new(2));
        assert!(record.value < 5.0);
        assert!(record
            .additional_info
            .as_deref()
            .unwrap()
            .starts_with("Very consistent"));
    }

    #[test]
    fn test_league_records_order() {
        let members = vec![
            member_with_ranks(1, &[5, 3, 4]),
            member_with_points(2, &[40, 70, 55]),
        ];

        let types: Vec<RecordType> = league_records(&members)
            .into_iter()
            .map(|r| r.record_type)
            .collect();
        assert_eq!(
            types,
            vec![
                RecordType::BestGameweek,
                RecordType::WorstGameweek,
                RecordType::BiggestRankRise,
                RecordType::BiggestRankFall,
                RecordType::MostConsistent,
            ]
        );
    }
}
