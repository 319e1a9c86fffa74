//! Pairwise head-to-head comparisons.

use crate::models::{HeadToHeadRecord, LeagueMember, Margin};

/// Compare two members gameweek by gameweek, from `a`'s side.
///
/// Only the overlapping prefix of the two histories is walked. Gameweek
/// numbers are taken from `a`'s history.
pub fn head_to_head(a: &LeagueMember, b: &LeagueMember) -> HeadToHeadRecord {
    let overlap = a.gameweek_history.len().min(b.gameweek_history.len());

    let mut record = HeadToHeadRecord {
        member1: a.entry_id,
        member1_name: a.entry_name.clone(),
        member2: b.entry_id,
        member2_name: b.entry_name.clone(),
        gameweeks_compared: overlap as u32,
        wins: 0,
        draws: 0,
        losses: 0,
        total_points_for: 0,
        total_points_against: 0,
        biggest_win: None,
        biggest_loss: None,
    };

    for (gw_a, gw_b) in a.gameweek_history.iter().zip(&b.gameweek_history) {
        record.total_points_for += i64::from(gw_a.points);
        record.total_points_against += i64::from(gw_b.points);

        let diff = gw_a.points - gw_b.points;
        if diff > 0 {
            record.wins += 1;
            if record.biggest_win.map_or(true, |m| diff > m.difference) {
                record.biggest_win = Some(Margin {
                    gameweek: gw_a.event,
                    difference: diff,
                });
            }
        } else if diff < 0 {
            record.losses += 1;
            if record.biggest_loss.map_or(true, |m| -diff > m.difference) {
                record.biggest_loss = Some(Margin {
                    gameweek: gw_a.event,
                    difference: -diff,
                });
            }
        } else {
            record.draws += 1;
        }
    }

    record
}

/// All unordered pairs among the first `limit` members.
pub fn head_to_head_records(members: &[LeagueMember], limit: usize) -> Vec<HeadToHeadRecord> {
    let field = &members[..members.len().min(limit)];

    let mut records = Vec::with_capacity(field.len() * field.len().saturating_sub(1) / 2);
    for (i, a) in field.iter().enumerate() {
        for b in &field[i + 1..] {
            records.push(head_to_head(a, b));
        }
    }
    records
}
