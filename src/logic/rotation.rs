//! Win/loss rotation: round 1 from balanced columns, later rounds as placeholder ladders.
//!
//! Losers of round r-1 play each other in increasing table order, winners in
//! decreasing table order. With an odd team count one team sits out each
//! round: the team carried over from the previous bye opens table 1 against
//! the loser of table 1, and the loser of table 2 takes the new bye.

use crate::logic::schedule::{append_catch_up_round, balanced_columns, pair_columns};
use crate::models::{Match, MatchParticipant, Schedule, ScheduleStrategy, Team};
use std::collections::VecDeque;
use uuid::Uuid;

pub(crate) fn win_loss_schedule(tournament_id: Uuid, teams: &[Team], rounds: u32) -> Schedule {
    let mut schedule = Schedule::new(tournament_id, ScheduleStrategy::WinLossRotation);
    if rounds == 0 {
        return schedule;
    }

    let columns = balanced_columns(teams);
    let first_round = pair_columns(1, &columns);
    let mut carry = first_round.iter().find(|m| m.is_bye).map(|m| m.slot_a);
    schedule.matches.extend(first_round);

    let tables = (teams.len() / 2) as u32;
    for round in 2..=rounds {
        let (round_matches, next_carry) = ladder_round(round, tables, carry);
        schedule.matches.extend(round_matches);
        carry = next_carry;
    }

    schedule.base_rounds = rounds;
    schedule.total_rounds = rounds;
    schedule.catch_up_pending = teams.len() % 2 == 1;
    append_catch_up_round(&mut schedule, teams);
    schedule
}

/// Build one round of placeholders from round - 1. Returns the matches and the
/// participant sitting out this round, who is carried into the next.
fn ladder_round(
    round: u32,
    tables: u32,
    carry: Option<MatchParticipant>,
) -> (Vec<Match>, Option<MatchParticipant>) {
    let prev = round - 1;
    let mut losers: VecDeque<MatchParticipant> =
        (1..=tables).map(|t| MatchParticipant::loser_of(prev, t)).collect();
    // Highest table first.
    let mut winners: Vec<MatchParticipant> = (1..=tables)
        .rev()
        .map(|t| MatchParticipant::winner_of(prev, t))
        .collect();

    let mut opening = None;
    let mut sitter = None;
    if let Some(carried) = carry {
        opening = losers.pop_front().map(|first_loser| (first_loser, carried));
        sitter = losers.pop_front().or_else(|| winners.pop());
    }

    let losers: Vec<_> = losers.into_iter().collect();
    let loser_chunks = losers.chunks_exact(2);
    let winner_chunks = winners.chunks_exact(2);
    // Lowest leftover winner meets the loser left over after the losers ladder.
    let mixed = match (winner_chunks.remainder(), loser_chunks.remainder()) {
        ([winner], [loser]) => Some((*winner, *loser)),
        _ => None,
    };

    let mut pairs: Vec<(MatchParticipant, MatchParticipant)> = Vec::with_capacity(tables as usize);
    pairs.extend(opening);
    pairs.extend(loser_chunks.map(|c| (c[0], c[1])));
    pairs.extend(mixed);
    pairs.extend(winner_chunks.map(|c| (c[0], c[1])));

    let mut matches: Vec<Match> = pairs
        .into_iter()
        .enumerate()
        .map(|(i, (a, b))| Match::new(round, i as u32 + 1, a, b))
        .collect();
    if let Some(sitter) = sitter {
        matches.push(Match::new(round, tables + 1, sitter, MatchParticipant::Bye));
    }
    (matches, sitter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlaceholderRole;

    fn is_loser_of(p: &MatchParticipant, round: u32, table: u32) -> bool {
        *p == MatchParticipant::Placeholder {
            role: PlaceholderRole::Loser,
            source_round: round,
            source_table: table,
        }
    }

    #[test]
    fn even_round_pairs_losers_up_and_winners_down() {
        let (matches, sitter) = ladder_round(2, 4, None);
        assert!(sitter.is_none());
        assert_eq!(matches.len(), 4);
        assert!(is_loser_of(&matches[0].slot_a, 1, 1));
        assert!(is_loser_of(&matches[0].slot_b, 1, 2));
        assert_eq!(matches[2].slot_a, MatchParticipant::winner_of(1, 4));
        assert_eq!(matches[2].slot_b, MatchParticipant::winner_of(1, 3));
    }

    #[test]
    fn odd_table_count_pairs_leftovers_from_different_tables() {
        let (matches, sitter) = ladder_round(2, 3, None);
        assert!(sitter.is_none());
        assert_eq!(matches.len(), 3);
        assert!(is_loser_of(&matches[0].slot_a, 1, 1));
        assert!(is_loser_of(&matches[0].slot_b, 1, 2));
        assert_eq!(matches[1].slot_a, MatchParticipant::winner_of(1, 1));
        assert!(is_loser_of(&matches[1].slot_b, 1, 3));
        assert_eq!(matches[2].slot_a, MatchParticipant::winner_of(1, 3));
        assert_eq!(matches[2].slot_b, MatchParticipant::winner_of(1, 2));
    }

    #[test]
    fn carried_team_opens_table_one_and_second_loser_sits_out() {
        let carried = MatchParticipant::team(Uuid::from_u128(9));
        let (matches, sitter) = ladder_round(2, 3, Some(carried));
        assert!(is_loser_of(&matches[0].slot_a, 1, 1));
        assert_eq!(matches[0].slot_b, carried);
        assert_eq!(sitter, Some(MatchParticipant::loser_of(1, 2)));
        let bye = matches.last().unwrap();
        assert!(bye.is_bye);
        assert_eq!(bye.table, 4);
        // 7 teams: three tables plus the bye.
        assert_eq!(matches.len(), 4);
        // Leftover winner meets the first unconsumed loser.
        assert!(matches
            .iter()
            .any(|m| m.slot_a == MatchParticipant::winner_of(1, 1)
                && is_loser_of(&m.slot_b, 1, 3)));
    }

    #[test]
    fn three_teams_rotate_the_winner_out() {
        let carried = MatchParticipant::team(Uuid::from_u128(3));
        let (matches, sitter) = ladder_round(2, 1, Some(carried));
        assert_eq!(matches.len(), 2);
        assert_eq!(sitter, Some(MatchParticipant::winner_of(1, 1)));
    }
}
