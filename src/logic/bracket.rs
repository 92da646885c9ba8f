//! Single-elimination bracket: seeding, match tree and advancement.

use crate::events::{EngineEvent, EventSink};
use crate::logic::results::{ranked_teams, standings};
use crate::models::{
    Bracket, BracketMatch, BracketMatchId, BracketTeam, Team, Tournament, TournamentError,
    TournamentState, SUPPORTED_BRACKET_SIZES,
};
use uuid::Uuid;

fn check_size(size: usize) -> Result<(), TournamentError> {
    if SUPPORTED_BRACKET_SIZES.contains(&size) {
        Ok(())
    } else {
        Err(TournamentError::UnsupportedSize(size))
    }
}

/// Take the top `size` teams (already ranked) and number them 1..=size.
pub fn seed_bracket(ranked: &[Team], size: usize) -> Result<Vec<BracketTeam>, TournamentError> {
    check_size(size)?;
    if ranked.len() < size {
        return Err(TournamentError::InsufficientTeams {
            needed: size,
            available: ranked.len(),
        });
    }
    Ok(ranked
        .iter()
        .take(size)
        .enumerate()
        .map(|(i, t)| BracketTeam {
            seed: i as u32 + 1,
            team_id: t.id,
            name: t.name.clone(),
            team_number: t.team_number,
        })
        .collect())
}

/// Standard chart: seeds in round-1 order, pairs adjacent.
/// 8 teams gives `[1, 8, 4, 5, 2, 7, 3, 6]`.
pub fn seeding_chart(size: usize) -> Vec<u32> {
    let mut chart = vec![1u32];
    while chart.len() < size {
        let n = chart.len() as u32 * 2;
        chart = chart.iter().flat_map(|&s| [s, n + 1 - s]).collect();
    }
    chart
}

/// Round 1 from the chart (table = lower seed), later rounds empty.
pub fn build_matches(seeded: &[BracketTeam]) -> Result<Vec<BracketMatch>, TournamentError> {
    let size = seeded.len();
    check_size(size)?;

    let by_seed = |seed: u32| seeded.iter().find(|t| t.seed == seed).cloned();
    let chart = seeding_chart(size);
    let mut first_round: Vec<BracketMatch> = chart
        .chunks_exact(2)
        .map(|pair| {
            let mut m = BracketMatch::new(1, pair[0].min(pair[1]));
            m.team_1 = by_seed(pair[0]);
            m.team_2 = by_seed(pair[1]);
            m
        })
        .collect();
    if first_round
        .iter()
        .any(|m| m.team_1.is_none() || m.team_2.is_none())
    {
        return Err(TournamentError::InsufficientTeams {
            needed: size,
            available: seeded.len(),
        });
    }
    first_round.sort_by_key(|m| m.table);

    let rounds = size.trailing_zeros();
    let mut matches = first_round;
    for round in 2..=rounds {
        let tables = (size >> round) as u32;
        matches.extend((1..=tables).map(|table| BracketMatch::new(round, table)));
    }
    Ok(matches)
}

/// Seed and build in one step.
pub fn build_bracket(
    tournament_id: Uuid,
    ranked: &[Team],
    size: usize,
) -> Result<Bracket, TournamentError> {
    let teams = seed_bracket(ranked, size)?;
    let matches = build_matches(&teams)?;
    Ok(Bracket {
        tournament_id,
        size,
        teams,
        matches,
    })
}

/// Table in the next round that receives the winner of `table`.
/// Top and bottom of the round fold together: with 2 tables next round,
/// tables 1 and 4 feed table 1, tables 2 and 3 feed table 2.
pub fn next_table(table: u32, tables_in_next_round: u32) -> u32 {
    if table <= tables_in_next_round {
        table
    } else {
        (tables_in_next_round + 1) - (table - tables_in_next_round)
    }
}

fn match_index(bracket: &Bracket, match_id: BracketMatchId) -> Result<usize, TournamentError> {
    bracket
        .matches
        .iter()
        .position(|m| m.id == match_id)
        .ok_or(TournamentError::UnknownMatch(match_id))
}

/// Store scores; the winner is decided later by [`advance`], so scores may be corrected until then.
pub fn record_score(
    bracket: &mut Bracket,
    match_id: BracketMatchId,
    team_1_score: i32,
    team_2_score: i32,
) -> Result<(), TournamentError> {
    let idx = match_index(bracket, match_id)?;
    let m = &mut bracket.matches[idx];
    if m.winner.is_some() {
        return Err(TournamentError::Conflict);
    }
    if m.team_1.is_none() || m.team_2.is_none() {
        return Err(TournamentError::UnresolvedMatch(match_id));
    }
    m.team_1_score = Some(team_1_score);
    m.team_2_score = Some(team_2_score);
    Ok(())
}

/// Decide the match by score and move the winner on.
///
/// Returns the (round, table) the winner moved to, or None for the final.
pub fn advance(
    bracket: &mut Bracket,
    match_id: BracketMatchId,
) -> Result<Option<(u32, u32)>, TournamentError> {
    let idx = match_index(bracket, match_id)?;
    let m = &bracket.matches[idx];
    if m.winner.is_some() {
        return Err(TournamentError::Conflict);
    }
    let (Some(team_1), Some(team_2)) = (m.team_1.as_ref(), m.team_2.as_ref()) else {
        return Err(TournamentError::UnresolvedMatch(match_id));
    };
    let (Some(s1), Some(s2)) = (m.team_1_score, m.team_2_score) else {
        return Err(TournamentError::AmbiguousResult);
    };
    let winner = match s1.cmp(&s2) {
        std::cmp::Ordering::Greater => team_1.clone(),
        std::cmp::Ordering::Less => team_2.clone(),
        std::cmp::Ordering::Equal => return Err(TournamentError::AmbiguousResult),
    };

    let (round, table) = (m.round, m.table);
    let destination = if round < bracket.rounds() {
        let tables_next = (bracket.size >> (round + 1)) as u32;
        let target = next_table(table, tables_next);
        let next_idx = bracket
            .matches
            .iter()
            .position(|n| n.round == round + 1 && n.table == target)
            .ok_or(TournamentError::InvalidState)?;
        let next = &bracket.matches[next_idx];
        if next.team_1.is_some() && next.team_2.is_some() {
            return Err(TournamentError::Conflict);
        }
        Some((next_idx, round + 1, target))
    } else {
        None
    };

    log::info!(
        "Bracket round {} table {}: seed {} ({}) advances",
        round,
        table,
        winner.seed,
        winner.name
    );
    bracket.matches[idx].winner = Some(winner.clone());
    Ok(destination.map(|(next_idx, next_round, target)| {
        let next = &mut bracket.matches[next_idx];
        if next.team_1.is_none() {
            next.team_1 = Some(winner);
        } else {
            next.team_2 = Some(winner);
        }
        (next_round, target)
    }))
}

/// Seed a bracket from current standings and move the tournament into bracket play.
pub fn start_bracket(tournament: &mut Tournament, size: usize) -> Result<(), TournamentError> {
    if !matches!(
        tournament.state,
        TournamentState::Setup | TournamentState::RoundPlay
    ) {
        return Err(TournamentError::InvalidState);
    }
    let rows = standings(&tournament.teams, &tournament.results, &tournament.overrides);
    let ranked = ranked_teams(&tournament.teams, &rows);
    tournament.bracket = Some(build_bracket(tournament.id, &ranked, size)?);
    tournament.state = TournamentState::Bracket;
    Ok(())
}

/// Advance a bracket match of the tournament; completing the final completes the tournament.
pub fn advance_bracket_match<E: EventSink>(
    tournament: &mut Tournament,
    match_id: BracketMatchId,
    events: &E,
) -> Result<(), TournamentError> {
    if tournament.state != TournamentState::Bracket {
        return Err(TournamentError::InvalidState);
    }
    let bracket = tournament
        .bracket
        .as_mut()
        .ok_or(TournamentError::InvalidState)?;
    advance(bracket, match_id)?;

    if let Some(m) = bracket.get_match(match_id) {
        if let Some(winner) = m.winner.clone() {
            events.publish(&EngineEvent::BracketAdvanced {
                tournament_id: bracket.tournament_id,
                round: m.round,
                table: m.table,
                winner,
            });
        }
    }
    if bracket.champion().is_some() {
        tournament.state = TournamentState::Completed;
    }
    Ok(())
}
