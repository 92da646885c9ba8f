//! Round play schedule: balanced city columns, circle rotation and the catch-up round.

use crate::logic::rotation::win_loss_schedule;
use crate::models::{
    Match, MatchParticipant, Schedule, ScheduleStrategy, Team, TeamId, TournamentError,
};
use std::collections::HashSet;
use uuid::Uuid;

/// Minimum number of teams for either strategy.
pub const MIN_TEAMS: usize = 2;

/// Two columns of seats; `None` is the synthetic bye seat.
pub(crate) struct Columns<'a> {
    pub left: Vec<Option<&'a Team>>,
    pub right: Vec<Option<&'a Team>>,
}

/// Generate the schedule for `teams` with `rounds` requested rounds.
///
/// Fails with `InsufficientTeams` below two teams. A request for zero rounds
/// yields an empty schedule.
pub fn build_schedule(
    tournament_id: Uuid,
    teams: &[Team],
    rounds: u32,
    strategy: ScheduleStrategy,
) -> Result<Schedule, TournamentError> {
    if teams.len() < MIN_TEAMS {
        return Err(TournamentError::InsufficientTeams {
            needed: MIN_TEAMS,
            available: teams.len(),
        });
    }
    let schedule = match strategy {
        ScheduleStrategy::FullSchedule => full_schedule(tournament_id, teams, rounds),
        ScheduleStrategy::WinLossRotation => win_loss_schedule(tournament_id, teams, rounds),
    };
    log::debug!(
        "Generated {:?} schedule: {} teams, {} rounds, {} matches",
        strategy,
        teams.len(),
        schedule.total_rounds,
        schedule.matches.len()
    );
    Ok(schedule)
}

/// Static strategy: every base round up front, then the catch-up round.
fn full_schedule(tournament_id: Uuid, teams: &[Team], rounds: u32) -> Schedule {
    let mut schedule = Schedule::new(tournament_id, ScheduleStrategy::FullSchedule);
    let mut columns = balanced_columns(teams);
    let capacity = columns.left.len() as u32;
    let base_rounds = rounds.min(capacity);

    for round in 1..=base_rounds {
        schedule.matches.extend(pair_columns(round, &columns));
        columns.right.rotate_left(1);
    }
    schedule.base_rounds = base_rounds;
    schedule.total_rounds = base_rounds;
    schedule.catch_up_pending = schedule.matches.iter().any(|m| m.is_bye);
    append_catch_up_round(&mut schedule, teams);
    schedule
}

/// Split teams into two near-equal columns so each city straddles both sides.
///
/// Cities are grouped (largest first). For every candidate split city and
/// slicing point, Left takes the slice plus all earlier cities and Right
/// takes all later cities plus the rest of the split city. The first
/// candidate minimizing the length difference wins. The split city's slice
/// heads Left while its remainder tails Right, so its members only face
/// each other when the city is larger than a column.
pub(crate) fn balanced_columns(teams: &[Team]) -> Columns<'_> {
    let mut cities: Vec<Vec<&Team>> = Vec::new();
    for team in teams {
        match cities.iter_mut().find(|c| c[0].same_city(team)) {
            Some(city) => city.push(team),
            None => cities.push(vec![team]),
        }
    }
    cities.sort_by(|a, b| b.len().cmp(&a.len()));

    let n = teams.len();
    let mut best = (usize::MAX, 0, 0);
    let mut before = 0;
    for (idx, members) in cities.iter().enumerate() {
        for k in 0..=members.len() {
            let diff = n.abs_diff(2 * (before + k));
            if diff < best.0 {
                best = (diff, idx, k);
            }
        }
        before += members.len();
    }
    let (_, split, k) = best;

    let mut left: Vec<Option<&Team>> = Vec::with_capacity(n / 2 + 1);
    let mut right: Vec<Option<&Team>> = Vec::with_capacity(n / 2 + 1);
    if let Some(split_city) = cities.get(split) {
        left.extend(split_city[..k].iter().copied().map(Some));
        left.extend(cities[..split].iter().flatten().copied().map(Some));
        right.extend(cities[split + 1..].iter().flatten().copied().map(Some));
        right.extend(split_city[k..].iter().copied().map(Some));
    }

    if n % 2 == 1 {
        if left.len() < right.len() {
            left.push(None);
        } else {
            right.push(None);
        }
    }
    Columns { left, right }
}

/// One round of Left[i] vs Right[i]. Real matches take tables 1..n, the bye match comes last.
pub(crate) fn pair_columns(round: u32, columns: &Columns<'_>) -> Vec<Match> {
    let mut matches = Vec::with_capacity(columns.left.len());
    let mut bye = None;
    for (a, b) in columns.left.iter().zip(columns.right.iter()) {
        match (a, b) {
            (Some(a), Some(b)) => matches.push(team_match(round, 0, a, b)),
            (Some(t), None) | (None, Some(t)) => bye = Some(bye_match(round, 0, t.id)),
            (None, None) => {}
        }
    }
    matches.extend(bye);
    for (i, m) in matches.iter_mut().enumerate() {
        m.table = i as u32 + 1;
    }
    matches
}

fn team_match(round: u32, table: u32, a: &Team, b: &Team) -> Match {
    let mut m = Match::new(
        round,
        table,
        MatchParticipant::team(a.id),
        MatchParticipant::team(b.id),
    );
    m.is_same_city = a.same_city(b);
    m
}

fn bye_match(round: u32, table: u32, team_id: TeamId) -> Match {
    Match::new(round, table, MatchParticipant::team(team_id), MatchParticipant::Bye)
}

/// Recompute `is_same_city` for matches whose slots are both known.
pub(crate) fn refresh_same_city(matches: &mut [Match], teams: &[Team]) {
    for m in matches.iter_mut() {
        if let Some((a, b)) = m.teams() {
            let a = teams.iter().find(|t| t.id == a);
            let b = teams.iter().find(|t| t.id == b);
            m.is_same_city = matches!((a, b), (Some(a), Some(b)) if a.same_city(b));
        }
    }
}

/// Append the catch-up round if it is pending and every bye of the base rounds
/// belongs to a known team. Returns true when a round was appended.
///
/// Teams that sat out at least once play each other, avoiding rematches where
/// possible. With an odd count the last team sits out again.
pub(crate) fn append_catch_up_round(schedule: &mut Schedule, teams: &[Team]) -> bool {
    if !schedule.catch_up_pending {
        return false;
    }
    let base = schedule.base_rounds;
    let mut bye_matches: Vec<&Match> = schedule
        .matches
        .iter()
        .filter(|m| m.is_bye && m.round <= base)
        .collect();
    bye_matches.sort_by_key(|m| (m.round, m.table));

    let mut byed: Vec<TeamId> = Vec::new();
    for m in bye_matches {
        match m.bye_team() {
            Some(id) if !byed.contains(&id) => byed.push(id),
            Some(_) => {}
            None => return false,
        }
    }
    if byed.is_empty() {
        schedule.catch_up_pending = false;
        return false;
    }

    let played: HashSet<(TeamId, TeamId)> = schedule
        .matches
        .iter()
        .filter_map(|m| m.teams())
        .map(|(a, b)| if a < b { (a, b) } else { (b, a) })
        .collect();
    let met = |a: TeamId, b: TeamId| played.contains(&if a < b { (a, b) } else { (b, a) });

    let round = base + 1;
    let mut round_matches = Vec::new();
    let mut sit_out = None;
    let mut pool = byed;
    while !pool.is_empty() {
        let first = pool.remove(0);
        if pool.is_empty() {
            sit_out = Some(first);
            break;
        }
        let partner = pool.iter().position(|&p| !met(first, p)).unwrap_or(0);
        let second = pool.remove(partner);
        round_matches.push(Match::new(
            round,
            round_matches.len() as u32 + 1,
            MatchParticipant::team(first),
            MatchParticipant::team(second),
        ));
    }
    if let Some(team_id) = sit_out {
        round_matches.push(bye_match(round, round_matches.len() as u32 + 1, team_id));
    }
    refresh_same_city(&mut round_matches, teams);

    log::debug!(
        "Appended catch-up round {} with {} matches",
        round,
        round_matches.len()
    );
    schedule.matches.extend(round_matches);
    schedule.total_rounds = round;
    schedule.catch_up_pending = false;
    true
}
