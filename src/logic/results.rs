//! Results aggregation: confirmed games into per-round lines, totals and standings.

use crate::models::{
    GameRecord, OverrideField, OverrideKey, OverrideScope, OverrideStore, OverrideValue,
    ResultsBook, RoundResult, Team, TeamId, TournamentError, TournamentResult, WinLoss,
};
use std::cmp::Ordering;

/// Fold a confirmed game into both teams' results and drop their overrides for that round.
pub fn on_confirmed(
    book: &mut ResultsBook,
    overrides: &mut OverrideStore,
    game: &GameRecord,
) -> Result<(), TournamentError> {
    if !game.is_confirmed() {
        return Err(TournamentError::InvalidState);
    }
    let winner = game.winner.ok_or(TournamentError::AmbiguousResult)?;
    for team_id in [game.team_a, game.team_b] {
        let Some((points, boston)) = game.line_for(team_id) else {
            continue;
        };
        let win_loss = if team_id == winner {
            WinLoss::Win
        } else {
            WinLoss::Loss
        };
        let result = book
            .results
            .entry(team_id)
            .or_insert_with(|| TournamentResult::new(team_id));
        result.rounds.insert(
            game.round,
            RoundResult {
                points,
                win_loss,
                boston,
            },
        );
        result.recompute_totals();

        let dropped = overrides.clear_round(team_id, game.round);
        if dropped > 0 {
            log::debug!(
                "Dropped {} override(s) for team {} round {} after confirmation",
                dropped,
                team_id,
                game.round
            );
        }
    }
    Ok(())
}

/// Store an operator override. Round scope takes points, W/L or bostons; the
/// total scope takes points, wins or bostons.
pub fn apply_override(
    overrides: &mut OverrideStore,
    team_id: TeamId,
    scope: OverrideScope,
    value: OverrideValue,
) -> Result<(), TournamentError> {
    let field = value.field();
    let valid = match scope {
        OverrideScope::Round(0) => false,
        OverrideScope::Round(_) => field != OverrideField::Wins,
        OverrideScope::Total => field != OverrideField::WinLoss,
    };
    if !valid {
        return Err(TournamentError::InvalidOverride);
    }
    overrides.insert(
        OverrideKey {
            team_id,
            scope,
            field,
        },
        value,
    );
    log::info!("Override {:?} {:?} for team {}", scope, value, team_id);
    Ok(())
}

/// Canonical order: wins desc, points desc, team id asc.
pub fn compare_standings(a: &TournamentResult, b: &TournamentResult) -> Ordering {
    b.total_wins
        .cmp(&a.total_wins)
        .then_with(|| b.total_points.cmp(&a.total_points))
        .then_with(|| a.team_id.cmp(&b.team_id))
}

/// Every registered team's result with overrides merged in, best first.
///
/// A round override only shows while no confirmed game exists for that team and round.
pub fn standings(
    teams: &[Team],
    book: &ResultsBook,
    overrides: &OverrideStore,
) -> Vec<TournamentResult> {
    let mut rows: Vec<TournamentResult> = teams
        .iter()
        .map(|team| merged_result(team.id, book, overrides))
        .collect();
    rows.sort_by(compare_standings);
    rows
}

fn merged_result(team_id: TeamId, book: &ResultsBook, overrides: &OverrideStore) -> TournamentResult {
    let mut result = book
        .get(team_id)
        .cloned()
        .unwrap_or_else(|| TournamentResult::new(team_id));

    let mut totals = Vec::new();
    for (key, value) in overrides.for_team(team_id) {
        match key.scope {
            OverrideScope::Round(round) if !book.has_round(team_id, round) => {
                let line = result.rounds.entry(round).or_default();
                match *value {
                    OverrideValue::Points(p) => line.points = p,
                    OverrideValue::WinLoss(wl) => line.win_loss = wl,
                    OverrideValue::Boston(b) => line.boston = b,
                    OverrideValue::Wins(_) => {}
                }
            }
            OverrideScope::Round(_) => {}
            OverrideScope::Total => totals.push(*value),
        }
    }
    result.recompute_totals();

    for value in totals {
        match value {
            OverrideValue::Points(p) => result.total_points = p,
            OverrideValue::Wins(w) => result.total_wins = w,
            OverrideValue::Boston(b) => result.total_boston = b,
            OverrideValue::WinLoss(_) => {}
        }
    }
    result
}

/// Teams in standings order, for bracket seeding.
pub fn ranked_teams(teams: &[Team], rows: &[TournamentResult]) -> Vec<Team> {
    rows.iter()
        .filter_map(|row| teams.iter().find(|t| t.id == row.team_id).cloned())
        .collect()
}
