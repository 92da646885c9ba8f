//! Integration tests for results aggregation, overrides and standings.

use chrono::Utc;
use team_tournament::{
    apply_override, on_confirmed, standings, start_bracket, GameRecord, GameStatus,
    OverrideScope, OverrideStore, OverrideValue, ResultsBook, ScheduleStrategy, Team, TeamId,
    Tournament, TournamentError, WinLoss,
};
use uuid::Uuid;

fn id(n: u128) -> TeamId {
    Uuid::from_u128(n)
}

fn teams(n: u128) -> Vec<Team> {
    (1..=n)
        .map(|i| Team::with_id(id(i), format!("T{i}"), "Chicago", i as u32))
        .collect()
}

fn game(round: u32, a: u128, b: u128, score_a: i32, score_b: i32) -> GameRecord {
    let mut g = GameRecord::new(
        Uuid::nil(),
        Uuid::new_v4(),
        round,
        id(a),
        id(b),
        id(a),
        Utc::now(),
    );
    g.score_a = score_a;
    g.score_b = score_b;
    g.boston_a = 1;
    g.winner = Some(if score_a >= score_b { id(a) } else { id(b) });
    g.status = GameStatus::Confirmed;
    g.confirmed_by = Some(id(b));
    g
}

#[test]
fn confirmed_games_build_round_lines_and_totals() {
    let mut book = ResultsBook::new();
    let mut overrides = OverrideStore::new();
    on_confirmed(&mut book, &mut overrides, &game(1, 1, 2, 300, 250)).unwrap();
    on_confirmed(&mut book, &mut overrides, &game(2, 1, 3, 200, 280)).unwrap();

    let one = book.get(id(1)).unwrap();
    assert_eq!(one.rounds.len(), 2);
    assert_eq!(one.rounds[&1].win_loss, WinLoss::Win);
    assert_eq!(one.rounds[&2].win_loss, WinLoss::Loss);
    assert_eq!(one.total_points, 500);
    assert_eq!(one.total_wins, 1);
    assert_eq!(one.total_boston, 2);

    let two = book.get(id(2)).unwrap();
    assert_eq!(two.total_points, 250);
    assert_eq!(two.total_wins, 0);
    assert_eq!(two.total_boston, 0);
}

#[test]
fn unconfirmed_games_are_rejected() {
    let mut g = game(1, 1, 2, 300, 250);
    g.status = GameStatus::PendingConfirmation;
    let mut book = ResultsBook::new();
    assert_eq!(
        on_confirmed(&mut book, &mut OverrideStore::new(), &g),
        Err(TournamentError::InvalidState)
    );
    assert!(book.results.is_empty());
}

#[test]
fn standings_order_by_wins_then_points_then_id() {
    let t = teams(5);
    let mut book = ResultsBook::new();
    let mut overrides = OverrideStore::new();
    // 1 and 3 win once; 3 has more points.
    on_confirmed(&mut book, &mut overrides, &game(1, 1, 2, 200, 100)).unwrap();
    on_confirmed(&mut book, &mut overrides, &game(1, 3, 4, 300, 100)).unwrap();

    let rows = standings(&t, &book, &overrides);
    // Team 5 has no games but is still listed.
    assert_eq!(rows.len(), 5);
    let order: Vec<TeamId> = rows.iter().map(|r| r.team_id).collect();
    assert_eq!(order, vec![id(3), id(1), id(2), id(4), id(5)]);
    assert_eq!(rows[4].total_points, 0);
    assert!(rows[4].rounds.is_empty());
}

#[test]
fn round_override_shows_until_the_round_is_confirmed() {
    let t = teams(2);
    let mut book = ResultsBook::new();
    let mut overrides = OverrideStore::new();
    apply_override(
        &mut overrides,
        id(2),
        OverrideScope::Round(1),
        OverrideValue::WinLoss(WinLoss::Win),
    )
    .unwrap();
    apply_override(
        &mut overrides,
        id(2),
        OverrideScope::Round(1),
        OverrideValue::Points(275),
    )
    .unwrap();

    let rows = standings(&t, &book, &overrides);
    assert_eq!(rows[0].team_id, id(2));
    assert_eq!(rows[0].total_wins, 1);
    assert_eq!(rows[0].total_points, 275);

    on_confirmed(&mut book, &mut overrides, &game(1, 1, 2, 300, 250)).unwrap();
    assert!(overrides.is_empty());
    let rows = standings(&t, &book, &overrides);
    assert_eq!(rows[0].team_id, id(1));
    assert_eq!(rows[1].total_points, 250);
    assert_eq!(rows[1].rounds[&1].win_loss, WinLoss::Loss);
}

#[test]
fn round_override_is_ignored_over_confirmed_data() {
    let t = teams(2);
    let mut book = ResultsBook::new();
    let mut overrides = OverrideStore::new();
    on_confirmed(&mut book, &mut overrides, &game(1, 1, 2, 300, 250)).unwrap();
    apply_override(
        &mut overrides,
        id(2),
        OverrideScope::Round(1),
        OverrideValue::Points(999),
    )
    .unwrap();
    let rows = standings(&t, &book, &overrides);
    let two = rows.iter().find(|r| r.team_id == id(2)).unwrap();
    assert_eq!(two.total_points, 250);
}

#[test]
fn total_overrides_replace_derived_totals() {
    let t = teams(3);
    let mut book = ResultsBook::new();
    let mut overrides = OverrideStore::new();
    on_confirmed(&mut book, &mut overrides, &game(1, 1, 2, 300, 250)).unwrap();
    apply_override(&mut overrides, id(3), OverrideScope::Total, OverrideValue::Wins(2)).unwrap();
    apply_override(&mut overrides, id(3), OverrideScope::Total, OverrideValue::Boston(4)).unwrap();

    let rows = standings(&t, &book, &overrides);
    assert_eq!(rows[0].team_id, id(3));
    assert_eq!(rows[0].total_wins, 2);
    assert_eq!(rows[0].total_boston, 4);
    // Derived results are untouched.
    assert!(book.get(id(3)).is_none());
}

#[test]
fn mismatched_override_fields_are_rejected() {
    let mut overrides = OverrideStore::new();
    for (scope, value) in [
        (OverrideScope::Round(1), OverrideValue::Wins(3)),
        (OverrideScope::Total, OverrideValue::WinLoss(WinLoss::Win)),
        (OverrideScope::Round(0), OverrideValue::Points(10)),
    ] {
        assert_eq!(
            apply_override(&mut overrides, id(1), scope, value),
            Err(TournamentError::InvalidOverride)
        );
    }
    assert!(overrides.is_empty());
}

#[test]
fn bracket_seeds_follow_standings() {
    let mut tournament = Tournament::with_teams(teams(5), 2, ScheduleStrategy::FullSchedule);
    for g in [game(1, 4, 1, 400, 100), game(1, 2, 3, 350, 100), game(2, 4, 2, 300, 200)] {
        on_confirmed(&mut tournament.results, &mut tournament.overrides, &g).unwrap();
    }
    start_bracket(&mut tournament, 4).unwrap();
    let seeds: Vec<(u32, TeamId)> = tournament
        .bracket
        .as_ref()
        .unwrap()
        .teams
        .iter()
        .map(|t| (t.seed, t.team_id))
        .collect();
    // 4: two wins; 2: one win; then 1 and 3 (100 points each) by id. Team 5 misses out.
    assert_eq!(
        seeds,
        vec![(1, id(4)), (2, id(2)), (3, id(1)), (4, id(3))]
    );
    assert_eq!(
        start_bracket(&mut tournament, 4),
        Err(TournamentError::InvalidState)
    );
}
