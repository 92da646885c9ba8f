//! Placeholder resolution: rewrite "winner/loser of round r, table t" into concrete teams.

use crate::logic::schedule::{append_catch_up_round, refresh_same_city};
use crate::models::{
    GameRecord, MatchId, MatchParticipant, PlaceholderRole, Schedule, Team, TeamId,
};
use std::collections::HashMap;

/// Resolve every placeholder whose source match has a confirmed game among `games`.
///
/// Unconfirmed records are ignored, so this is safe to run as a full sweep over
/// every known record and to run repeatedly. Appends a pending catch-up round
/// once all of its bye teams are known.
pub fn resolve_placeholders(schedule: &Schedule, games: &[GameRecord], teams: &[Team]) -> Schedule {
    let confirmed: HashMap<MatchId, &GameRecord> = games
        .iter()
        .filter(|g| g.is_confirmed())
        .map(|g| (g.match_id, g))
        .collect();

    let lookup = |p: &MatchParticipant| -> Option<TeamId> {
        let MatchParticipant::Placeholder {
            role,
            source_round,
            source_table,
        } = *p
        else {
            return None;
        };
        let source = schedule.match_at(source_round, source_table)?;
        let game = confirmed.get(&source.id)?;
        match role {
            PlaceholderRole::Winner => game.winner,
            PlaceholderRole::Loser => game.loser(),
        }
    };

    let mut resolved = schedule.clone();
    let mut count = 0;
    for m in resolved.matches.iter_mut() {
        for slot in [&mut m.slot_a, &mut m.slot_b] {
            if let Some(team_id) = lookup(&*slot) {
                *slot = MatchParticipant::team(team_id);
                count += 1;
            }
        }
    }

    if count > 0 {
        refresh_same_city(&mut resolved.matches, teams);
        log::debug!("Resolved {} placeholder(s)", count);
    }
    append_catch_up_round(&mut resolved, teams);
    resolved
}

/// Number of placeholders that still reference `round`.
pub fn unresolved_from_round(schedule: &Schedule, round: u32) -> usize {
    schedule
        .unresolved_placeholders()
        .filter(|p| {
            matches!(p, MatchParticipant::Placeholder { source_round, .. } if *source_round == round)
        })
        .count()
}
