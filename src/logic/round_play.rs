//! Round play on a tournament: generate the schedule, fold in confirmed games, sweep placeholders.

use crate::events::{EngineEvent, EventSink};
use crate::logic::placeholders::resolve_placeholders;
use crate::logic::results::on_confirmed;
use crate::logic::schedule::build_schedule;
use crate::models::{
    GameRecord, ScheduleStrategy, Tournament, TournamentError, TournamentState,
};

/// Generate the schedule and move Setup -> RoundPlay.
pub fn start_round_play(tournament: &mut Tournament) -> Result<(), TournamentError> {
    if tournament.state != TournamentState::Setup {
        return Err(TournamentError::InvalidState);
    }
    let schedule = build_schedule(
        tournament.id,
        &tournament.teams,
        tournament.rounds,
        tournament.strategy,
    )?;
    log::info!(
        "Tournament {}: {} rounds scheduled for {} teams",
        tournament.id,
        schedule.total_rounds,
        tournament.teams.len()
    );
    tournament.schedule = Some(schedule);
    tournament.state = TournamentState::RoundPlay;
    Ok(())
}

/// Apply a freshly confirmed game: update results, and for win/loss rotation
/// fill the placeholders that were waiting on this match.
pub fn apply_confirmed_game<E: EventSink>(
    tournament: &mut Tournament,
    game: &GameRecord,
    events: &E,
) -> Result<(), TournamentError> {
    if game.tournament_id != tournament.id {
        return Err(TournamentError::UnknownMatch(game.match_id));
    }
    let schedule = tournament
        .schedule
        .as_ref()
        .ok_or(TournamentError::InvalidState)?;
    if schedule.get_match(game.match_id).is_none() {
        return Err(TournamentError::UnknownMatch(game.match_id));
    }

    // Compute the new schedule before touching results, so a failure leaves both untouched.
    let resolved = match schedule.strategy {
        ScheduleStrategy::WinLossRotation => Some(resolve_placeholders(
            schedule,
            std::slice::from_ref(game),
            &tournament.teams,
        )),
        ScheduleStrategy::FullSchedule => None,
    };
    on_confirmed(&mut tournament.results, &mut tournament.overrides, game)?;

    if let Some(resolved) = resolved {
        let remaining = resolved.unresolved_placeholders().count();
        tournament.schedule = Some(resolved);
        events.publish(&EngineEvent::PlaceholdersResolved {
            tournament_id: tournament.id,
            remaining,
        });
    }
    Ok(())
}

/// Re-run placeholder resolution against every known confirmed game.
/// Returns how many placeholders remain unresolved.
pub fn resolve_all<E: EventSink>(
    tournament: &mut Tournament,
    games: &[GameRecord],
    events: &E,
) -> Result<usize, TournamentError> {
    let schedule = tournament
        .schedule
        .as_ref()
        .ok_or(TournamentError::InvalidState)?;
    let resolved = resolve_placeholders(schedule, games, &tournament.teams);
    let remaining = resolved.unresolved_placeholders().count();
    tournament.schedule = Some(resolved);
    events.publish(&EngineEvent::PlaceholdersResolved {
        tournament_id: tournament.id,
        remaining,
    });
    Ok(remaining)
}
