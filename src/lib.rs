//! Team tournament engine: library with models and business logic.

pub mod config;
pub mod events;
pub mod logic;
pub mod models;
pub mod roster;
pub mod store;

pub use events::{BroadcastSink, EngineEvent, EventSink, LogSink, NullSink};
pub use logic::{
    advance, advance_bracket_match, apply_confirmed_game, apply_override, begin_entry,
    build_bracket, build_matches, build_schedule, compare_standings, confirm, decide_winner,
    next_table, on_confirmed, ranked_teams, record_score, resolve_all, resolve_placeholders,
    seed_bracket, seeding_chart, standings, start_bracket, start_round_play, submit,
    unresolved_from_round, ScoreDesk, MIN_TEAMS,
};
pub use models::{
    Bracket, BracketMatch, BracketMatchId, BracketTeam, GameId, GameRecord, GameStatus, Match,
    MatchId, MatchParticipant, OverrideField, OverrideKey, OverrideScope, OverrideStore,
    OverrideValue, PlaceholderRole, ResultsBook, RoundResult, Schedule, ScheduleStrategy,
    ScoreSubmission, Team, TeamId, Tournament, TournamentError, TournamentId, TournamentResult,
    TournamentState, WinLoss, SUPPORTED_BRACKET_SIZES,
};
pub use store::{GameStore, MemoryGameStore};
