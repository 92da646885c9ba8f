//! Data structures for the team tournament: teams, schedule, game records, results, bracket.

mod bracket;
mod game;
mod results;
mod schedule;
mod team;
mod tournament;

pub use bracket::{Bracket, BracketMatch, BracketMatchId, BracketTeam, SUPPORTED_BRACKET_SIZES};
pub use game::{GameId, GameRecord, GameStatus, ScoreSubmission};
pub use results::{
    OverrideField, OverrideKey, OverrideScope, OverrideStore, OverrideValue, ResultsBook,
    RoundResult, TournamentResult, WinLoss,
};
pub use schedule::{
    Match, MatchId, MatchParticipant, PlaceholderRole, Schedule, ScheduleStrategy,
};
pub use team::{Team, TeamId};
pub use tournament::{Tournament, TournamentError, TournamentId, TournamentState};
