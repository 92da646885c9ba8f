//! Tournament, TournamentState and TournamentError.

use crate::models::bracket::Bracket;
use crate::models::results::{OverrideStore, ResultsBook};
use crate::models::schedule::{Schedule, ScheduleStrategy};
use crate::models::team::{Team, TeamId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during tournament operations. Every kind is recoverable by the caller.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum TournamentError {
    #[error("Need at least {needed} teams (have {available})")]
    InsufficientTeams { needed: usize, available: usize },

    #[error("Bracket size {0} is not supported (use 4, 8, 16 or 32)")]
    UnsupportedSize(usize),

    /// Another team holds the score record, or it is awaiting confirmation.
    #[error("Another team is already working on this score")]
    Conflict,

    /// Two players of the same team opened score entry at once.
    #[error("A teammate is already entering this score")]
    TeammateEntering,

    #[error("No matching score record")]
    NotFound,

    /// Tied or missing scores where a winner is required.
    #[error("Cannot determine a winner from these scores")]
    AmbiguousResult,

    #[error("Team {0} does not play in this match")]
    NotParticipant(TeamId),

    /// The match still has a placeholder, bye or empty slot.
    #[error("Match {0} does not have two known teams yet")]
    UnresolvedMatch(Uuid),

    #[error("Match {0} not found")]
    UnknownMatch(Uuid),

    #[error("Override field does not apply to this scope")]
    InvalidOverride,

    #[error("A team with this name already exists")]
    DuplicateTeamName,

    #[error("Invalid state for this action")]
    InvalidState,

    #[error("Roster error: {0}")]
    Roster(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Current phase of the tournament.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentState {
    /// Registering teams; no schedule yet.
    #[default]
    Setup,
    /// Schedule generated; rounds being played and confirmed.
    RoundPlay,
    /// Bracket seeded from standings.
    Bracket,
    /// Bracket final advanced.
    Completed,
}

/// Full tournament state: teams, schedule, derived results, overrides and bracket.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub teams: Vec<Team>,
    /// Round count requested for the schedule (before any catch-up round).
    pub rounds: u32,
    pub strategy: ScheduleStrategy,
    pub state: TournamentState,
    pub schedule: Option<Schedule>,
    pub results: ResultsBook,
    #[serde(skip)]
    pub overrides: OverrideStore,
    pub bracket: Option<Bracket>,
}

impl Tournament {
    /// Create a new tournament in Setup state with no teams.
    pub fn new(name: impl Into<String>, rounds: u32, strategy: ScheduleStrategy) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            teams: Vec::new(),
            rounds,
            strategy,
            state: TournamentState::Setup,
            schedule: None,
            results: ResultsBook::new(),
            overrides: OverrideStore::new(),
            bracket: None,
        }
    }

    /// Create a tournament with initial teams. Still in Setup until a schedule is generated.
    pub fn with_teams(teams: Vec<Team>, rounds: u32, strategy: ScheduleStrategy) -> Self {
        Self {
            teams,
            ..Self::new("", rounds, strategy)
        }
    }

    pub fn get_team(&self, id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    /// Register a team (Setup only). Names must be unique (case-insensitive).
    pub fn add_team(&mut self, team: Team) -> Result<(), TournamentError> {
        if self.state != TournamentState::Setup {
            return Err(TournamentError::InvalidState);
        }
        let name = team.name.trim();
        if name.is_empty() {
            return Err(TournamentError::Roster("team name is empty".to_string()));
        }
        if self.teams.iter().any(|t| t.name.eq_ignore_ascii_case(name)) {
            return Err(TournamentError::DuplicateTeamName);
        }
        self.teams.push(Team {
            name: name.to_string(),
            ..team
        });
        Ok(())
    }

    /// Remove a team by id (Setup only).
    pub fn remove_team(&mut self, team_id: TeamId) -> Result<(), TournamentError> {
        if self.state != TournamentState::Setup {
            return Err(TournamentError::InvalidState);
        }
        let idx = self
            .teams
            .iter()
            .position(|t| t.id == team_id)
            .ok_or(TournamentError::NotParticipant(team_id))?;
        self.teams.remove(idx);
        Ok(())
    }
}
