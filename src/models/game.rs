//! Game record: the score of one scheduled match, as agreed by both teams.

use crate::models::schedule::MatchId;
use crate::models::team::TeamId;
use crate::models::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a game record. Stable per match across re-entries.
pub type GameId = Uuid;

/// Lifecycle of a game record.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    /// One team is typing in the score.
    #[default]
    Entering,
    /// Submitted; waiting for the other team.
    PendingConfirmation,
    /// Both teams agree. Terminal.
    Confirmed,
    /// The other team rejected the submitted score.
    Disputed,
}

/// Persisted score record for one match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: GameId,
    pub tournament_id: TournamentId,
    pub match_id: MatchId,
    pub round: u32,
    pub team_a: TeamId,
    pub team_b: TeamId,
    pub score_a: i32,
    pub score_b: i32,
    pub hands_a: Option<u32>,
    pub hands_b: Option<u32>,
    pub boston_a: u32,
    pub boston_b: u32,
    /// None until submitted.
    pub winner: Option<TeamId>,
    pub status: GameStatus,
    pub entered_by: TeamId,
    pub confirmed_by: Option<TeamId>,
    pub timestamp: DateTime<Utc>,
    /// Bumped on every write; the store only accepts writes against the version it holds.
    pub version: u64,
}

impl GameRecord {
    /// Fresh `entering` record for a match, owned by `entered_by`.
    pub fn new(
        tournament_id: TournamentId,
        match_id: MatchId,
        round: u32,
        team_a: TeamId,
        team_b: TeamId,
        entered_by: TeamId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            match_id,
            round,
            team_a,
            team_b,
            score_a: 0,
            score_b: 0,
            hands_a: None,
            hands_b: None,
            boston_a: 0,
            boston_b: 0,
            winner: None,
            status: GameStatus::Entering,
            entered_by,
            confirmed_by: None,
            timestamp: now,
            version: 0,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == GameStatus::Confirmed
    }

    /// The team that did not win; None until a winner is recorded.
    pub fn loser(&self) -> Option<TeamId> {
        let winner = self.winner?;
        if winner == self.team_a {
            Some(self.team_b)
        } else {
            Some(self.team_a)
        }
    }

    /// (score, boston count) credited to `team_id`, if it played in this game.
    pub fn line_for(&self, team_id: TeamId) -> Option<(i32, u32)> {
        if team_id == self.team_a {
            Some((self.score_a, self.boston_a))
        } else if team_id == self.team_b {
            Some((self.score_b, self.boston_b))
        } else {
            None
        }
    }
}

/// Final numbers one team submits for a match.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub score_a: i32,
    pub score_b: i32,
    #[serde(default)]
    pub hands_a: Option<u32>,
    #[serde(default)]
    pub hands_b: Option<u32>,
    #[serde(default)]
    pub boston_a: u32,
    #[serde(default)]
    pub boston_b: u32,
    /// Required when the scores are equal; ignored otherwise.
    #[serde(default)]
    pub tie_winner: Option<TeamId>,
}
