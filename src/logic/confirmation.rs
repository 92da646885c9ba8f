//! Score confirmation: one team enters and submits, the other confirms or disputes.
//!
//! ```text
//!   (none) --begin_entry--> entering --submit--> pending_confirmation
//!                              ^                   |            |
//!                              |             confirm(true) confirm(false)
//!                              |                   v            v
//!                              +---begin_entry-- disputed    confirmed
//!                                 (same team)
//! ```
//!
//! The transitions are pure functions of the stored record. [`ScoreDesk`]
//! wires them to a [`GameStore`] with a compare-and-set write, so two clients
//! racing on the same record cannot both win.

use crate::events::{EngineEvent, EventSink};
use crate::models::{
    GameId, GameRecord, GameStatus, MatchId, Schedule, ScoreSubmission, TeamId, TournamentError,
};
use crate::store::GameStore;
use chrono::{DateTime, Utc};

/// Writes retried when another client updates the record between our read and write.
const MAX_WRITE_ATTEMPTS: usize = 3;

/// Open score entry for `team_id` on a match.
pub fn begin_entry(
    current: Option<&GameRecord>,
    schedule: &Schedule,
    match_id: MatchId,
    team_id: TeamId,
    now: DateTime<Utc>,
) -> Result<GameRecord, TournamentError> {
    let m = schedule
        .get_match(match_id)
        .ok_or(TournamentError::UnknownMatch(match_id))?;
    let (team_a, team_b) = m.teams().ok_or(TournamentError::UnresolvedMatch(match_id))?;
    if team_id != team_a && team_id != team_b {
        return Err(TournamentError::NotParticipant(team_id));
    }

    let Some(record) = current else {
        return Ok(GameRecord::new(
            schedule.tournament_id,
            match_id,
            m.round,
            team_a,
            team_b,
            team_id,
            now,
        ));
    };

    match record.status {
        GameStatus::Entering if record.entered_by == team_id => {
            Err(TournamentError::TeammateEntering)
        }
        GameStatus::Entering | GameStatus::PendingConfirmation | GameStatus::Confirmed => {
            Err(TournamentError::Conflict)
        }
        GameStatus::Disputed if record.entered_by != team_id => Err(TournamentError::Conflict),
        GameStatus::Disputed => Ok(GameRecord {
            status: GameStatus::Entering,
            winner: None,
            confirmed_by: None,
            timestamp: now,
            ..record.clone()
        }),
    }
}

/// Store the final numbers and hand the record to the other team.
pub fn submit(
    current: Option<&GameRecord>,
    team_id: TeamId,
    scores: &ScoreSubmission,
    now: DateTime<Utc>,
) -> Result<GameRecord, TournamentError> {
    let record = current
        .filter(|r| r.status == GameStatus::Entering && r.entered_by == team_id)
        .ok_or(TournamentError::NotFound)?;
    let winner = decide_winner(record.team_a, record.team_b, scores)?;
    Ok(GameRecord {
        score_a: scores.score_a,
        score_b: scores.score_b,
        hands_a: scores.hands_a,
        hands_b: scores.hands_b,
        boston_a: scores.boston_a,
        boston_b: scores.boston_b,
        winner: Some(winner),
        status: GameStatus::PendingConfirmation,
        timestamp: now,
        ..record.clone()
    })
}

/// Higher score wins; equal scores need an explicit winner from the caller.
pub fn decide_winner(
    team_a: TeamId,
    team_b: TeamId,
    scores: &ScoreSubmission,
) -> Result<TeamId, TournamentError> {
    use std::cmp::Ordering;
    match scores.score_a.cmp(&scores.score_b) {
        Ordering::Greater => Ok(team_a),
        Ordering::Less => Ok(team_b),
        Ordering::Equal => match scores.tie_winner {
            Some(w) if w == team_a || w == team_b => Ok(w),
            _ => Err(TournamentError::AmbiguousResult),
        },
    }
}

/// Accept or dispute a pending score. Only the team that did not enter it may answer.
pub fn confirm(
    current: Option<&GameRecord>,
    game_id: GameId,
    team_id: TeamId,
    accepted: bool,
) -> Result<GameRecord, TournamentError> {
    let record = current
        .filter(|r| r.id == game_id && r.status == GameStatus::PendingConfirmation)
        .ok_or(TournamentError::NotFound)?;
    if team_id != record.team_a && team_id != record.team_b {
        return Err(TournamentError::NotParticipant(team_id));
    }
    if team_id == record.entered_by {
        return Err(TournamentError::Conflict);
    }
    let status = if accepted {
        GameStatus::Confirmed
    } else {
        GameStatus::Disputed
    };
    Ok(GameRecord {
        status,
        confirmed_by: accepted.then_some(team_id),
        ..record.clone()
    })
}

/// Runs the transitions against a store and publishes the resulting events.
pub struct ScoreDesk<S, E> {
    store: S,
    events: E,
}

impl<S: GameStore, E: EventSink> ScoreDesk<S, E> {
    pub fn new(store: S, events: E) -> Self {
        Self { store, events }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn events(&self) -> &E {
        &self.events
    }

    pub fn begin_entry(
        &self,
        schedule: &Schedule,
        match_id: MatchId,
        team_id: TeamId,
    ) -> Result<GameRecord, TournamentError> {
        let record = self.transact(match_id, |current| {
            begin_entry(current, schedule, match_id, team_id, Utc::now())
        })?;
        log::debug!("Team {} entering score for match {}", team_id, match_id);
        self.events.publish(&EngineEvent::EntryStarted {
            tournament_id: record.tournament_id,
            match_id,
            team_id,
        });
        Ok(record)
    }

    pub fn submit(
        &self,
        match_id: MatchId,
        team_id: TeamId,
        scores: &ScoreSubmission,
    ) -> Result<GameRecord, TournamentError> {
        let record = self.transact(match_id, |current| {
            submit(current, team_id, scores, Utc::now())
        })?;
        log::debug!(
            "Match {} submitted {}-{} by team {}",
            match_id,
            record.score_a,
            record.score_b,
            team_id
        );
        self.events.publish(&EngineEvent::ScoreSubmitted {
            game: record.clone(),
        });
        Ok(record)
    }

    /// Answer a pending score. On `accepted` the returned record is confirmed
    /// and the caller feeds it to the results and the schedule.
    pub fn confirm(
        &self,
        game_id: GameId,
        team_id: TeamId,
        accepted: bool,
    ) -> Result<GameRecord, TournamentError> {
        let match_id = self
            .store
            .load_by_id(game_id)?
            .ok_or(TournamentError::NotFound)?
            .match_id;
        let record = self.transact(match_id, |current| {
            confirm(current, game_id, team_id, accepted)
        })?;
        if accepted {
            log::info!(
                "Match {} confirmed: {}-{}, winner {:?}",
                match_id,
                record.score_a,
                record.score_b,
                record.winner
            );
            self.events.publish(&EngineEvent::ScoreConfirmed {
                game: record.clone(),
            });
        } else {
            log::info!("Match {} disputed by team {}", match_id, team_id);
            self.events.publish(&EngineEvent::ScoreDisputed {
                game: record.clone(),
            });
        }
        Ok(record)
    }

    /// Administrative reset of a stuck record. Confirmed scores cannot be reset.
    ///
    /// The removal only goes through against the version that was checked, so a
    /// confirmation landing in between is never deleted.
    pub fn reset(&self, match_id: MatchId) -> Result<GameRecord, TournamentError> {
        for _ in 0..MAX_WRITE_ATTEMPTS {
            let current = self
                .store
                .load(match_id)?
                .ok_or(TournamentError::NotFound)?;
            if current.is_confirmed() {
                return Err(TournamentError::Conflict);
            }
            if let Some(removed) = self.store.remove_if(match_id, current.version)? {
                log::warn!("Score record for match {} reset", match_id);
                self.events.publish(&EngineEvent::EntryReset {
                    tournament_id: removed.tournament_id,
                    match_id,
                    game_id: removed.id,
                });
                return Ok(removed);
            }
            log::warn!("Concurrent write on match {}, re-reading", match_id);
        }
        Err(TournamentError::Conflict)
    }

    /// Read, apply `transition`, then write only if nobody changed the record meanwhile.
    /// A lost write re-reads so the caller sees the error the new state implies.
    fn transact<F>(&self, match_id: MatchId, transition: F) -> Result<GameRecord, TournamentError>
    where
        F: Fn(Option<&GameRecord>) -> Result<GameRecord, TournamentError>,
    {
        for _ in 0..MAX_WRITE_ATTEMPTS {
            let current = self.store.load(match_id)?;
            let mut next = transition(current.as_ref())?;
            let expected = current.as_ref().map(|r| r.version);
            if self.store.compare_and_set(expected, next.clone())? {
                next.version = expected.map_or(1, |v| v + 1);
                return Ok(next);
            }
            log::warn!("Concurrent write on match {}, re-reading", match_id);
        }
        Err(TournamentError::Conflict)
    }
}
