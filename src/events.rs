//! Engine events and the sinks they are published to.
//!
//! Delivery to other clients is not the engine's job: a sink hands events to
//! whatever transport the surrounding system uses.

use crate::models::{BracketTeam, GameId, GameRecord, MatchId, TeamId, TournamentId};
use serde::Serialize;
use tokio::sync::broadcast;

/// State change worth telling the other clients about.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    EntryStarted {
        tournament_id: TournamentId,
        match_id: MatchId,
        team_id: TeamId,
    },
    ScoreSubmitted {
        game: GameRecord,
    },
    ScoreConfirmed {
        game: GameRecord,
    },
    ScoreDisputed {
        game: GameRecord,
    },
    EntryReset {
        tournament_id: TournamentId,
        match_id: MatchId,
        game_id: GameId,
    },
    PlaceholdersResolved {
        tournament_id: TournamentId,
        remaining: usize,
    },
    BracketAdvanced {
        tournament_id: TournamentId,
        round: u32,
        table: u32,
        winner: BracketTeam,
    },
}

impl EngineEvent {
    pub fn tournament_id(&self) -> TournamentId {
        match self {
            EngineEvent::EntryStarted { tournament_id, .. }
            | EngineEvent::EntryReset { tournament_id, .. }
            | EngineEvent::PlaceholdersResolved { tournament_id, .. }
            | EngineEvent::BracketAdvanced { tournament_id, .. } => *tournament_id,
            EngineEvent::ScoreSubmitted { game }
            | EngineEvent::ScoreConfirmed { game }
            | EngineEvent::ScoreDisputed { game } => game.tournament_id,
        }
    }
}

pub trait EventSink {
    fn publish(&self, event: &EngineEvent);
}

/// Drops every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&self, _event: &EngineEvent) {}
}

/// Writes events to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn publish(&self, event: &EngineEvent) {
        match serde_json::to_string(event) {
            Ok(json) => log::info!("event {}", json),
            Err(e) => log::warn!("event not serializable: {}", e),
        }
    }
}

/// Fans events out to subscribers over a tokio broadcast channel.
#[derive(Clone, Debug)]
pub struct BroadcastSink {
    sender: broadcast::Sender<EngineEvent>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.sender.subscribe()
    }
}

impl EventSink for BroadcastSink {
    fn publish(&self, event: &EngineEvent) {
        // No subscribers is not an error.
        let _ = self.sender.send(event.clone());
    }
}

impl<S: EventSink + ?Sized> EventSink for &S {
    fn publish(&self, event: &EngineEvent) {
        (**self).publish(event)
    }
}
