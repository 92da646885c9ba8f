//! Persistence seam for game records, with a compare-and-set write.

use crate::models::{GameId, GameRecord, MatchId, TournamentError};
use std::collections::HashMap;
use std::sync::RwLock;

/// Where game records live. Implementations must make `compare_and_set` atomic.
pub trait GameStore {
    /// Current record for a match, if any.
    fn load(&self, match_id: MatchId) -> Result<Option<GameRecord>, TournamentError>;

    fn load_by_id(&self, game_id: GameId) -> Result<Option<GameRecord>, TournamentError>;

    /// Write `record` only if the stored version for its match still equals
    /// `expected` (`None` meaning "no record yet"). Returns false when another
    /// writer got there first. The stored record gets `expected + 1` as version.
    fn compare_and_set(
        &self,
        expected: Option<u64>,
        record: GameRecord,
    ) -> Result<bool, TournamentError>;

    /// Every confirmed record (for placeholder sweeps).
    fn confirmed(&self) -> Result<Vec<GameRecord>, TournamentError>;

    /// Remove the record for a match only if its stored version still equals
    /// `expected`. Returns the removed record, or None when it changed or is gone.
    fn remove_if(
        &self,
        match_id: MatchId,
        expected: u64,
    ) -> Result<Option<GameRecord>, TournamentError>;
}

/// In-memory store keyed by match id.
#[derive(Debug, Default)]
pub struct MemoryGameStore {
    records: RwLock<HashMap<MatchId, GameRecord>>,
}

impl MemoryGameStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> TournamentError {
    TournamentError::Storage("lock poisoned".to_string())
}

impl GameStore for MemoryGameStore {
    fn load(&self, match_id: MatchId) -> Result<Option<GameRecord>, TournamentError> {
        let g = self.records.read().map_err(poisoned)?;
        Ok(g.get(&match_id).cloned())
    }

    fn load_by_id(&self, game_id: GameId) -> Result<Option<GameRecord>, TournamentError> {
        let g = self.records.read().map_err(poisoned)?;
        Ok(g.values().find(|r| r.id == game_id).cloned())
    }

    fn compare_and_set(
        &self,
        expected: Option<u64>,
        mut record: GameRecord,
    ) -> Result<bool, TournamentError> {
        let mut g = self.records.write().map_err(poisoned)?;
        let current = g.get(&record.match_id).map(|r| r.version);
        if current != expected {
            return Ok(false);
        }
        record.version = expected.map_or(1, |v| v + 1);
        g.insert(record.match_id, record);
        Ok(true)
    }

    fn confirmed(&self) -> Result<Vec<GameRecord>, TournamentError> {
        let g = self.records.read().map_err(poisoned)?;
        Ok(g.values().filter(|r| r.is_confirmed()).cloned().collect())
    }

    fn remove_if(
        &self,
        match_id: MatchId,
        expected: u64,
    ) -> Result<Option<GameRecord>, TournamentError> {
        let mut g = self.records.write().map_err(poisoned)?;
        if g.get(&match_id).map(|r| r.version) != Some(expected) {
            return Ok(None);
        }
        Ok(g.remove(&match_id))
    }
}
