//! Per-team results, standings rows and operator overrides.

use crate::models::team::TeamId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Outcome of one round for one team. `None` renders as an empty cell.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum WinLoss {
    #[serde(rename = "W")]
    Win,
    #[serde(rename = "L")]
    Loss,
    #[default]
    #[serde(rename = "")]
    None,
}

/// One round's line for one team.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    pub points: i32,
    pub win_loss: WinLoss,
    pub boston: u32,
}

/// A team's results across all rounds.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TournamentResult {
    pub team_id: TeamId,
    pub rounds: BTreeMap<u32, RoundResult>,
    pub total_points: i32,
    pub total_wins: u32,
    pub total_boston: u32,
}

impl TournamentResult {
    /// Zeroed result for a team without confirmed games.
    pub fn new(team_id: TeamId) -> Self {
        Self {
            team_id,
            rounds: BTreeMap::new(),
            total_points: 0,
            total_wins: 0,
            total_boston: 0,
        }
    }

    /// Recompute totals as sums and counts over the rounds present.
    pub fn recompute_totals(&mut self) {
        self.total_points = self.rounds.values().map(|r| r.points).sum();
        self.total_wins = self
            .rounds
            .values()
            .filter(|r| r.win_loss == WinLoss::Win)
            .count() as u32;
        self.total_boston = self.rounds.values().map(|r| r.boston).sum();
    }
}

/// Derived results keyed by team. Only confirmed games land here.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResultsBook {
    pub results: HashMap<TeamId, TournamentResult>,
}

impl ResultsBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, team_id: TeamId) -> Option<&TournamentResult> {
        self.results.get(&team_id)
    }

    /// True once a confirmed game exists for the team in that round.
    pub fn has_round(&self, team_id: TeamId, round: u32) -> bool {
        self.results
            .get(&team_id)
            .is_some_and(|r| r.rounds.contains_key(&round))
    }
}

/// Which part of a team's line an override targets.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scope", content = "round", rename_all = "snake_case")]
pub enum OverrideScope {
    Round(u32),
    Total,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideField {
    Points,
    WinLoss,
    Boston,
    /// Totals only.
    Wins,
}

/// Operator-forced value.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum OverrideValue {
    Points(i32),
    WinLoss(WinLoss),
    Boston(u32),
    Wins(u32),
}

impl OverrideValue {
    pub fn field(&self) -> OverrideField {
        match self {
            OverrideValue::Points(_) => OverrideField::Points,
            OverrideValue::WinLoss(_) => OverrideField::WinLoss,
            OverrideValue::Boston(_) => OverrideField::Boston,
            OverrideValue::Wins(_) => OverrideField::Wins,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct OverrideKey {
    pub team_id: TeamId,
    pub scope: OverrideScope,
    pub field: OverrideField,
}

/// Operator overrides layered over derived results. Passed explicitly to standings.
#[derive(Clone, Debug, Default)]
pub struct OverrideStore {
    entries: HashMap<OverrideKey, OverrideValue>,
}

impl OverrideStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: OverrideKey, value: OverrideValue) {
        self.entries.insert(key, value);
    }

    pub fn get(&self, key: &OverrideKey) -> Option<&OverrideValue> {
        self.entries.get(key)
    }

    /// Drop every override for one team's round.
    pub fn clear_round(&mut self, team_id: TeamId, round: u32) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|k, _| !(k.team_id == team_id && k.scope == OverrideScope::Round(round)));
        before - self.entries.len()
    }

    /// Overrides for one team, in no particular order.
    pub fn for_team(&self, team_id: TeamId) -> impl Iterator<Item = (&OverrideKey, &OverrideValue)> {
        self.entries.iter().filter(move |(k, _)| k.team_id == team_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
