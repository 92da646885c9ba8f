//! Match, MatchParticipant and Schedule for round play.

use crate::models::team::TeamId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a scheduled match.
pub type MatchId = Uuid;

/// Whether a placeholder waits for the winner or the loser of its source match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderRole {
    Winner,
    Loser,
}

/// Occupant of one side of a match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchParticipant {
    Concrete {
        team_id: TeamId,
    },
    /// Winner or loser of the match at (`source_round`, `source_table`), not yet known.
    Placeholder {
        role: PlaceholderRole,
        source_round: u32,
        source_table: u32,
    },
    Bye,
    Unassigned,
}

impl MatchParticipant {
    pub fn team(team_id: TeamId) -> Self {
        MatchParticipant::Concrete { team_id }
    }

    pub fn winner_of(source_round: u32, source_table: u32) -> Self {
        MatchParticipant::Placeholder {
            role: PlaceholderRole::Winner,
            source_round,
            source_table,
        }
    }

    pub fn loser_of(source_round: u32, source_table: u32) -> Self {
        MatchParticipant::Placeholder {
            role: PlaceholderRole::Loser,
            source_round,
            source_table,
        }
    }

    /// Team id if the slot is resolved to a concrete team.
    pub fn team_id(&self) -> Option<TeamId> {
        match self {
            MatchParticipant::Concrete { team_id } => Some(*team_id),
            _ => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, MatchParticipant::Placeholder { .. })
    }

    /// Short label used in logs, e.g. `R1L2` for "loser of round 1, table 2".
    pub fn label(&self) -> String {
        match self {
            MatchParticipant::Concrete { team_id } => team_id.to_string(),
            MatchParticipant::Placeholder {
                role,
                source_round,
                source_table,
            } => {
                let r = match role {
                    PlaceholderRole::Winner => 'W',
                    PlaceholderRole::Loser => 'L',
                };
                format!("R{source_round}{r}{source_table}")
            }
            MatchParticipant::Bye => "bye".to_string(),
            MatchParticipant::Unassigned => "unassigned".to_string(),
        }
    }
}

/// How rounds after the first are produced.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStrategy {
    /// Every round computed up front by column rotation.
    #[default]
    FullSchedule,
    /// Round 1 computed; later rounds pair winners with winners and losers with losers.
    WinLossRotation,
}

/// A single scheduled match at one table of one round.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    /// 1-based round number.
    pub round: u32,
    /// 1-based table number, dense within a round.
    pub table: u32,
    pub slot_a: MatchParticipant,
    pub slot_b: MatchParticipant,
    pub is_bye: bool,
    /// Informational only; the generator minimizes these but never rejects them.
    pub is_same_city: bool,
}

impl Match {
    pub fn new(round: u32, table: u32, slot_a: MatchParticipant, slot_b: MatchParticipant) -> Self {
        let is_bye = slot_a == MatchParticipant::Bye || slot_b == MatchParticipant::Bye;
        Self {
            id: Uuid::new_v4(),
            round,
            table,
            slot_a,
            slot_b,
            is_bye,
            is_same_city: false,
        }
    }

    /// Both team ids, if both slots are concrete.
    pub fn teams(&self) -> Option<(TeamId, TeamId)> {
        Some((self.slot_a.team_id()?, self.slot_b.team_id()?))
    }

    pub fn involves(&self, team_id: TeamId) -> bool {
        self.slot_a.team_id() == Some(team_id) || self.slot_b.team_id() == Some(team_id)
    }

    pub fn has_placeholder(&self) -> bool {
        self.slot_a.is_placeholder() || self.slot_b.is_placeholder()
    }

    /// The team that sits out, for bye matches with a known team.
    pub fn bye_team(&self) -> Option<TeamId> {
        if !self.is_bye {
            return None;
        }
        self.slot_a.team_id().or_else(|| self.slot_b.team_id())
    }
}

/// The full match graph of one tournament's round play.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Schedule {
    pub tournament_id: Uuid,
    pub strategy: ScheduleStrategy,
    /// Base rounds plus the catch-up round once appended.
    pub total_rounds: u32,
    /// Rounds generated before any catch-up round.
    pub base_rounds: u32,
    pub matches: Vec<Match>,
    /// Set when byes happened but the catch-up round cannot be built until
    /// every bye slot resolves to a known team.
    pub catch_up_pending: bool,
}

impl Schedule {
    pub fn new(tournament_id: Uuid, strategy: ScheduleStrategy) -> Self {
        Self {
            tournament_id,
            strategy,
            total_rounds: 0,
            base_rounds: 0,
            matches: Vec::new(),
            catch_up_pending: false,
        }
    }

    pub fn round(&self, round: u32) -> impl Iterator<Item = &Match> {
        self.matches.iter().filter(move |m| m.round == round)
    }

    pub fn match_at(&self, round: u32, table: u32) -> Option<&Match> {
        self.matches
            .iter()
            .find(|m| m.round == round && m.table == table)
    }

    pub fn get_match(&self, id: MatchId) -> Option<&Match> {
        self.matches.iter().find(|m| m.id == id)
    }

    pub fn has_catch_up_round(&self) -> bool {
        self.total_rounds > self.base_rounds
    }

    /// Placeholders still waiting for their source match.
    pub fn unresolved_placeholders(&self) -> impl Iterator<Item = &MatchParticipant> {
        self.matches
            .iter()
            .flat_map(|m| [&m.slot_a, &m.slot_b])
            .filter(|p| p.is_placeholder())
    }
}
