//! Single-elimination bracket data structures.

use crate::models::team::TeamId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a bracket match.
pub type BracketMatchId = Uuid;

/// Bracket sizes the seeding chart supports.
pub const SUPPORTED_BRACKET_SIZES: [usize; 4] = [4, 8, 16, 32];

/// A team entered into the bracket at a seed.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BracketTeam {
    /// 1-based rank.
    pub seed: u32,
    pub team_id: TeamId,
    pub name: String,
    pub team_number: u32,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BracketMatch {
    pub id: BracketMatchId,
    pub round: u32,
    pub table: u32,
    pub team_1: Option<BracketTeam>,
    pub team_2: Option<BracketTeam>,
    pub team_1_score: Option<i32>,
    pub team_2_score: Option<i32>,
    /// None until advanced.
    pub winner: Option<BracketTeam>,
}

impl BracketMatch {
    pub fn new(round: u32, table: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            round,
            table,
            team_1: None,
            team_2: None,
            team_1_score: None,
            team_2_score: None,
            winner: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Bracket {
    pub tournament_id: Uuid,
    pub size: usize,
    /// Seeded teams, seed 1 first.
    pub teams: Vec<BracketTeam>,
    /// All matches, ordered by round then table.
    pub matches: Vec<BracketMatch>,
}

impl Bracket {
    /// Number of rounds: log2(size).
    pub fn rounds(&self) -> u32 {
        self.size.trailing_zeros()
    }

    pub fn get_match(&self, id: BracketMatchId) -> Option<&BracketMatch> {
        self.matches.iter().find(|m| m.id == id)
    }

    pub fn match_at(&self, round: u32, table: u32) -> Option<&BracketMatch> {
        self.matches
            .iter()
            .find(|m| m.round == round && m.table == table)
    }

    pub fn final_match(&self) -> Option<&BracketMatch> {
        self.match_at(self.rounds(), 1)
    }

    /// Winner of the final, once advanced.
    pub fn champion(&self) -> Option<&BracketTeam> {
        self.final_match().and_then(|m| m.winner.as_ref())
    }
}
