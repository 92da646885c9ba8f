//! Team data structure.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a team (used in matches, game records and standings).
pub type TeamId = Uuid;

/// A registered team. Immutable once the tournament is running.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    /// Home city; the schedule generator spreads each city across both columns.
    pub city: String,
    /// Number printed on the team's table card.
    pub team_number: u32,
}

impl Team {
    /// Create a new team with a fresh id.
    pub fn new(name: impl Into<String>, city: impl Into<String>, team_number: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            city: city.into(),
            team_number,
        }
    }

    /// Same as [`Team::new`] but with a caller-chosen id (imports, tests).
    pub fn with_id(
        id: TeamId,
        name: impl Into<String>,
        city: impl Into<String>,
        team_number: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            city: city.into(),
            team_number,
        }
    }

    /// Cities compare case-insensitively and ignore surrounding whitespace.
    pub fn same_city(&self, other: &Team) -> bool {
        self.city.trim().eq_ignore_ascii_case(other.city.trim())
    }
}
