//! Team roster import from CSV (`name,city,team_number`).

use crate::models::{Team, TournamentError};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct RosterRow {
    name: String,
    city: String,
    #[serde(default)]
    team_number: Option<u32>,
}

/// Parse a roster with a header row. Missing team numbers default to the row position (1-based).
pub fn read_teams<R: Read>(reader: R) -> Result<Vec<Team>, TournamentError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut teams: Vec<Team> = Vec::new();
    for (i, row) in rdr.deserialize::<RosterRow>().enumerate() {
        let row = row.map_err(|e| TournamentError::Roster(e.to_string()))?;
        if row.name.is_empty() {
            return Err(TournamentError::Roster(format!("row {}: empty team name", i + 1)));
        }
        if teams.iter().any(|t| t.name.eq_ignore_ascii_case(&row.name)) {
            return Err(TournamentError::Roster(format!(
                "row {}: duplicate team name {}",
                i + 1,
                row.name
            )));
        }
        let number = row.team_number.unwrap_or(i as u32 + 1);
        teams.push(Team::new(row.name, row.city, number));
    }
    log::debug!("Imported {} team(s) from roster", teams.len());
    Ok(teams)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_rows_and_defaults_numbers() {
        let data = "name,city,team_number\nAces, Columbus ,7\nKings,Chicago,\n";
        let teams = read_teams(data.as_bytes()).unwrap();
        assert_eq!(teams.len(), 2);
        assert_eq!(teams[0].city, "Columbus");
        assert_eq!(teams[0].team_number, 7);
        assert_eq!(teams[1].team_number, 2);
    }

    #[test]
    fn rejects_duplicate_names() {
        let data = "name,city\nAces,Columbus\naces,Detroit\n";
        assert!(matches!(
            read_teams(data.as_bytes()),
            Err(TournamentError::Roster(_))
        ));
    }
}
