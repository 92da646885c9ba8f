//! Tournament engine logic: schedules, score confirmation, results and bracket.

mod bracket;
mod confirmation;
mod placeholders;
mod results;
mod rotation;
mod round_play;
mod schedule;

pub use bracket::{
    advance, advance_bracket_match, build_bracket, build_matches, next_table, record_score,
    seed_bracket, seeding_chart, start_bracket,
};
pub use confirmation::{begin_entry, confirm, decide_winner, submit, ScoreDesk};
pub use placeholders::{resolve_placeholders, unresolved_from_round};
pub use results::{apply_override, compare_standings, on_confirmed, ranked_teams, standings};
pub use round_play::{apply_confirmed_game, resolve_all, start_round_play};
pub use schedule::{build_schedule, MIN_TEAMS};
