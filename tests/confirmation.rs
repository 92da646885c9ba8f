//! Integration tests for score entry, submission and confirmation.

use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use team_tournament::{
    build_schedule, confirm, BroadcastSink, EngineEvent, GameRecord, GameStatus, GameStore,
    Match, MatchId, MemoryGameStore, NullSink, Schedule, ScheduleStrategy, ScoreDesk,
    ScoreSubmission, Team, TeamId, TournamentError,
};
use uuid::Uuid;

fn setup(n: usize) -> (Schedule, ScoreDesk<MemoryGameStore, NullSink>) {
    let teams: Vec<Team> = (0..n)
        .map(|i| {
            Team::with_id(
                Uuid::from_u128(i as u128 + 1),
                format!("T{}", i + 1),
                format!("City{}", i),
                i as u32 + 1,
            )
        })
        .collect();
    let schedule =
        build_schedule(Uuid::from_u128(99), &teams, 2, ScheduleStrategy::FullSchedule).unwrap();
    (schedule, ScoreDesk::new(MemoryGameStore::new(), NullSink))
}

fn first_match(schedule: &Schedule) -> (Match, TeamId, TeamId) {
    let m = schedule.match_at(1, 1).unwrap().clone();
    let (a, b) = m.teams().unwrap();
    (m, a, b)
}

fn win_for_a() -> ScoreSubmission {
    ScoreSubmission {
        score_a: 420,
        score_b: 380,
        hands_a: Some(9),
        hands_b: Some(4),
        boston_a: 2,
        boston_b: 0,
        tie_winner: None,
    }
}

#[test]
fn other_team_cannot_open_entry_while_one_is_entering() {
    let (s, desk) = setup(4);
    let (m, a, b) = first_match(&s);
    let record = desk.begin_entry(&s, m.id, a).unwrap();
    assert_eq!(record.status, GameStatus::Entering);
    assert_eq!(record.entered_by, a);
    assert_eq!(desk.begin_entry(&s, m.id, b), Err(TournamentError::Conflict));
}

#[test]
fn same_team_twice_is_a_teammate_conflict() {
    let (s, desk) = setup(4);
    let (m, a, _) = first_match(&s);
    desk.begin_entry(&s, m.id, a).unwrap();
    assert_eq!(
        desk.begin_entry(&s, m.id, a),
        Err(TournamentError::TeammateEntering)
    );
}

#[test]
fn submit_requires_an_entering_record_owned_by_the_team() {
    let (s, desk) = setup(4);
    let (m, a, b) = first_match(&s);
    assert_eq!(
        desk.submit(m.id, a, &win_for_a()),
        Err(TournamentError::NotFound)
    );
    desk.begin_entry(&s, m.id, a).unwrap();
    assert_eq!(
        desk.submit(m.id, b, &win_for_a()),
        Err(TournamentError::NotFound)
    );
    let pending = desk.submit(m.id, a, &win_for_a()).unwrap();
    assert_eq!(pending.status, GameStatus::PendingConfirmation);
    assert_eq!(pending.winner, Some(a));
    assert_eq!(pending.hands_a, Some(9));
    assert_eq!(pending.boston_a, 2);

    // Awaiting the other side: nobody may reopen entry.
    assert_eq!(desk.begin_entry(&s, m.id, b), Err(TournamentError::Conflict));
    assert_eq!(desk.begin_entry(&s, m.id, a), Err(TournamentError::Conflict));
}

#[test]
fn confirmed_record_is_terminal() {
    let (s, desk) = setup(4);
    let (m, a, b) = first_match(&s);
    desk.begin_entry(&s, m.id, a).unwrap();
    let pending = desk.submit(m.id, a, &win_for_a()).unwrap();

    // The entering team cannot confirm its own score.
    assert_eq!(
        desk.confirm(pending.id, a, true),
        Err(TournamentError::Conflict)
    );
    let confirmed = desk.confirm(pending.id, b, true).unwrap();
    assert!(confirmed.is_confirmed());
    assert_eq!(confirmed.confirmed_by, Some(b));
    assert_eq!(confirmed.id, pending.id);

    assert_eq!(
        desk.submit(m.id, a, &win_for_a()),
        Err(TournamentError::NotFound)
    );
    assert_eq!(
        desk.confirm(pending.id, b, true),
        Err(TournamentError::NotFound)
    );
    assert_eq!(desk.begin_entry(&s, m.id, b), Err(TournamentError::Conflict));
    assert_eq!(desk.reset(m.id), Err(TournamentError::Conflict));
}

#[test]
fn dispute_returns_entry_to_the_original_team_only() {
    let (s, desk) = setup(4);
    let (m, a, b) = first_match(&s);
    let first = desk.begin_entry(&s, m.id, a).unwrap();
    let pending = desk.submit(m.id, a, &win_for_a()).unwrap();
    let disputed = desk.confirm(pending.id, b, false).unwrap();
    assert_eq!(disputed.status, GameStatus::Disputed);
    assert_eq!(disputed.confirmed_by, None);

    assert_eq!(desk.begin_entry(&s, m.id, b), Err(TournamentError::Conflict));
    let again = desk.begin_entry(&s, m.id, a).unwrap();
    assert_eq!(again.status, GameStatus::Entering);
    // Same record id across re-entries.
    assert_eq!(again.id, first.id);
    assert_eq!(again.winner, None);
}

#[test]
fn ties_need_an_explicit_winner() {
    let (s, desk) = setup(4);
    let (m, a, b) = first_match(&s);
    desk.begin_entry(&s, m.id, a).unwrap();
    let mut tied = ScoreSubmission {
        score_a: 300,
        score_b: 300,
        ..Default::default()
    };
    assert_eq!(
        desk.submit(m.id, a, &tied),
        Err(TournamentError::AmbiguousResult)
    );
    // Still entering after the failed submit.
    assert_eq!(
        desk.store().load(m.id).unwrap().unwrap().status,
        GameStatus::Entering
    );
    tied.tie_winner = Some(Uuid::from_u128(1234));
    assert_eq!(
        desk.submit(m.id, a, &tied),
        Err(TournamentError::AmbiguousResult)
    );
    tied.tie_winner = Some(b);
    assert_eq!(desk.submit(m.id, a, &tied).unwrap().winner, Some(b));
}

#[test]
fn entry_is_limited_to_known_participants() {
    let (s, desk) = setup(5);
    let (m, _, _) = first_match(&s);
    let outsider = Uuid::from_u128(777);
    assert_eq!(
        desk.begin_entry(&s, m.id, outsider),
        Err(TournamentError::NotParticipant(outsider))
    );
    let bye = s.round(1).find(|m| m.is_bye).unwrap();
    let bye_team = bye.bye_team().unwrap();
    assert_eq!(
        desk.begin_entry(&s, bye.id, bye_team),
        Err(TournamentError::UnresolvedMatch(bye.id))
    );
    let unknown = Uuid::from_u128(4242);
    assert_eq!(
        desk.begin_entry(&s, unknown, bye_team),
        Err(TournamentError::UnknownMatch(unknown))
    );
}

#[test]
fn reset_clears_a_stuck_entry() {
    let (s, desk) = setup(4);
    let (m, a, b) = first_match(&s);
    let stuck = desk.begin_entry(&s, m.id, a).unwrap();
    let removed = desk.reset(m.id).unwrap();
    assert_eq!(removed.id, stuck.id);
    assert_eq!(desk.reset(m.id), Err(TournamentError::NotFound));
    let fresh = desk.begin_entry(&s, m.id, b).unwrap();
    assert_eq!(fresh.entered_by, b);
}

#[test]
fn store_rejects_stale_writes() {
    let store = MemoryGameStore::new();
    let (a, b) = (Uuid::from_u128(1), Uuid::from_u128(2));
    let record = GameRecord::new(Uuid::nil(), Uuid::from_u128(10), 1, a, b, a, Utc::now());

    assert!(store.compare_and_set(None, record.clone()).unwrap());
    // A second "first write" loses.
    assert!(!store.compare_and_set(None, record.clone()).unwrap());
    let stored = store.load(record.match_id).unwrap().unwrap();
    assert_eq!(stored.version, 1);
    assert!(store.compare_and_set(Some(1), stored.clone()).unwrap());
    assert!(!store.compare_and_set(Some(1), stored).unwrap());
    assert_eq!(store.load(record.match_id).unwrap().unwrap().version, 2);
}

#[test]
fn transitions_are_published() {
    let (s, _) = setup(4);
    let (m, a, b) = first_match(&s);
    let sink = BroadcastSink::new(16);
    let mut rx = sink.subscribe();
    let desk = ScoreDesk::new(MemoryGameStore::new(), &sink);

    desk.begin_entry(&s, m.id, a).unwrap();
    let pending = desk.submit(m.id, a, &win_for_a()).unwrap();
    desk.confirm(pending.id, b, true).unwrap();

    assert!(matches!(
        rx.try_recv().unwrap(),
        EngineEvent::EntryStarted { team_id, .. } if team_id == a
    ));
    assert!(matches!(
        rx.try_recv().unwrap(),
        EngineEvent::ScoreSubmitted { .. }
    ));
    match rx.try_recv().unwrap() {
        EngineEvent::ScoreConfirmed { game } => {
            assert_eq!(game.tournament_id, Uuid::from_u128(99));
            assert_eq!(game.winner, Some(a));
        }
        other => panic!("unexpected event {other:?}"),
    }
    // Failed operations publish nothing.
    assert_eq!(desk.begin_entry(&s, m.id, a), Err(TournamentError::Conflict));
    assert!(rx.try_recv().is_err());
}

#[test]
fn store_removes_only_the_expected_version() {
    let store = MemoryGameStore::new();
    let (a, b) = (Uuid::from_u128(1), Uuid::from_u128(2));
    let record = GameRecord::new(Uuid::nil(), Uuid::from_u128(10), 1, a, b, a, Utc::now());
    store.compare_and_set(None, record.clone()).unwrap();

    assert_eq!(store.remove_if(record.match_id, 7).unwrap(), None);
    assert!(store.load(record.match_id).unwrap().is_some());
    let removed = store.remove_if(record.match_id, 1).unwrap().unwrap();
    assert_eq!(removed.id, record.id);
    assert_eq!(store.remove_if(record.match_id, 1).unwrap(), None);
}

/// Store that lets the other team confirm right before the first conditional removal.
struct ConfirmsBeforeRemoval {
    inner: MemoryGameStore,
    confirmer: TeamId,
    fired: AtomicBool,
}

impl GameStore for ConfirmsBeforeRemoval {
    fn load(&self, match_id: MatchId) -> Result<Option<GameRecord>, TournamentError> {
        self.inner.load(match_id)
    }

    fn load_by_id(&self, game_id: Uuid) -> Result<Option<GameRecord>, TournamentError> {
        self.inner.load_by_id(game_id)
    }

    fn compare_and_set(
        &self,
        expected: Option<u64>,
        record: GameRecord,
    ) -> Result<bool, TournamentError> {
        self.inner.compare_and_set(expected, record)
    }

    fn confirmed(&self) -> Result<Vec<GameRecord>, TournamentError> {
        self.inner.confirmed()
    }

    fn remove_if(
        &self,
        match_id: MatchId,
        expected: u64,
    ) -> Result<Option<GameRecord>, TournamentError> {
        if !self.fired.swap(true, Ordering::SeqCst) {
            let pending = self.inner.load(match_id)?.unwrap();
            let confirmed = confirm(Some(&pending), pending.id, self.confirmer, true)?;
            assert!(self.inner.compare_and_set(Some(pending.version), confirmed)?);
        }
        self.inner.remove_if(match_id, expected)
    }
}

#[test]
fn reset_never_deletes_a_score_confirmed_meanwhile() {
    let (s, _) = setup(4);
    let (m, a, b) = first_match(&s);
    let desk = ScoreDesk::new(
        ConfirmsBeforeRemoval {
            inner: MemoryGameStore::new(),
            confirmer: b,
            fired: AtomicBool::new(false),
        },
        NullSink,
    );
    desk.begin_entry(&s, m.id, a).unwrap();
    desk.submit(m.id, a, &win_for_a()).unwrap();

    // The confirmation wins the race; the re-read sees it and refuses.
    assert_eq!(desk.reset(m.id), Err(TournamentError::Conflict));
    let stored = desk.store().load(m.id).unwrap().unwrap();
    assert!(stored.is_confirmed());
    assert_eq!(stored.confirmed_by, Some(b));
}
