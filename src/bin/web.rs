//! Single binary web server: the tournament engine behind a REST API.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT
//! (see `team_tournament::config` for the rest).

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Instant;
use team_tournament::config::ServerConfig;
use team_tournament::roster::read_teams;
use team_tournament::{
    advance_bracket_match, apply_confirmed_game, apply_override, record_score, resolve_all,
    standings, start_bracket, start_round_play, BroadcastSink, EventSink, GameStore,
    MemoryGameStore, OverrideScope, OverrideValue, ScheduleStrategy, ScoreDesk, ScoreSubmission,
    Team, Tournament, TournamentError, TournamentId,
};
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

/// Per-tournament entry: tournament data + last activity time (for auto-cleanup).
struct TournamentEntry {
    tournament: Tournament,
    last_activity: Instant,
}

/// In-memory tournaments by ID. Entries are removed after the configured inactivity timeout.
type Tournaments = Data<RwLock<HashMap<TournamentId, TournamentEntry>>>;

/// Score records for every tournament plus the event fan-out.
type Desk = Data<ScoreDesk<MemoryGameStore, BroadcastSink>>;

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    #[serde(default)]
    name: String,
    rounds: Option<u32>,
    #[serde(default)]
    strategy: ScheduleStrategy,
}

#[derive(Deserialize)]
struct AddTeamBody {
    name: String,
    city: String,
    #[serde(default)]
    team_number: u32,
}

#[derive(Deserialize)]
struct TeamBody {
    team_id: Uuid,
}

#[derive(Deserialize)]
struct SubmitBody {
    team_id: Uuid,
    #[serde(flatten)]
    scores: ScoreSubmission,
}

#[derive(Deserialize)]
struct ConfirmBody {
    team_id: Uuid,
    accepted: bool,
}

#[derive(Deserialize)]
struct OverrideBody {
    team_id: Uuid,
    scope: OverrideScope,
    value: OverrideValue,
}

#[derive(Deserialize)]
struct BracketBody {
    size: usize,
}

#[derive(Deserialize)]
struct BracketScoreBody {
    team_1_score: i32,
    team_2_score: i32,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and a team/match/game id.
#[derive(Deserialize)]
struct TournamentItemPath {
    id: TournamentId,
    item_id: Uuid,
}

fn error_kind(e: &TournamentError) -> &'static str {
    match e {
        TournamentError::InsufficientTeams { .. } => "insufficient_teams",
        TournamentError::UnsupportedSize(_) => "unsupported_size",
        TournamentError::Conflict => "conflict",
        TournamentError::TeammateEntering => "teammate_entering",
        TournamentError::NotFound => "not_found",
        TournamentError::AmbiguousResult => "ambiguous_result",
        TournamentError::NotParticipant(_) => "not_participant",
        TournamentError::UnresolvedMatch(_) => "unresolved_match",
        TournamentError::UnknownMatch(_) => "unknown_match",
        TournamentError::InvalidOverride => "invalid_override",
        TournamentError::DuplicateTeamName => "duplicate_team_name",
        TournamentError::InvalidState => "invalid_state",
        TournamentError::Roster(_) => "roster",
        TournamentError::Storage(_) => "storage",
    }
}

fn error_response(e: &TournamentError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string(), "kind": error_kind(e) });
    match e {
        TournamentError::Conflict | TournamentError::TeammateEntering => {
            HttpResponse::Conflict().json(body)
        }
        TournamentError::NotFound | TournamentError::UnknownMatch(_) => {
            HttpResponse::NotFound().json(body)
        }
        TournamentError::Storage(_) => HttpResponse::InternalServerError().json(body),
        _ => HttpResponse::UnprocessableEntity().json(body),
    }
}

/// Run `f` on a tournament under the write lock, refreshing its activity time.
fn with_tournament<F>(state: &Tournaments, id: TournamentId, f: F) -> HttpResponse
where
    F: FnOnce(&mut Tournament) -> Result<HttpResponse, TournamentError>,
{
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    };
    entry.last_activity = Instant::now();
    match f(&mut entry.tournament) {
        Ok(resp) => resp,
        Err(e) => error_response(&e),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "team-tournament",
    })
}

/// Create a new tournament (returns it with id; clients store the id for subsequent requests).
#[post("/api/tournaments")]
async fn api_create_tournament(
    state: Tournaments,
    config: Data<ServerConfig>,
    body: Option<Json<CreateTournamentBody>>,
) -> HttpResponse {
    let (name, rounds, strategy) = match body {
        Some(b) => {
            let b = b.into_inner();
            (b.name, b.rounds.unwrap_or(config.default_rounds), b.strategy)
        }
        None => (String::new(), config.default_rounds, ScheduleStrategy::default()),
    };
    let tournament = Tournament::new(name, rounds, strategy);
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let resp = HttpResponse::Ok().json(&tournament);
    log::info!("Created tournament {}", tournament.id);
    g.insert(
        tournament.id,
        TournamentEntry {
            tournament,
            last_activity: Instant::now(),
        },
    );
    resp
}

#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: Tournaments, path: Path<TournamentPath>) -> HttpResponse {
    with_tournament(&state, path.id, |t| Ok(HttpResponse::Ok().json(&*t)))
}

/// Register a team (Setup only).
#[post("/api/tournaments/{id}/teams")]
async fn api_add_team(
    state: Tournaments,
    path: Path<TournamentPath>,
    body: Json<AddTeamBody>,
) -> HttpResponse {
    let body = body.into_inner();
    with_tournament(&state, path.id, move |t| {
        let number = if body.team_number == 0 {
            t.teams.len() as u32 + 1
        } else {
            body.team_number
        };
        t.add_team(Team::new(body.name, body.city, number))?;
        Ok(HttpResponse::Ok().json(&*t))
    })
}

/// Remove a team by id (Setup only).
#[delete("/api/tournaments/{id}/teams/{item_id}")]
async fn api_remove_team(state: Tournaments, path: Path<TournamentItemPath>) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        t.remove_team(path.item_id)?;
        Ok(HttpResponse::Ok().json(&*t))
    })
}

/// Import teams from a CSV body (`name,city,team_number`).
#[post("/api/tournaments/{id}/teams/import")]
async fn api_import_teams(state: Tournaments, path: Path<TournamentPath>, body: String) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        let teams = read_teams(body.as_bytes())?;
        // Validate the whole roster before adding any team.
        let mut staged = t.clone();
        for team in teams {
            staged.add_team(team)?;
        }
        *t = staged;
        Ok(HttpResponse::Ok().json(&*t))
    })
}

/// Generate the schedule (Setup -> RoundPlay).
#[post("/api/tournaments/{id}/schedule")]
async fn api_generate_schedule(state: Tournaments, path: Path<TournamentPath>) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        start_round_play(t)?;
        Ok(HttpResponse::Ok().json(&t.schedule))
    })
}

/// Sweep every placeholder against all confirmed games.
#[post("/api/tournaments/{id}/schedule/resolve")]
async fn api_resolve_schedule(state: Tournaments, desk: Desk, path: Path<TournamentPath>) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        let games: Vec<_> = desk
            .store()
            .confirmed()?
            .into_iter()
            .filter(|g| g.tournament_id == t.id)
            .collect();
        let remaining = resolve_all(t, &games, desk.events())?;
        Ok(HttpResponse::Ok().json(serde_json::json!({
            "remaining": remaining,
            "schedule": &t.schedule,
        })))
    })
}

/// Open score entry for a team on a match.
#[post("/api/tournaments/{id}/matches/{item_id}/entry")]
async fn api_begin_entry(
    state: Tournaments,
    desk: Desk,
    path: Path<TournamentItemPath>,
    body: Json<TeamBody>,
) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        let schedule = t.schedule.as_ref().ok_or(TournamentError::InvalidState)?;
        let record = desk.begin_entry(schedule, path.item_id, body.team_id)?;
        Ok(HttpResponse::Ok().json(record))
    })
}

/// Administrative reset of a stuck score record.
#[delete("/api/tournaments/{id}/matches/{item_id}/entry")]
async fn api_reset_entry(state: Tournaments, desk: Desk, path: Path<TournamentItemPath>) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        let belongs = t
            .schedule
            .as_ref()
            .is_some_and(|s| s.get_match(path.item_id).is_some());
        if !belongs {
            return Err(TournamentError::UnknownMatch(path.item_id));
        }
        let record = desk.reset(path.item_id)?;
        Ok(HttpResponse::Ok().json(record))
    })
}

/// Submit final scores for a match the team is entering.
#[post("/api/tournaments/{id}/matches/{item_id}/submit")]
async fn api_submit_score(
    state: Tournaments,
    desk: Desk,
    path: Path<TournamentItemPath>,
    body: Json<SubmitBody>,
) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        let belongs = t
            .schedule
            .as_ref()
            .is_some_and(|s| s.get_match(path.item_id).is_some());
        if !belongs {
            return Err(TournamentError::UnknownMatch(path.item_id));
        }
        let record = desk.submit(path.item_id, body.team_id, &body.scores)?;
        Ok(HttpResponse::Ok().json(record))
    })
}

/// Confirm or dispute a pending score. A confirmation updates results and the schedule.
#[post("/api/tournaments/{id}/games/{item_id}/confirm")]
async fn api_confirm_score(
    state: Tournaments,
    desk: Desk,
    path: Path<TournamentItemPath>,
    body: Json<ConfirmBody>,
) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        let pending = desk
            .store()
            .load_by_id(path.item_id)?
            .ok_or(TournamentError::NotFound)?;
        if pending.tournament_id != t.id {
            return Err(TournamentError::NotFound);
        }
        let record = desk.confirm(path.item_id, body.team_id, body.accepted)?;
        if record.is_confirmed() {
            apply_confirmed_game(t, &record, desk.events())?;
        }
        Ok(HttpResponse::Ok().json(record))
    })
}

#[get("/api/tournaments/{id}/standings")]
async fn api_standings(state: Tournaments, path: Path<TournamentPath>) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        Ok(HttpResponse::Ok().json(standings(&t.teams, &t.results, &t.overrides)))
    })
}

/// Force a standings value for a team's round or totals.
#[put("/api/tournaments/{id}/overrides")]
async fn api_apply_override(
    state: Tournaments,
    path: Path<TournamentPath>,
    body: Json<OverrideBody>,
) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        if t.get_team(body.team_id).is_none() {
            return Err(TournamentError::NotParticipant(body.team_id));
        }
        apply_override(&mut t.overrides, body.team_id, body.scope, body.value)?;
        Ok(HttpResponse::Ok().json(standings(&t.teams, &t.results, &t.overrides)))
    })
}

/// Seed a bracket of `size` from current standings.
#[post("/api/tournaments/{id}/bracket")]
async fn api_start_bracket(
    state: Tournaments,
    path: Path<TournamentPath>,
    body: Json<BracketBody>,
) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        start_bracket(t, body.size)?;
        Ok(HttpResponse::Ok().json(&t.bracket))
    })
}

#[put("/api/tournaments/{id}/bracket/matches/{item_id}/score")]
async fn api_bracket_score(
    state: Tournaments,
    path: Path<TournamentItemPath>,
    body: Json<BracketScoreBody>,
) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        let bracket = t.bracket.as_mut().ok_or(TournamentError::InvalidState)?;
        record_score(bracket, path.item_id, body.team_1_score, body.team_2_score)?;
        Ok(HttpResponse::Ok().json(&*bracket))
    })
}

#[post("/api/tournaments/{id}/bracket/matches/{item_id}/advance")]
async fn api_bracket_advance(state: Tournaments, desk: Desk, path: Path<TournamentItemPath>) -> HttpResponse {
    with_tournament(&state, path.id, |t| {
        advance_bracket_match(t, path.item_id, desk.events())?;
        Ok(HttpResponse::Ok().json(&*t))
    })
}

/// Long poll: wait for the next event of this tournament, or 204 after the poll timeout.
#[get("/api/tournaments/{id}/events")]
async fn api_poll_events(
    state: Tournaments,
    desk: Desk,
    config: Data<ServerConfig>,
    path: Path<TournamentPath>,
) -> HttpResponse {
    let exists = state.read().map(|g| g.contains_key(&path.id)).unwrap_or(false);
    if !exists {
        return HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" }));
    }
    let mut rx = desk.events().subscribe();
    let deadline = tokio::time::Instant::now() + config.event_poll_timeout;
    loop {
        match tokio::time::timeout_at(deadline, rx.recv()).await {
            Ok(Ok(event)) if event.tournament_id() == path.id => {
                return HttpResponse::Ok().json(event);
            }
            Ok(Ok(_)) | Ok(Err(RecvError::Lagged(_))) => continue,
            Ok(Err(RecvError::Closed)) | Err(_) => return HttpResponse::NoContent().finish(),
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state: Tournaments = Data::new(RwLock::new(HashMap::new()));
    let sink = BroadcastSink::new(config.event_capacity);
    let desk: Desk = Data::new(ScoreDesk::new(MemoryGameStore::new(), sink));

    // Log every event alongside the broadcast.
    let mut log_rx = desk.events().subscribe();
    actix_web::rt::spawn(async move {
        loop {
            match log_rx.recv().await {
                Ok(event) => team_tournament::LogSink.publish(&event),
                Err(RecvError::Lagged(n)) => log::warn!("Event log lagged by {} event(s)", n),
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Background task: periodically remove tournaments without recent activity.
    let state_cleanup = state.clone();
    let inactivity = config.inactivity_timeout;
    let cleanup_every = config.cleanup_interval;
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(cleanup_every);
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| entry.last_activity.elapsed() < inactivity);
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive tournament(s)", removed);
            }
        }
    });

    let config = Data::new(config);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(desk.clone())
            .app_data(config.clone())
            .service(api_health)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_add_team)
            .service(api_remove_team)
            .service(api_import_teams)
            .service(api_generate_schedule)
            .service(api_resolve_schedule)
            .service(api_begin_entry)
            .service(api_reset_entry)
            .service(api_submit_score)
            .service(api_confirm_score)
            .service(api_standings)
            .service(api_apply_override)
            .service(api_start_bracket)
            .service(api_bracket_score)
            .service(api_bracket_advance)
            .service(api_poll_events)
    })
    .bind(bind)?
    .run()
    .await
}
