//! Single binary web server: JSON API driving the draw wizard, backed by the padel backend.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST, PORT, BACKEND_URL.

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path, Query},
    App, HttpResponse, HttpServer, Responder,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use padel_draw::{
    require_ready, spawn_submission, Category, DrawBackend, DrawType, DrawWizard, Feasibility,
    HttpBackend, Person, SessionGate, SessionState, SubmissionOutcome, Team, TournamentRecord,
    WebConfig, WizardError,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use uuid::Uuid;

type SessionId = Uuid;

/// One operator: their session gate, the wizard in progress (if any), last activity time.
struct SessionEntry {
    gate: SessionGate,
    wizard: Option<DrawWizard>,
    last_activity: Instant,
}

/// In-memory state: operator sessions by id. Entries are removed after 12h inactivity.
type AppState = Data<RwLock<HashMap<SessionId, SessionEntry>>>;

type Backend = Data<HttpBackend>;

/// Inactivity threshold: sessions not accessed for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateSessionBody {
    #[serde(default)]
    credential: Option<String>,
}

#[derive(Deserialize)]
struct AddTeamBody {
    teammate1: String,
    teammate2: String,
    gender: u8,
}

#[derive(Deserialize)]
struct ParametersBody {
    total_rounds: u32,
    available_courts: u32,
}

#[derive(Deserialize)]
struct DateBody {
    date: NaiveDate,
}

#[derive(Deserialize)]
struct DrawTypeBody {
    draw_type: DrawType,
}

#[derive(Deserialize)]
struct DateQuery {
    date: NaiveDate,
}

/// Path segment: session id (e.g. /api/sessions/{id})
#[derive(Deserialize)]
struct SessionPath {
    id: SessionId,
}

/// Path segments: session id and roster position.
#[derive(Deserialize)]
struct SessionTeamPath {
    id: SessionId,
    index: usize,
}

#[derive(Serialize)]
struct SessionView {
    id: SessionId,
    status: &'static str,
    error: Option<String>,
}

impl SessionView {
    fn new(id: SessionId, state: &SessionState) -> Self {
        let (status, error) = match state {
            SessionState::Authenticating => ("authenticating", None),
            SessionState::Ready(_) => ("ready", None),
            SessionState::Failed(reason) => ("failed", Some(reason.to_string())),
        };
        Self { id, status, error }
    }
}

#[derive(Serialize)]
struct TeamView {
    index: usize,
    members: String,
    subtitle: String,
    team: Team,
}

#[derive(Serialize)]
struct WizardView {
    teams: Vec<TeamView>,
    draw_type: DrawType,
    date_start: Option<DateTime<Utc>>,
    total_rounds: u32,
    available_courts: u32,
    feasibility: Feasibility,
    summary: String,
    submitting: bool,
    completed: bool,
}

impl WizardView {
    fn new(wizard: &DrawWizard) -> Self {
        let params = wizard.parameters();
        let feasibility = wizard.feasibility();
        let teams = wizard
            .roster()
            .snapshot()
            .into_iter()
            .enumerate()
            .map(|(index, team)| TeamView {
                index,
                members: team.members_label(),
                subtitle: format!("{} team", team.category),
                team,
            })
            .collect();
        Self {
            teams,
            draw_type: wizard.draw_type(),
            date_start: wizard.date_start(),
            total_rounds: params.total_rounds,
            available_courts: params.available_courts,
            summary: feasibility.summary(),
            feasibility,
            submitting: wizard.is_submitting(),
            completed: wizard.is_completed(),
        }
    }
}

fn error_body(message: impl ToString) -> serde_json::Value {
    serde_json::json!({ "error": message.to_string() })
}

fn wizard_error_response(e: WizardError) -> HttpResponse {
    match e {
        WizardError::Session(_) => HttpResponse::Forbidden().json(error_body(e)),
        WizardError::SubmissionInFlight => HttpResponse::Conflict().json(error_body(e)),
        _ => HttpResponse::BadRequest().json(error_body(e)),
    }
}

fn lock_error() -> HttpResponse {
    HttpResponse::InternalServerError().body("lock error")
}

fn no_session() -> HttpResponse {
    HttpResponse::NotFound().json(error_body("No session"))
}

fn no_wizard() -> HttpResponse {
    HttpResponse::NotFound().json(error_body("No draw in progress"))
}

/// Look up a session and refresh its activity time.
fn touch(
    sessions: &mut HashMap<SessionId, SessionEntry>,
    id: SessionId,
) -> Option<&mut SessionEntry> {
    let entry = sessions.get_mut(&id)?;
    entry.last_activity = Instant::now();
    Some(entry)
}

/// Run `f` against the session's wizard under the write lock.
fn with_wizard<F>(state: &AppState, id: SessionId, f: F) -> HttpResponse
where
    F: FnOnce(&mut DrawWizard) -> Result<(), WizardError>,
{
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match touch(&mut g, id) {
        Some(e) => e,
        None => return no_session(),
    };
    if let Err(e) = require_ready(entry.gate.state()) {
        return HttpResponse::Forbidden().json(error_body(e));
    }
    let wizard = match entry.wizard.as_mut() {
        Some(w) => w,
        None => return no_wizard(),
    };
    match f(&mut *wizard) {
        Ok(()) => HttpResponse::Ok().json(WizardView::new(wizard)),
        Err(e) => wizard_error_response(e),
    }
}

/// Bearer token of a ready session, for calls made outside the lock.
fn session_token(state: &AppState, id: SessionId) -> Result<String, HttpResponse> {
    let mut g = state.write().map_err(|_| lock_error())?;
    let entry = touch(&mut g, id).ok_or_else(no_session)?;
    require_ready(entry.gate.state())
        .map(str::to_string)
        .map_err(|e| HttpResponse::Forbidden().json(error_body(e)))
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "padel-draw-web",
    })
}

/// Open a session: exchange the host credential with the backend once.
#[post("/api/sessions")]
async fn api_create_session(
    state: AppState,
    backend: Backend,
    body: Option<Json<CreateSessionBody>>,
) -> HttpResponse {
    let credential = body.and_then(|b| b.into_inner().credential);
    let mut gate = SessionGate::new();
    gate.authenticate(backend.get_ref(), credential.as_deref()).await;

    let id = Uuid::new_v4();
    let view = SessionView::new(id, gate.state());
    let ready = matches!(gate.state(), SessionState::Ready(_));
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    g.insert(
        id,
        SessionEntry {
            gate,
            wizard: None,
            last_activity: Instant::now(),
        },
    );
    if ready {
        HttpResponse::Ok().json(view)
    } else {
        HttpResponse::Forbidden().json(view)
    }
}

#[get("/api/sessions/{id}")]
async fn api_get_session(state: AppState, path: Path<SessionPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match touch(&mut g, path.id) {
        Some(entry) => HttpResponse::Ok().json(SessionView::new(path.id, entry.gate.state())),
        None => no_session(),
    }
}

/// Start a new draw, discarding any unfinished one.
#[post("/api/sessions/{id}/wizard")]
async fn api_start_wizard(state: AppState, path: Path<SessionPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match touch(&mut g, path.id) {
        Some(e) => e,
        None => return no_session(),
    };
    if entry.wizard.as_ref().is_some_and(DrawWizard::is_submitting) {
        return wizard_error_response(WizardError::SubmissionInFlight);
    }
    match DrawWizard::start(entry.gate.state()) {
        Ok(wizard) => {
            let view = WizardView::new(&wizard);
            entry.wizard = Some(wizard);
            HttpResponse::Ok().json(view)
        }
        Err(e) => wizard_error_response(e),
    }
}

#[get("/api/sessions/{id}/wizard")]
async fn api_get_wizard(state: AppState, path: Path<SessionPath>) -> HttpResponse {
    with_wizard(&state, path.id, |_| Ok(()))
}

/// Abandon the draw in progress.
#[delete("/api/sessions/{id}/wizard")]
async fn api_abandon_wizard(state: AppState, path: Path<SessionPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match touch(&mut g, path.id) {
        Some(e) => e,
        None => return no_session(),
    };
    if entry.wizard.as_ref().is_some_and(DrawWizard::is_submitting) {
        return wizard_error_response(WizardError::SubmissionInFlight);
    }
    entry.wizard = None;
    HttpResponse::NoContent().finish()
}

/// Add a team to the roster.
#[post("/api/sessions/{id}/wizard/teams")]
async fn api_add_team(
    state: AppState,
    path: Path<SessionPath>,
    body: Json<AddTeamBody>,
) -> HttpResponse {
    let category = match Category::try_from(body.gender) {
        Ok(c) => c,
        Err(e) => return HttpResponse::BadRequest().json(error_body(e)),
    };
    let team = Team::new(
        Person::new(body.teammate1.trim()),
        Person::new(body.teammate2.trim()),
        category,
    );
    with_wizard(&state, path.id, move |w| w.add_team(team))
}

/// Remove the team at a roster position.
#[delete("/api/sessions/{id}/wizard/teams/{index}")]
async fn api_remove_team(state: AppState, path: Path<SessionTeamPath>) -> HttpResponse {
    let index = path.index;
    with_wizard(&state, path.id, move |w| w.remove_team(index).map(|_| ()))
}

/// Update rounds and courts; the response carries the recomputed feasibility.
#[put("/api/sessions/{id}/wizard/parameters")]
async fn api_set_parameters(
    state: AppState,
    path: Path<SessionPath>,
    body: Json<ParametersBody>,
) -> HttpResponse {
    let ParametersBody {
        total_rounds,
        available_courts,
    } = body.into_inner();
    with_wizard(&state, path.id, move |w| {
        w.set_parameters(total_rounds, available_courts).map(|_| ())
    })
}

/// Set the tournament date (midnight UTC).
#[put("/api/sessions/{id}/wizard/date")]
async fn api_set_date(
    state: AppState,
    path: Path<SessionPath>,
    body: Json<DateBody>,
) -> HttpResponse {
    let date_start = body.date.and_time(NaiveTime::MIN).and_utc();
    with_wizard(&state, path.id, move |w| w.set_date_start(date_start))
}

#[put("/api/sessions/{id}/wizard/draw-type")]
async fn api_set_draw_type(
    state: AppState,
    path: Path<SessionPath>,
    body: Json<DrawTypeBody>,
) -> HttpResponse {
    let draw_type = body.draw_type;
    with_wizard(&state, path.id, move |w| w.set_draw_type(draw_type))
}

/// Send the draw to the backend. The request runs on its own task without the lock held,
/// so the wizard is released even if the client disconnects. A second submit is refused
/// until this one resolves.
#[post("/api/sessions/{id}/wizard/submit")]
async fn api_submit(state: AppState, backend: Backend, path: Path<SessionPath>) -> HttpResponse {
    let pending = {
        let mut g = match state.write() {
            Ok(guard) => guard,
            Err(_) => return lock_error(),
        };
        let entry = match touch(&mut g, path.id) {
            Some(e) => e,
            None => return no_session(),
        };
        let session = entry.gate.state().clone();
        let wizard = match entry.wizard.as_mut() {
            Some(w) => w,
            None => return no_wizard(),
        };
        match wizard.begin_submission(&session) {
            Ok(p) => p,
            Err(e) => return wizard_error_response(e),
        }
    };

    log::info!(
        "Session {}: submitting {} teams, {} rounds, {} courts",
        path.id,
        pending.request.teams.len(),
        pending.request.total_rounds,
        pending.request.available_courts
    );
    let id = path.id;
    let task_state = state.clone();
    let submission = spawn_submission(backend.into_inner(), pending, move |result| {
        let mut g = match task_state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        touch(&mut g, id)
            .and_then(|e| e.wizard.as_mut())
            .map(|w| w.finish_submission(result))
    });

    let outcome = match submission.await {
        Ok(Some(outcome)) => outcome,
        Ok(None) => return no_wizard(),
        Err(e) => {
            log::warn!("Session {}: submission task failed: {}", id, e);
            return HttpResponse::InternalServerError().json(error_body("Submission failed"));
        }
    };
    match outcome {
        SubmissionOutcome::Created(notice) => HttpResponse::Ok().json(serde_json::json!({
            "created": true,
            "notice": notice,
        })),
        SubmissionOutcome::Failed { notice, error } => {
            HttpResponse::BadGateway().json(serde_json::json!({
                "created": false,
                "notice": notice,
                "error": error.to_string(),
            }))
        }
    }
}

/// Tournaments created on a date, straight from the backend.
#[get("/api/sessions/{id}/tournaments")]
async fn api_list_tournaments(
    state: AppState,
    backend: Backend,
    path: Path<SessionPath>,
    query: Query<DateQuery>,
) -> HttpResponse {
    let token = match session_token(&state, path.id) {
        Ok(t) => t,
        Err(response) => return response,
    };
    match backend.tournaments_by_date(&token, query.date).await {
        Ok(listing) => HttpResponse::Ok().json(listing),
        Err(e) => {
            log::warn!("Tournament listing for {} failed: {}", query.date, e);
            HttpResponse::BadGateway().json(error_body("Server not reachable"))
        }
    }
}

/// Get a download link for a tournament's printable draw.
#[post("/api/sessions/{id}/tournaments/download")]
async fn api_download_link(
    state: AppState,
    backend: Backend,
    path: Path<SessionPath>,
    body: Json<TournamentRecord>,
) -> HttpResponse {
    let token = match session_token(&state, path.id) {
        Ok(t) => t,
        Err(response) => return response,
    };
    let record = body.into_inner();
    match backend.download_token(&token, &record).await {
        Ok(download_token) => HttpResponse::Ok().json(serde_json::json!({
            "url": backend.download_url(&download_token),
            "file_name": record.artifact_name(),
        })),
        Err(e) => {
            log::warn!("Download link for {} failed: {}", record.name, e);
            HttpResponse::BadGateway().json(error_body(e))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = WebConfig::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    log::info!(
        "Starting server at http://{}:{} (backend {})",
        config.host,
        config.port,
        config.backend_url
    );

    let state = Data::new(RwLock::new(HashMap::<SessionId, SessionEntry>::new()));
    let backend = Data::new(HttpBackend::new(config.backend_url.clone()));

    // Background task: every 30 minutes, remove sessions inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive session(s) (no activity for 12h)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(backend.clone())
            .service(api_health)
            .service(api_create_session)
            .service(api_get_session)
            .service(api_start_wizard)
            .service(api_get_wizard)
            .service(api_abandon_wizard)
            .service(api_add_team)
            .service(api_remove_team)
            .service(api_set_parameters)
            .service(api_set_date)
            .service(api_set_draw_type)
            .service(api_submit)
            .service(api_list_tournaments)
            .service(api_download_link)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
