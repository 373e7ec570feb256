//! REST API: thin actix-web handlers over [`BracketStore`].
//!
//! Every response uses the envelope `{success, message?, data?}`.

use crate::auth::{authorize_bracket_admin, ApiTokens};
use crate::logic::{standings, ScoreUpdate};
use crate::models::{
    BracketError, BracketFormat, BracketSettings, EventId, MatchFormat, MatchId, SeedingType,
    Team,
};
use crate::store::BracketStore;
use crate::view::{rounds_view, BracketView};
use actix_web::{
    delete, error, get, http::header, http::StatusCode, post, put,
    web::{self, Data, Json, Path},
    HttpRequest, HttpResponse, Responder,
};
use serde::{Deserialize, Serialize};

/// Shared store (many events by ID).
pub type AppState = Data<BracketStore>;
/// Tokens accepted on admin routes.
pub type AppTokens = Data<ApiTokens>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
pub struct TeamBody {
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub rating: Option<i32>,
    #[serde(default)]
    pub seed: Option<u32>,
}

impl From<TeamBody> for Team {
    fn from(body: TeamBody) -> Self {
        Team {
            short_name: body.short_name,
            rating: body.rating,
            seed: body.seed,
            ..Team::new(body.name)
        }
    }
}

#[derive(Deserialize)]
pub struct CreateEventBody {
    pub name: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub teams: Vec<TeamBody>,
}

/// Options of a generate request; unknown values are rejected as validation errors.
#[derive(Default, Deserialize)]
pub struct GenerateBracketBody {
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub seeding_type: Option<String>,
    #[serde(default)]
    pub match_format: Option<String>,
    #[serde(default)]
    pub finals_format: Option<String>,
}

impl GenerateBracketBody {
    /// A missing or blank body means defaults; anything else must be a valid options object.
    pub fn from_bytes(raw: &[u8]) -> Result<Self, BracketError> {
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(raw)
            .map_err(|e| BracketError::Validation(format!("invalid generate options: {e}")))
    }

    /// Resolve to settings; the format falls back to the event's, then single elimination.
    pub fn settings(&self, event_format: Option<BracketFormat>) -> Result<BracketSettings, BracketError> {
        let defaults = BracketSettings::default();
        Ok(BracketSettings {
            format: match &self.format {
                Some(f) => f.parse()?,
                None => event_format.unwrap_or(defaults.format),
            },
            seeding_type: parse_opt::<SeedingType>(&self.seeding_type)?.unwrap_or(defaults.seeding_type),
            match_format: parse_opt::<MatchFormat>(&self.match_format)?.unwrap_or(defaults.match_format),
            finals_format: parse_opt::<MatchFormat>(&self.finals_format)?.unwrap_or(defaults.finals_format),
            grand_final_reset: defaults.grand_final_reset,
        })
    }
}

fn parse_opt<T>(raw: &Option<String>) -> Result<Option<T>, BracketError>
where
    T: std::str::FromStr<Err = BracketError>,
{
    raw.as_deref().map(str::parse).transpose()
}

/// Path segment: event id (e.g. /api/events/{id}/bracket)
#[derive(Deserialize)]
struct EventPath {
    id: EventId,
}

/// Path segment: match id (e.g. /api/admin/matches/{id})
#[derive(Deserialize)]
struct MatchPath {
    id: MatchId,
}

fn status_for(e: &BracketError) -> StatusCode {
    match e {
        BracketError::Validation(_) => StatusCode::BAD_REQUEST,
        BracketError::NotFound(_) => StatusCode::NOT_FOUND,
        BracketError::Unauthorized => StatusCode::UNAUTHORIZED,
        BracketError::Forbidden => StatusCode::FORBIDDEN,
        BracketError::Integrity(_) => StatusCode::CONFLICT,
        BracketError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(e: &BracketError) -> HttpResponse {
    let status = status_for(e);
    if status.is_server_error() {
        log::error!("Request failed: {e}");
    } else {
        log::warn!("Request rejected ({status}): {e}");
    }
    HttpResponse::build(status).json(serde_json::json!({ "success": false, "message": e.to_string() }))
}

fn ok_response(message: &str, data: serde_json::Value) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "success": true, "message": message, "data": data }))
}

fn authorize(req: &HttpRequest, tokens: &ApiTokens) -> Result<(), BracketError> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    authorize_bracket_admin(tokens, header_value).map(|_| ())
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "rivals-bracket",
    })
}

/// Register an event with its teams.
#[post("/api/admin/events")]
async fn api_create_event(
    req: HttpRequest,
    state: AppState,
    tokens: AppTokens,
    body: Json<CreateEventBody>,
) -> HttpResponse {
    if let Err(e) = authorize(&req, &tokens) {
        return error_response(&e);
    }
    let body = body.into_inner();
    let format = match parse_opt::<BracketFormat>(&body.format) {
        Ok(f) => f,
        Err(e) => return error_response(&e),
    };
    let teams = body.teams.into_iter().map(Team::from).collect();
    match state.create_event(&body.name, format, teams) {
        Ok(event) => ok_response("Event created successfully", serde_json::json!(event)),
        Err(e) => error_response(&e),
    }
}

/// Generate the bracket of an event (replaces an unplayed one).
#[post("/api/admin/events/{id}/bracket/generate")]
async fn api_generate_bracket(
    req: HttpRequest,
    state: AppState,
    tokens: AppTokens,
    path: Path<EventPath>,
    body: web::Bytes,
) -> HttpResponse {
    if let Err(e) = authorize(&req, &tokens) {
        return error_response(&e);
    }
    let result = state
        .event(path.id)
        .and_then(|event| GenerateBracketBody::from_bytes(&body)?.settings(event.format))
        .and_then(|settings| state.generate_bracket(path.id, settings));
    match result {
        Ok((created, event)) => {
            let Some(bracket) = &event.bracket else {
                return error_response(&BracketError::Internal("bracket missing after generation".to_string()));
            };
            ok_response(
                "Bracket generated successfully",
                serde_json::json!({
                    "matches_created": created,
                    "format": bracket.format(),
                    "bracket": rounds_view(&event, bracket),
                }),
            )
        }
        Err(e) => error_response(&e),
    }
}

fn bracket_response(state: &BracketStore, id: EventId) -> HttpResponse {
    let result = state.event(id).and_then(|event| {
        let bracket = event.bracket()?;
        Ok(BracketView::new(&event, bracket))
    });
    match result {
        Ok(view) => ok_response("Bracket retrieved", serde_json::json!(view)),
        Err(e) => error_response(&e),
    }
}

/// Bracket of an event (admin view).
#[get("/api/admin/events/{id}/bracket")]
async fn api_admin_get_bracket(
    req: HttpRequest,
    state: AppState,
    tokens: AppTokens,
    path: Path<EventPath>,
) -> HttpResponse {
    if let Err(e) = authorize(&req, &tokens) {
        return error_response(&e);
    }
    bracket_response(&state, path.id)
}

/// Bracket of an event (public).
#[get("/api/events/{id}/bracket")]
async fn api_get_bracket(state: AppState, path: Path<EventPath>) -> HttpResponse {
    bracket_response(&state, path.id)
}

/// Standings of a round robin or Swiss bracket.
#[get("/api/events/{id}/standings")]
async fn api_get_standings(state: AppState, path: Path<EventPath>) -> HttpResponse {
    let result = state.event(path.id).and_then(|event| {
        let bracket = event.bracket()?;
        standings(bracket).ok_or_else(|| {
            BracketError::Validation(format!("{} brackets have no standings", bracket.format()))
        })
    });
    match result {
        Ok(table) => ok_response("Standings retrieved", serde_json::json!(table)),
        Err(e) => error_response(&e),
    }
}

/// Update scores/status of a match; completing it advances the winner.
#[put("/api/admin/matches/{id}")]
async fn api_update_match(
    req: HttpRequest,
    state: AppState,
    tokens: AppTokens,
    path: Path<MatchPath>,
    body: Json<ScoreUpdate>,
) -> HttpResponse {
    if let Err(e) = authorize(&req, &tokens) {
        return error_response(&e);
    }
    match state.update_match(path.id, &body) {
        Ok((outcome, event)) => ok_response(
            "Match updated successfully",
            serde_json::json!({
                "match": outcome,
                "event_status": event.status,
                "current_round": event.current_round,
            }),
        ),
        Err(e) => error_response(&e),
    }
}

/// Delete every match of an event's bracket.
#[delete("/api/admin/events/{id}/bracket")]
async fn api_delete_bracket(
    req: HttpRequest,
    state: AppState,
    tokens: AppTokens,
    path: Path<EventPath>,
) -> HttpResponse {
    if let Err(e) = authorize(&req, &tokens) {
        return error_response(&e);
    }
    match state.delete_bracket(path.id) {
        Ok(removed) => ok_response(
            "Bracket deleted successfully",
            serde_json::json!({ "matches_deleted": removed }),
        ),
        Err(e) => error_response(&e),
    }
}

/// Register routes plus JSON/path error handlers that keep the response envelope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        let body = serde_json::json!({ "success": false, "message": err.to_string() });
        error::InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        let body = serde_json::json!({ "success": false, "message": "Not found" });
        error::InternalError::from_response(err, HttpResponse::NotFound().json(body)).into()
    }))
    .service(api_health)
    .service(api_create_event)
    .service(api_generate_bracket)
    .service(api_admin_get_bracket)
    .service(api_get_bracket)
    .service(api_get_standings)
    .service(api_update_match)
    .service(api_delete_bracket);
}
