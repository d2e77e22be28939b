use crate::api_state::AppState;
use crate::models::api::*;
use crate::models::error::LogError;
use crate::models::log_entry::{LogEntry, NewLogEntry};
use crate::service::query::{run_query, LogQuery};
use crate::service::retention::{purge, RetentionPolicy};
use crate::service::pin::set_lock;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::tokio::select;
use rocket::tokio::sync::broadcast::error::RecvError;
use rocket::tokio::time::{interval, Duration};
use rocket::{
    response::stream::{Event, EventStream},
    Request, Shutdown, State,
};

/// Parse an optional integer query parameter, rejecting garbage instead of ignoring it
fn int_param(name: &str, raw: Option<&str>) -> Result<Option<i64>, LogError> {
    raw.filter(|v| !v.trim().is_empty())
        .map(|v| {
            v.trim().parse::<i64>().map_err(|_| {
                LogError::InvalidRequest(format!("{} must be an integer, got '{}'", name, v))
            })
        })
        .transpose()
}

/// GET /api/logs - Page through log entries, newest first
#[get("/logs?<page>&<limit>&<tag>&<start_date>&<end_date>")]
pub fn get_logs(
    page: Option<&str>,
    limit: Option<&str>,
    tag: Option<String>,
    start_date: Option<&str>,
    end_date: Option<&str>,
    state: &State<AppState>,
) -> Result<Json<LogPage>, LogError> {
    let query = LogQuery::from_params(
        int_param("page", page)?,
        int_param("limit", limit)?,
        tag,
        start_date,
        end_date,
        state.config().default_page_limit,
    )?;

    run_query(state.store(), &query).map(Json)
}

/// GET /api/logs/tags - Distinct tags for the filter control
#[get("/logs/tags")]
pub fn get_log_tags(state: &State<AppState>) -> Result<Json<Vec<String>>, LogError> {
    state.store().list_tags().map(Json)
}

/// GET /api/logs/<id> - Single log entry
#[get("/logs/<id>")]
pub fn get_log(id: i64, state: &State<AppState>) -> Result<Json<LogEntry>, LogError> {
    state.store().get(id).map(Json)
}

/// POST /api/logs - Record a finished invocation
#[post("/logs", format = "json", data = "<entry>")]
pub fn append_log(
    entry: Json<NewLogEntry>,
    state: &State<AppState>,
) -> Result<(Status, Json<AppendResponse>), LogError> {
    let entry = entry.into_inner().validate()?;
    let id = state.store().append(&entry)?;

    log::info!(
        "Recorded log entry {} (model {}, {})",
        id,
        entry.model,
        if entry.error.is_some() { "failed" } else { "ok" }
    );
    state.notify(LogEvent::Appended {
        id,
        tag: entry.tag.clone(),
    });

    Ok((
        Status::Created,
        Json(AppendResponse {
            status: "success".to_string(),
            id,
        }),
    ))
}

/// PATCH /api/logs/<id> - Pin or unpin an entry
#[patch("/logs/<id>", format = "json", data = "<request>")]
pub fn set_log_lock(
    id: i64,
    request: Json<LockRequest>,
    state: &State<AppState>,
) -> Result<Json<LogEntry>, LogError> {
    let entry = set_lock(state.store(), id, request.locked)?;
    state.notify(LogEvent::LockChanged {
        id,
        locked: entry.locked,
    });
    Ok(Json(entry))
}

/// DELETE /api/logs - Purge unlocked entries by age or by count
#[delete("/logs?<days_to_keep>&<count_to_keep>")]
pub fn purge_logs(
    days_to_keep: Option<&str>,
    count_to_keep: Option<&str>,
    state: &State<AppState>,
) -> Result<Json<PurgeResponse>, LogError> {
    let policy = RetentionPolicy::from_params(
        int_param("days_to_keep", days_to_keep)?,
        int_param("count_to_keep", count_to_keep)?,
    )?;

    let deleted = purge(state.store(), policy)?;
    state.notify(LogEvent::Purged { deleted });

    Ok(Json(PurgeResponse {
        status: "success".to_string(),
        deleted,
    }))
}

/// GET /api/events - Server-Sent Events whenever the log table changes
#[get("/events")]
pub fn log_events(state: &State<AppState>, mut shutdown: Shutdown) -> EventStream![] {
    let mut receiver = state.subscribe_events();

    EventStream! {
        let mut interval = interval(Duration::from_secs(15));

        loop {
            select! {
                event = receiver.recv() => {
                    match event {
                        Ok(log_event) => {
                            yield Event::json(&log_event);
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            log::warn!("Event subscriber lagged, {} events dropped", skipped);
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
                _ = interval.tick() => {
                    // Keep idle connections open through proxies
                    yield Event::data("heartbeat");
                }
                _ = &mut shutdown => break,
            }
        }
    }
}

/// GET /api/health - Health check endpoint
#[get("/health")]
pub fn health_check() -> &'static str {
    "OK"
}

/// OPTIONS /api/<path..> - CORS preflight
#[options("/<_..>")]
pub fn cors_preflight() -> Status {
    Status::NoContent
}

/// JSON body for every error Rocket raises before a handler runs
#[catch(default)]
pub fn default_catcher(status: Status, req: &Request) -> (Status, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: status.reason().unwrap_or("error").to_lowercase().replace(' ', "_"),
            details: Some(format!("{} {}", req.method(), req.uri())),
        }),
    )
}
