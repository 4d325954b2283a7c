//! HTTP route handlers for the UI API.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::warn;

use mom_agent::core::types::Reminder;
use mom_agent::reminders::local_clock;
use mom_agent::study::{EmptySourceError, StudyResult};

use crate::state::AppState;

const INDEX_HTML: &str = include_str!("../assets/index.html");
const DEFAULT_LOG_LIMIT: usize = 30;

/// Build the API router.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/study", post(study))
        .route("/reminders", get(list_reminders))
        .route("/reminders/check", post(check_reminders))
        .route("/logs", get(recent_logs))
}

/// GET / - the single-page UI.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> &'static str {
    "ok"
}

/// Error body `{"error": "..."}` with a status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(empty) = err.downcast_ref::<EmptySourceError>() {
            return Self {
                status: StatusCode::BAD_REQUEST,
                message: empty.to_string(),
            };
        }
        warn!(err = %format!("{err:#}"), "request failed");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("{err:#}"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct StudyRequest {
    #[serde(default)]
    text: String,
}

/// POST /api/study - plan and execute notes and a quiz for `text`.
async fn study(
    State(state): State<AppState>,
    Json(request): Json<StudyRequest>,
) -> Result<Json<StudyResult>, ApiError> {
    let result = state.study.run(&request.text).await?;
    Ok(Json(result))
}

/// GET /api/reminders - the reminder table.
async fn list_reminders(State(state): State<AppState>) -> Json<Vec<Reminder>> {
    Json(state.reminders.to_vec())
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckQuery {
    /// Evaluate at this `HH:MM` instead of the local clock.
    at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    now: String,
    fired: Vec<Reminder>,
}

/// POST /api/reminders/check - evaluate and deliver reminders once.
async fn check_reminders(
    State(state): State<AppState>,
    Query(query): Query<CheckQuery>,
) -> Result<Json<CheckResponse>, ApiError> {
    let now = query.at.unwrap_or_else(local_clock);
    let dispatcher = Arc::clone(&state.dispatcher);
    let reminders = Arc::clone(&state.reminders);
    let at = now.clone();
    let fired = tokio::task::spawn_blocking(move || dispatcher.check_now(&reminders, &at))
        .await
        .map_err(anyhow::Error::from)??;
    Ok(Json(CheckResponse { now, fired }))
}

#[derive(Debug, Default, Deserialize)]
pub struct LogsQuery {
    limit: Option<usize>,
}

/// GET /api/logs - most recent interaction log entries, oldest first.
async fn recent_logs(
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LOG_LIMIT);
    let log = state.log();
    let entries = tokio::task::spawn_blocking(move || log.read_recent(limit))
        .await
        .map_err(anyhow::Error::from)??;
    Ok(Json(entries))
}
