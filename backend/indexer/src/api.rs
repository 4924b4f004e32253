//! Axum REST API over the indexed events.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::error;

use crate::db;
use crate::errors::IndexerError;
use crate::events::EventRecord;
use crate::funding::{self, FundingSummary};

#[derive(Clone)]
pub struct ApiState {
    pub pool: SqlitePool,
}

// ─────────────────────────────────────────────────────────
// Response shapes
// ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct EventsResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    /// Stored event type, e.g. `executed` or `payout_released`.
    #[serde(rename = "type")]
    pub event_type: Option<String>,
}

/// Database failures surface as `500` with a JSON body.
pub struct ApiError(IndexerError);

impl From<IndexerError> for ApiError {
    fn from(err: IndexerError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("API request failed: {}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /events[?type=<event_type>]`
pub async fn get_all_events(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<EventsResponse>, ApiError> {
    let events = db::get_all_events(&state.pool, query.event_type.as_deref()).await?;
    Ok(Json(EventsResponse {
        project_id: None,
        count: events.len(),
        events,
    }))
}

/// `GET /projects/:id/events`
pub async fn get_project_events(
    State(state): State<Arc<ApiState>>,
    Path(project_id): Path<String>,
) -> Result<Json<EventsResponse>, ApiError> {
    let events = db::get_events_for_project(&state.pool, &project_id).await?;
    Ok(Json(EventsResponse {
        project_id: Some(project_id),
        count: events.len(),
        events,
    }))
}

/// `GET /projects/:id/funding`
///
/// `404` when nothing has been indexed for the project.
pub async fn get_project_funding(
    State(state): State<Arc<ApiState>>,
    Path(project_id): Path<String>,
) -> Result<Response, ApiError> {
    let events = db::get_events_for_project(&state.pool, &project_id).await?;
    if events.is_empty() {
        let body = ErrorResponse {
            error: format!("no events indexed for project {project_id}"),
        };
        return Ok((StatusCode::NOT_FOUND, Json(body)).into_response());
    }
    let summary: FundingSummary = funding::summarize(&project_id, &events);
    Ok(Json(summary).into_response())
}
