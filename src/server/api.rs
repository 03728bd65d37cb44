//! JSON API handlers.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::{Value, json};
use tracing::error;

use super::TaskServer;
use crate::error::{ErrorBody, TaskError};
use crate::format::task_json;
use crate::service::{Fields, ListParams};

/// Health check response.
#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

impl IntoResponse for TaskError {
    fn into_response(self) -> Response {
        if let TaskError::Storage(ref e) = self {
            error!("Storage failure: {:#}", e);
        }
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorBody::from(&self))).into_response()
    }
}

/// Parse a request body into a field map. Anything that is not a JSON object
/// counts as no body at all.
pub(crate) fn parse_fields(body: &[u8]) -> Option<Fields> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Health check endpoint.
pub(super) async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub(super) async fn create_task(
    State(state): State<TaskServer>,
    body: Bytes,
) -> Result<Response, TaskError> {
    let fields = parse_fields(&body);
    let task = state.service().create(fields.as_ref())?;
    Ok((StatusCode::CREATED, Json(task_json(&task))).into_response())
}

pub(super) async fn list_tasks(
    State(state): State<TaskServer>,
    Query(params): Query<ListParams>,
) -> Result<Response, TaskError> {
    let tasks = state.service().list(&params)?;
    let body: Vec<_> = tasks.iter().map(task_json).collect();
    Ok(Json(body).into_response())
}

pub(super) async fn get_task(
    State(state): State<TaskServer>,
    Path(task_id): Path<i64>,
) -> Result<Response, TaskError> {
    let task = state.service().get(task_id)?;
    Ok(Json(task_json(&task)).into_response())
}

pub(super) async fn update_task(
    State(state): State<TaskServer>,
    Path(task_id): Path<i64>,
    body: Bytes,
) -> Result<Response, TaskError> {
    let fields = parse_fields(&body);
    let task = state.service().update(task_id, fields.as_ref())?;
    Ok(Json(task_json(&task)).into_response())
}

pub(super) async fn delete_task(
    State(state): State<TaskServer>,
    Path(task_id): Path<i64>,
) -> Result<Response, TaskError> {
    state.service().delete(task_id)?;
    Ok(Json(json!({ "message": "Task deleted" })).into_response())
}

pub(super) async fn mark_done(
    State(state): State<TaskServer>,
    Path(task_id): Path<i64>,
) -> Result<Response, TaskError> {
    let task = state.service().mark_done(task_id)?;
    Ok(Json(task_json(&task)).into_response())
}
