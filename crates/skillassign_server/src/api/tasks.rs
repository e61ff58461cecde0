use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use skillassign_core::{ProjectId, SqliteTaskRepository, Task, TaskId, TaskService, UserId};

use crate::error::ApiError;
use crate::state::{with_connection, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskActionRequest {
    pub user_id: UserId,
}

pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<ProjectId>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = with_connection(&state, move |conn, _| {
        let service = TaskService::new(SqliteTaskRepository::try_new(conn)?);
        Ok(service.list_tasks(project_id)?)
    })
    .await?;
    Ok(Json(tasks))
}

/// Starts a pending task; an unassigned one is claimed by the caller.
pub async fn start_task(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<TaskId>,
    Json(request): Json<TaskActionRequest>,
) -> Result<Json<Task>, ApiError> {
    let task = with_connection(&state, move |conn, _| {
        let service = TaskService::new(SqliteTaskRepository::try_new(conn)?);
        Ok(service.start_task(task_id, request.user_id)?)
    })
    .await?;
    Ok(Json(task))
}

pub async fn complete_task(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<TaskId>,
    Json(request): Json<TaskActionRequest>,
) -> Result<Json<Task>, ApiError> {
    let task = with_connection(&state, move |conn, _| {
        let service = TaskService::new(SqliteTaskRepository::try_new(conn)?);
        Ok(service.complete_task(task_id, request.user_id)?)
    })
    .await?;
    Ok(Json(task))
}
