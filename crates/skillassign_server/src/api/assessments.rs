//! Assessment endpoints and the reassignment trigger.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use log::info;
use serde::Deserialize;
use serde_json::{json, Value};
use skillassign_core::{
    Assessment, AssessmentOutcome, AssessmentService, AssignmentService, ProjectId,
    ReassignSummary, SqliteAssessmentRepository, SqliteTaskRepository, UserId,
};

use crate::error::ApiError;
use crate::state::{with_connection, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordAssessmentRequest {
    pub user_id: UserId,
    pub score: u32,
}

/// Answers keyed by question id; the key comes from the project's question bank.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAssessmentRequest {
    pub user_id: UserId,
    pub answer_key: BTreeMap<i64, u32>,
    pub answers: BTreeMap<i64, u32>,
}

/// Clears and re-plans the pending tasks of a project.
pub async fn reassign(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<ProjectId>,
) -> Result<Json<ReassignSummary>, ApiError> {
    let summary = with_connection(&state, move |conn, state| {
        let service = AssignmentService::new(
            SqliteAssessmentRepository::try_new(conn)?,
            SqliteTaskRepository::try_new(conn)?,
            state.config.quota,
        );
        Ok(service.reassign_exclusive(&state.locks, project_id)?)
    })
    .await?;
    info!(
        "event=http_reassign module=server status=ok project_id={project_id} run_id={} assigned={}",
        summary.run_id, summary.assigned_tasks
    );
    Ok(Json(summary))
}

pub async fn record_assessment(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<ProjectId>,
    Json(request): Json<RecordAssessmentRequest>,
) -> Result<(StatusCode, Json<Assessment>), ApiError> {
    let assessment = with_connection(&state, move |conn, state| {
        let service =
            AssessmentService::new(SqliteAssessmentRepository::try_new(conn)?, state.config.scoring);
        Ok(service.record_assessment(request.user_id, project_id, request.score)?)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(assessment)))
}

/// Grades submitted answers and stores the derived level.
pub async fn submit_assessment(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<ProjectId>,
    Json(request): Json<SubmitAssessmentRequest>,
) -> Result<(StatusCode, Json<AssessmentOutcome>), ApiError> {
    let outcome = with_connection(&state, move |conn, state| {
        let service =
            AssessmentService::new(SqliteAssessmentRepository::try_new(conn)?, state.config.scoring);
        Ok(service.submit_assessment(
            request.user_id,
            project_id,
            &request.answer_key,
            request.answers,
        )?)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

pub async fn list_assessments(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<ProjectId>,
) -> Result<Json<Vec<Assessment>>, ApiError> {
    let items = with_connection(&state, move |conn, state| {
        let service =
            AssessmentService::new(SqliteAssessmentRepository::try_new(conn)?, state.config.scoring);
        Ok(service.list_assessments(project_id)?)
    })
    .await?;
    Ok(Json(items))
}

pub async fn get_assessment(
    State(state): State<Arc<AppState>>,
    Path((project_id, user_id)): Path<(ProjectId, UserId)>,
) -> Result<Json<Assessment>, ApiError> {
    let assessment = with_connection(&state, move |conn, state| {
        let service =
            AssessmentService::new(SqliteAssessmentRepository::try_new(conn)?, state.config.scoring);
        Ok(service.get_assessment(user_id, project_id)?)
    })
    .await?;
    Ok(Json(assessment))
}

/// Deletes a user's assessment so they can take it again.
pub async fn reset_assessment(
    State(state): State<Arc<AppState>>,
    Path((project_id, user_id)): Path<(ProjectId, UserId)>,
) -> Result<Json<Value>, ApiError> {
    with_connection(&state, move |conn, state| {
        let service =
            AssessmentService::new(SqliteAssessmentRepository::try_new(conn)?, state.config.scoring);
        Ok(service.reset_assessment(user_id, project_id)?)
    })
    .await?;
    Ok(Json(json!({ "message": "Assessment reset successfully" })))
}
