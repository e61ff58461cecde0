//! Maps service errors onto HTTP status codes and a JSON error body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{error, warn};
use serde::Serialize;
use skillassign_core::db::DbError;
use skillassign_core::{AssessmentError, AssignError, RepoError, TaskError};

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: &'a str,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(
                "event=http_request module=server status=error code={} http_status={}",
                self.code,
                self.status.as_u16()
            );
        } else {
            warn!(
                "event=http_request module=server status=error code={} http_status={}",
                self.code,
                self.status.as_u16()
            );
        }
        let body = ErrorBody {
            error: self.code,
            message: &self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(value: DbError) -> Self {
        Self::internal(value.to_string())
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        let message = value.to_string();
        match value {
            RepoError::Validation(_) => Self::new(StatusCode::BAD_REQUEST, "validation", message),
            RepoError::UserNotFound(_) => Self::new(StatusCode::NOT_FOUND, "user_not_found", message),
            RepoError::TaskNotFound(_) => Self::new(StatusCode::NOT_FOUND, "task_not_found", message),
            RepoError::AssessmentNotFound { .. } => {
                Self::new(StatusCode::NOT_FOUND, "assessment_not_found", message)
            }
            RepoError::DuplicateAssessment { .. } => {
                Self::new(StatusCode::BAD_REQUEST, "duplicate_assessment", message)
            }
            _ => Self::internal(message),
        }
    }
}

impl From<AssignError> for ApiError {
    fn from(value: AssignError) -> Self {
        let message = value.to_string();
        match value {
            AssignError::NoAssessments(_) => {
                Self::new(StatusCode::BAD_REQUEST, "no_assessments", message)
            }
            AssignError::AssignmentConflict(_) => {
                Self::new(StatusCode::CONFLICT, "assignment_conflict", message)
            }
            AssignError::Repo(err) => err.into(),
        }
    }
}

impl From<AssessmentError> for ApiError {
    fn from(value: AssessmentError) -> Self {
        let message = value.to_string();
        match value {
            AssessmentError::DuplicateAssessment { .. } => {
                Self::new(StatusCode::BAD_REQUEST, "duplicate_assessment", message)
            }
            AssessmentError::AssessmentNotFound { .. } => {
                Self::new(StatusCode::NOT_FOUND, "assessment_not_found", message)
            }
            AssessmentError::UserNotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, "user_not_found", message)
            }
            AssessmentError::EmptyAnswerKey => {
                Self::new(StatusCode::BAD_REQUEST, "empty_answer_key", message)
            }
            AssessmentError::InvalidScore(_) => {
                Self::new(StatusCode::BAD_REQUEST, "invalid_score", message)
            }
            AssessmentError::Repo(err) => err.into(),
            AssessmentError::InconsistentState(_) => Self::internal(message),
        }
    }
}

impl From<TaskError> for ApiError {
    fn from(value: TaskError) -> Self {
        let message = value.to_string();
        match value {
            TaskError::TaskNotFound(_) => Self::new(StatusCode::NOT_FOUND, "task_not_found", message),
            TaskError::TaskNotPending { .. } => {
                Self::new(StatusCode::CONFLICT, "task_not_pending", message)
            }
            TaskError::TaskNotInProgress { .. } => {
                Self::new(StatusCode::CONFLICT, "task_not_in_progress", message)
            }
            TaskError::NotAssignedToUser { .. } => {
                Self::new(StatusCode::FORBIDDEN, "not_assigned_to_user", message)
            }
            TaskError::AssignmentConflict(_) => {
                Self::new(StatusCode::CONFLICT, "assignment_conflict", message)
            }
            TaskError::Repo(err) => err.into(),
            TaskError::InconsistentState(_) => Self::internal(message),
        }
    }
}
