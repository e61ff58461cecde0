//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for users, assessments
//!   and tasks.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Read paths reject invalid persisted state (`InvalidData`) instead of
//!   masking it.
//! - Assignee writes on tasks are conditional (compare-and-set); callers see
//!   `CasOutcome::Conflict` instead of a silent overwrite.

use crate::db::DbError;
use crate::model::task::TaskValidationError;
use crate::model::{ProjectId, TaskId, UserId};
use rusqlite::{Connection, ErrorCode};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod assessment_repo;
pub mod task_repo;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(TaskValidationError),
    Db(DbError),
    UserNotFound(UserId),
    TaskNotFound(TaskId),
    AssessmentNotFound {
        user_id: UserId,
        project_id: ProjectId,
    },
    DuplicateAssessment {
        user_id: UserId,
        project_id: ProjectId,
    },
    InvalidData(String),
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::AssessmentNotFound {
                user_id,
                project_id,
            } => write!(
                f,
                "assessment not found for user {user_id} in project {project_id}"
            ),
            Self::DuplicateAssessment {
                user_id,
                project_id,
            } => write!(
                f,
                "user {user_id} already completed an assessment for project {project_id}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Query(value))
    }
}

/// Result of a conditional (compare-and-set) write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasOutcome {
    /// The row matched the expected state and was updated.
    Applied,
    /// The row changed since it was read; nothing was written.
    Conflict,
}

impl CasOutcome {
    fn from_changed(changed: usize) -> Self {
        if changed == 0 {
            Self::Conflict
        } else {
            Self::Applied
        }
    }
}

fn ensure_tables(conn: &Connection, tables: &[&'static str]) -> RepoResult<()> {
    for table in tables {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}

/// Classifies SQLite constraint failures by extended result code.
fn constraint_kind(err: &rusqlite::Error) -> Option<ConstraintKind> {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) if failure.code == ErrorCode::ConstraintViolation => {
            match failure.extended_code {
                rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE => Some(ConstraintKind::Unique),
                rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Some(ConstraintKind::ForeignKey),
                _ => Some(ConstraintKind::Other),
            }
        }
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConstraintKind {
    Unique,
    ForeignKey,
    Other,
}
