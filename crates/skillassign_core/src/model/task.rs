//! Task pool model.
//!
//! # Responsibility
//! - Define task rows and their lifecycle states.
//! - Validate bulk-generated tasks before they reach storage.
//!
//! # Invariants
//! - `day_number >= 1`.
//! - `estimated_hours` is finite and non-negative.
//! - Lifecycle only moves `Pending -> InProgress -> Completed`.
//! - `assignee_id` of a non-pending task is frozen for the assigner.

use super::skill::SkillLevel;
use super::{ProjectId, TaskId, UserId};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Generated, unstarted, eligible for (re)assignment.
    Pending,
    /// Started by its assignee.
    InProgress,
    /// Finished.
    Completed,
}

impl TaskStatus {
    pub fn as_db_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Persisted task row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub project_id: ProjectId,
    pub day_number: u32,
    pub skill_level: SkillLevel,
    pub status: TaskStatus,
    pub assignee_id: Option<UserId>,
    pub title: String,
    pub estimated_hours: f64,
}

/// Insert payload produced by the task generation step.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub day_number: u32,
    pub skill_level: SkillLevel,
    pub title: String,
    pub estimated_hours: f64,
}

impl NewTask {
    pub fn new(day_number: u32, skill_level: SkillLevel, title: impl Into<String>) -> Self {
        Self {
            day_number,
            skill_level,
            title: title.into(),
            estimated_hours: 0.0,
        }
    }

    /// Checks the row-level invariants enforced before insert.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.day_number == 0 {
            return Err(TaskValidationError::DayNumberOutOfRange);
        }
        if !self.estimated_hours.is_finite() || self.estimated_hours < 0.0 {
            return Err(TaskValidationError::InvalidEstimate(self.estimated_hours));
        }
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        Ok(())
    }
}

/// Pending task projection consumed by the assigner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTask {
    pub task_id: TaskId,
    pub day_number: u32,
    pub skill_level: SkillLevel,
    pub title: String,
    pub assignee_id: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TaskValidationError {
    DayNumberOutOfRange,
    InvalidEstimate(f64),
    EmptyTitle,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DayNumberOutOfRange => write!(f, "day_number must be >= 1"),
            Self::InvalidEstimate(value) => {
                write!(f, "estimated_hours must be finite and >= 0, got {value}")
            }
            Self::EmptyTitle => write!(f, "task title cannot be empty"),
        }
    }
}

impl Error for TaskValidationError {}
