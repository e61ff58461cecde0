//! Skill assessment records.
//!
//! # Invariants
//! - At most one assessment exists per `(user_id, project_id)`.
//! - `score` is within `0..=100`.
//! - Records are never mutated; reset deletes them.

use super::skill::SkillLevel;
use super::{ProjectId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Persisted assessment result joined with the user display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub user_id: UserId,
    pub user_name: String,
    pub project_id: ProjectId,
    pub skill_level: SkillLevel,
    pub score: u8,
    /// Submitted answers keyed by question id, when scored from answers.
    pub answers: Option<BTreeMap<i64, u32>>,
    /// Unix epoch milliseconds.
    pub completed_at: i64,
}

/// Insert payload for a new assessment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAssessment {
    pub user_id: UserId,
    pub project_id: ProjectId,
    pub skill_level: SkillLevel,
    pub score: u8,
    pub answers: Option<BTreeMap<i64, u32>>,
}

/// Minimal projection consumed by the assigner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessedUser {
    pub user_id: UserId,
    pub user_name: String,
    pub skill_level: SkillLevel,
}
