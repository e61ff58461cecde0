//! Skill-based task assignment engine.
//!
//! Plans a deterministic, day-by-day, least-loaded assignment of generated
//! project tasks to users whose assessed skill level matches, under per-level
//! daily quotas.

pub mod assign;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod policy;
pub mod repo;
pub mod service;

pub use assign::{plan_assignments, AssignableUser, AssignmentPlan, UnassignedReason, UserPool};
pub use config::{load_config, AppConfig, ConfigError};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::assessment::{AssessedUser, Assessment, NewAssessment};
pub use model::skill::SkillLevel;
pub use model::task::{NewTask, PendingTask, Task, TaskStatus};
pub use model::{ProjectId, TaskId, UserId};
pub use policy::quota::QuotaPolicy;
pub use policy::scoring::ScoringPolicy;
pub use repo::assessment_repo::{AssessmentRepository, SqliteAssessmentRepository};
pub use repo::task_repo::{SqliteTaskRepository, TaskRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{CasOutcome, RepoError, RepoResult};
pub use service::assessment_service::{AssessmentError, AssessmentOutcome, AssessmentService};
pub use service::assignment_service::{
    AssignError, AssignmentService, ReassignDetails, ReassignSummary,
};
pub use service::project_locks::ProjectLocks;
pub use service::task_service::{TaskError, TaskService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
