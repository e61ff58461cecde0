//! Domain model for assessments, tasks and assignable users.
//!
//! # Responsibility
//! - Define canonical data structures used by the assigner and services.
//! - Own label conversions shared by storage and transport layers.
//!
//! # Invariants
//! - Users, projects and tasks are identified by stable integer row ids.
//! - Skill levels and task statuses are closed enums; unknown labels are
//!   rejected at parse time.

pub mod assessment;
pub mod skill;
pub mod task;

/// Row id of a user.
pub type UserId = i64;
/// Row id of a project. Projects live outside this crate.
pub type ProjectId = i64;
/// Row id of a task.
pub type TaskId = i64;
