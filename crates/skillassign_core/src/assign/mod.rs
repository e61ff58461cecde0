//! Skill-based task assignment.
//!
//! # Responsibility
//! - Group assessed users into per-level candidate pools with daily limits.
//! - Choose, day by day, the least-loaded qualified user for each task.
//!
//! # Invariants
//! - A task is only ever given to a user of exactly the task's skill level.
//! - A user is only chosen while `load(user, day) < daily_limit`.
//! - Ties go to the earliest user in assessment insertion order.
//! - Day load counters are independent; nothing carries across days.
//! - No randomness: equal inputs produce equal plans.

mod planner;
mod pool;

pub use planner::{
    order_by_day, plan_assignments, AssignmentPlan, PlannedAssignment, Planner, Selection,
    UnassignedReason, UnassignedTask,
};
pub use pool::{AssignableUser, UserPool};
