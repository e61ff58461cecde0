//! Reassignment use-case.
//!
//! # Responsibility
//! - Run one full reassignment of a project's pending tasks.
//! - Persist each assignment as soon as it is chosen.
//! - Report every task that stayed unassigned, with a reason.
//!
//! # Invariants
//! - Fails with `NoAssessments` before any write when nobody is assessed.
//! - Only `PENDING` tasks are cleared or assigned.
//! - Load is counted only for writes that were applied.

use crate::assign::{order_by_day, Planner, Selection, UnassignedReason, UnassignedTask, UserPool};
use crate::model::skill::SkillLevel;
use crate::model::task::{PendingTask, TaskStatus};
use crate::model::{ProjectId, TaskId, UserId};
use crate::policy::quota::QuotaPolicy;
use crate::repo::assessment_repo::AssessmentRepository;
use crate::repo::task_repo::TaskRepository;
use crate::repo::{CasOutcome, RepoError};
use crate::service::project_locks::ProjectLocks;
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use uuid::Uuid;

#[derive(Debug)]
pub enum AssignError {
    /// The project has no completed assessments to plan against.
    NoAssessments(ProjectId),
    /// A compare-and-set write kept losing to concurrent updates.
    AssignmentConflict(TaskId),
    Repo(RepoError),
}

impl Display for AssignError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoAssessments(project_id) => write!(
                f,
                "project {project_id} has no completed skill assessments; complete assessments first"
            ),
            Self::AssignmentConflict(task_id) => {
                write!(f, "task {task_id} changed concurrently; retry the reassignment")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AssignError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AssignError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReassignDetails {
    /// Pending tasks considered by the run.
    pub total_tasks: usize,
    /// Completed assessments of the project.
    pub assessments: usize,
    pub unassigned_tasks: usize,
    /// Assessed users per skill level.
    pub users_by_skill: BTreeMap<SkillLevel, usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReassignSummary {
    pub run_id: Uuid,
    pub assigned_tasks: usize,
    pub message: String,
    pub details: ReassignDetails,
    pub unassigned: Vec<UnassignedTask>,
}

/// Reassignment service over assessment and task repositories.
pub struct AssignmentService<A: AssessmentRepository, T: TaskRepository> {
    assessments: A,
    tasks: T,
    quota: QuotaPolicy,
}

impl<A: AssessmentRepository, T: TaskRepository> AssignmentService<A, T> {
    pub fn new(assessments: A, tasks: T, quota: QuotaPolicy) -> Self {
        Self {
            assessments,
            tasks,
            quota,
        }
    }

    /// Runs `reassign` while holding the project's lock.
    pub fn reassign_exclusive(
        &self,
        locks: &ProjectLocks,
        project_id: ProjectId,
    ) -> Result<ReassignSummary, AssignError> {
        locks.with_project(project_id, || self.reassign(project_id))
    }

    /// Discards previous pending assignments and re-plans the project.
    ///
    /// Callers must not run two reassignments of one project at the same
    /// time; use `reassign_exclusive` when calls may overlap.
    pub fn reassign(&self, project_id: ProjectId) -> Result<ReassignSummary, AssignError> {
        let run_id = Uuid::new_v4();
        let started_at = Instant::now();
        info!("event=reassign module=assign status=start project_id={project_id} run_id={run_id}");

        let assessed = self.assessments.list_completed_assessments(project_id)?;
        if assessed.is_empty() {
            warn!(
                "event=reassign module=assign status=error project_id={project_id} run_id={run_id} error_code=no_assessments"
            );
            return Err(AssignError::NoAssessments(project_id));
        }
        let pool = UserPool::from_assessments(&assessed, &self.quota);
        let pending = self.tasks.list_pending_tasks(project_id)?;

        let mut summary = ReassignSummary {
            run_id,
            assigned_tasks: 0,
            message: String::new(),
            details: ReassignDetails {
                total_tasks: pending.len(),
                assessments: assessed.len(),
                unassigned_tasks: 0,
                users_by_skill: pool.counts_by_level(),
            },
            unassigned: Vec::new(),
        };

        if pending.is_empty() {
            info!(
                "event=reassign module=assign status=skip project_id={project_id} run_id={run_id} reason=no_pending_tasks"
            );
            summary.message = "No pending tasks to reassign".to_string();
            return Ok(summary);
        }

        for task in &pending {
            self.tasks.clear_assignee(task.task_id)?;
        }
        debug!(
            "event=reassign_clear module=assign status=ok project_id={project_id} run_id={run_id} cleared={}",
            pending.len()
        );

        let mut planner = Planner::new(&pool);
        for task in order_by_day(&pending) {
            let user = match planner.select(task) {
                Selection::Assign(user) => user,
                Selection::Skip(reason) => {
                    debug!(
                        "event=task_skip module=assign project_id={project_id} run_id={run_id} task_id={} day={} skill={} reason={reason:?}",
                        task.task_id,
                        task.day_number,
                        task.skill_level.as_db_str()
                    );
                    summary.unassigned.push(UnassignedTask::new(task, reason));
                    continue;
                }
            };

            if !self.persist_assignment(task, user.user_id)? {
                debug!(
                    "event=task_skip module=assign project_id={project_id} run_id={run_id} task_id={} reason=NoLongerPending",
                    task.task_id
                );
                summary.unassigned.push(UnassignedTask::new(
                    task,
                    UnassignedReason::NoLongerPending,
                ));
                continue;
            }

            let load = planner.commit(user.user_id, task.day_number);
            summary.assigned_tasks += 1;
            debug!(
                "event=task_assign module=assign project_id={project_id} run_id={run_id} task_id={} user_id={} day={} load={}/{}",
                task.task_id, user.user_id, task.day_number, load, user.daily_limit
            );
        }

        summary.details.unassigned_tasks = summary.unassigned.len();
        summary.message = format!(
            "Reassigned {} tasks based on skill assessments and daily limits",
            summary.assigned_tasks
        );
        info!(
            "event=reassign module=assign status=ok project_id={project_id} run_id={run_id} total_tasks={} assigned={} unassigned={} duration_ms={}",
            summary.details.total_tasks,
            summary.assigned_tasks,
            summary.details.unassigned_tasks,
            started_at.elapsed().as_millis()
        );
        Ok(summary)
    }

    /// Writes one assignment with compare-and-set.
    ///
    /// Returns `Ok(false)` when the task left `PENDING` (or vanished) during
    /// the run. A second lost race is reported as `AssignmentConflict`.
    fn persist_assignment(&self, task: &PendingTask, user_id: UserId) -> Result<bool, AssignError> {
        if self.tasks.set_assignee(task.task_id, user_id, None)? == CasOutcome::Applied {
            return Ok(true);
        }

        let Some(current) = self.tasks.get_task(task.task_id)? else {
            return Ok(false);
        };
        if current.status != TaskStatus::Pending {
            return Ok(false);
        }

        match self
            .tasks
            .set_assignee(task.task_id, user_id, current.assignee_id)?
        {
            CasOutcome::Applied => Ok(true),
            CasOutcome::Conflict => {
                warn!(
                    "event=task_assign module=assign status=error task_id={} error_code=assignment_conflict",
                    task.task_id
                );
                Err(AssignError::AssignmentConflict(task.task_id))
            }
        }
    }
}
