//! Task lifecycle use-cases: start (with self-assignment) and complete.
//!
//! # Invariants
//! - Starting an unassigned pending task assigns it to the starter, without
//!   a quota check.
//! - Only the assignee may start an assigned task or complete a task; a
//!   task held by someone else reports `NotAssignedToUser` whatever its status.
//! - Writes are compare-and-set; one lost race is retried from a fresh
//!   read, a second one is reported as `AssignmentConflict`.

use crate::model::task::{NewTask, Task, TaskStatus};
use crate::model::{ProjectId, TaskId, UserId};
use crate::repo::task_repo::TaskRepository;
use crate::repo::{CasOutcome, RepoError, RepoResult};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

const CAS_ATTEMPTS: usize = 2;

#[derive(Debug)]
pub enum TaskError {
    TaskNotFound(TaskId),
    TaskNotPending { task_id: TaskId, status: TaskStatus },
    TaskNotInProgress { task_id: TaskId, status: TaskStatus },
    NotAssignedToUser { task_id: TaskId, user_id: UserId },
    AssignmentConflict(TaskId),
    Repo(RepoError),
    InconsistentState(&'static str),
}

impl Display for TaskError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TaskNotFound(task_id) => write!(f, "task not found: {task_id}"),
            Self::TaskNotPending { task_id, status } => {
                write!(f, "task {task_id} cannot be started from status {status:?}")
            }
            Self::TaskNotInProgress { task_id, status } => {
                write!(f, "task {task_id} cannot be completed from status {status:?}")
            }
            Self::NotAssignedToUser { task_id, user_id } => {
                write!(f, "task {task_id} is not assigned to user {user_id}")
            }
            Self::AssignmentConflict(task_id) => {
                write!(f, "task {task_id} changed concurrently; try again")
            }
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent task state: {details}"),
        }
    }
}

impl Error for TaskError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TaskError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::TaskNotFound(task_id) => Self::TaskNotFound(task_id),
            other => Self::Repo(other),
        }
    }
}

pub struct TaskService<T: TaskRepository> {
    repo: T,
}

impl<T: TaskRepository> TaskService<T> {
    pub fn new(repo: T) -> Self {
        Self { repo }
    }

    /// Stores a generated batch of pending, unassigned tasks.
    pub fn create_tasks(&self, project_id: ProjectId, tasks: &[NewTask]) -> RepoResult<Vec<TaskId>> {
        let ids = self.repo.create_tasks(project_id, tasks)?;
        info!(
            "event=tasks_create module=task status=ok project_id={project_id} count={}",
            ids.len()
        );
        Ok(ids)
    }

    pub fn get_task(&self, task_id: TaskId) -> Result<Task, TaskError> {
        self.repo
            .get_task(task_id)?
            .ok_or(TaskError::TaskNotFound(task_id))
    }

    pub fn list_tasks(&self, project_id: ProjectId) -> RepoResult<Vec<Task>> {
        self.repo.list_tasks(project_id)
    }

    /// Starts a pending task, claiming it when it has no assignee yet.
    pub fn start_task(&self, task_id: TaskId, user_id: UserId) -> Result<Task, TaskError> {
        for _ in 0..CAS_ATTEMPTS {
            let task = self.get_task(task_id)?;
            if task.assignee_id.is_some_and(|assignee| assignee != user_id) {
                return Err(TaskError::NotAssignedToUser { task_id, user_id });
            }
            if task.status != TaskStatus::Pending {
                return Err(TaskError::TaskNotPending {
                    task_id,
                    status: task.status,
                });
            }

            if self.repo.start_task(task_id, user_id, task.assignee_id)? == CasOutcome::Applied {
                info!(
                    "event=task_start module=task status=ok task_id={task_id} user_id={user_id} self_assigned={}",
                    task.assignee_id.is_none()
                );
                return self.read_back(task_id);
            }
        }

        warn!("event=task_start module=task status=error task_id={task_id} error_code=assignment_conflict");
        Err(TaskError::AssignmentConflict(task_id))
    }

    /// Completes an in-progress task owned by `user_id`.
    pub fn complete_task(&self, task_id: TaskId, user_id: UserId) -> Result<Task, TaskError> {
        for _ in 0..CAS_ATTEMPTS {
            let task = self.get_task(task_id)?;
            if task.status != TaskStatus::InProgress {
                return Err(TaskError::TaskNotInProgress {
                    task_id,
                    status: task.status,
                });
            }
            if task.assignee_id != Some(user_id) {
                return Err(TaskError::NotAssignedToUser { task_id, user_id });
            }

            if self.repo.complete_task(task_id, user_id)? == CasOutcome::Applied {
                info!("event=task_complete module=task status=ok task_id={task_id} user_id={user_id}");
                return self.read_back(task_id);
            }
        }

        warn!("event=task_complete module=task status=error task_id={task_id} error_code=assignment_conflict");
        Err(TaskError::AssignmentConflict(task_id))
    }

    fn read_back(&self, task_id: TaskId) -> Result<Task, TaskError> {
        self.repo
            .get_task(task_id)?
            .ok_or(TaskError::InconsistentState("updated task not found in read-back"))
    }
}
