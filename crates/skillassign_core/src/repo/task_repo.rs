//! Task pool repository.
//!
//! # Responsibility
//! - Bulk-insert generated tasks and read them back.
//! - Provide the pending-task feed and conditional assignee writes used by
//!   the assigner and by task start/complete.
//!
//! # Invariants
//! - `list_pending_tasks` order is `day_number ASC, id ASC` (generation order
//!   within a day).
//! - Every assignee/status write is guarded by the expected prior state;
//!   non-pending rows are never touched by assigner writes.

use super::{ensure_tables, CasOutcome, RepoError, RepoResult};
use crate::model::skill::SkillLevel;
use crate::model::task::{NewTask, PendingTask, Task, TaskStatus};
use crate::model::{ProjectId, TaskId, UserId};
use rusqlite::{params, Connection, Row};

const TASK_SELECT_SQL: &str = "SELECT
    id,
    project_id,
    day_number,
    skill_level,
    status,
    assignee_id,
    title,
    estimated_hours
FROM tasks";

pub trait TaskRepository {
    /// Inserts all tasks in one transaction; returns ids in input order.
    fn create_tasks(&self, project_id: ProjectId, tasks: &[NewTask]) -> RepoResult<Vec<TaskId>>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    /// Lists every task of a project ordered by day then id.
    fn list_tasks(&self, project_id: ProjectId) -> RepoResult<Vec<Task>>;
    fn list_pending_tasks(&self, project_id: ProjectId) -> RepoResult<Vec<PendingTask>>;
    /// Clears the assignee of a pending task. Non-pending tasks are left as is.
    fn clear_assignee(&self, id: TaskId) -> RepoResult<()>;
    /// Sets the assignee of a pending task if it still has `expected_prior`.
    fn set_assignee(
        &self,
        id: TaskId,
        user_id: UserId,
        expected_prior: Option<UserId>,
    ) -> RepoResult<CasOutcome>;
    /// Moves a pending task with `expected_prior` assignee to in-progress,
    /// owned by `user_id`.
    fn start_task(
        &self,
        id: TaskId,
        user_id: UserId,
        expected_prior: Option<UserId>,
    ) -> RepoResult<CasOutcome>;
    /// Moves an in-progress task owned by `user_id` to completed.
    fn complete_task(&self, id: TaskId, user_id: UserId) -> RepoResult<CasOutcome>;
}

pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["users", "tasks"])?;
        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_tasks(&self, project_id: ProjectId, tasks: &[NewTask]) -> RepoResult<Vec<TaskId>> {
        for task in tasks {
            task.validate()?;
        }

        let tx = self.conn.unchecked_transaction()?;
        let mut ids = Vec::with_capacity(tasks.len());
        {
            let mut stmt = tx.prepare(
                "INSERT INTO tasks (
                    project_id,
                    day_number,
                    skill_level,
                    status,
                    title,
                    estimated_hours
                ) VALUES (?1, ?2, ?3, 'pending', ?4, ?5);",
            )?;
            for task in tasks {
                stmt.execute(params![
                    project_id,
                    task.day_number,
                    task.skill_level.as_db_str(),
                    task.title.trim(),
                    task.estimated_hours,
                ])?;
                ids.push(tx.last_insert_rowid());
            }
        }
        tx.commit()?;
        Ok(ids)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn list_tasks(&self, project_id: ProjectId) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE project_id = ?1
             ORDER BY day_number ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([project_id])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn list_pending_tasks(&self, project_id: ProjectId) -> RepoResult<Vec<PendingTask>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, day_number, skill_level, title, assignee_id
             FROM tasks
             WHERE project_id = ?1
               AND status = 'pending'
             ORDER BY day_number ASC, id ASC;",
        )?;
        let mut rows = stmt.query([project_id])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(PendingTask {
                task_id: row.get("id")?,
                day_number: parse_day_number(row)?,
                skill_level: parse_skill_level(row)?,
                title: row.get("title")?,
                assignee_id: row.get("assignee_id")?,
            });
        }
        Ok(tasks)
    }

    fn clear_assignee(&self, id: TaskId) -> RepoResult<()> {
        self.conn.execute(
            "UPDATE tasks
             SET
                assignee_id = NULL,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1
               AND status = 'pending'
               AND assignee_id IS NOT NULL;",
            [id],
        )?;
        Ok(())
    }

    fn set_assignee(
        &self,
        id: TaskId,
        user_id: UserId,
        expected_prior: Option<UserId>,
    ) -> RepoResult<CasOutcome> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                assignee_id = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1
               AND status = 'pending'
               AND assignee_id IS ?3;",
            params![id, user_id, expected_prior],
        )?;
        Ok(CasOutcome::from_changed(changed))
    }

    fn start_task(
        &self,
        id: TaskId,
        user_id: UserId,
        expected_prior: Option<UserId>,
    ) -> RepoResult<CasOutcome> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                status = 'in_progress',
                assignee_id = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1
               AND status = 'pending'
               AND assignee_id IS ?3;",
            params![id, user_id, expected_prior],
        )?;
        Ok(CasOutcome::from_changed(changed))
    }

    fn complete_task(&self, id: TaskId, user_id: UserId) -> RepoResult<CasOutcome> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                status = 'completed',
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1
               AND status = 'in_progress'
               AND assignee_id = ?2;",
            params![id, user_id],
        )?;
        Ok(CasOutcome::from_changed(changed))
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let status_text: String = row.get("status")?;
    let status = TaskStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid task status `{status_text}` in tasks.status"))
    })?;

    Ok(Task {
        id: row.get("id")?,
        project_id: row.get("project_id")?,
        day_number: parse_day_number(row)?,
        skill_level: parse_skill_level(row)?,
        status,
        assignee_id: row.get("assignee_id")?,
        title: row.get("title")?,
        estimated_hours: row.get("estimated_hours")?,
    })
}

fn parse_day_number(row: &Row<'_>) -> RepoResult<u32> {
    let value: i64 = row.get("day_number")?;
    u32::try_from(value)
        .ok()
        .filter(|day| *day >= 1)
        .ok_or_else(|| {
            RepoError::InvalidData(format!("invalid day number `{value}` in tasks.day_number"))
        })
}

fn parse_skill_level(row: &Row<'_>) -> RepoResult<SkillLevel> {
    let label: String = row.get("skill_level")?;
    SkillLevel::parse(&label).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid skill level `{label}` in tasks.skill_level"))
    })
}
