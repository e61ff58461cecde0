//! Assessment store: one skill result per (user, project).
//!
//! # Responsibility
//! - Persist, read and delete assessment results.
//! - Provide the insertion-ordered user list the assigner plans against.
//!
//! # Invariants
//! - Uniqueness of `(user_id, project_id)` is enforced by the schema and
//!   surfaced as `RepoError::DuplicateAssessment`.
//! - `list_completed_assessments` returns rows in insertion order; assigner
//!   tie-breaks depend on it.

use super::{constraint_kind, ensure_tables, ConstraintKind, RepoError, RepoResult};
use crate::model::assessment::{AssessedUser, Assessment, NewAssessment};
use crate::model::skill::SkillLevel;
use crate::model::{ProjectId, UserId};
use rusqlite::{params, Connection, Row};
use std::collections::BTreeMap;

const ASSESSMENT_SELECT_SQL: &str = "SELECT
    a.user_id,
    u.name AS user_name,
    a.project_id,
    a.skill_level,
    a.score,
    a.answers,
    a.completed_at
FROM skill_assessments a
INNER JOIN users u ON u.id = a.user_id";

pub trait AssessmentRepository {
    fn insert_assessment(&self, assessment: &NewAssessment) -> RepoResult<()>;
    fn get_assessment(
        &self,
        user_id: UserId,
        project_id: ProjectId,
    ) -> RepoResult<Option<Assessment>>;
    /// Lists full records for a project, newest first.
    fn list_assessments(&self, project_id: ProjectId) -> RepoResult<Vec<Assessment>>;
    /// Lists assessed users for a project in insertion order.
    fn list_completed_assessments(&self, project_id: ProjectId) -> RepoResult<Vec<AssessedUser>>;
    fn delete_assessment(&self, user_id: UserId, project_id: ProjectId) -> RepoResult<()>;
}

pub struct SqliteAssessmentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAssessmentRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["users", "skill_assessments"])?;
        Ok(Self { conn })
    }
}

impl AssessmentRepository for SqliteAssessmentRepository<'_> {
    fn insert_assessment(&self, assessment: &NewAssessment) -> RepoResult<()> {
        if assessment.score > 100 {
            return Err(RepoError::InvalidData(format!(
                "score {} is outside 0..=100",
                assessment.score
            )));
        }
        let answers_json = match assessment.answers.as_ref() {
            Some(answers) => Some(serde_json::to_string(answers).map_err(|err| {
                RepoError::InvalidData(format!("answers are not serializable: {err}"))
            })?),
            None => None,
        };

        let result = self.conn.execute(
            "INSERT INTO skill_assessments (
                user_id,
                project_id,
                skill_level,
                score,
                answers
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                assessment.user_id,
                assessment.project_id,
                assessment.skill_level.as_db_str(),
                i64::from(assessment.score),
                answers_json,
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(err) => Err(match constraint_kind(&err) {
                Some(ConstraintKind::Unique) => RepoError::DuplicateAssessment {
                    user_id: assessment.user_id,
                    project_id: assessment.project_id,
                },
                Some(ConstraintKind::ForeignKey) => RepoError::UserNotFound(assessment.user_id),
                _ => err.into(),
            }),
        }
    }

    fn get_assessment(
        &self,
        user_id: UserId,
        project_id: ProjectId,
    ) -> RepoResult<Option<Assessment>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ASSESSMENT_SELECT_SQL}
             WHERE a.user_id = ?1
               AND a.project_id = ?2;"
        ))?;
        let mut rows = stmt.query(params![user_id, project_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_assessment_row(row)?));
        }
        Ok(None)
    }

    fn list_assessments(&self, project_id: ProjectId) -> RepoResult<Vec<Assessment>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ASSESSMENT_SELECT_SQL}
             WHERE a.project_id = ?1
             ORDER BY a.completed_at DESC, a.id DESC;"
        ))?;
        let mut rows = stmt.query([project_id])?;
        let mut assessments = Vec::new();
        while let Some(row) = rows.next()? {
            assessments.push(parse_assessment_row(row)?);
        }
        Ok(assessments)
    }

    fn list_completed_assessments(&self, project_id: ProjectId) -> RepoResult<Vec<AssessedUser>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                a.user_id,
                u.name AS user_name,
                a.skill_level
             FROM skill_assessments a
             INNER JOIN users u ON u.id = a.user_id
             WHERE a.project_id = ?1
             ORDER BY a.id ASC;",
        )?;
        let mut rows = stmt.query([project_id])?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(AssessedUser {
                user_id: row.get("user_id")?,
                user_name: row.get("user_name")?,
                skill_level: parse_skill_level(row)?,
            });
        }
        Ok(users)
    }

    fn delete_assessment(&self, user_id: UserId, project_id: ProjectId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM skill_assessments WHERE user_id = ?1 AND project_id = ?2;",
            params![user_id, project_id],
        )?;
        if changed == 0 {
            return Err(RepoError::AssessmentNotFound {
                user_id,
                project_id,
            });
        }
        Ok(())
    }
}

fn parse_assessment_row(row: &Row<'_>) -> RepoResult<Assessment> {
    let score_value: i64 = row.get("score")?;
    let score = u8::try_from(score_value)
        .ok()
        .filter(|score| *score <= 100)
        .ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid score `{score_value}` in skill_assessments.score"
            ))
        })?;

    let answers = match row.get::<_, Option<String>>("answers")? {
        Some(text) => Some(serde_json::from_str::<BTreeMap<i64, u32>>(&text).map_err(|err| {
            RepoError::InvalidData(format!("invalid json in skill_assessments.answers: {err}"))
        })?),
        None => None,
    };

    Ok(Assessment {
        user_id: row.get("user_id")?,
        user_name: row.get("user_name")?,
        project_id: row.get("project_id")?,
        skill_level: parse_skill_level(row)?,
        score,
        answers,
        completed_at: row.get("completed_at")?,
    })
}

fn parse_skill_level(row: &Row<'_>) -> RepoResult<SkillLevel> {
    let label: String = row.get("skill_level")?;
    SkillLevel::parse(&label).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid skill level `{label}` in skill_assessments.skill_level"
        ))
    })
}
