//! Assessment submission, lookup and reset.
//!
//! # Responsibility
//! - Turn answers or a precomputed score into a stored skill level.
//! - Guard the one-assessment-per-(user, project) rule.
//!
//! # Invariants
//! - Resubmission requires an explicit reset.
//! - Reset never touches tasks; existing assignments stay until the next
//!   reassignment run.

use crate::model::assessment::{Assessment, NewAssessment};
use crate::model::skill::SkillLevel;
use crate::model::{ProjectId, UserId};
use crate::policy::scoring::{recommendations, score_answers, ScoringPolicy};
use crate::repo::assessment_repo::AssessmentRepository;
use crate::repo::{RepoError, RepoResult};
use log::info;
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum AssessmentError {
    DuplicateAssessment {
        user_id: UserId,
        project_id: ProjectId,
    },
    AssessmentNotFound {
        user_id: UserId,
        project_id: ProjectId,
    },
    UserNotFound(UserId),
    EmptyAnswerKey,
    InvalidScore(u32),
    Repo(RepoError),
    InconsistentState(&'static str),
}

impl Display for AssessmentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateAssessment {
                user_id,
                project_id,
            } => write!(
                f,
                "user {user_id} already completed an assessment for project {project_id}"
            ),
            Self::AssessmentNotFound {
                user_id,
                project_id,
            } => write!(
                f,
                "assessment not found for user {user_id} in project {project_id}"
            ),
            Self::UserNotFound(user_id) => write!(f, "user not found: {user_id}"),
            Self::EmptyAnswerKey => write!(f, "answer key has no questions"),
            Self::InvalidScore(score) => write!(f, "score must be within 0..=100, got {score}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent assessment state: {details}")
            }
        }
    }
}

impl Error for AssessmentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AssessmentError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::DuplicateAssessment {
                user_id,
                project_id,
            } => Self::DuplicateAssessment {
                user_id,
                project_id,
            },
            RepoError::AssessmentNotFound {
                user_id,
                project_id,
            } => Self::AssessmentNotFound {
                user_id,
                project_id,
            },
            RepoError::UserNotFound(user_id) => Self::UserNotFound(user_id),
            other => Self::Repo(other),
        }
    }
}

/// Result returned to a user right after grading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentOutcome {
    pub skill_level: SkillLevel,
    pub score: u8,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub recommendations: Vec<String>,
}

pub struct AssessmentService<A: AssessmentRepository> {
    repo: A,
    scoring: ScoringPolicy,
}

impl<A: AssessmentRepository> AssessmentService<A> {
    pub fn new(repo: A, scoring: ScoringPolicy) -> Self {
        Self { repo, scoring }
    }

    /// Grades `answers` against `answer_key` and stores the result.
    ///
    /// The answer key comes from the project's question bank, which lives
    /// outside this crate.
    pub fn submit_assessment(
        &self,
        user_id: UserId,
        project_id: ProjectId,
        answer_key: &BTreeMap<i64, u32>,
        answers: BTreeMap<i64, u32>,
    ) -> Result<AssessmentOutcome, AssessmentError> {
        self.ensure_not_assessed(user_id, project_id)?;
        let card = score_answers(answer_key, &answers).ok_or(AssessmentError::EmptyAnswerKey)?;
        let skill_level = self.scoring.level_for_score(card.score);

        self.repo.insert_assessment(&NewAssessment {
            user_id,
            project_id,
            skill_level,
            score: card.score,
            answers: Some(answers),
        })?;
        info!(
            "event=assessment_submit module=assessment status=ok user_id={user_id} project_id={project_id} skill={} score={}",
            skill_level.as_db_str(),
            card.score
        );

        Ok(AssessmentOutcome {
            skill_level,
            score: card.score,
            total_questions: card.total_questions,
            correct_answers: card.correct_answers,
            recommendations: recommendations(skill_level, card.score)
                .into_iter()
                .map(str::to_string)
                .collect(),
        })
    }

    /// Stores an already computed score; the level follows the thresholds.
    pub fn record_assessment(
        &self,
        user_id: UserId,
        project_id: ProjectId,
        score: u32,
    ) -> Result<Assessment, AssessmentError> {
        let score = u8::try_from(score)
            .ok()
            .filter(|value| *value <= 100)
            .ok_or(AssessmentError::InvalidScore(score))?;
        self.ensure_not_assessed(user_id, project_id)?;

        let skill_level = self.scoring.level_for_score(score);
        self.repo.insert_assessment(&NewAssessment {
            user_id,
            project_id,
            skill_level,
            score,
            answers: None,
        })?;
        info!(
            "event=assessment_record module=assessment status=ok user_id={user_id} project_id={project_id} skill={} score={score}",
            skill_level.as_db_str()
        );

        self.repo
            .get_assessment(user_id, project_id)?
            .ok_or(AssessmentError::InconsistentState(
                "recorded assessment not found in read-back",
            ))
    }

    pub fn get_assessment(
        &self,
        user_id: UserId,
        project_id: ProjectId,
    ) -> Result<Assessment, AssessmentError> {
        self.repo
            .get_assessment(user_id, project_id)?
            .ok_or(AssessmentError::AssessmentNotFound {
                user_id,
                project_id,
            })
    }

    /// Lists a project's assessments, newest first.
    pub fn list_assessments(&self, project_id: ProjectId) -> RepoResult<Vec<Assessment>> {
        self.repo.list_assessments(project_id)
    }

    /// Deletes the assessment so the user may submit again.
    pub fn reset_assessment(
        &self,
        user_id: UserId,
        project_id: ProjectId,
    ) -> Result<(), AssessmentError> {
        self.repo.delete_assessment(user_id, project_id)?;
        info!(
            "event=assessment_reset module=assessment status=ok user_id={user_id} project_id={project_id}"
        );
        Ok(())
    }

    fn ensure_not_assessed(
        &self,
        user_id: UserId,
        project_id: ProjectId,
    ) -> Result<(), AssessmentError> {
        if self.repo.get_assessment(user_id, project_id)?.is_some() {
            return Err(AssessmentError::DuplicateAssessment {
                user_id,
                project_id,
            });
        }
        Ok(())
    }
}
