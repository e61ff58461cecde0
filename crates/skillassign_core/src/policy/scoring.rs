//! Assessment scoring: answers to score, score to skill level.
//!
//! The question bank is owned elsewhere; callers pass the answer key for the
//! project's questions.

use crate::model::skill::SkillLevel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Minimum scores (inclusive) for the upper skill levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringPolicy {
    pub advanced_min_score: u8,
    pub intermediate_min_score: u8,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            advanced_min_score: 80,
            intermediate_min_score: 60,
        }
    }
}

impl ScoringPolicy {
    pub fn level_for_score(&self, score: u8) -> SkillLevel {
        if score >= self.advanced_min_score {
            SkillLevel::Advanced
        } else if score >= self.intermediate_min_score {
            SkillLevel::Intermediate
        } else {
            SkillLevel::Beginner
        }
    }

    pub fn validate(&self) -> Result<(), ScoringPolicyError> {
        if self.advanced_min_score > 100 {
            return Err(ScoringPolicyError::ThresholdAboveMax(self.advanced_min_score));
        }
        if self.intermediate_min_score > self.advanced_min_score {
            return Err(ScoringPolicyError::ThresholdsOutOfOrder {
                intermediate: self.intermediate_min_score,
                advanced: self.advanced_min_score,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoringPolicyError {
    ThresholdAboveMax(u8),
    ThresholdsOutOfOrder { intermediate: u8, advanced: u8 },
}

impl Display for ScoringPolicyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ThresholdAboveMax(value) => {
                write!(f, "scoring.advanced_min_score must be <= 100, got {value}")
            }
            Self::ThresholdsOutOfOrder {
                intermediate,
                advanced,
            } => write!(
                f,
                "scoring.intermediate_min_score ({intermediate}) exceeds advanced_min_score ({advanced})"
            ),
        }
    }
}

impl Error for ScoringPolicyError {}

/// Result of grading a set of answers against a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreCard {
    pub correct_answers: u32,
    pub total_questions: u32,
    /// `round(correct / total * 100)`.
    pub score: u8,
}

/// Grades `answers` (question id -> chosen option) against `answer_key`.
///
/// Unanswered questions count as wrong; answers to unknown questions are
/// ignored. Returns `None` for an empty key.
pub fn score_answers(
    answer_key: &BTreeMap<i64, u32>,
    answers: &BTreeMap<i64, u32>,
) -> Option<ScoreCard> {
    if answer_key.is_empty() {
        return None;
    }

    let total = answer_key.len() as u32;
    let correct = answer_key
        .iter()
        .filter(|(question_id, expected)| answers.get(question_id) == Some(expected))
        .count() as u32;
    let score = (f64::from(correct) / f64::from(total) * 100.0).round() as u8;

    Some(ScoreCard {
        correct_answers: correct,
        total_questions: total,
        score,
    })
}

/// Fixed study advice for a freshly assessed user.
pub fn recommendations(level: SkillLevel, score: u8) -> Vec<&'static str> {
    let mut lines = match level {
        SkillLevel::Beginner => vec![
            "Focus on core programming fundamentals",
            "Practice basic algorithm exercises",
            "Study the basics of the project's main language",
        ],
        SkillLevel::Intermediate => vec![
            "Go deeper into design patterns and best practices",
            "Join code reviews to learn from other developers",
            "Experiment with different tools and frameworks",
        ],
        SkillLevel::Advanced => vec![
            "Consider mentoring other team members",
            "Lead the implementation of complex features",
            "Share your knowledge through technical documentation",
        ],
    };
    if level == SkillLevel::Beginner && score < 40 {
        lines.push("Consider an introductory course before contributing actively");
    }
    lines
}
