//! Skill level taxonomy.
//!
//! # Invariants
//! - Ordering is `Beginner < Intermediate < Advanced`.
//! - Storage labels are lowercase english; legacy spanish labels parse too.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Assessed skill level of a user, or required level of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl SkillLevel {
    /// All levels in ascending order.
    pub const ALL: [SkillLevel; 3] = [Self::Beginner, Self::Intermediate, Self::Advanced];

    /// Label persisted in `skill_level` columns.
    pub fn as_db_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }

    /// Parses a level label, case-insensitive.
    ///
    /// Accepts the storage labels and the `Principiante|Intermedio|Avanzado`
    /// labels found in imported data. Returns `None` for anything else.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "beginner" | "principiante" => Some(Self::Beginner),
            "intermediate" | "intermedio" => Some(Self::Intermediate),
            "advanced" | "avanzado" => Some(Self::Advanced),
            _ => None,
        }
    }
}

impl Display for SkillLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        };
        f.write_str(label)
    }
}
