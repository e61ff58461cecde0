//! Daily task quota per skill level.
//!
//! Advanced users receive fewer, larger tasks per day and beginners more,
//! smaller ones, so total effort per user stays comparable.

use crate::model::skill::SkillLevel;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum tasks a user may receive on a single day, by skill level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuotaPolicy {
    pub beginner: u32,
    pub intermediate: u32,
    pub advanced: u32,
    /// Applied to labels that do not parse as a known skill level.
    pub fallback: u32,
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self {
            beginner: 3,
            intermediate: 2,
            advanced: 1,
            fallback: 2,
        }
    }
}

impl QuotaPolicy {
    pub fn daily_limit(&self, level: SkillLevel) -> u32 {
        match level {
            SkillLevel::Beginner => self.beginner,
            SkillLevel::Intermediate => self.intermediate,
            SkillLevel::Advanced => self.advanced,
        }
    }

    /// Resolves a raw level label; unknown or empty labels get `fallback`.
    pub fn daily_limit_for_label(&self, label: &str) -> u32 {
        SkillLevel::parse(label).map_or(self.fallback, |level| self.daily_limit(level))
    }

    /// Rejects zero quotas, which would silently starve a whole level.
    pub fn validate(&self) -> Result<(), QuotaPolicyError> {
        let fields = [
            ("beginner", self.beginner),
            ("intermediate", self.intermediate),
            ("advanced", self.advanced),
            ("fallback", self.fallback),
        ];
        match fields.iter().find(|(_, value)| *value == 0) {
            Some((name, _)) => Err(QuotaPolicyError::ZeroLimit(name)),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuotaPolicyError {
    ZeroLimit(&'static str),
}

impl Display for QuotaPolicyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroLimit(field) => write!(f, "quota.{field} must be at least 1"),
        }
    }
}

impl Error for QuotaPolicyError {}
