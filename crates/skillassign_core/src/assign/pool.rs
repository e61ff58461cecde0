use crate::model::assessment::AssessedUser;
use crate::model::skill::SkillLevel;
use crate::model::UserId;
use crate::policy::quota::QuotaPolicy;
use serde::Serialize;
use std::collections::BTreeMap;

/// User view computed at run time from an assessment and the quota policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignableUser {
    pub user_id: UserId,
    pub user_name: String,
    pub skill_level: SkillLevel,
    pub daily_limit: u32,
}

/// Candidate lists per skill level.
///
/// Each list keeps assessment insertion order, which is the tie-break order
/// of the planner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPool {
    by_level: BTreeMap<SkillLevel, Vec<AssignableUser>>,
}

impl UserPool {
    pub fn from_assessments(assessed: &[AssessedUser], quota: &QuotaPolicy) -> Self {
        let mut by_level: BTreeMap<SkillLevel, Vec<AssignableUser>> = BTreeMap::new();
        for user in assessed {
            by_level
                .entry(user.skill_level)
                .or_default()
                .push(AssignableUser {
                    user_id: user.user_id,
                    user_name: user.user_name.clone(),
                    skill_level: user.skill_level,
                    daily_limit: quota.daily_limit(user.skill_level),
                });
        }
        Self { by_level }
    }

    /// Users qualified for `level`, in tie-break order.
    pub fn candidates(&self, level: SkillLevel) -> &[AssignableUser] {
        self.by_level.get(&level).map_or(&[], Vec::as_slice)
    }

    /// Number of users per level; levels without users are omitted.
    pub fn counts_by_level(&self) -> BTreeMap<SkillLevel, usize> {
        self.by_level
            .iter()
            .map(|(level, users)| (*level, users.len()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.by_level.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
