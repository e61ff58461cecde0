use super::pool::{AssignableUser, UserPool};
use crate::model::skill::SkillLevel;
use crate::model::task::PendingTask;
use crate::model::{TaskId, UserId};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Why a pending task was left without an assignee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnassignedReason {
    /// No assessed user has the task's skill level.
    NoQualifiedUser,
    /// Every qualified user already reached the daily limit for that day.
    DailyQuotaReached,
    /// The task left `PENDING` while the run was in flight.
    NoLongerPending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnassignedTask {
    pub task_id: TaskId,
    pub day_number: u32,
    pub skill_level: SkillLevel,
    pub title: String,
    pub reason: UnassignedReason,
}

impl UnassignedTask {
    pub fn new(task: &PendingTask, reason: UnassignedReason) -> Self {
        Self {
            task_id: task.task_id,
            day_number: task.day_number,
            skill_level: task.skill_level,
            title: task.title.clone(),
            reason,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedAssignment {
    pub task_id: TaskId,
    pub user_id: UserId,
    pub day_number: u32,
    /// Tasks held by the user on that day, this one included.
    pub load_after: u32,
    pub daily_limit: u32,
}

/// Outcome of the planner for one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<'pool> {
    Assign(&'pool AssignableUser),
    Skip(UnassignedReason),
}

/// Greedy per-day least-loaded selector with a run-scoped load counter.
///
/// `select` is read-only; callers `commit` a selection once it has been
/// persisted, so a write that lost a race does not consume quota.
#[derive(Debug)]
pub struct Planner<'pool> {
    pool: &'pool UserPool,
    load: HashMap<(UserId, u32), u32>,
}

impl<'pool> Planner<'pool> {
    pub fn new(pool: &'pool UserPool) -> Self {
        Self {
            pool,
            load: HashMap::new(),
        }
    }

    pub fn load(&self, user_id: UserId, day_number: u32) -> u32 {
        self.load
            .get(&(user_id, day_number))
            .copied()
            .unwrap_or(0)
    }

    /// Picks the first candidate with the smallest load among those still
    /// under their daily limit for the task's day.
    pub fn select(&self, task: &PendingTask) -> Selection<'pool> {
        let candidates = self.pool.candidates(task.skill_level);
        if candidates.is_empty() {
            return Selection::Skip(UnassignedReason::NoQualifiedUser);
        }

        let mut best: Option<(&'pool AssignableUser, u32)> = None;
        for user in candidates {
            let current = self.load(user.user_id, task.day_number);
            if current >= user.daily_limit {
                continue;
            }
            // Strict `<`: the earliest candidate keeps a tie.
            if best.map_or(true, |(_, min)| current < min) {
                best = Some((user, current));
            }
        }

        match best {
            Some((user, _)) => Selection::Assign(user),
            None => Selection::Skip(UnassignedReason::DailyQuotaReached),
        }
    }

    /// Records one persisted assignment; returns the user's new day load.
    pub fn commit(&mut self, user_id: UserId, day_number: u32) -> u32 {
        let entry = self.load.entry((user_id, day_number)).or_insert(0);
        *entry += 1;
        *entry
    }
}

/// Full plan for a set of pending tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentPlan {
    pub assignments: Vec<PlannedAssignment>,
    pub unassigned: Vec<UnassignedTask>,
}

/// Orders tasks by ascending day, keeping input order within a day.
pub fn order_by_day(tasks: &[PendingTask]) -> Vec<&PendingTask> {
    let mut by_day: BTreeMap<u32, Vec<&PendingTask>> = BTreeMap::new();
    for task in tasks {
        by_day.entry(task.day_number).or_default().push(task);
    }
    by_day.into_values().flatten().collect()
}

/// Plans every task without touching storage.
///
/// Equivalent to a reassignment run in which every write succeeds.
pub fn plan_assignments(pool: &UserPool, tasks: &[PendingTask]) -> AssignmentPlan {
    let mut planner = Planner::new(pool);
    let mut plan = AssignmentPlan::default();

    for task in order_by_day(tasks) {
        match planner.select(task) {
            Selection::Assign(user) => {
                let load_after = planner.commit(user.user_id, task.day_number);
                plan.assignments.push(PlannedAssignment {
                    task_id: task.task_id,
                    user_id: user.user_id,
                    day_number: task.day_number,
                    load_after,
                    daily_limit: user.daily_limit,
                });
            }
            Selection::Skip(reason) => plan.unassigned.push(UnassignedTask::new(task, reason)),
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::{order_by_day, plan_assignments, Planner, Selection, UnassignedReason};
    use crate::assign::pool::UserPool;
    use crate::model::assessment::AssessedUser;
    use crate::model::skill::SkillLevel;
    use crate::model::task::PendingTask;
    use crate::policy::quota::QuotaPolicy;
    use std::collections::HashMap;

    fn pool(users: &[(i64, SkillLevel)]) -> UserPool {
        let assessed: Vec<AssessedUser> = users
            .iter()
            .map(|(user_id, level)| AssessedUser {
                user_id: *user_id,
                user_name: format!("user-{user_id}"),
                skill_level: *level,
            })
            .collect();
        UserPool::from_assessments(&assessed, &QuotaPolicy::default())
    }

    fn task(task_id: i64, day_number: u32, level: SkillLevel) -> PendingTask {
        PendingTask {
            task_id,
            day_number,
            skill_level: level,
            title: format!("task-{task_id}"),
            assignee_id: None,
        }
    }

    #[test]
    fn single_advanced_user_gets_one_task_per_day() {
        let pool = pool(&[(1, SkillLevel::Advanced)]);
        let tasks: Vec<PendingTask> = (1..=3).map(|id| task(id, 1, SkillLevel::Advanced)).collect();

        let plan = plan_assignments(&pool, &tasks);
        assert_eq!(plan.assignments.len(), 1);
        assert_eq!(plan.assignments[0].task_id, 1);
        assert_eq!(plan.unassigned.len(), 2);
        assert!(plan
            .unassigned
            .iter()
            .all(|item| item.reason == UnassignedReason::DailyQuotaReached));
    }

    #[test]
    fn two_beginners_split_five_tasks_three_and_two() {
        let pool = pool(&[(1, SkillLevel::Beginner), (2, SkillLevel::Beginner)]);
        let tasks: Vec<PendingTask> = (1..=5).map(|id| task(id, 1, SkillLevel::Beginner)).collect();

        let plan = plan_assignments(&pool, &tasks);
        let owners: Vec<i64> = plan.assignments.iter().map(|a| a.user_id).collect();
        assert_eq!(owners, vec![1, 2, 1, 2, 1]);
        assert!(plan.unassigned.is_empty());
    }

    #[test]
    fn task_without_matching_level_is_skipped() {
        let pool = pool(&[(1, SkillLevel::Beginner)]);
        let tasks = vec![
            task(1, 1, SkillLevel::Intermediate),
            task(2, 1, SkillLevel::Beginner),
        ];

        let plan = plan_assignments(&pool, &tasks);
        assert_eq!(plan.assignments.len(), 1);
        assert_eq!(plan.assignments[0].task_id, 2);
        assert_eq!(plan.unassigned.len(), 1);
        assert_eq!(plan.unassigned[0].reason, UnassignedReason::NoQualifiedUser);
    }

    #[test]
    fn load_counters_reset_every_day() {
        let pool = pool(&[(1, SkillLevel::Advanced), (2, SkillLevel::Advanced)]);
        let tasks = vec![
            task(10, 2, SkillLevel::Advanced),
            task(11, 1, SkillLevel::Advanced),
            task(12, 1, SkillLevel::Advanced),
            task(13, 2, SkillLevel::Advanced),
        ];

        let plan = plan_assignments(&pool, &tasks);
        let order: Vec<(i64, i64)> = plan
            .assignments
            .iter()
            .map(|a| (a.task_id, a.user_id))
            .collect();
        // Day 1 first; day 2 starts again from the first candidate.
        assert_eq!(order, vec![(11, 1), (12, 2), (10, 1), (13, 2)]);
    }

    #[test]
    fn plan_never_exceeds_limit_or_crosses_levels() {
        let users = [
            (1, SkillLevel::Beginner),
            (2, SkillLevel::Intermediate),
            (3, SkillLevel::Advanced),
            (4, SkillLevel::Intermediate),
        ];
        let pool = pool(&users);
        let levels = SkillLevel::ALL;
        let tasks: Vec<PendingTask> = (0..60)
            .map(|i| task(i, (i % 4) as u32 + 1, levels[(i % 3) as usize]))
            .collect();

        let plan = plan_assignments(&pool, &tasks);
        let level_of: HashMap<i64, SkillLevel> = users.iter().copied().collect();
        let task_level: HashMap<i64, SkillLevel> =
            tasks.iter().map(|t| (t.task_id, t.skill_level)).collect();
        let mut per_day: HashMap<(i64, u32), u32> = HashMap::new();
        for assignment in &plan.assignments {
            assert_eq!(level_of[&assignment.user_id], task_level[&assignment.task_id]);
            *per_day
                .entry((assignment.user_id, assignment.day_number))
                .or_insert(0) += 1;
            assert!(assignment.load_after <= assignment.daily_limit);
        }
        let quota = QuotaPolicy::default();
        for ((user_id, _), count) in per_day {
            assert!(count <= quota.daily_limit(level_of[&user_id]));
        }
        assert_eq!(plan.assignments.len() + plan.unassigned.len(), tasks.len());
    }

    #[test]
    fn plan_is_deterministic() {
        let pool = pool(&[(5, SkillLevel::Beginner), (6, SkillLevel::Beginner)]);
        let tasks: Vec<PendingTask> = (1..=9)
            .map(|id| task(id, (id % 3) as u32 + 1, SkillLevel::Beginner))
            .collect();
        assert_eq!(plan_assignments(&pool, &tasks), plan_assignments(&pool, &tasks));
    }

    #[test]
    fn uncommitted_selection_does_not_consume_quota() {
        let pool = pool(&[(1, SkillLevel::Advanced)]);
        let planner = Planner::new(&pool);
        let first = task(1, 1, SkillLevel::Advanced);

        assert!(matches!(planner.select(&first), Selection::Assign(user) if user.user_id == 1));
        assert!(matches!(planner.select(&first), Selection::Assign(_)));
        assert_eq!(planner.load(1, 1), 0);
    }

    #[test]
    fn order_by_day_is_stable_within_day() {
        let tasks = vec![
            task(3, 2, SkillLevel::Beginner),
            task(1, 1, SkillLevel::Advanced),
            task(2, 2, SkillLevel::Beginner),
            task(4, 1, SkillLevel::Beginner),
        ];
        let ids: Vec<i64> = order_by_day(&tasks).iter().map(|t| t.task_id).collect();
        assert_eq!(ids, vec![1, 4, 3, 2]);
    }
}
