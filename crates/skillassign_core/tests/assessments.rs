use rusqlite::Connection;
use skillassign_core::db::open_db_in_memory;
use skillassign_core::{
    AssessmentError, AssessmentService, AssignmentService, NewTask, QuotaPolicy, ScoringPolicy,
    SkillLevel, SqliteAssessmentRepository, SqliteTaskRepository, SqliteUserRepository,
    TaskRepository, UserId, UserRepository,
};
use std::collections::BTreeMap;

const PROJECT: i64 = 7;

fn user(conn: &Connection, name: &str) -> UserId {
    SqliteUserRepository::try_new(conn)
        .unwrap()
        .create_user(name)
        .unwrap()
}

fn service(conn: &Connection) -> AssessmentService<SqliteAssessmentRepository<'_>> {
    AssessmentService::new(
        SqliteAssessmentRepository::try_new(conn).unwrap(),
        ScoringPolicy::default(),
    )
}

fn key() -> BTreeMap<i64, u32> {
    (1..=5).map(|question| (question, 1)).collect()
}

#[test]
fn submit_scores_answers_and_derives_level() {
    let conn = open_db_in_memory().unwrap();
    let ana = user(&conn, "ana");
    let answers: BTreeMap<i64, u32> = [(1, 1), (2, 1), (3, 1), (4, 0)].into_iter().collect();

    let outcome = service(&conn)
        .submit_assessment(ana, PROJECT, &key(), answers.clone())
        .unwrap();

    assert_eq!(outcome.correct_answers, 3);
    assert_eq!(outcome.total_questions, 5);
    assert_eq!(outcome.score, 60);
    assert_eq!(outcome.skill_level, SkillLevel::Intermediate);
    assert_eq!(outcome.recommendations.len(), 3);

    let stored = service(&conn).get_assessment(ana, PROJECT).unwrap();
    assert_eq!(stored.user_name, "ana");
    assert_eq!(stored.answers, Some(answers));
}

#[test]
fn second_submission_is_rejected_until_reset() {
    let conn = open_db_in_memory().unwrap();
    let ana = user(&conn, "ana");
    let service = service(&conn);

    service.record_assessment(ana, PROJECT, 90).unwrap();
    let err = service
        .submit_assessment(ana, PROJECT, &key(), BTreeMap::new())
        .unwrap_err();
    assert!(matches!(err, AssessmentError::DuplicateAssessment { .. }));

    service.reset_assessment(ana, PROJECT).unwrap();
    let outcome = service
        .submit_assessment(ana, PROJECT, &key(), BTreeMap::new())
        .unwrap();
    assert_eq!(outcome.skill_level, SkillLevel::Beginner);
    assert_eq!(outcome.recommendations.len(), 4);
}

#[test]
fn record_derives_level_and_validates_score() {
    let conn = open_db_in_memory().unwrap();
    let ana = user(&conn, "ana");
    let service = service(&conn);

    let err = service.record_assessment(ana, PROJECT, 101).unwrap_err();
    assert!(matches!(err, AssessmentError::InvalidScore(101)));

    let stored = service.record_assessment(ana, PROJECT, 80).unwrap();
    assert_eq!(stored.skill_level, SkillLevel::Advanced);
    assert_eq!(stored.score, 80);
}

#[test]
fn record_for_unknown_user_fails() {
    let conn = open_db_in_memory().unwrap();
    let err = service(&conn)
        .record_assessment(999, PROJECT, 50)
        .unwrap_err();
    assert!(matches!(err, AssessmentError::UserNotFound(999)));
}

#[test]
fn empty_answer_key_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let ana = user(&conn, "ana");
    let err = service(&conn)
        .submit_assessment(ana, PROJECT, &BTreeMap::new(), BTreeMap::new())
        .unwrap_err();
    assert!(matches!(err, AssessmentError::EmptyAnswerKey));
}

#[test]
fn reset_of_missing_assessment_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let ana = user(&conn, "ana");
    let err = service(&conn).reset_assessment(ana, PROJECT).unwrap_err();
    assert!(matches!(err, AssessmentError::AssessmentNotFound { .. }));
}

#[test]
fn list_is_scoped_to_project() {
    let conn = open_db_in_memory().unwrap();
    let ana = user(&conn, "ana");
    let bo = user(&conn, "bo");
    let service = service(&conn);
    service.record_assessment(ana, PROJECT, 10).unwrap();
    service.record_assessment(bo, PROJECT, 70).unwrap();
    service.record_assessment(bo, PROJECT + 1, 70).unwrap();

    let listed = service.list_assessments(PROJECT).unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|item| item.project_id == PROJECT));
}

#[test]
fn reset_keeps_existing_task_assignments() {
    let conn = open_db_in_memory().unwrap();
    let ana = user(&conn, "ana");
    service(&conn).record_assessment(ana, PROJECT, 20).unwrap();
    let tasks = SqliteTaskRepository::try_new(&conn).unwrap();
    let ids = tasks
        .create_tasks(PROJECT, &[NewTask::new(1, SkillLevel::Beginner, "t")])
        .unwrap();
    AssignmentService::new(
        SqliteAssessmentRepository::try_new(&conn).unwrap(),
        SqliteTaskRepository::try_new(&conn).unwrap(),
        QuotaPolicy::default(),
    )
    .reassign(PROJECT)
    .unwrap();

    service(&conn).reset_assessment(ana, PROJECT).unwrap();

    assert_eq!(tasks.get_task(ids[0]).unwrap().unwrap().assignee_id, Some(ana));
}
