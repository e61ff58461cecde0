use rusqlite::Connection;
use skillassign_core::db::migrations::{latest_version, schema_version};
use skillassign_core::db::{open_db, open_db_in_memory, DbError, DbTarget};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn).unwrap(), latest_version());
    assert_table_exists(&conn, "users");
    assert_table_exists(&conn, "skill_assessments");
    assert_table_exists(&conn, "tasks");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("skillassign.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute("INSERT INTO users (name) VALUES ('ana');", [])
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second).unwrap(), latest_version());
    let users: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM users;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(users, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::SchemaTooNew { found, supported } => {
            assert_eq!(found, 999);
            assert_eq!(supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn open_failure_names_the_target_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("skillassign.db");

    let err = open_db(&path).unwrap_err();

    match err {
        DbError::Open { target, .. } => assert_eq!(target, DbTarget::File(path)),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn schema_rejects_day_zero_and_duplicate_assessment() {
    let conn = open_db_in_memory().unwrap();
    conn.execute("INSERT INTO users (name) VALUES ('ana');", [])
        .unwrap();

    let day_zero = conn.execute(
        "INSERT INTO tasks (project_id, day_number, skill_level, title) VALUES (1, 0, 'beginner', 't');",
        [],
    );
    assert!(day_zero.is_err());

    conn.execute(
        "INSERT INTO skill_assessments (user_id, project_id, skill_level, score) VALUES (1, 1, 'beginner', 10);",
        [],
    )
    .unwrap();
    let duplicate = conn.execute(
        "INSERT INTO skill_assessments (user_id, project_id, skill_level, score) VALUES (1, 1, 'advanced', 90);",
        [],
    );
    assert!(duplicate.is_err());
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
