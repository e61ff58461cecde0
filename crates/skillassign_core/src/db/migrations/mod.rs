//! Ordered schema steps for the assignment store.
//!
//! A step runs once per database. All pending steps of one upgrade share a
//! transaction, so a database is either fully upgraded or left untouched.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "users_assessments",
        sql: include_str!("0001_users_assessments.sql"),
    },
    SchemaStep {
        version: 2,
        name: "tasks",
        sql: include_str!("0002_tasks.sql"),
    },
];

/// What an upgrade did to one database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationReport {
    pub from_version: u32,
    pub to_version: u32,
    pub steps_applied: usize,
}

/// Newest schema version this build can produce.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |step| step.version)
}

/// Reads the schema version recorded in the database.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Brings `conn` up to `latest_version()`.
///
/// # Errors
/// - `SchemaTooNew` when the database is ahead of this build.
/// - `Migration` when a step fails; nothing is committed then.
pub fn migrate(conn: &mut Connection) -> DbResult<MigrationReport> {
    run_steps(conn, STEPS)
}

fn run_steps(conn: &mut Connection, steps: &[SchemaStep]) -> DbResult<MigrationReport> {
    let found = schema_version(conn)?;
    let supported = steps.last().map_or(0, |step| step.version);
    if found > supported {
        return Err(DbError::SchemaTooNew { found, supported });
    }

    let pending = &steps[steps.partition_point(|step| step.version <= found)..];
    if pending.is_empty() {
        return Ok(MigrationReport {
            from_version: found,
            to_version: found,
            steps_applied: 0,
        });
    }

    let tx = conn.transaction()?;
    for step in pending {
        tx.execute_batch(step.sql)
            .and_then(|()| tx.pragma_update(None, "user_version", step.version))
            .map_err(|source| DbError::Migration {
                from_version: found,
                failed_version: step.version,
                source,
            })?;
        debug!(
            "event=db_migrate_step module=db status=ok version={} name={}",
            step.version, step.name
        );
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={found} to_version={supported} steps={}",
        pending.len()
    );
    Ok(MigrationReport {
        from_version: found,
        to_version: supported,
        steps_applied: pending.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::{run_steps, schema_version, SchemaStep, STEPS};
    use crate::db::DbError;
    use rusqlite::Connection;

    #[test]
    fn step_versions_strictly_increase() {
        assert!(STEPS.windows(2).all(|pair| pair[0].version < pair[1].version));
        assert!(STEPS.first().is_some_and(|step| step.version == 1));
    }

    #[test]
    fn failing_step_rolls_back_whole_upgrade() {
        let steps = [
            SchemaStep {
                version: 1,
                name: "ok",
                sql: "CREATE TABLE first_step (id INTEGER);",
            },
            SchemaStep {
                version: 2,
                name: "broken",
                sql: "CREATE TABLE first_step (id INTEGER);",
            },
        ];
        let mut conn = Connection::open_in_memory().unwrap();

        let err = run_steps(&mut conn, &steps).unwrap_err();

        assert!(matches!(
            err,
            DbError::Migration {
                from_version: 0,
                failed_version: 2,
                ..
            }
        ));
        assert_eq!(schema_version(&conn).unwrap(), 0);
        let leftover: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE name = 'first_step';",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(leftover, 0);
    }

    #[test]
    fn partial_database_runs_only_newer_steps() {
        let mut conn = Connection::open_in_memory().unwrap();
        let report = run_steps(&mut conn, &STEPS[..1]).unwrap();
        assert_eq!(report.steps_applied, 1);

        let report = run_steps(&mut conn, STEPS).unwrap();
        assert_eq!(report.from_version, 1);
        assert_eq!(report.to_version, 2);
        assert_eq!(report.steps_applied, 1);
    }
}
