//! Command-line front end for reassignment and inspection.
//!
//! The CLI opens its own connection and takes no cross-process lock; run it
//! while no server is writing to the same database.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use skillassign_core::db::open_db;
use skillassign_core::{
    core_version, init_logging_from_config, load_config, AppConfig, AssessmentService,
    AssignmentService, ProjectId, SqliteAssessmentRepository, SqliteTaskRepository, TaskService,
};

#[derive(Debug, Parser)]
#[command(name = "skillassign", about = "Skill-based task assignment")]
struct CliArgs {
    /// SQLite database path; defaults to `server.db_path` from the config.
    #[arg(long, env = "SKILLASSIGN_DB")]
    db: Option<PathBuf>,

    /// TOML config file.
    #[arg(long, env = "SKILLASSIGN_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Re-plan the pending tasks of a project.
    Reassign { project: ProjectId },
    /// List a project's tasks.
    Tasks { project: ProjectId },
    /// List a project's assessments.
    Assessments { project: ProjectId },
    /// Print the daily limit configured for a skill label.
    Quota { label: String },
    /// Print the core version.
    Version,
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    let config = load_config(args.config.as_deref()).context("failed to load configuration")?;
    init_logging_from_config(&config.logging).map_err(|err| anyhow!(err))?;

    let output = execute(args.command, args.db.as_deref(), &config)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn execute(command: Command, db: Option<&Path>, config: &AppConfig) -> Result<Value> {
    let output = match command {
        Command::Version => json!({ "name": "skillassign", "version": core_version() }),
        Command::Quota { label } => {
            let limit = config.quota.daily_limit_for_label(&label);
            json!({ "label": label, "dailyLimit": limit })
        }
        Command::Reassign { project } => {
            let conn = open_database(db, config)?;
            let service = AssignmentService::new(
                SqliteAssessmentRepository::try_new(&conn)?,
                SqliteTaskRepository::try_new(&conn)?,
                config.quota,
            );
            serde_json::to_value(service.reassign(project)?)?
        }
        Command::Tasks { project } => {
            let conn = open_database(db, config)?;
            let service = TaskService::new(SqliteTaskRepository::try_new(&conn)?);
            serde_json::to_value(service.list_tasks(project)?)?
        }
        Command::Assessments { project } => {
            let conn = open_database(db, config)?;
            let service =
                AssessmentService::new(SqliteAssessmentRepository::try_new(&conn)?, config.scoring);
            serde_json::to_value(service.list_assessments(project)?)?
        }
    };
    Ok(output)
}

fn open_database(db: Option<&Path>, config: &AppConfig) -> Result<rusqlite::Connection> {
    let path = db.unwrap_or(config.server.db_path.as_path());
    open_db(path).with_context(|| format!("failed to open database {}", path.display()))
}
