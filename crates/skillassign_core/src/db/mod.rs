//! Storage bootstrap: every connection handed to the repositories is opened,
//! configured and migrated here.
//!
//! Schema state lives in `PRAGMA user_version`; a connection is only returned
//! once that version equals `migrations::latest_version()`.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory, DbTarget};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while bringing a database into a usable state, or while using it.
#[derive(Debug)]
pub enum DbError {
    /// SQLite refused to open or configure the target.
    Open {
        target: DbTarget,
        source: rusqlite::Error,
    },
    /// A schema step failed; the whole upgrade was rolled back.
    Migration {
        from_version: u32,
        failed_version: u32,
        source: rusqlite::Error,
    },
    /// The database was written by a newer build of the engine.
    SchemaTooNew { found: u32, supported: u32 },
    /// A statement failed on a ready connection.
    Query(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { target, source } => write!(f, "cannot open {target}: {source}"),
            Self::Migration {
                from_version,
                failed_version,
                source,
            } => write!(
                f,
                "schema upgrade from v{from_version} failed at v{failed_version}: {source}"
            ),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "database uses schema v{found}, this build understands up to v{supported}"
            ),
            Self::Query(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Migration { source, .. } => Some(source),
            Self::Query(err) => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Query(value)
    }
}
