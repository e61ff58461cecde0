//! Minimal user directory.
//!
//! Users are owned by the platform's account system; this table only keeps
//! the id and display name that assessment listings join and foreign keys
//! point to.

use super::{ensure_tables, RepoResult};
use crate::model::UserId;
use rusqlite::Connection;

pub trait UserRepository {
    fn create_user(&self, name: &str) -> RepoResult<UserId>;
}

pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["users"])?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, name: &str) -> RepoResult<UserId> {
        self.conn
            .execute("INSERT INTO users (name) VALUES (?1);", [name.trim()])?;
        Ok(self.conn.last_insert_rowid())
    }
}
