use rusqlite::{Connection, OptionalExtension, Row};

use crate::models::{MessageRow, UserRow};
use crate::{Database, DbResult};

impl Database {
    // -- Users --

    /// Insert a user and return its id. A username or email collision
    /// surfaces as [`crate::DbError::UniqueViolation`].
    pub fn create_user(&self, username: &str, email: &str, password_hash: &str) -> DbResult<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (username, email, password_hash) VALUES (?1, ?2, ?3)",
                (username, email, password_hash),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> DbResult<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username", username))
    }

    pub fn get_user_by_email(&self, email: &str) -> DbResult<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn get_user_by_id(&self, id: i64) -> DbResult<Option<UserRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, username, email, password_hash FROM users WHERE id = ?1",
                    [id],
                    map_user,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// True if any user already holds `username` or `email`.
    pub fn user_exists(&self, username: &str, email: &str) -> DbResult<bool> {
        self.with_conn(|conn| {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1 OR email = ?2)",
                (username, email),
                |row| row.get(0),
            )?;
            Ok(exists)
        })
    }

    // -- Messages --

    pub fn insert_message(&self, message: &str) -> DbResult<i64> {
        self.with_conn(|conn| {
            conn.execute("INSERT INTO messages (message) VALUES (?1)", [message])?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// The `limit` newest messages, newest first.
    pub fn recent_messages(&self, limit: u32) -> DbResult<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, message FROM messages ORDER BY id DESC LIMIT ?1")?;

            let rows = stmt
                .query_map([limit], |row| {
                    Ok(MessageRow {
                        id: row.get(0)?,
                        message: row.get(1)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn message_count(&self) -> DbResult<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))?;
            Ok(count)
        })
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> DbResult<Option<UserRow>> {
    // `column` is always one of our own literals, never caller input.
    let sql = format!(
        "SELECT id, username, email, password_hash FROM users WHERE {} = ?1",
        column
    );
    let row = conn.query_row(&sql, [value], map_user).optional()?;
    Ok(row)
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
    })
}
