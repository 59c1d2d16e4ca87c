//! Interfaces between the application code and database.

use crate::error::{ReconcileError, Result};
use crate::{LoggedPair, NewStudentLog, StudentLogRecord, TimelineKey};
use chrono::NaiveDateTime;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use std::collections::HashSet;

mod conversions;
mod course_schedules;
mod student_logs;
mod student_timelines;
mod students;
mod subcourses;

#[cfg(test)]
pub(crate) mod test_support;

pub use course_schedules::get_schedule_name;
pub use student_logs::{
    confirm_pending_logs_since, count_pending_logs_since, get_logged_pairs_since,
    get_student_logs_since, insert_student_log,
};
pub use student_timelines::get_timeline_keys_since;
pub use students::get_student_name_and_seat;
pub use subcourses::get_subcourse_room;

/// How long a connection waits on a locked database before giving up.
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5000;

/// Read the database location from the environment, loading `.env` first.
///
/// # Errors
/// Returns a connection error if `DATABASE_URL` is not set.
pub fn database_url_from_env() -> Result<String> {
    dotenvy::dotenv().ok();
    std::env::var("DATABASE_URL")
        .map_err(|_| ReconcileError::Connection("DATABASE_URL must be set".to_string()))
}

/// Strip the `sqlite:` scheme the web server's `DATABASE_URL` carries.
fn sqlite_path(database_url: &str) -> &str {
    database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url)
}

/// Open a connection to the SQLite store.
///
/// # Errors
/// Returns a connection error if the file cannot be opened or configured.
pub fn get_database_connection(
    database_url: &str,
    busy_timeout_ms: u32,
) -> Result<SqliteConnection> {
    let mut conn = SqliteConnection::establish(sqlite_path(database_url))
        .map_err(|e| ReconcileError::Connection(format!("{database_url}: {e}")))?;
    conn.batch_execute(&format!("PRAGMA busy_timeout = {busy_timeout_ms};"))
        .map_err(|e| ReconcileError::Connection(e.to_string()))?;
    Ok(conn)
}
