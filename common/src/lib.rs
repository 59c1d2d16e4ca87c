//! A library with common records and utilities for reconciling lab activity logs.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod reconcile;

#[cfg(feature = "database")]
pub mod db_util;
#[cfg(feature = "database")]
pub mod job;

pub use error::{LookupKind, ReconcileError};

use chrono::NaiveDateTime;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// How far back the job looks for timelines and logs.
pub const LOOKBACK_HOURS: i64 = 24;
/// Reviewer name stamped on every row the job writes.
pub const AUTOMATED_REVIEWER_NAME: &str = "cronjob";
/// Reviewer note on logs synthesized from a timeline.
pub const SYNTHESIZED_NOTE: &str = "Log by C";
/// Reviewer note on existing logs confirmed by the sweep.
pub const CONFIRMED_NOTE: &str = "Conf by C";

/// One distinct (student, subcourse, schedule) triple from the timeline table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimelineKey {
    pub stu_id: String,
    pub subcourse_id: i64,
    pub schedule_id: i64,
}

impl TimelineKey {
    /// The (student, subcourse) pair this key is matched on.
    #[must_use]
    pub fn pair(&self) -> LoggedPair {
        LoggedPair {
            stu_id: self.stu_id.clone(),
            subcourse_id: self.subcourse_id,
        }
    }
}

/// A (student, subcourse) pair that already has a log in the window.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoggedPair {
    pub stu_id: String,
    pub subcourse_id: i64,
}

/// Display fields pulled from the roster, schedule and subcourse tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrichment {
    pub stu_name: String,
    pub seat: i64,
    pub lab_name: String,
    pub room_id: i64,
}

/// A full row of the log table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentLogRecord {
    pub log_id: i64,
    pub stu_id: String,
    pub stu_name: String,
    pub subcourse_id: i64,
    pub room_id: i64,
    pub seat: i64,
    pub lab_name: String,
    pub note: String,
    pub tea_note: String,
    pub tea_name: String,
    pub fin_time: NaiveDateTime,
    pub confirmed: bool,
}

/// A log row that has not been written yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStudentLog {
    pub stu_id: String,
    pub stu_name: String,
    pub subcourse_id: i64,
    pub room_id: i64,
    pub seat: i64,
    pub lab_name: String,
    pub note: String,
    pub tea_note: String,
    pub tea_name: String,
    pub fin_time: NaiveDateTime,
    pub confirmed: bool,
}

/// What to do when a missing entry cannot be enriched.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum MissingLookupPolicy {
    /// Log the key, leave it out of the inserts and keep going.
    #[default]
    Skip,
    /// Fail the whole run on the first unresolved lookup.
    Abort,
}

/// Where the job commits its writes.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum CommitMode {
    /// Inserts and the confirmation sweep share one transaction.
    #[default]
    Single,
    /// Inserts are committed first, then the sweep in its own transaction.
    Phased,
}

/// A missing entry that was left out because a lookup came back empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    pub key: TimelineKey,
    pub reason: String,
}

/// Summary of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub cutoff: NaiveDateTime,
    pub timeline_keys: usize,
    pub logged_pairs: usize,
    pub missing: Vec<TimelineKey>,
    pub inserted: usize,
    pub skipped: Vec<SkippedEntry>,
    pub confirmed: usize,
    pub dry_run: bool,
}
