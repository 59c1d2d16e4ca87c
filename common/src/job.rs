//! One reconciliation pass over the lookback window.
//!
//! Every timeline pair without a log gets a synthesized, already confirmed
//! log, then every unconfirmed log in the window is confirmed.
//!
//! Each writing phase runs inside `BEGIN IMMEDIATE`, so the read-then-insert
//! section holds the store's write lock and an overlapping run waits on the
//! busy timeout instead of inserting the same pair twice. Dry runs only read
//! and use a plain deferred transaction. Scheduling at most one run at a time
//! is still expected of the caller.

use crate::db_util;
use crate::error::{LookupKind, ReconcileError, Result};
use crate::reconcile::{build_synthesized_log, compute_cutoff, compute_missing};
use crate::{
    AUTOMATED_REVIEWER_NAME, CONFIRMED_NOTE, CommitMode, Enrichment, LOOKBACK_HOURS,
    MissingLookupPolicy, NewStudentLog, ReconcileReport, SkippedEntry, TimelineKey,
};
use chrono::{NaiveDateTime, TimeDelta};
use diesel::{Connection, SqliteConnection};
use log::{debug, info, warn};

/// Knobs for a single run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobOptions {
    pub on_missing_lookup: MissingLookupPolicy,
    pub commit_mode: CommitMode,
    /// Resolve everything but write nothing.
    pub dry_run: bool,
}

/// Run the whole pass as of `now`.
///
/// # Errors
/// Any read or write failure ends the run. Unresolved lookups end it only
/// under [`MissingLookupPolicy::Abort`]. Whatever was not yet committed is
/// rolled back.
pub fn run_reconciliation(
    conn: &mut SqliteConnection,
    now: NaiveDateTime,
    options: &JobOptions,
) -> Result<ReconcileReport> {
    let cutoff = compute_cutoff(now, TimeDelta::hours(LOOKBACK_HOURS));
    info!("Reconciling logs since {cutoff} ({:?} commit).", options.commit_mode);

    let report = match options.commit_mode {
        CommitMode::Single => run_phase(conn, options.dry_run, |conn| {
            let mut report = synthesize_missing(conn, cutoff, now, options)?;
            report.confirmed = sweep_window(conn, cutoff, options.dry_run)?;
            Ok(report)
        })?,
        CommitMode::Phased => {
            let mut report = run_phase(conn, options.dry_run, |conn| {
                synthesize_missing(conn, cutoff, now, options)
            })?;
            info!("Committed {} synthesized logs.", report.inserted);
            report.confirmed = run_phase(conn, options.dry_run, |conn| {
                sweep_window(conn, cutoff, options.dry_run)
            })?;
            report
        }
    };

    info!(
        "Done: {} missing, {} inserted, {} skipped, {} confirmed{}.",
        report.missing.len(),
        report.inserted,
        report.skipped.len(),
        report.confirmed,
        if report.dry_run { " (dry run)" } else { "" }
    );
    Ok(report)
}

/// Run one phase in its own transaction. Only phases that write take the write lock up front.
fn run_phase<T>(
    conn: &mut SqliteConnection,
    read_only: bool,
    phase: impl FnOnce(&mut SqliteConnection) -> Result<T>,
) -> Result<T> {
    if read_only {
        conn.transaction(phase)
    } else {
        conn.immediate_transaction(phase)
    }
}

/// Find the missing pairs and insert a log for each one that can be enriched.
fn synthesize_missing(
    conn: &mut SqliteConnection,
    cutoff: NaiveDateTime,
    now: NaiveDateTime,
    options: &JobOptions,
) -> Result<ReconcileReport> {
    let timeline_keys = db_util::get_timeline_keys_since(conn, cutoff)?;
    let logged_pairs = db_util::get_logged_pairs_since(conn, cutoff)?;
    let missing = compute_missing(&timeline_keys, &logged_pairs);
    info!(
        "{} timeline keys, {} logged pairs, {} missing.",
        timeline_keys.len(),
        logged_pairs.len(),
        missing.len()
    );

    let mut inserted = 0;
    let mut skipped = Vec::new();
    for entry in &missing {
        let result = if options.dry_run {
            lookup_enrichment(conn, entry).map(|enrichment| {
                debug!(
                    "Would log {} in subcourse {} ({}).",
                    entry.stu_id, entry.subcourse_id, enrichment.lab_name
                );
            })
        } else {
            enrich_and_insert(conn, entry, now).map(|_| ())
        };
        match result {
            Ok(()) => inserted += 1,
            Err(err @ ReconcileError::LookupNotFound { .. })
                if options.on_missing_lookup == MissingLookupPolicy::Skip =>
            {
                warn!(
                    "Skipping {} in subcourse {} (schedule {}): {err}",
                    entry.stu_id, entry.subcourse_id, entry.schedule_id
                );
                skipped.push(SkippedEntry {
                    key: entry.clone(),
                    reason: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        }
    }

    Ok(ReconcileReport {
        cutoff,
        timeline_keys: timeline_keys.len(),
        logged_pairs: logged_pairs.len(),
        missing,
        inserted,
        skipped,
        confirmed: 0,
        dry_run: options.dry_run,
    })
}

/// Gather the display fields for a missing entry.
///
/// # Errors
/// Returns [`ReconcileError::LookupNotFound`] naming the first table with no matching row.
pub fn lookup_enrichment(conn: &mut SqliteConnection, entry: &TimelineKey) -> Result<Enrichment> {
    let (stu_name, seat) =
        db_util::get_student_name_and_seat(conn, &entry.stu_id, entry.subcourse_id)?.ok_or_else(
            || ReconcileError::LookupNotFound {
                lookup: LookupKind::Student,
                key: format!("{} in subcourse {}", entry.stu_id, entry.subcourse_id),
            },
        )?;
    let lab_name = db_util::get_schedule_name(conn, entry.schedule_id)?.ok_or_else(|| {
        ReconcileError::LookupNotFound {
            lookup: LookupKind::Schedule,
            key: format!("schedule {}", entry.schedule_id),
        }
    })?;
    let room_id = db_util::get_subcourse_room(conn, entry.subcourse_id)?.ok_or_else(|| {
        ReconcileError::LookupNotFound {
            lookup: LookupKind::Room,
            key: format!("subcourse {}", entry.subcourse_id),
        }
    })?;
    Ok(Enrichment {
        stu_name,
        seat,
        lab_name,
        room_id,
    })
}

/// Enrich a missing entry and insert its confirmed log, returning the row written.
///
/// # Errors
/// Returns a lookup error if enrichment fails, or a write error if the insert does.
pub fn enrich_and_insert(
    conn: &mut SqliteConnection,
    entry: &TimelineKey,
    now: NaiveDateTime,
) -> Result<NewStudentLog> {
    let enrichment = lookup_enrichment(conn, entry)?;
    let new_log = build_synthesized_log(entry, enrichment, now);
    db_util::insert_student_log(conn, &new_log)?;
    debug!(
        "Logged {} ({}) in subcourse {}, room {}, seat {}.",
        new_log.stu_id, new_log.stu_name, new_log.subcourse_id, new_log.room_id, new_log.seat
    );
    Ok(new_log)
}

/// Confirm every unconfirmed log at or after the cutoff. Returns the rows updated.
///
/// # Errors
/// Returns a write error if the update fails.
pub fn confirm_pending(conn: &mut SqliteConnection, cutoff: NaiveDateTime) -> Result<usize> {
    db_util::confirm_pending_logs_since(conn, cutoff, CONFIRMED_NOTE, AUTOMATED_REVIEWER_NAME)
}

fn sweep_window(conn: &mut SqliteConnection, cutoff: NaiveDateTime, dry_run: bool) -> Result<usize> {
    if dry_run {
        let pending = db_util::count_pending_logs_since(conn, cutoff)?;
        info!("{pending} unconfirmed logs would be confirmed.");
        Ok(pending)
    } else {
        let confirmed = confirm_pending(conn, cutoff)?;
        info!("Confirmed {confirmed} pending logs.");
        Ok(confirmed)
    }
}
