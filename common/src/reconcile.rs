//! Pure pieces of the reconciliation pass: the cutoff, the set difference and the synthesized row.

use crate::{
    AUTOMATED_REVIEWER_NAME, Enrichment, LoggedPair, NewStudentLog, SYNTHESIZED_NOTE, TimelineKey,
};
use chrono::{NaiveDateTime, TimeDelta};
use std::collections::HashSet;

/// The oldest timestamp still inside the window.
#[must_use]
pub fn compute_cutoff(now: NaiveDateTime, window: TimeDelta) -> NaiveDateTime {
    now - window
}

/// Timeline keys whose (student, subcourse) pair has no log yet.
///
/// Source order is kept and the schedule is carried through, so a pair seen
/// under several schedules yields one key per schedule.
#[must_use]
pub fn compute_missing(
    timeline_keys: &[TimelineKey],
    logged_pairs: &HashSet<LoggedPair>,
) -> Vec<TimelineKey> {
    timeline_keys
        .iter()
        .filter(|key| !logged_pairs.contains(&key.pair()))
        .cloned()
        .collect()
}

/// Build the fully confirmed log row for a missing entry.
#[must_use]
pub fn build_synthesized_log(
    entry: &TimelineKey,
    enrichment: Enrichment,
    now: NaiveDateTime,
) -> NewStudentLog {
    NewStudentLog {
        stu_id: entry.stu_id.clone(),
        stu_name: enrichment.stu_name,
        subcourse_id: entry.subcourse_id,
        room_id: enrichment.room_id,
        seat: enrichment.seat,
        lab_name: enrichment.lab_name,
        note: String::new(),
        tea_note: SYNTHESIZED_NOTE.to_string(),
        tea_name: AUTOMATED_REVIEWER_NAME.to_string(),
        fin_time: now,
        confirmed: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn key(stu_id: &str, subcourse_id: i64, schedule_id: i64) -> TimelineKey {
        TimelineKey {
            stu_id: stu_id.to_string(),
            subcourse_id,
            schedule_id,
        }
    }

    fn pair(stu_id: &str, subcourse_id: i64) -> LoggedPair {
        LoggedPair {
            stu_id: stu_id.to_string(),
            subcourse_id,
        }
    }

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 12)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test_log::test]
    fn test_compute_cutoff_day_window() {
        let cutoff = compute_cutoff(noon(), TimeDelta::hours(24));
        let expected = NaiveDate::from_ymd_opt(2024, 3, 11)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(cutoff, expected);
    }

    #[test_log::test]
    fn test_compute_missing_basic_difference() {
        let timeline = vec![key("1", 10, 100), key("2", 20, 200)];
        let logged: HashSet<LoggedPair> = [pair("1", 10)].into_iter().collect();
        assert_eq!(compute_missing(&timeline, &logged), vec![key("2", 20, 200)]);
    }

    #[test_log::test]
    fn test_compute_missing_keeps_source_order() {
        let timeline = vec![key("3", 30, 300), key("1", 10, 100), key("2", 20, 200)];
        let logged = HashSet::new();
        assert_eq!(compute_missing(&timeline, &logged), timeline);
    }

    #[test_log::test]
    fn test_compute_missing_ignores_schedule_when_matching() {
        // a log for the pair covers every schedule of that pair
        let timeline = vec![key("1", 10, 100), key("1", 10, 101)];
        let logged: HashSet<LoggedPair> = [pair("1", 10)].into_iter().collect();
        assert!(compute_missing(&timeline, &logged).is_empty());
    }

    #[test_log::test]
    fn test_compute_missing_keeps_every_schedule_of_a_pair() {
        let timeline = vec![key("1", 10, 100), key("1", 10, 101), key("1", 11, 100)];
        let logged = HashSet::new();
        assert_eq!(compute_missing(&timeline, &logged), timeline);
    }

    #[test_log::test]
    fn test_compute_missing_empty_timeline() {
        let logged: HashSet<LoggedPair> = [pair("1", 10)].into_iter().collect();
        assert!(compute_missing(&[], &logged).is_empty());
    }

    #[test_log::test]
    fn test_build_synthesized_log() {
        let entry = key("2", 20, 200);
        let enrichment = Enrichment {
            stu_name: "Alice".to_string(),
            seat: 5,
            lab_name: "Lab 1".to_string(),
            room_id: 3,
        };
        let log = build_synthesized_log(&entry, enrichment, noon());
        assert_eq!(
            log,
            NewStudentLog {
                stu_id: "2".to_string(),
                stu_name: "Alice".to_string(),
                subcourse_id: 20,
                room_id: 3,
                seat: 5,
                lab_name: "Lab 1".to_string(),
                note: String::new(),
                tea_note: "Log by C".to_string(),
                tea_name: "cronjob".to_string(),
                fin_time: noon(),
                confirmed: true,
            }
        );
    }
}
