//! In-memory store with the live schema, plus seeding helpers for tests.

use super::*;
use super::course_schedules::course_schedules;
use super::student_timelines::student_timelines;
use super::students::students;
use super::subcourses::subcourses;
use chrono::NaiveDate;

const SCHEMA: &str = include_str!("test_schema.sql");

pub fn memory_connection() -> SqliteConnection {
    let mut conn = get_database_connection(":memory:", DEFAULT_BUSY_TIMEOUT_MS).unwrap();
    conn.batch_execute(SCHEMA).unwrap();
    conn
}

/// A store on disk, so a second connection can contend for its locks.
pub fn file_connection(path: &str, busy_timeout_ms: u32) -> SqliteConnection {
    let mut conn = get_database_connection(path, busy_timeout_ms).unwrap();
    conn.batch_execute(SCHEMA).unwrap();
    conn
}

/// Open another connection and hold the write lock until it is dropped or rolled back.
pub fn hold_write_lock(path: &str) -> SqliteConnection {
    let mut writer = get_database_connection(path, 10).unwrap();
    writer.batch_execute("BEGIN IMMEDIATE;").unwrap();
    writer
}

/// A fixed wall clock so windows are reproducible.
pub fn test_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 12)
        .unwrap()
        .and_hms_opt(18, 30, 0)
        .unwrap()
}

/// Far enough back to see every seeded row.
pub fn epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2000, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

pub fn add_student(conn: &mut SqliteConnection, stu_id: &str, subcourse_id: i64, name: &str, seat: i64) {
    diesel::insert_into(students::table)
        .values((
            students::stu_id.eq(stu_id),
            students::stu_name.eq(name),
            students::seat.eq(seat),
            students::subcourse_id.eq(subcourse_id),
        ))
        .execute(conn)
        .unwrap();
}

pub fn add_schedule(conn: &mut SqliteConnection, schedule_id: i64, name: &str) {
    diesel::insert_into(course_schedules::table)
        .values((course_schedules::id.eq(schedule_id), course_schedules::name.eq(name)))
        .execute(conn)
        .unwrap();
}

pub fn add_subcourse(conn: &mut SqliteConnection, subcourse_id: i64, room_id: i64) {
    diesel::insert_into(subcourses::table)
        .values((subcourses::id.eq(subcourse_id), subcourses::room_id.eq(room_id)))
        .execute(conn)
        .unwrap();
}

pub fn add_timeline(
    conn: &mut SqliteConnection,
    stu_id: &str,
    subcourse_id: i64,
    schedule_id: i64,
    timestamp: NaiveDateTime,
) {
    diesel::insert_into(student_timelines::table)
        .values((
            student_timelines::stu_id.eq(stu_id),
            student_timelines::subcourse_id.eq(subcourse_id),
            student_timelines::schedule_id.eq(schedule_id),
            student_timelines::timestamp.eq(timestamp),
        ))
        .execute(conn)
        .unwrap();
}

/// Insert a log as another actor would have written it.
pub fn add_log(
    conn: &mut SqliteConnection,
    stu_id: &str,
    subcourse_id: i64,
    fin_time: NaiveDateTime,
    confirmed: bool,
    tea_note: &str,
    tea_name: &str,
) {
    let log = NewStudentLog {
        stu_id: stu_id.to_string(),
        stu_name: format!("student {stu_id}"),
        subcourse_id,
        room_id: 1,
        seat: 1,
        lab_name: "manual".to_string(),
        note: "written by hand".to_string(),
        tea_note: tea_note.to_string(),
        tea_name: tea_name.to_string(),
        fin_time,
        confirmed,
    };
    insert_student_log(conn, &log).unwrap();
}
