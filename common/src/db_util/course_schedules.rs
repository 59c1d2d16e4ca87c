use super::*;

table! {
    course_schedules (id) {
        id -> BigInt,
        name -> Text,
    }
}

/// Look up the display name of a course schedule.
///
/// # Errors
/// Returns a query error if the read fails. An unknown schedule is `Ok(None)`.
pub fn get_schedule_name(conn: &mut SqliteConnection, schedule_id: i64) -> Result<Option<String>> {
    use self::course_schedules::dsl::*;

    course_schedules
        .filter(id.eq(schedule_id))
        .select(name)
        .first::<String>(conn)
        .optional()
        .map_err(|e| ReconcileError::Query(e.to_string()))
}
