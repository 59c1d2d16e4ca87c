use super::*;

table! {
    students (id) {
        id -> BigInt,
        stu_id -> Text,
        stu_name -> Text,
        seat -> BigInt,
        subcourse_id -> BigInt,
    }
}

/// Look up a student's name and seat in a subcourse roster.
///
/// # Errors
/// Returns a query error if the read fails. A missing roster entry is `Ok(None)`.
pub fn get_student_name_and_seat(
    conn: &mut SqliteConnection,
    input_stu_id: &str,
    input_subcourse_id: i64,
) -> Result<Option<(String, i64)>> {
    use self::students::dsl::*;

    students
        .filter(stu_id.eq(input_stu_id))
        .filter(subcourse_id.eq(input_subcourse_id))
        .order(id.asc())
        .select((stu_name, seat))
        .first::<(String, i64)>(conn)
        .optional()
        .map_err(|e| ReconcileError::Query(e.to_string()))
}
