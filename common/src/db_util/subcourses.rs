use super::*;

table! {
    subcourses (id) {
        id -> BigInt,
        room_id -> BigInt,
    }
}

/// Look up the room a subcourse is held in.
///
/// # Errors
/// Returns a query error if the read fails. An unknown subcourse is `Ok(None)`.
pub fn get_subcourse_room(conn: &mut SqliteConnection, subcourse_id: i64) -> Result<Option<i64>> {
    use self::subcourses::dsl::*;

    subcourses
        .filter(id.eq(subcourse_id))
        .select(room_id)
        .first::<i64>(conn)
        .optional()
        .map_err(|e| ReconcileError::Query(e.to_string()))
}
