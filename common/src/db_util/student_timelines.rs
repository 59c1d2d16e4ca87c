use super::*;

table! {
    student_timelines (id) {
        id -> BigInt,
        stu_id -> Text,
        subcourse_id -> BigInt,
        schedule_id -> BigInt,
        timestamp -> Timestamp,
    }
}

#[derive(Queryable)]
struct TimelineKeyPrivate {
    stu_id: String,
    subcourse_id: i64,
    schedule_id: i64,
}

fn private_to_public(p: TimelineKeyPrivate) -> TimelineKey {
    TimelineKey {
        stu_id: p.stu_id,
        subcourse_id: p.subcourse_id,
        schedule_id: p.schedule_id,
    }
}

/// Every distinct (student, subcourse, schedule) seen at or after the cutoff.
///
/// # Errors
/// Returns a query error if the read fails.
pub fn get_timeline_keys_since(
    conn: &mut SqliteConnection,
    cutoff: NaiveDateTime,
) -> Result<Vec<TimelineKey>> {
    use self::student_timelines::dsl::*;

    let rows = student_timelines
        .filter(timestamp.ge(cutoff))
        .select((stu_id, subcourse_id, schedule_id))
        .distinct()
        .order((stu_id.asc(), subcourse_id.asc(), schedule_id.asc()))
        .load::<TimelineKeyPrivate>(conn)
        .map_err(|e| ReconcileError::Query(e.to_string()))?;
    Ok(rows.into_iter().map(private_to_public).collect())
}
