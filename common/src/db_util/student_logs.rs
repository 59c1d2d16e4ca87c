use super::*;

table! {
    student_logs (id) {
        id -> BigInt,
        stu_id -> Text,
        stu_name -> Text,
        subcourse_id -> BigInt,
        room_id -> BigInt,
        seat -> BigInt,
        lab_name -> Text,
        note -> Text,
        tea_note -> Text,
        tea_name -> Text,
        fin_time -> Timestamp,
        confirm -> BigInt,
    }
}

#[derive(Queryable)]
struct StudentLogPrivate {
    id: i64,
    stu_id: String,
    stu_name: String,
    subcourse_id: i64,
    room_id: i64,
    seat: i64,
    lab_name: String,
    note: String,
    tea_note: String,
    tea_name: String,
    fin_time: NaiveDateTime,
    confirm: i64,
}

#[derive(Insertable)]
#[diesel(table_name = student_logs)]
struct StudentLogPrivateNew {
    stu_id: String,
    stu_name: String,
    subcourse_id: i64,
    room_id: i64,
    seat: i64,
    lab_name: String,
    note: String,
    tea_note: String,
    tea_name: String,
    fin_time: NaiveDateTime,
    confirm: i64,
}

fn private_to_public(p: StudentLogPrivate) -> Result<StudentLogRecord> {
    use conversions::*;
    Ok(StudentLogRecord {
        log_id: p.id,
        stu_id: p.stu_id,
        stu_name: p.stu_name,
        subcourse_id: p.subcourse_id,
        room_id: p.room_id,
        seat: p.seat,
        lab_name: p.lab_name,
        note: p.note,
        tea_note: p.tea_note,
        tea_name: p.tea_name,
        fin_time: p.fin_time,
        confirmed: i64_to_bool(p.confirm)?,
    })
}

fn build_new_row(p: &NewStudentLog) -> StudentLogPrivateNew {
    use conversions::*;
    StudentLogPrivateNew {
        stu_id: p.stu_id.clone(),
        stu_name: p.stu_name.clone(),
        subcourse_id: p.subcourse_id,
        room_id: p.room_id,
        seat: p.seat,
        lab_name: p.lab_name.clone(),
        note: p.note.clone(),
        tea_note: p.tea_note.clone(),
        tea_name: p.tea_name.clone(),
        fin_time: p.fin_time,
        confirm: bool_to_i64(p.confirmed),
    }
}

/// Every (student, subcourse) pair with any log at or after the cutoff, confirmed or not.
///
/// # Errors
/// Returns a query error if the read fails.
pub fn get_logged_pairs_since(
    conn: &mut SqliteConnection,
    cutoff: NaiveDateTime,
) -> Result<HashSet<LoggedPair>> {
    use self::student_logs::dsl::*;

    let rows = student_logs
        .filter(fin_time.ge(cutoff))
        .select((stu_id, subcourse_id))
        .distinct()
        .load::<(String, i64)>(conn)
        .map_err(|e| ReconcileError::Query(e.to_string()))?;
    Ok(rows
        .into_iter()
        .map(|(row_stu_id, row_subcourse_id)| LoggedPair {
            stu_id: row_stu_id,
            subcourse_id: row_subcourse_id,
        })
        .collect())
}

/// Full log rows at or after the cutoff, oldest first.
///
/// # Errors
/// Returns a query error if the read fails or a row carries an invalid confirm flag.
pub fn get_student_logs_since(
    conn: &mut SqliteConnection,
    cutoff: NaiveDateTime,
) -> Result<Vec<StudentLogRecord>> {
    use self::student_logs::dsl::*;

    student_logs
        .filter(fin_time.ge(cutoff))
        .order((fin_time.asc(), id.asc()))
        .load::<StudentLogPrivate>(conn)
        .map_err(|e| ReconcileError::Query(e.to_string()))?
        .into_iter()
        .map(private_to_public)
        .collect()
}

/// Insert a single log row.
///
/// # Errors
/// Returns a write error if the insert fails.
pub fn insert_student_log(conn: &mut SqliteConnection, new_log: &NewStudentLog) -> Result<()> {
    use self::student_logs::dsl::*;

    let insert_row = build_new_row(new_log);
    diesel::insert_into(student_logs)
        .values(&insert_row)
        .execute(conn)
        .map_err(|e| ReconcileError::Write(e.to_string()))?;
    Ok(())
}

/// Confirm every unconfirmed log at or after the cutoff, stamping the reviewer fields.
/// Rows that are already confirmed are not touched. Returns the number of rows updated.
///
/// # Errors
/// Returns a write error if the update fails.
pub fn confirm_pending_logs_since(
    conn: &mut SqliteConnection,
    cutoff: NaiveDateTime,
    input_tea_note: &str,
    input_tea_name: &str,
) -> Result<usize> {
    use self::student_logs::dsl::*;

    diesel::update(student_logs.filter(confirm.eq(0)).filter(fin_time.ge(cutoff)))
        .set((
            confirm.eq(1),
            tea_note.eq(input_tea_note),
            tea_name.eq(input_tea_name),
        ))
        .execute(conn)
        .map_err(|e| ReconcileError::Write(e.to_string()))
}

/// Number of unconfirmed logs at or after the cutoff.
///
/// # Errors
/// Returns a query error if the read fails.
pub fn count_pending_logs_since(conn: &mut SqliteConnection, cutoff: NaiveDateTime) -> Result<usize> {
    use self::student_logs::dsl::*;

    let count = student_logs
        .filter(confirm.eq(0))
        .filter(fin_time.ge(cutoff))
        .count()
        .get_result::<i64>(conn)
        .map_err(|e| ReconcileError::Query(e.to_string()))?;
    conversions::i64_to_usize(count)
}
