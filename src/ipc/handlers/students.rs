use crate::ipc::error::{err, get_required_str, ok, HandlerErr};
use crate::ipc::types::{AppState, Request};
use rusqlite::{Connection, OptionalExtension};
use serde_json::json;

fn student_exists(conn: &Connection, regno: &str) -> Result<bool, HandlerErr> {
    conn.query_row("SELECT 1 FROM students WHERE regno = ?", [regno], |r| {
        r.get::<_, i64>(0)
    })
    .optional()
    .map(|v| v.is_some())
    .map_err(|e| HandlerErr::db("db_query_failed", e))
}

fn attendance_count(conn: &Connection, regno: &str) -> Result<i64, HandlerErr> {
    conn.query_row(
        "SELECT COUNT(*) FROM attendance WHERE student_regno = ?",
        [regno],
        |r| r.get(0),
    )
    .map_err(|e| HandlerErr::db("db_query_failed", e))
}

fn students_list(conn: &Connection) -> Result<serde_json::Value, HandlerErr> {
    let mut stmt = conn
        .prepare(
            "SELECT
               s.regno,
               s.student_name,
               s.gender,
               (SELECT COUNT(*) FROM attendance a WHERE a.student_regno = s.regno) AS record_count
             FROM students s
             ORDER BY s.regno",
        )
        .map_err(|e| HandlerErr::db("db_query_failed", e))?;
    let students = stmt
        .query_map([], |row| {
            let regno: String = row.get(0)?;
            let name: String = row.get(1)?;
            let gender: String = row.get(2)?;
            let record_count: i64 = row.get(3)?;
            Ok(json!({
                "regno": regno,
                "studentName": name,
                "gender": gender,
                "attendanceCount": record_count
            }))
        })
        .and_then(|it| it.collect::<Result<Vec<_>, _>>())
        .map_err(|e| HandlerErr::db("db_query_failed", e))?;
    Ok(json!({ "students": students }))
}

fn students_create(
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let regno = get_required_str(params, "regno")?;
    let name = get_required_str(params, "studentName")?;
    let gender = get_required_str(params, "gender")?;

    if student_exists(conn, &regno)? {
        return Err(
            HandlerErr::new("duplicate_regno", "student with this regno already exists")
                .with_details(json!({ "regno": regno })),
        );
    }

    conn.execute(
        "INSERT INTO students(regno, student_name, gender) VALUES(?, ?, ?)",
        (&regno, &name, &gender),
    )
    .map_err(|e| HandlerErr::db("db_insert_failed", e).with_details(json!({ "table": "students" })))?;

    Ok(json!({
        "regno": regno,
        "studentName": name,
        "gender": gender
    }))
}

fn students_delete(
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let regno = get_required_str(params, "regno")?;

    if !student_exists(conn, &regno)? {
        return Err(HandlerErr::not_found("student not found"));
    }

    // Policy: refuse to orphan attendance rows. The foreign key would reject
    // the delete anyway; surface it as a distinct condition instead.
    let dependent = attendance_count(conn, &regno)?;
    if dependent > 0 {
        return Err(
            HandlerErr::new("has_attendance", "student has attendance records")
                .with_details(json!({ "regno": regno, "attendanceCount": dependent })),
        );
    }

    conn.execute("DELETE FROM students WHERE regno = ?", [&regno])
        .map_err(|e| HandlerErr::db("db_delete_failed", e))?;
    Ok(json!({ "regno": regno }))
}

fn with_db(
    state: &AppState,
    req: &Request,
    f: impl FnOnce(&Connection) -> Result<serde_json::Value, HandlerErr>,
) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    match f(conn) {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(with_db(state, req, students_list)),
        "students.create" => Some(with_db(state, req, |c| students_create(c, &req.params))),
        "students.delete" => Some(with_db(state, req, |c| students_delete(c, &req.params))),
        _ => None,
    }
}
