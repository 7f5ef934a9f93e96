use crate::ipc::error::{err, ok, HandlerErr};
use crate::ipc::types::{AppState, Request};
use rusqlite::Connection;
use serde_json::json;

/// Recognized filter states: "present" and "absent" narrow to the
/// conventional status values; anything else means the full join.
fn status_filter(params: &serde_json::Value) -> Option<&'static str> {
    match params.get("status").and_then(|v| v.as_str()) {
        Some("present") => Some("Present"),
        Some("absent") => Some("Absent"),
        _ => None,
    }
}

fn attendance_list(
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let filter = status_filter(params);

    // Inner join: attendance rows without a matching student fall out, as do
    // students with no attendance.
    let base = "SELECT a.id, a.date, a.status, s.regno, s.student_name, s.gender
                FROM attendance a
                JOIN students s ON s.regno = a.student_regno";
    let map_row = |row: &rusqlite::Row<'_>| {
        let id: i64 = row.get(0)?;
        let date: String = row.get(1)?;
        let status: String = row.get(2)?;
        let regno: String = row.get(3)?;
        let name: String = row.get(4)?;
        let gender: String = row.get(5)?;
        Ok(json!({
            "id": id,
            "date": date,
            "status": status,
            "regno": regno,
            "studentName": name,
            "gender": gender
        }))
    };

    let rows = match filter {
        Some(status) => {
            let sql = format!("{} WHERE a.status = ? ORDER BY a.id", base);
            let mut stmt = conn
                .prepare(&sql)
                .map_err(|e| HandlerErr::db("db_query_failed", e))?;
            stmt.query_map([status], map_row)
                .and_then(|it| it.collect::<Result<Vec<_>, _>>())
                .map_err(|e| HandlerErr::db("db_query_failed", e))?
        }
        None => {
            let sql = format!("{} ORDER BY a.id", base);
            let mut stmt = conn
                .prepare(&sql)
                .map_err(|e| HandlerErr::db("db_query_failed", e))?;
            stmt.query_map([], map_row)
                .and_then(|it| it.collect::<Result<Vec<_>, _>>())
                .map_err(|e| HandlerErr::db("db_query_failed", e))?
        }
    };

    Ok(json!({ "records": rows }))
}

fn handle_attendance_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    match attendance_list(conn, &req.params) {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "attendance.list" => Some(handle_attendance_list(state, req)),
        _ => None,
    }
}
