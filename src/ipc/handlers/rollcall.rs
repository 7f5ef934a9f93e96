use crate::db;
use crate::export::{self, ExportRecord};
use crate::ipc::error::{err, get_required_str, ok, HandlerErr};
use crate::ipc::types::{AppState, Request};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension};
use serde_json::json;
use std::path::Path;

fn student_name(conn: &Connection, regno: &str) -> Result<Option<String>, HandlerErr> {
    conn.query_row(
        "SELECT student_name FROM students WHERE regno = ?",
        [regno],
        |r| r.get::<_, String>(0),
    )
    .optional()
    .map_err(|e| HandlerErr::db("db_query_failed", e))
}

fn rollcall_submit(
    conn: &Connection,
    workspace: &Path,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let date = get_required_str(params, "date")?;
    if NaiveDate::parse_from_str(&date, "%Y-%m-%d").is_err() {
        return Err(HandlerErr::bad_params("date must be YYYY-MM-DD"));
    }

    let Some(entries) = params.get("attendance").and_then(|v| v.as_object()) else {
        return Err(HandlerErr::bad_params("missing attendance map"));
    };
    if entries.is_empty() {
        return Err(HandlerErr::bad_params("attendance map must not be empty"));
    }

    let mut submitted: Vec<(String, String)> = Vec::with_capacity(entries.len());
    for (regno, status) in entries {
        let Some(status) = status.as_str().map(str::trim) else {
            return Err(HandlerErr::bad_params(format!(
                "status for {} must be a string",
                regno
            )));
        };
        if status.is_empty() {
            return Err(HandlerErr::bad_params(format!(
                "status for {} must not be empty",
                regno
            )));
        }
        submitted.push((regno.clone(), status.to_string()));
    }
    // Deterministic insert and export order.
    submitted.sort_by(|a, b| a.0.cmp(&b.0));

    let tx = conn
        .unchecked_transaction()
        .map_err(|e| HandlerErr::db("db_tx_failed", e))?;
    let mut exported: Vec<ExportRecord> = Vec::new();
    let mut skipped: Vec<String> = Vec::new();
    for (regno, status) in &submitted {
        let Some(name) = student_name(&tx, regno)? else {
            skipped.push(regno.clone());
            continue;
        };
        tx.execute(
            "INSERT INTO attendance(student_regno, date, status) VALUES(?, ?, ?)",
            (regno, &date, status),
        )
        .map_err(|e| {
            HandlerErr::db("db_insert_failed", e).with_details(json!({ "table": "attendance" }))
        })?;
        exported.push(ExportRecord {
            student_name: name,
            regno: regno.clone(),
            status: status.clone(),
        });
    }
    tx.commit()
        .map_err(|e| HandlerErr::db("db_commit_failed", e))?;

    // Resubmitting a date replaces that date's export file; the database
    // keeps every submission.
    let filename = export::export_filename(&date);
    let content = export::render_export(&date, &exported);
    std::fs::write(db::export_dir(workspace).join(&filename), content).map_err(|e| {
        HandlerErr::new("io_failed", e.to_string()).with_details(json!({ "file": filename }))
    })?;

    Ok(json!({
        "date": date,
        "inserted": exported.len(),
        "skipped": skipped,
        "exportFile": filename
    }))
}

fn handle_rollcall_submit(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (Some(conn), Some(workspace)) = (state.db.as_ref(), state.workspace.as_ref()) else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    match rollcall_submit(conn, workspace, &req.params) {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "rollcall.submit" => Some(handle_rollcall_submit(state, req)),
        _ => None,
    }
}
