use crate::db;
use crate::export;
use crate::ipc::error::{err, get_required_str, ok, HandlerErr};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::Path;

fn safe_filename(name: &str) -> bool {
    !name.is_empty() && !name.contains('/') && !name.contains('\\') && name != "." && name != ".."
}

fn exports_list(workspace: &Path) -> Result<serde_json::Value, HandlerErr> {
    let dir = db::export_dir(workspace);
    let mut names: Vec<String> = Vec::new();
    if dir.is_dir() {
        let entries = std::fs::read_dir(&dir)
            .map_err(|e| HandlerErr::new("io_failed", e.to_string()))?;
        for ent in entries {
            let ent = ent.map_err(|e| HandlerErr::new("io_failed", e.to_string()))?;
            if !ent.path().is_file() {
                continue;
            }
            if let Some(name) = ent.file_name().to_str() {
                names.push(name.to_string());
            }
        }
    }
    // Deterministic listing regardless of directory order.
    names.sort();

    let files: Vec<serde_json::Value> = names
        .iter()
        .map(|name| {
            json!({
                "filename": name,
                "date": export::date_token(name)
            })
        })
        .collect();
    Ok(json!({ "files": files }))
}

fn exports_view(workspace: &Path, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let filename = get_required_str(params, "filename")?;
    if !safe_filename(&filename) {
        return Err(HandlerErr::bad_params("filename must be a bare file name"));
    }

    let path = db::export_dir(workspace).join(&filename);
    if !path.is_file() {
        return Err(HandlerErr::not_found("file not found")
            .with_details(json!({ "filename": filename })));
    }
    let content = std::fs::read_to_string(&path)
        .map_err(|e| HandlerErr::new("io_failed", e.to_string()))?;

    let parsed = export::parse_export(&content);
    let records: Vec<serde_json::Value> = parsed
        .records
        .iter()
        .map(|r| {
            json!({
                "studentName": r.student_name,
                "regno": r.regno,
                "status": r.status
            })
        })
        .collect();

    // An empty file is a reportable state, not an error.
    let date = if parsed.empty {
        "N/A".to_string()
    } else {
        export::date_token(&filename).to_string()
    };
    let mut result = json!({
        "filename": filename,
        "date": date,
        "records": records,
        "empty": parsed.empty,
        "skippedLines": parsed.skipped_lines
    });
    if parsed.empty {
        result["message"] = json!("The file is empty or contains no records.");
    }
    Ok(result)
}

fn with_workspace(
    state: &AppState,
    req: &Request,
    f: impl FnOnce(&Path) -> Result<serde_json::Value, HandlerErr>,
) -> serde_json::Value {
    let Some(workspace) = state.workspace.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    match f(workspace) {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "exports.list" => Some(with_workspace(state, req, exports_list)),
        "exports.view" => Some(with_workspace(state, req, |ws| exports_view(ws, &req.params))),
        _ => None,
    }
}
