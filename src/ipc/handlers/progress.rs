use serde_json::json;

use crate::ipc::error::{err, fail, ok};
use crate::ipc::helpers::required_str;
use crate::ipc::types::{AppState, Request};
use crate::model::{ProgressStatus, ProgressType};
use crate::progress::NewProgress;

fn handle_progress_record(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(hub) = state.data.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let Some(student_id) = required_str(&req.params, "studentId") else {
        return err(&req.id, "bad_params", "missing studentId", None);
    };
    let kind = match req
        .params
        .get("type")
        .and_then(|v| v.as_str())
        .and_then(ProgressType::parse)
    {
        Some(v) => v,
        None => return err(&req.id, "bad_params", "type must be hifz or murajaah", None),
    };
    let status = match req
        .params
        .get("status")
        .and_then(|v| v.as_str())
        .and_then(ProgressStatus::parse)
    {
        Some(v) => v,
        None => {
            return err(
                &req.id,
                "bad_params",
                "status must be correct or incorrect",
                None,
            )
        }
    };
    // surah/details are free-form; blank is accepted as-is.
    let surah = req
        .params
        .get("surah")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    let details = req
        .params
        .get("details")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    let entry = NewProgress {
        kind,
        status,
        surah,
        details,
    };
    match hub.recorder.record(&hub.store, &student_id, entry) {
        Ok(record) => ok(&req.id, json!({ "record": record })),
        Err(e) => fail(&req.id, "student", e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "progress.record" => Some(handle_progress_record(state, req)),
        _ => None,
    }
}
