use serde_json::json;

use crate::guard;
use crate::ipc::error::{err, fail, ok};
use crate::ipc::helpers::{patch_str, required_str};
use crate::ipc::types::{AppState, Request};
use crate::store;

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(hub) = state.data.as_ref() else {
        return ok(&req.id, json!({ "students": [] }));
    };
    ok(&req.id, json!({ "students": hub.sync.students() }))
}

fn handle_students_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(hub) = state.data.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let Some(name) = required_str(&req.params, "name") else {
        return err(&req.id, "bad_params", "missing name", None);
    };
    let Some(name_ar) = required_str(&req.params, "nameAr") else {
        return err(&req.id, "bad_params", "missing nameAr", None);
    };
    let Some(halaqa_id) = required_str(&req.params, "halaqaId") else {
        return err(&req.id, "bad_params", "missing halaqaId", None);
    };

    match hub.store.add(
        store::STUDENTS,
        json!({
            "name": name,
            "nameAr": name_ar,
            "halaqaId": halaqa_id,
            "progress": []
        }),
    ) {
        Ok(student_id) => ok(
            &req.id,
            json!({
                "studentId": student_id,
                "name": name,
                "nameAr": name_ar,
                "halaqaId": halaqa_id
            }),
        ),
        Err(e) => fail(&req.id, "student", e),
    }
}

fn handle_students_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(hub) = state.data.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let Some(student_id) = required_str(&req.params, "studentId") else {
        return err(&req.id, "bad_params", "missing studentId", None);
    };
    let patch = req.params.get("patch").cloned().unwrap_or_else(|| json!({}));

    // progress never goes through update; it is append-only via the recorder.
    let mut fields = serde_json::Map::new();
    for key in ["name", "nameAr", "halaqaId"] {
        match patch_str(&patch, key) {
            Ok(Some(value)) => {
                fields.insert(key.to_string(), json!(value));
            }
            Ok(None) => {}
            Err(msg) => return err(&req.id, "bad_params", msg, None),
        }
    }

    match hub
        .store
        .update(store::STUDENTS, &student_id, json!(fields))
    {
        Ok(()) => ok(&req.id, json!({ "ok": true })),
        Err(e) => fail(&req.id, "student", e),
    }
}

fn handle_students_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(hub) = state.data.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let Some(student_id) = required_str(&req.params, "studentId") else {
        return err(&req.id, "bad_params", "missing studentId", None);
    };

    match guard::delete_student(&hub.store, &student_id) {
        Ok(()) => ok(&req.id, json!({ "ok": true })),
        Err(e) => fail(&req.id, "student", e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_students_list(state, req)),
        "students.create" => Some(handle_students_create(state, req)),
        "students.update" => Some(handle_students_update(state, req)),
        "students.delete" => Some(handle_students_delete(state, req)),
        _ => None,
    }
}
