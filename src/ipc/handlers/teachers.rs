use serde_json::json;

use crate::guard;
use crate::ipc::error::{err, fail, ok};
use crate::ipc::helpers::{patch_str, required_str};
use crate::ipc::types::{AppState, Request};
use crate::store;

fn handle_teachers_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(hub) = state.data.as_ref() else {
        return ok(&req.id, json!({ "teachers": [] }));
    };
    ok(&req.id, json!({ "teachers": hub.sync.teachers() }))
}

fn handle_teachers_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(hub) = state.data.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let Some(name) = required_str(&req.params, "name") else {
        return err(&req.id, "bad_params", "missing name", None);
    };
    let Some(name_ar) = required_str(&req.params, "nameAr") else {
        return err(&req.id, "bad_params", "missing nameAr", None);
    };

    match hub
        .store
        .add(store::TEACHERS, json!({ "name": name, "nameAr": name_ar }))
    {
        Ok(teacher_id) => ok(
            &req.id,
            json!({ "teacherId": teacher_id, "name": name, "nameAr": name_ar }),
        ),
        Err(e) => fail(&req.id, "teacher", e),
    }
}

fn handle_teachers_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(hub) = state.data.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let Some(teacher_id) = required_str(&req.params, "teacherId") else {
        return err(&req.id, "bad_params", "missing teacherId", None);
    };
    let patch = req.params.get("patch").cloned().unwrap_or_else(|| json!({}));

    let mut fields = serde_json::Map::new();
    for key in ["name", "nameAr"] {
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
        .update(store::TEACHERS, &teacher_id, json!(fields))
    {
        Ok(()) => ok(&req.id, json!({ "ok": true })),
        Err(e) => fail(&req.id, "teacher", e),
    }
}

fn handle_teachers_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(hub) = state.data.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let Some(teacher_id) = required_str(&req.params, "teacherId") else {
        return err(&req.id, "bad_params", "missing teacherId", None);
    };

    match guard::delete_teacher(&hub.store, &teacher_id) {
        Ok(()) => ok(&req.id, json!({ "ok": true })),
        Err(e) => fail(&req.id, "teacher", e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "teachers.list" => Some(handle_teachers_list(state, req)),
        "teachers.create" => Some(handle_teachers_create(state, req)),
        "teachers.update" => Some(handle_teachers_update(state, req)),
        "teachers.delete" => Some(handle_teachers_delete(state, req)),
        _ => None,
    }
}
