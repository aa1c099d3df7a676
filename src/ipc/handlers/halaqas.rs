use serde_json::json;

use crate::guard;
use crate::ipc::error::{err, fail, ok};
use crate::ipc::helpers::{patch_str, required_str};
use crate::ipc::types::{AppState, Request};
use crate::store;

fn handle_halaqas_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(hub) = state.data.as_ref() else {
        return ok(&req.id, json!({ "halaqas": [] }));
    };
    ok(&req.id, json!({ "halaqas": hub.sync.halaqas() }))
}

fn handle_halaqas_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(hub) = state.data.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let Some(name) = required_str(&req.params, "name") else {
        return err(&req.id, "bad_params", "missing name", None);
    };
    let Some(name_ar) = required_str(&req.params, "nameAr") else {
        return err(&req.id, "bad_params", "missing nameAr", None);
    };
    let Some(period_id) = required_str(&req.params, "periodId") else {
        return err(&req.id, "bad_params", "missing periodId", None);
    };
    let Some(teacher_id) = required_str(&req.params, "teacherId") else {
        return err(&req.id, "bad_params", "missing teacherId", None);
    };

    // The referenced period/teacher are not checked for existence; only the
    // delete side enforces the relation.
    match hub.store.add(
        store::HALAQAS,
        json!({
            "name": name,
            "nameAr": name_ar,
            "periodId": period_id,
            "teacherId": teacher_id
        }),
    ) {
        Ok(halaqa_id) => ok(
            &req.id,
            json!({
                "halaqaId": halaqa_id,
                "name": name,
                "nameAr": name_ar,
                "periodId": period_id,
                "teacherId": teacher_id
            }),
        ),
        Err(e) => fail(&req.id, "halaqa", e),
    }
}

fn handle_halaqas_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(hub) = state.data.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let Some(halaqa_id) = required_str(&req.params, "halaqaId") else {
        return err(&req.id, "bad_params", "missing halaqaId", None);
    };
    let patch = req.params.get("patch").cloned().unwrap_or_else(|| json!({}));

    let mut fields = serde_json::Map::new();
    for key in ["name", "nameAr", "periodId", "teacherId"] {
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
        .update(store::HALAQAS, &halaqa_id, json!(fields))
    {
        Ok(()) => ok(&req.id, json!({ "ok": true })),
        Err(e) => fail(&req.id, "halaqa", e),
    }
}

fn handle_halaqas_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(hub) = state.data.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let Some(halaqa_id) = required_str(&req.params, "halaqaId") else {
        return err(&req.id, "bad_params", "missing halaqaId", None);
    };

    match guard::delete_halaqa(&hub.store, &halaqa_id) {
        Ok(()) => ok(&req.id, json!({ "ok": true })),
        Err(e) => fail(&req.id, "halaqa", e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "halaqas.list" => Some(handle_halaqas_list(state, req)),
        "halaqas.create" => Some(handle_halaqas_create(state, req)),
        "halaqas.update" => Some(handle_halaqas_update(state, req)),
        "halaqas.delete" => Some(handle_halaqas_delete(state, req)),
        _ => None,
    }
}
