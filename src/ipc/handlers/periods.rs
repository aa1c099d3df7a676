use serde_json::json;

use crate::guard;
use crate::ipc::error::{err, fail, ok};
use crate::ipc::helpers::{patch_str, required_str};
use crate::ipc::types::{AppState, Request};
use crate::store;

fn handle_periods_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(hub) = state.data.as_ref() else {
        return ok(&req.id, json!({ "periods": [] }));
    };
    ok(&req.id, json!({ "periods": hub.sync.periods() }))
}

fn handle_periods_create(state: &mut AppState, req: &Request) -> serde_json::Value {
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
        .add(store::PERIODS, json!({ "name": name, "nameAr": name_ar }))
    {
        Ok(period_id) => ok(
            &req.id,
            json!({ "periodId": period_id, "name": name, "nameAr": name_ar }),
        ),
        Err(e) => fail(&req.id, "period", e),
    }
}

fn handle_periods_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(hub) = state.data.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let Some(period_id) = required_str(&req.params, "periodId") else {
        return err(&req.id, "bad_params", "missing periodId", None);
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
        .update(store::PERIODS, &period_id, json!(fields))
    {
        Ok(()) => ok(&req.id, json!({ "ok": true })),
        Err(e) => fail(&req.id, "period", e),
    }
}

fn handle_periods_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(hub) = state.data.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let Some(period_id) = required_str(&req.params, "periodId") else {
        return err(&req.id, "bad_params", "missing periodId", None);
    };

    match guard::delete_period(&hub.store, &period_id) {
        Ok(()) => ok(&req.id, json!({ "ok": true })),
        Err(e) => fail(&req.id, "period", e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "periods.list" => Some(handle_periods_list(state, req)),
        "periods.create" => Some(handle_periods_create(state, req)),
        "periods.update" => Some(handle_periods_update(state, req)),
        "periods.delete" => Some(handle_periods_delete(state, req)),
        _ => None,
    }
}
