use std::path::PathBuf;
use std::rc::Rc;

use serde_json::json;

use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, DataHub, Request};
use crate::progress::ProgressRecorder;
use crate::store::DocumentStore;
use crate::sync::EntitySync;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string())
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    let store = match DocumentStore::open(&path) {
        Ok(store) => Rc::new(store),
        Err(e) => return err(&req.id, "store_open_failed", format!("{e:?}"), None),
    };

    // Detach the previous workspace's subscriptions before the new ones open.
    state.data = None;
    state.workspace = None;

    let sync = match EntitySync::attach(Rc::clone(&store)) {
        Ok(sync) => sync,
        Err(e) => return err(&req.id, "store_open_failed", e.to_string(), None),
    };

    state.workspace = Some(path.clone());
    state.data = Some(DataHub {
        store,
        sync,
        recorder: ProgressRecorder::new(),
    });
    ok(&req.id, json!({ "workspacePath": path.to_string_lossy() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        _ => None,
    }
}
