use serde_json::json;

use crate::error::DataError;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

/// Maps a data-core failure onto the wire. `entity` names the mutation target
/// so NotFound reads as "period not found" rather than a bare "not found".
pub fn fail(id: &str, entity: &str, e: DataError) -> serde_json::Value {
    match e {
        DataError::NotFound => err(id, "not_found", format!("{entity} not found"), None),
        DataError::ConstraintViolation(reason) => err(id, "constraint_violation", reason, None),
        DataError::StoreUnavailable(cause) => {
            err(id, "store_unavailable", format!("{cause:#}"), None)
        }
    }
}
