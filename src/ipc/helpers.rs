use serde_json::Value;

/// Required string param, trimmed; `None` when missing or blank.
pub fn required_str(params: &Value, key: &str) -> Option<String> {
    let v = params.get(key)?.as_str()?.trim().to_string();
    if v.is_empty() {
        None
    } else {
        Some(v)
    }
}

/// Pulls an optional field out of an update patch. Present-but-blank is an
/// error (names must stay non-empty); absent means "leave unchanged".
pub fn patch_str(patch: &Value, key: &str) -> Result<Option<String>, String> {
    match patch.get(key) {
        None => Ok(None),
        Some(v) => {
            let s = v
                .as_str()
                .ok_or_else(|| format!("{key} must be a string"))?
                .trim()
                .to_string();
            if s.is_empty() {
                Err(format!("{key} must not be empty"))
            } else {
                Ok(Some(s))
            }
        }
    }
}
