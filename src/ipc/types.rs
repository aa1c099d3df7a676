use std::path::PathBuf;
use std::rc::Rc;

use serde::Deserialize;

use crate::progress::ProgressRecorder;
use crate::store::DocumentStore;
use crate::sync::EntitySync;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Everything that exists only while a workspace is selected. Dropping it
/// detaches the sync layer before the store goes away.
pub struct DataHub {
    pub store: Rc<DocumentStore>,
    pub sync: EntitySync,
    pub recorder: ProgressRecorder,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub data: Option<DataHub>,
}
