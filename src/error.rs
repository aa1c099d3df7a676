use thiserror::Error;

/// Error surface of the data core. Everything the guard, the recorder and the
/// store adapter can fail with collapses into these three kinds; the IPC layer
/// maps them onto wire codes.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("not found")]
    NotFound,
    /// A delete-time referential check failed. The payload is the
    /// human-readable reason shown to the end user.
    #[error("{0}")]
    ConstraintViolation(String),
    #[error("store unavailable: {0}")]
    StoreUnavailable(anyhow::Error),
}

impl From<rusqlite::Error> for DataError {
    fn from(e: rusqlite::Error) -> Self {
        DataError::StoreUnavailable(e.into())
    }
}

impl From<serde_json::Error> for DataError {
    fn from(e: serde_json::Error) -> Self {
        DataError::StoreUnavailable(e.into())
    }
}
