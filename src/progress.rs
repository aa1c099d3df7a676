use std::cell::Cell;

use chrono::{SecondsFormat, Utc};

use crate::error::DataError;
use crate::model::{ProgressRecord, ProgressStatus, ProgressType};
use crate::store::{self, DocumentStore};

/// The caller-supplied part of a progress record; id and timestamp are
/// assigned here. surah/details are free-form and stored as-is.
#[derive(Debug, Clone)]
pub struct NewProgress {
    pub kind: ProgressType,
    pub status: ProgressStatus,
    pub surah: String,
    pub details: String,
}

/// Appends immutable progress records to a student document.
///
/// Record ids are `p<millis>-<seq>`: wall-clock millis for readability plus a
/// strictly monotonic per-process sequence, so two records minted in the same
/// clock tick still get distinct ids.
pub struct ProgressRecorder {
    sequence: Cell<u64>,
}

impl ProgressRecorder {
    pub fn new() -> ProgressRecorder {
        ProgressRecorder {
            sequence: Cell::new(0),
        }
    }

    /// Fails with `NotFound` when the student id does not resolve; the store
    /// detects that, there is no pre-check here.
    pub fn record(
        &self,
        store: &DocumentStore,
        student_id: &str,
        entry: NewProgress,
    ) -> Result<ProgressRecord, DataError> {
        let sequence = self.sequence.get();
        self.sequence.set(sequence + 1);

        let now = Utc::now();
        let record = ProgressRecord {
            id: format!("p{}-{}", now.timestamp_millis(), sequence),
            date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            kind: entry.kind,
            status: entry.status,
            surah: entry.surah,
            details: entry.details,
        };

        let element = serde_json::to_value(&record)?;
        store.array_union(store::STUDENTS, student_id, "progress", element)?;
        Ok(record)
    }
}

impl Default for ProgressRecorder {
    fn default() -> Self {
        Self::new()
    }
}
