//! Delete-time referential integrity. Runs a dependent-row query before the
//! store delete; the check and the delete are not one atomic transaction, so
//! a concurrent create of a dependent between the two is a documented race.
//!
//! Create/update of a halaqa's periodId/teacherId is deliberately NOT checked;
//! enforcement is delete-side only (accepted debt, see DESIGN.md).

use crate::error::DataError;
use crate::store::{self, DocumentStore};

pub fn delete_period(store: &DocumentStore, period_id: &str) -> Result<(), DataError> {
    if !store.query(store::HALAQAS, "periodId", period_id)?.is_empty() {
        return Err(DataError::ConstraintViolation(
            "period has dependent halaqas".to_string(),
        ));
    }
    store.delete(store::PERIODS, period_id)
}

pub fn delete_teacher(store: &DocumentStore, teacher_id: &str) -> Result<(), DataError> {
    if store.get(store::TEACHERS, teacher_id)?.is_none() {
        return Err(DataError::NotFound);
    }
    if !store.query(store::HALAQAS, "teacherId", teacher_id)?.is_empty() {
        return Err(DataError::ConstraintViolation(
            "teacher has dependent halaqas".to_string(),
        ));
    }
    store.delete(store::TEACHERS, teacher_id)
}

pub fn delete_halaqa(store: &DocumentStore, halaqa_id: &str) -> Result<(), DataError> {
    if !store.query(store::STUDENTS, "halaqaId", halaqa_id)?.is_empty() {
        return Err(DataError::ConstraintViolation(
            "halaqa has dependent students".to_string(),
        ));
    }
    store.delete(store::HALAQAS, halaqa_id)
}

/// Unconditional: nothing references a student, and the progress records go
/// down with the owning document.
pub fn delete_student(store: &DocumentStore, student_id: &str) -> Result<(), DataError> {
    store.delete(store::STUDENTS, student_id)
}
