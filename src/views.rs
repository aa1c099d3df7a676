//! Role-scoped projections over the synchronized collections. Everything here
//! is pure and recomputed per read; reverse lookups scan rather than keeping
//! indexes, which is fine at institute scale.

use serde::Serialize;

use crate::model::{Halaqa, ProgressRecord, ProgressStatus, ProgressType, Student, Teacher};

/// Newest first by record date. The sort is stable, so records sharing a
/// timestamp keep insertion order; only "newest known first" is guaranteed.
pub fn sorted_history(progress: &[ProgressRecord]) -> Vec<ProgressRecord> {
    let mut history = progress.to_vec();
    history.sort_by(|a, b| b.date.cmp(&a.date));
    history
}

pub fn halaqas_for_teacher(halaqas: &[Halaqa], teacher_id: &str) -> Vec<Halaqa> {
    halaqas
        .iter()
        .filter(|h| h.teacher_id == teacher_id)
        .cloned()
        .collect()
}

pub fn students_in_halaqa(students: &[Student], halaqa_id: &str) -> Vec<Student> {
    students
        .iter()
        .filter(|s| s.halaqa_id == halaqa_id)
        .cloned()
        .collect()
}

/// The student's incorrect records, newest first. Surfaced to the student as
/// notifications ("areas for improvement").
pub fn notifications(student: &Student) -> Vec<ProgressRecord> {
    let incorrect: Vec<ProgressRecord> = student
        .progress
        .iter()
        .filter(|p| p.status == ProgressStatus::Incorrect)
        .cloned()
        .collect();
    sorted_history(&incorrect)
}

/// Institute-wide concatenation of every student's progress, newest first.
pub fn all_progress(students: &[Student]) -> Vec<ProgressRecord> {
    let combined: Vec<ProgressRecord> = students
        .iter()
        .flat_map(|s| s.progress.iter().cloned())
        .collect();
    sorted_history(&combined)
}

/// The counts the performance charts are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStats {
    pub total_correct: usize,
    pub total_incorrect: usize,
    pub hifz_correct: usize,
    pub hifz_incorrect: usize,
    pub murajaah_correct: usize,
    pub murajaah_incorrect: usize,
}

pub fn progress_stats(progress: &[ProgressRecord]) -> ProgressStats {
    let mut stats = ProgressStats {
        total_correct: 0,
        total_incorrect: 0,
        hifz_correct: 0,
        hifz_incorrect: 0,
        murajaah_correct: 0,
        murajaah_incorrect: 0,
    };
    for record in progress {
        match record.status {
            ProgressStatus::Correct => {
                stats.total_correct += 1;
                match record.kind {
                    ProgressType::Hifz => stats.hifz_correct += 1,
                    ProgressType::Murajaah => stats.murajaah_correct += 1,
                }
            }
            ProgressStatus::Incorrect => {
                stats.total_incorrect += 1;
                match record.kind {
                    ProgressType::Hifz => stats.hifz_incorrect += 1,
                    ProgressType::Murajaah => stats.murajaah_incorrect += 1,
                }
            }
        }
    }
    stats
}

/// One row of the supervisor's roster table: student joined to its halaqa and
/// the halaqa's teacher. Either side of the join may be absent while the
/// mirrors are catching up; that renders as a missing cell, not an error.
#[derive(Debug, Clone)]
pub struct RosterRow {
    pub student: Student,
    pub halaqa: Option<Halaqa>,
    pub teacher: Option<Teacher>,
}

pub fn roster(students: &[Student], halaqas: &[Halaqa], teachers: &[Teacher]) -> Vec<RosterRow> {
    students
        .iter()
        .map(|student| {
            let halaqa = halaqas.iter().find(|h| h.id == student.halaqa_id).cloned();
            let teacher = halaqa
                .as_ref()
                .and_then(|h| teachers.iter().find(|t| t.id == h.teacher_id))
                .cloned();
            RosterRow {
                student: student.clone(),
                halaqa,
                teacher,
            }
        })
        .collect()
}
