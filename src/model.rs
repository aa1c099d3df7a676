use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressType {
    Hifz,
    Murajaah,
}

impl ProgressType {
    pub fn parse(s: &str) -> Option<ProgressType> {
        match s {
            "hifz" => Some(ProgressType::Hifz),
            "murajaah" => Some(ProgressType::Murajaah),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    Correct,
    Incorrect,
}

impl ProgressStatus {
    pub fn parse(s: &str) -> Option<ProgressStatus> {
        match s {
            "correct" => Some(ProgressStatus::Correct),
            "incorrect" => Some(ProgressStatus::Incorrect),
            _ => None,
        }
    }
}

/// Immutable once written. Lives embedded in the owning student document;
/// removed only when the student is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub id: String,
    /// RFC 3339 UTC timestamp. Uniform formatting keeps lexicographic order
    /// equal to chronological order, which the view sorts rely on.
    pub date: String,
    #[serde(rename = "type")]
    pub kind: ProgressType,
    pub status: ProgressStatus,
    pub surah: String,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub name_ar: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub name_ar: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Halaqa {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub name_ar: String,
    #[serde(default)]
    pub period_id: String,
    #[serde(default)]
    pub teacher_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub name_ar: String,
    pub halaqa_id: String,
    pub progress: Vec<ProgressRecord>,
}

fn from_fields<T: serde::de::DeserializeOwned>(doc: &Document) -> Option<T> {
    let mut fields = doc.fields.clone();
    let obj = fields.as_object_mut()?;
    obj.insert("id".to_string(), Value::String(doc.id.clone()));
    serde_json::from_value(fields).ok()
}

impl Period {
    pub fn from_document(doc: &Document) -> Option<Period> {
        from_fields(doc)
    }
}

impl Teacher {
    pub fn from_document(doc: &Document) -> Option<Teacher> {
        from_fields(doc)
    }
}

impl Halaqa {
    pub fn from_document(doc: &Document) -> Option<Halaqa> {
        from_fields(doc)
    }
}

impl Student {
    /// Flattens the embedded progress array. A malformed element is skipped
    /// rather than poisoning the whole student.
    pub fn from_document(doc: &Document) -> Option<Student> {
        let obj = doc.fields.as_object()?;
        let text = |key: &str| {
            obj.get(key)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };
        let progress = obj
            .get("progress")
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| serde_json::from_value(item.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();
        Some(Student {
            id: doc.id.clone(),
            name: text("name"),
            name_ar: text("nameAr"),
            halaqa_id: text("halaqaId"),
            progress,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn student_normalization_skips_malformed_progress_elements() {
        let doc = Document {
            id: "s1".into(),
            fields: json!({
                "name": "Omar",
                "nameAr": "عمر",
                "halaqaId": "h1",
                "progress": [
                    {
                        "id": "p1-0",
                        "date": "2024-09-01T10:00:00.000Z",
                        "type": "hifz",
                        "status": "correct",
                        "surah": "Al-Baqarah",
                        "details": "1-5"
                    },
                    { "id": "broken", "type": "unknown-kind" },
                    42
                ]
            }),
        };

        let student = Student::from_document(&doc).expect("normalize student");
        assert_eq!(student.halaqa_id, "h1");
        assert_eq!(student.progress.len(), 1);
        assert_eq!(student.progress[0].kind, ProgressType::Hifz);
        assert_eq!(student.progress[0].status, ProgressStatus::Correct);
    }

    #[test]
    fn halaqa_normalization_tolerates_missing_references() {
        let doc = Document {
            id: "h9".into(),
            fields: json!({ "name": "Morning", "nameAr": "الصباح" }),
        };
        let halaqa = Halaqa::from_document(&doc).expect("normalize halaqa");
        assert_eq!(halaqa.period_id, "");
        assert_eq!(halaqa.teacher_id, "");
    }

    #[test]
    fn progress_record_round_trips_wire_field_names() {
        let record = ProgressRecord {
            id: "p1700000000000-3".into(),
            date: "2024-09-01T10:00:00.000Z".into(),
            kind: ProgressType::Murajaah,
            status: ProgressStatus::Incorrect,
            surah: "Ya-Sin".into(),
            details: "Ya-Sin".into(),
        };
        let value = serde_json::to_value(&record).expect("serialize");
        assert_eq!(value.get("type").and_then(|v| v.as_str()), Some("murajaah"));
        assert_eq!(
            value.get("status").and_then(|v| v.as_str()),
            Some("incorrect")
        );
    }
}
