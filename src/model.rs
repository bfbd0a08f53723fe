use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Teachers, courses and subjects share the same `{id, name}` shape and the
/// same name-matching rules.
pub trait NamedEntity: Clone {
    fn with_name(id: String, name: String) -> Self;
    fn id(&self) -> &str;
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub name: String,
}

impl NamedEntity for Teacher {
    fn with_name(id: String, name: String) -> Self {
        Self { id, name }
    }
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
}

impl NamedEntity for Course {
    fn with_name(id: String, name: String) -> Self {
        Self { id, name }
    }
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
}

impl NamedEntity for Subject {
    fn with_name(id: String, name: String) -> Self {
        Self { id, name }
    }
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentLog {
    pub id: String,
    pub teacher_id: String,
    pub course_id: String,
    pub subject_id: String,
    /// Calendar date, `YYYY-MM-DD`. Imported rows keep whatever the
    /// extraction step produced.
    pub date: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
}

/// Identity of a log for deduplication. Observations are not part of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LogKey {
    date: String,
    teacher_id: String,
    course_id: String,
    subject_id: String,
    content: String,
}

impl ContentLog {
    pub fn key(&self) -> LogKey {
        LogKey {
            date: self.date.clone(),
            teacher_id: self.teacher_id.clone(),
            course_id: self.course_id.clone(),
            subject_id: self.subject_id.clone(),
            content: self.content.trim().to_string(),
        }
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_log_date(&self.date)
    }
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (its date part is used).
pub fn parse_log_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(d);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.date_naive())
}

/// The whole persisted state: one shared document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppData {
    #[serde(default)]
    pub teachers: Vec<Teacher>,
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub content_logs: Vec<ContentLog>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("duplicate {collection} id: {id}")]
    DuplicateId { collection: &'static str, id: String },
    #[error("content log {log_id} references unknown {field} {id}")]
    DanglingReference {
        log_id: String,
        field: &'static str,
        id: String,
    },
}

fn by_id<'a, E: NamedEntity>(collection: &'a [E], id: &str) -> Option<&'a E> {
    collection.iter().find(|e| e.id() == id)
}

impl AppData {
    pub fn teacher(&self, id: &str) -> Option<&Teacher> {
        by_id(&self.teachers, id)
    }

    pub fn course(&self, id: &str) -> Option<&Course> {
        by_id(&self.courses, id)
    }

    pub fn subject(&self, id: &str) -> Option<&Subject> {
        by_id(&self.subjects, id)
    }

    /// Checks id uniqueness per collection and that every log's foreign ids
    /// resolve. Reports the first violation found.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let teacher_ids = unique_ids("teacher", self.teachers.iter().map(|t| t.id.as_str()))?;
        let course_ids = unique_ids("course", self.courses.iter().map(|c| c.id.as_str()))?;
        let subject_ids = unique_ids("subject", self.subjects.iter().map(|s| s.id.as_str()))?;
        unique_ids(
            "content log",
            self.content_logs.iter().map(|l| l.id.as_str()),
        )?;

        for log in &self.content_logs {
            let refs = [
                ("teacherId", &log.teacher_id, &teacher_ids),
                ("courseId", &log.course_id, &course_ids),
                ("subjectId", &log.subject_id, &subject_ids),
            ];
            for (field, id, known) in refs {
                if !known.contains(id.as_str()) {
                    return Err(SnapshotError::DanglingReference {
                        log_id: log.id.clone(),
                        field,
                        id: id.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn unique_ids<'a>(
    collection: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<HashSet<&'a str>, SnapshotError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(SnapshotError::DuplicateId {
                collection,
                id: id.to_string(),
            });
        }
    }
    Ok(seen)
}

/// One row as returned by the extraction service. Every field may be absent;
/// the reconciler decides which rows are usable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRow {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, rename = "teacher")]
    pub teacher_name: Option<String>,
    #[serde(default, rename = "course")]
    pub course_name: Option<String>,
    #[serde(default, rename = "subject")]
    pub subject_name: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}
