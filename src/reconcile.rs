use crate::model::{new_id, AppData, CandidateRow, ContentLog};
use crate::resolve::resolve;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub rows_total: usize,
    pub rows_invalid: usize,
    pub logs_added: usize,
    pub logs_duplicate: usize,
    pub teachers_created: usize,
    pub courses_created: usize,
    pub subjects_created: usize,
}

#[derive(Debug, Clone)]
pub struct Reconciled {
    pub data: AppData,
    pub summary: ImportSummary,
}

struct RequiredFields<'a> {
    teacher: &'a str,
    course: &'a str,
    subject: &'a str,
    content: &'a str,
}

fn non_blank(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.trim().is_empty())
}

fn required_fields(row: &CandidateRow) -> Option<RequiredFields<'_>> {
    Some(RequiredFields {
        teacher: non_blank(&row.teacher_name)?,
        course: non_blank(&row.course_name)?,
        subject: non_blank(&row.subject_name)?,
        content: non_blank(&row.content)?,
    })
}

/// Merges extracted rows into `current`, producing the next full snapshot.
///
/// Rows are processed in order against the accumulating collections: a name
/// introduced by an earlier row is reused by later rows, and a log already
/// present (stored or added earlier in the batch) is not added twice. Rows
/// missing a teacher, course, subject or content are dropped without
/// touching any collection. Dates pass through unchecked.
pub fn reconcile(current: &AppData, rows: &[CandidateRow]) -> Reconciled {
    let mut teachers = current.teachers.clone();
    let mut courses = current.courses.clone();
    let mut subjects = current.subjects.clone();
    let mut logs = current.content_logs.clone();
    let mut seen: HashSet<_> = logs.iter().map(ContentLog::key).collect();

    let mut summary = ImportSummary {
        rows_total: rows.len(),
        ..ImportSummary::default()
    };

    for row in rows {
        let Some(fields) = required_fields(row) else {
            summary.rows_invalid += 1;
            continue;
        };

        let (teacher, next) = resolve(teachers, fields.teacher);
        teachers = next;
        let (course, next) = resolve(courses, fields.course);
        courses = next;
        let (subject, next) = resolve(subjects, fields.subject);
        subjects = next;

        summary.teachers_created += usize::from(teacher.created);
        summary.courses_created += usize::from(course.created);
        summary.subjects_created += usize::from(subject.created);

        let log = ContentLog {
            id: new_id(),
            teacher_id: teacher.entity.id,
            course_id: course.entity.id,
            subject_id: subject.entity.id,
            date: row.date.clone().unwrap_or_default(),
            content: fields.content.to_string(),
            observations: None,
        };
        if !seen.insert(log.key()) {
            summary.logs_duplicate += 1;
            continue;
        }
        logs.push(log);
        summary.logs_added += 1;
    }

    Reconciled {
        data: AppData {
            teachers,
            courses,
            subjects,
            content_logs: logs,
        },
        summary,
    }
}
