use crate::model::{AppData, ContentLog};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashMap;
use thiserror::Error;

pub const ALL: &str = "all";

pub const TITLE_COMPLETE: &str = "Reporte Completo de Registro de Contenidos";
pub const TITLE_TEACHER_PREFIX: &str = "Reporte de Contenidos - ";
pub const TITLE_REPORT_VIEW: &str = "Reporte de Registro de Contenidos";

/// One report criterion: `"all"` (or absent) matches everything, anything
/// else is an exact id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Option<String>")]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl From<Option<String>> for Selection {
    fn from(raw: Option<String>) -> Self {
        match raw {
            None => Selection::All,
            Some(s) if s.trim().is_empty() || s.trim() == ALL => Selection::All,
            Some(s) => Selection::Only(s),
        }
    }
}

impl Selection {
    fn matches(&self, id: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(want) => want == id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportFilters {
    #[serde(alias = "teacher")]
    pub teacher_id: Selection,
    #[serde(alias = "course")]
    pub course_id: Selection,
    #[serde(alias = "subject")]
    pub subject_id: Selection,
}

impl ReportFilters {
    pub fn for_teacher(teacher_id: &str) -> Self {
        Self {
            teacher_id: Selection::Only(teacher_id.to_string()),
            ..Self::default()
        }
    }

    fn matches(&self, log: &ContentLog) -> bool {
        self.teacher_id.matches(&log.teacher_id)
            && self.course_id.matches(&log.course_id)
            && self.subject_id.matches(&log.subject_id)
    }
}

/// Logs matching every criterion, most recent first. Logs whose date does
/// not parse go last. Order among equal dates is unspecified.
pub fn filter_logs<'a>(logs: &'a [ContentLog], filters: &ReportFilters) -> Vec<&'a ContentLog> {
    let mut out: Vec<&ContentLog> = logs.iter().filter(|l| filters.matches(l)).collect();
    out.sort_by_cached_key(|l| Reverse(l.parsed_date()));
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub id: String,
    pub date: String,
    pub teacher: String,
    pub course: String,
    pub subject: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
}

pub fn report_rows(data: &AppData, logs: &[&ContentLog], unknown_label: &str) -> Vec<ReportRow> {
    let teachers: HashMap<&str, &str> = data
        .teachers
        .iter()
        .map(|t| (t.id.as_str(), t.name.as_str()))
        .collect();
    let courses: HashMap<&str, &str> = data
        .courses
        .iter()
        .map(|c| (c.id.as_str(), c.name.as_str()))
        .collect();
    let subjects: HashMap<&str, &str> = data
        .subjects
        .iter()
        .map(|s| (s.id.as_str(), s.name.as_str()))
        .collect();
    let name = |map: &HashMap<&str, &str>, id: &str| -> String {
        map.get(id).copied().unwrap_or(unknown_label).to_string()
    };

    logs.iter()
        .map(|log| ReportRow {
            id: log.id.clone(),
            date: log.date.clone(),
            teacher: name(&teachers, &log.teacher_id),
            course: name(&courses, &log.course_id),
            subject: name(&subjects, &log.subject_id),
            content: log.content.clone(),
            observations: log.observations.clone(),
        })
        .collect()
}

/// What an export covers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ExportScope {
    All,
    Teacher {
        #[serde(rename = "teacherId", default)]
        teacher_id: String,
    },
    /// The report view's current filters.
    Report,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    #[error("there is no data to export")]
    NoData,
    #[error("there are no records to export for the current selection")]
    NoRecords,
    #[error("select a teacher for a teacher report")]
    MissingTeacher,
}

impl ExportError {
    pub fn code(&self) -> &'static str {
        match self {
            ExportError::NoData => "no_data",
            ExportError::NoRecords => "no_records",
            ExportError::MissingTeacher => "bad_params",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportModel {
    pub title: String,
    pub file_name: String,
    pub generated_on: NaiveDate,
    pub rows: Vec<ReportRow>,
}

/// `reporte_<scope>_<YYYY-MM-DD>.pdf`
pub fn export_file_name(scope: &str, generated_on: NaiveDate) -> String {
    format!("reporte_{}_{}.pdf", scope, generated_on.format("%Y-%m-%d"))
}

fn underscored(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

/// Builds the printable projection handed to the PDF renderer.
///
/// A teacher scope naming an unknown teacher falls back to the complete
/// report. The report-view scope renders whatever the filters select, even
/// nothing.
pub fn export_model(
    data: &AppData,
    scope: &ExportScope,
    filters: &ReportFilters,
    generated_on: NaiveDate,
    unknown_label: &str,
) -> Result<ExportModel, ExportError> {
    let complete = || {
        (
            TITLE_COMPLETE.to_string(),
            export_file_name("completo", generated_on),
            ReportFilters::default(),
        )
    };

    let (title, file_name, effective) = match scope {
        ExportScope::Report => (
            TITLE_REPORT_VIEW.to_string(),
            export_file_name("contenidos", generated_on),
            filters.clone(),
        ),
        ExportScope::Teacher { teacher_id } if teacher_id.trim().is_empty() => {
            return Err(ExportError::MissingTeacher)
        }
        _ if data.content_logs.is_empty() => return Err(ExportError::NoData),
        ExportScope::All => complete(),
        ExportScope::Teacher { teacher_id } => match data.teacher(teacher_id.trim()) {
            Some(t) => (
                format!("{}{}", TITLE_TEACHER_PREFIX, t.name),
                export_file_name(&underscored(&t.name), generated_on),
                ReportFilters::for_teacher(&t.id),
            ),
            None => complete(),
        },
    };

    let logs = filter_logs(&data.content_logs, &effective);
    if logs.is_empty() && *scope != ExportScope::Report {
        return Err(ExportError::NoRecords);
    }

    Ok(ExportModel {
        title,
        file_name,
        generated_on,
        rows: report_rows(data, &logs, unknown_label),
    })
}
