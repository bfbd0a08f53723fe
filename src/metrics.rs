use crate::model::{AppData, ContentLog};
use chrono::{Duration, NaiveDate};
use serde::Serialize;

/// Trailing window, in calendar days, used for compliance.
pub const COMPLIANCE_WINDOW_DAYS: i64 = 30;
/// Logs expected over one window for a teacher to be at 100%.
pub const COMPLIANCE_BASELINE: usize = 20;

/// First day of the window. Saturates at the earliest representable date.
pub fn window_start(as_of: NaiveDate) -> NaiveDate {
    as_of
        .checked_sub_signed(Duration::days(COMPLIANCE_WINDOW_DAYS))
        .unwrap_or(NaiveDate::MIN)
}

// Unparsable dates never fall inside the window. There is no upper bound:
// logs dated after `as_of` still count.
fn in_window(log: &ContentLog, start: NaiveDate) -> bool {
    log.parsed_date().map(|d| d >= start).unwrap_or(false)
}

pub fn recent_teacher_logs(teacher_id: &str, logs: &[ContentLog], as_of: NaiveDate) -> usize {
    let start = window_start(as_of);
    logs.iter()
        .filter(|l| l.teacher_id == teacher_id && in_window(l, start))
        .count()
}

/// Percentage of the baseline reached in the window, clamped to `0..=100`.
pub fn compute_teacher_progress(teacher_id: &str, logs: &[ContentLog], as_of: NaiveDate) -> f64 {
    progress_for(recent_teacher_logs(teacher_id, logs, as_of))
}

fn progress_for(recent: usize) -> f64 {
    let pct = 100.0 * (recent as f64) / (COMPLIANCE_BASELINE as f64);
    pct.clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallCounts {
    pub total: usize,
    pub recent_count: usize,
}

pub fn compute_overall_counts(logs: &[ContentLog], as_of: NaiveDate) -> OverallCounts {
    let start = window_start(as_of);
    OverallCounts {
        total: logs.len(),
        recent_count: logs.iter().filter(|l| in_window(l, start)).count(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherProgress {
    pub teacher_id: String,
    pub name: String,
    pub recent_logs: usize,
    pub progress: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub as_of: NaiveDate,
    pub total_logs: usize,
    pub recent_logs: usize,
    pub window_days: i64,
    pub baseline: usize,
    pub teachers: Vec<TeacherProgress>,
}

pub fn dashboard_summary(data: &AppData, as_of: NaiveDate) -> DashboardSummary {
    let counts = compute_overall_counts(&data.content_logs, as_of);
    let teachers = data
        .teachers
        .iter()
        .map(|t| {
            let recent = recent_teacher_logs(&t.id, &data.content_logs, as_of);
            TeacherProgress {
                teacher_id: t.id.clone(),
                name: t.name.clone(),
                recent_logs: recent,
                progress: progress_for(recent),
            }
        })
        .collect();

    DashboardSummary {
        as_of,
        total_logs: counts.total,
        recent_logs: counts.recent_count,
        window_days: COMPLIANCE_WINDOW_DAYS,
        baseline: COMPLIANCE_BASELINE,
        teachers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Teacher;

    fn log(teacher: &str, date: &str) -> ContentLog {
        ContentLog {
            id: crate::model::new_id(),
            teacher_id: teacher.to_string(),
            course_id: "c1".to_string(),
            subject_id: "s1".to_string(),
            date: date.to_string(),
            content: "x".to_string(),
            observations: None,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn progress_scales_against_baseline() {
        let as_of = day(2025, 4, 30);
        let logs: Vec<_> = (0..5).map(|_| log("t1", "2025-04-20")).collect();
        assert_eq!(compute_teacher_progress("t1", &logs, as_of), 25.0);
        assert_eq!(compute_teacher_progress("t2", &logs, as_of), 0.0);
    }

    #[test]
    fn unparsable_dates_count_in_total_only() {
        let as_of = day(2025, 4, 30);
        let logs = vec![log("t1", "2025-04-29"), log("t1", "ayer"), log("t1", "")];
        let counts = compute_overall_counts(&logs, as_of);
        assert_eq!(counts.total, 3);
        assert_eq!(counts.recent_count, 1);
    }

    #[test]
    fn window_saturates_near_the_earliest_date() {
        let as_of = NaiveDate::MIN + Duration::days(3);
        assert_eq!(window_start(as_of), NaiveDate::MIN);
        let counts = compute_overall_counts(&[log("t1", "2025-04-29")], as_of);
        assert_eq!(counts.total, 1);
        assert_eq!(counts.recent_count, 1);
    }

    #[test]
    fn future_dated_logs_are_inside_the_window() {
        let as_of = day(2025, 4, 30);
        let logs = vec![log("t1", "2025-05-15")];
        assert_eq!(compute_overall_counts(&logs, as_of).recent_count, 1);
    }

    #[test]
    fn dashboard_lists_teachers_in_collection_order() {
        let data = AppData {
            teachers: vec![
                Teacher {
                    id: "t2".to_string(),
                    name: "Zoe".to_string(),
                },
                Teacher {
                    id: "t1".to_string(),
                    name: "Ana".to_string(),
                },
            ],
            content_logs: vec![log("t1", "2025-04-01"), log("t1", "2024-01-01")],
            ..AppData::default()
        };
        let summary = dashboard_summary(&data, day(2025, 4, 30));
        assert_eq!(summary.total_logs, 2);
        assert_eq!(summary.recent_logs, 1);
        let ids: Vec<_> = summary.teachers.iter().map(|t| t.teacher_id.as_str()).collect();
        assert_eq!(ids, vec!["t2", "t1"]);
        assert_eq!(summary.teachers[1].progress, 5.0);
    }
}
