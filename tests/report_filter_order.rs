#[path = "../src/model.rs"]
mod model;
#[path = "../src/report.rs"]
mod report;

use chrono::NaiveDate;
use model::{AppData, ContentLog, Course, Subject, Teacher};
use report::{export_model, filter_logs, ExportError, ExportScope, ReportFilters, Selection};

fn log(id: &str, teacher: &str, course: &str, date: &str) -> ContentLog {
    ContentLog {
        id: id.to_string(),
        teacher_id: teacher.to_string(),
        course_id: course.to_string(),
        subject_id: "s1".to_string(),
        date: date.to_string(),
        content: format!("contenido {id}"),
        observations: None,
    }
}

fn data() -> AppData {
    AppData {
        teachers: vec![
            Teacher {
                id: "t1".to_string(),
                name: "Ana María Pérez".to_string(),
            },
            Teacher {
                id: "t2".to_string(),
                name: "Pedro Rojas".to_string(),
            },
        ],
        courses: vec![
            Course {
                id: "c1".to_string(),
                name: "1° Básico".to_string(),
            },
            Course {
                id: "c2".to_string(),
                name: "2° Básico".to_string(),
            },
        ],
        subjects: vec![Subject {
            id: "s1".to_string(),
            name: "Música".to_string(),
        }],
        content_logs: vec![
            log("a", "t1", "c1", "2025-01-01"),
            log("b", "t2", "c1", "2025-04-15"),
            log("c", "t1", "c2", "2025-03-01"),
            log("d", "t1", "c1", "2025-02-01"),
        ],
    }
}

fn generated_on() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, 2).expect("date")
}

fn ids(logs: &[&ContentLog]) -> Vec<String> {
    logs.iter().map(|l| l.id.clone()).collect()
}

#[test]
fn logs_are_ordered_most_recent_first() {
    let d = data();
    let only_t1 = ReportFilters::for_teacher("t1");
    let out = filter_logs(&d.content_logs, &only_t1);
    let dates: Vec<&str> = out.iter().map(|l| l.date.as_str()).collect();
    assert_eq!(dates, vec!["2025-03-01", "2025-02-01", "2025-01-01"]);
}

#[test]
fn teacher_filter_equals_filter_then_sort() {
    let d = data();
    let out = filter_logs(&d.content_logs, &ReportFilters::for_teacher("t1"));
    assert!(out.iter().all(|l| l.teacher_id == "t1"));

    let mut manual: Vec<&ContentLog> = d.content_logs.iter().filter(|l| l.teacher_id == "t1").collect();
    manual.sort_by(|a, b| b.date.cmp(&a.date));
    assert_eq!(ids(&out), ids(&manual));
}

#[test]
fn filters_combine_and_all_matches_everything() {
    let d = data();
    let filters = ReportFilters {
        teacher_id: Selection::Only("t1".to_string()),
        course_id: Selection::Only("c1".to_string()),
        subject_id: Selection::All,
    };
    assert_eq!(ids(&filter_logs(&d.content_logs, &filters)), vec!["d", "a"]);
    assert_eq!(filter_logs(&d.content_logs, &ReportFilters::default()).len(), 4);

    let from_wire: ReportFilters =
        serde_json::from_value(serde_json::json!({ "teacherId": "all", "courseId": "c2" }))
            .expect("filters");
    assert_eq!(ids(&filter_logs(&d.content_logs, &from_wire)), vec!["c"]);
}

#[test]
fn export_file_names_follow_the_scope() {
    let d = data();
    let complete = export_model(&d, &ExportScope::All, &ReportFilters::default(), generated_on(), "N/A")
        .expect("complete export");
    assert_eq!(complete.file_name, "reporte_completo_2025-05-02.pdf");
    assert_eq!(complete.rows.len(), 4);

    let teacher = ExportScope::Teacher {
        teacher_id: "t1".to_string(),
    };
    let by_teacher = export_model(&d, &teacher, &ReportFilters::default(), generated_on(), "N/A")
        .expect("teacher export");
    assert_eq!(by_teacher.file_name, "reporte_Ana_María_Pérez_2025-05-02.pdf");
    assert_eq!(by_teacher.title, "Reporte de Contenidos - Ana María Pérez");
    assert_eq!(by_teacher.rows.len(), 3);
    assert_eq!(by_teacher.rows[0].teacher, "Ana María Pérez");
    assert_eq!(by_teacher.rows[0].course, "2° Básico");
}

#[test]
fn export_errors_distinguish_empty_store_from_empty_selection() {
    let empty = AppData::default();
    let err = export_model(&empty, &ExportScope::All, &ReportFilters::default(), generated_on(), "N/A")
        .expect_err("no data");
    assert_eq!(err, ExportError::NoData);

    let mut d = data();
    d.teachers.push(Teacher {
        id: "t3".to_string(),
        name: "Sin Registros".to_string(),
    });
    let idle = ExportScope::Teacher {
        teacher_id: "t3".to_string(),
    };
    let err = export_model(&d, &idle, &ReportFilters::default(), generated_on(), "N/A")
        .expect_err("no records");
    assert_eq!(err, ExportError::NoRecords);
}

#[test]
fn unknown_references_use_the_configured_label() {
    let mut d = data();
    d.content_logs.push(log("z", "ghost", "c9", "2025-04-30"));
    let model = export_model(&d, &ExportScope::All, &ReportFilters::default(), generated_on(), "Desconocido")
        .expect("export");
    let ghost = model.rows.iter().find(|r| r.id == "z").expect("ghost row");
    assert_eq!(ghost.teacher, "Desconocido");
    assert_eq!(ghost.course, "Desconocido");
    assert_eq!(ghost.subject, "Música");
}
