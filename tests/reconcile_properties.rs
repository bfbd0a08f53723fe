#[path = "../src/model.rs"]
mod model;
#[path = "../src/reconcile.rs"]
mod reconcile;
#[path = "../src/resolve.rs"]
mod resolve;

use model::{AppData, CandidateRow, Course, Subject, Teacher};
use reconcile::reconcile;
use resolve::resolve;

fn row(date: &str, teacher: &str, course: &str, subject: &str, content: &str) -> CandidateRow {
    let opt = |s: &str| (!s.is_empty()).then(|| s.to_string());
    CandidateRow {
        date: opt(date),
        teacher_name: opt(teacher),
        course_name: opt(course),
        subject_name: opt(subject),
        content: opt(content),
    }
}

fn base() -> AppData {
    AppData {
        teachers: vec![Teacher {
            id: "t-maria".to_string(),
            name: "María Soto".to_string(),
        }],
        courses: vec![Course {
            id: "c-1b".to_string(),
            name: "1° Básico".to_string(),
        }],
        subjects: vec![Subject {
            id: "s-mus".to_string(),
            name: "Música".to_string(),
        }],
        content_logs: Vec::new(),
    }
}

#[test]
fn resolving_case_and_whitespace_variants_is_idempotent() {
    let (first, teachers) = resolve(base().teachers, "  ana pérez");
    assert!(first.created);
    let before = teachers.len();

    for variant in ["Ana Pérez", "ANA PÉREZ", "ana pérez   ", "\tAna pérez"] {
        let (again, after) = resolve(teachers.clone(), variant);
        assert!(!again.created, "{variant:?} should match");
        assert_eq!(again.entity.id, first.entity.id);
        assert_eq!(after.len(), before);
    }
}

#[test]
fn importing_the_same_batch_twice_adds_nothing_the_second_time() {
    let batch = vec![
        row("2025-03-03", "María Soto", "1° Básico", "Música", "Pulso y ritmo"),
        row("2025-03-04", "Pedro Rojas", "2° Básico", "Matemática", "Sumas hasta 100"),
        row("2025-03-05", "pedro rojas", "2° Básico", "Matemática", "Restas"),
    ];

    let once = reconcile(&base(), &batch);
    assert_eq!(once.summary.logs_added, 3);
    let twice = reconcile(&once.data, &batch);

    assert_eq!(twice.data.content_logs.len(), once.data.content_logs.len());
    assert_eq!(twice.summary.logs_added, 0);
    assert_eq!(twice.summary.logs_duplicate, 3);
    assert_eq!(twice.data.teachers, once.data.teachers);
    assert_eq!(twice.data.courses, once.data.courses);
    assert_eq!(twice.data.subjects, once.data.subjects);
}

#[test]
fn name_variants_in_one_batch_create_a_single_teacher() {
    let batch = vec![
        row("2025-03-03", "Ana Pérez", "1° Básico", "Música", "Canciones"),
        row("2025-03-04", "ana pérez ", "1° Básico", "Música", "Instrumentos"),
    ];

    let out = reconcile(&base(), &batch);
    assert_eq!(out.summary.teachers_created, 1);
    assert_eq!(out.data.teachers.len(), 2);

    let ana = out
        .data
        .teachers
        .iter()
        .find(|t| t.name == "Ana Pérez")
        .expect("Ana created with the first spelling");
    assert_eq!(out.data.content_logs.len(), 2);
    assert!(out.data.content_logs.iter().all(|l| l.teacher_id == ana.id));
}

#[test]
fn a_row_without_content_is_dropped_without_side_effects() {
    let batch = vec![
        row("2025-03-03", "Nueva Docente", "9° Básico", "Robótica", ""),
        row("2025-03-04", "María Soto", "1° Básico", "Música", "Pulso"),
        row("2025-03-05", "", "1° Básico", "Música", "Sin docente"),
    ];

    let out = reconcile(&base(), &batch);
    assert_eq!(out.summary.rows_total, 3);
    assert_eq!(out.summary.rows_invalid, 2);
    assert_eq!(out.summary.logs_added, 1);
    assert_eq!(out.summary.teachers_created, 0);
    assert_eq!(out.summary.courses_created, 0);
    assert_eq!(out.summary.subjects_created, 0);
    assert_eq!(out.data.teachers, base().teachers);
    assert_eq!(out.data.courses, base().courses);

    let log = &out.data.content_logs[0];
    assert_eq!(log.teacher_id, "t-maria");
    assert_eq!(log.course_id, "c-1b");
    assert_eq!(log.subject_id, "s-mus");
}

#[test]
fn entities_created_by_the_batch_are_reused_by_later_rows() {
    let batch = vec![
        row("2025-04-01", "Luis Vera", "5° Básico", "Tecnología", "Circuitos"),
        row("2025-04-02", "LUIS VERA", "5° básico", "tecnología", "Motores"),
    ];

    let out = reconcile(&base(), &batch);
    assert_eq!(out.summary.teachers_created, 1);
    assert_eq!(out.summary.courses_created, 1);
    assert_eq!(out.summary.subjects_created, 1);
    let [a, b] = [&out.data.content_logs[0], &out.data.content_logs[1]];
    assert_eq!(a.teacher_id, b.teacher_id);
    assert_eq!(a.course_id, b.course_id);
    assert_eq!(a.subject_id, b.subject_id);
}
