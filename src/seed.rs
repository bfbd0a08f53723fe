use crate::model::{new_id, AppData, Course, NamedEntity, Subject};

const COURSES: &[&str] = &[
    "1° Básico",
    "2° Básico",
    "3° Básico",
    "4° Básico",
    "5° Básico",
    "6° Básico",
    "7° Básico",
    "8° Básico",
];

const SUBJECTS: &[&str] = &[
    "Lenguaje y Comunicación",
    "Matemática",
    "Historia, Geografía y Ciencias Sociales",
    "Ciencias Naturales",
    "Inglés",
    "Educación Física y Salud",
    "Artes Visuales",
    "Música",
    "Tecnología",
    "Orientación",
];

fn named<E: NamedEntity>(names: &[&str]) -> Vec<E> {
    names
        .iter()
        .map(|n| E::with_name(new_id(), n.to_string()))
        .collect()
}

/// Dataset written when the shared document does not exist yet.
pub fn initial_data() -> AppData {
    AppData {
        teachers: Vec::new(),
        courses: named::<Course>(COURSES),
        subjects: named::<Subject>(SUBJECTS),
        content_logs: Vec::new(),
    }
}
