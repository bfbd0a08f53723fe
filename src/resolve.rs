use crate::model::{new_id, NamedEntity};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<E> {
    pub entity: E,
    pub created: bool,
}

pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Finds the entity whose trimmed, lowercased name equals `query`'s, or
/// appends a new one carrying the trimmed query.
///
/// The collection is taken by value and handed back, so the caller decides
/// whether the extended collection is ever committed. When several entities
/// share a normalized name the first one in collection order wins.
pub fn resolve<E: NamedEntity>(mut collection: Vec<E>, query: &str) -> (Resolved<E>, Vec<E>) {
    let wanted = normalize_name(query);
    if let Some(found) = collection
        .iter()
        .find(|e| normalize_name(e.name()) == wanted)
    {
        let entity = found.clone();
        return (
            Resolved {
                entity,
                created: false,
            },
            collection,
        );
    }

    let entity = E::with_name(new_id(), query.trim().to_string());
    collection.push(entity.clone());
    (
        Resolved {
            entity,
            created: true,
        },
        collection,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Teacher;

    fn teacher(id: &str, name: &str) -> Teacher {
        Teacher {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn matches_ignoring_case_and_outer_whitespace() {
        let teachers = vec![teacher("t1", "Ana Pérez"), teacher("t2", "Luis Soto")];
        let (hit, teachers) = resolve(teachers, "  ANA PÉREZ ");
        assert!(!hit.created);
        assert_eq!(hit.entity.id, "t1");
        assert_eq!(teachers.len(), 2);
    }

    #[test]
    fn creates_trimmed_entity_at_the_end() {
        let teachers = vec![teacher("t1", "Ana Pérez")];
        let (hit, teachers) = resolve(teachers, "  Marta Rojas\t");
        assert!(hit.created);
        assert_eq!(hit.entity.name, "Marta Rojas");
        assert_eq!(teachers.len(), 2);
        assert_eq!(teachers.last(), Some(&hit.entity));
        assert_ne!(hit.entity.id, "t1");
    }

    #[test]
    fn first_match_wins_on_duplicate_names() {
        let teachers = vec![
            teacher("t1", "Luis Soto"),
            teacher("t2", " luis soto"),
        ];
        let (hit, _) = resolve(teachers, "LUIS SOTO");
        assert_eq!(hit.entity.id, "t1");
    }

    #[test]
    fn inner_whitespace_is_significant() {
        let teachers = vec![teacher("t1", "Ana Pérez")];
        let (hit, teachers) = resolve(teachers, "Ana  Pérez");
        assert!(hit.created);
        assert_eq!(teachers.len(), 2);
    }
}
