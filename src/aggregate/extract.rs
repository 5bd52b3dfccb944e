//! Normalization of person-like records into [`CanonicalPerson`].
//!
//! Records may carry their fields directly or under a nested `user` object;
//! names may be `name` or `fullName`. The visitor walks an arbitrary JSON
//! tree to a bounded depth without knowing any upstream schema.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::aggregate::shape::ListShape;

/// Deepest nesting level the visitor descends into.
pub const MAX_DEPTH: usize = 5;

/// Normalized person, constructed per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalPerson {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

fn non_empty_str<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Ids arrive as strings or numbers.
pub(crate) fn record_id(map: &Map<String, Value>) -> Option<String> {
    match map.get("id")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn nested_user(record: &Map<String, Value>) -> Option<&Map<String, Value>> {
    record.get("user").and_then(Value::as_object)
}

/// Non-empty trimmed `name`, else non-empty trimmed `fullName`.
pub fn normalize_name(map: &Map<String, Value>) -> Option<String> {
    non_empty_str(map, "name")
        .or_else(|| non_empty_str(map, "fullName"))
        .map(str::to_string)
}

/// Build a person from one record. Records without an email are skipped.
pub fn person_from_record(record: &Map<String, Value>) -> Option<CanonicalPerson> {
    let user = nested_user(record);
    let from_either = |key: &str| {
        non_empty_str(record, key)
            .or_else(|| user.and_then(|u| non_empty_str(u, key)))
            .map(str::to_string)
    };

    let email = from_either("email")?;
    let id = record_id(record)
        .or_else(|| user.and_then(record_id))
        .unwrap_or_else(|| email.clone());
    let name = normalize_name(record).or_else(|| user.and_then(normalize_name));
    let is_active = record
        .get("isActive")
        .and_then(Value::as_bool)
        .or_else(|| user.and_then(|u| u.get("isActive")).and_then(Value::as_bool));

    Some(CanonicalPerson {
        id,
        name,
        email,
        role: from_either("role"),
        is_active,
    })
}

/// Insertion-ordered set keyed by person id. First occurrence wins.
#[derive(Debug, Default)]
pub struct PersonSet {
    seen: HashSet<String>,
    people: Vec<CanonicalPerson>,
}

impl PersonSet {
    /// Returns false when a person with the same id was already present.
    pub fn insert(&mut self, person: CanonicalPerson) -> bool {
        if !self.seen.insert(person.id.clone()) {
            return false;
        }
        self.people.push(person);
        true
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    pub fn into_vec(self) -> Vec<CanonicalPerson> {
        self.people
    }
}

impl Extend<CanonicalPerson> for PersonSet {
    fn extend<I: IntoIterator<Item = CanonicalPerson>>(&mut self, iter: I) {
        for person in iter {
            self.insert(person);
        }
    }
}

/// People from a list endpoint, decoded through its known shape.
pub fn people_from_list(body: &Value) -> Vec<CanonicalPerson> {
    let shape = ListShape::decode(body);
    if shape == ListShape::Unrecognized && !body.is_null() {
        tracing::warn!("Upstream list body matched no known shape");
    }

    let mut set = PersonSet::default();
    set.extend(shape.records().into_iter().filter_map(person_from_record));
    set.into_vec()
}

/// Every person found anywhere in `body`, down to [`MAX_DEPTH`].
pub fn collect_people(body: &Value) -> Vec<CanonicalPerson> {
    let mut set = PersonSet::default();
    visit(body, 0, &mut set);
    set.into_vec()
}

fn visit(node: &Value, depth: usize, set: &mut PersonSet) {
    if depth > MAX_DEPTH {
        return;
    }
    match node {
        Value::Array(items) => {
            for item in items {
                visit(item, depth + 1, set);
            }
        }
        Value::Object(map) => {
            let accepted = person_from_record(map).map(|p| set.insert(p)).is_some();
            for (key, value) in map {
                // A nested `user` already contributed to this record.
                if accepted && key == "user" {
                    continue;
                }
                visit(value, depth + 1, set);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_name_preference() {
        assert_eq!(
            normalize_name(&record(json!({"name": "  Ana ", "fullName": "Ana Souza"}))),
            Some("Ana".to_string())
        );
        assert_eq!(
            normalize_name(&record(json!({"name": "   ", "fullName": "Ana Souza"}))),
            Some("Ana Souza".to_string())
        );
        assert_eq!(normalize_name(&record(json!({"name": null}))), None);
    }

    #[test]
    fn test_nested_user_profile() {
        let person = person_from_record(&record(json!({
            "bio": "Coach",
            "user": {"id": "u1", "email": "coach@x.io", "fullName": "Carla", "role": "TRAINER", "isActive": false}
        })))
        .unwrap();
        assert_eq!(
            person,
            CanonicalPerson {
                id: "u1".into(),
                name: Some("Carla".into()),
                email: "coach@x.io".into(),
                role: Some("TRAINER".into()),
                is_active: Some(false),
            }
        );
    }

    #[test]
    fn test_identifier_fallbacks() {
        let own = person_from_record(&record(json!({"id": "p1", "user": {"id": "u1", "email": "a@x.io"}}))).unwrap();
        assert_eq!(own.id, "p1");

        let numeric = person_from_record(&record(json!({"id": 7, "email": "a@x.io"}))).unwrap();
        assert_eq!(numeric.id, "7");

        let by_email = person_from_record(&record(json!({"email": "a@x.io"}))).unwrap();
        assert_eq!(by_email.id, "a@x.io");

        assert!(person_from_record(&record(json!({"id": "1"}))).is_none());
    }

    #[test]
    fn test_first_seen_wins() {
        let body = json!([
            {"id": "1", "email": "first@x.io", "name": "First"},
            {"id": "1", "email": "second@x.io", "name": "Second"},
            {"id": "2", "email": "other@x.io"}
        ]);
        let people = people_from_list(&body);
        assert_eq!(people.len(), 2);
        let one = people.iter().find(|p| p.id == "1").unwrap();
        assert_eq!(one.email, "first@x.io");
        assert_eq!(one.name.as_deref(), Some("First"));
    }

    #[test]
    fn test_list_shapes() {
        let people = vec![json!({"id": "1", "email": "a@x.io"})];
        for body in [
            json!(people.clone()),
            json!({"data": people.clone()}),
            json!({"items": people.clone(), "page": 1}),
            json!({"results": {"users": people.clone()}}),
        ] {
            assert_eq!(people_from_list(&body).len(), 1, "{body}");
        }
        assert!(people_from_list(&json!({"count": 3})).is_empty());
    }

    #[test]
    fn test_visitor_walks_dashboards() {
        let body = json!({
            "trainer": {"id": "t1", "bio": "x"},
            "stats": {"clients": 2},
            "clients": [
                {"id": "c1", "user": {"id": "u1", "email": "c1@x.io", "name": "C One"}},
                {"plan": {"assignee": {"id": "u2", "email": "c2@x.io"}}}
            ]
        });
        let people = collect_people(&body);
        let ids: HashSet<_> = people.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, HashSet::from(["c1", "u2"]));
    }

    #[test]
    fn test_visitor_depth_bound() {
        let mut body = json!({"id": "deep", "email": "deep@x.io"});
        for _ in 0..=MAX_DEPTH {
            body = json!({ "wrap": body });
        }
        assert!(collect_people(&body).is_empty());

        let mut shallow = json!({"id": "s", "email": "s@x.io"});
        for _ in 0..MAX_DEPTH {
            shallow = json!({ "wrap": shallow });
        }
        assert_eq!(collect_people(&shallow).len(), 1);
    }
}
