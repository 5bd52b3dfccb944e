//! Known shapes of upstream list responses.
//!
//! Each shape has its own decoder. A body that matches none of them decodes
//! to `Unrecognized`, which callers treat as empty and log, rather than
//! guessing.

use serde_json::{Map, Value};

use crate::aggregate::extract::MAX_DEPTH;

/// Wrapper keys that hold a record list.
pub const CONTAINER_KEYS: [&str; 4] = ["data", "users", "items", "results"];

#[derive(Debug, Clone, PartialEq)]
pub enum ListShape<'a> {
    /// `[ {...}, ... ]`
    Bare(&'a [Value]),
    /// `{ "<container>": [ ... ] }`, possibly nested in further containers.
    Wrapped {
        container: &'static str,
        items: &'a [Value],
    },
    /// A single person-like record, e.g. a profile with a nested `user`.
    Record(&'a Map<String, Value>),
    Unrecognized,
}

impl<'a> ListShape<'a> {
    pub fn decode(value: &'a Value) -> Self {
        Self::decode_at(value, 0)
    }

    fn decode_at(value: &'a Value, depth: usize) -> Self {
        if depth > MAX_DEPTH {
            return ListShape::Unrecognized;
        }
        match value {
            Value::Array(items) => ListShape::Bare(items.as_slice()),
            Value::Object(map) => {
                for key in CONTAINER_KEYS {
                    match map.get(key) {
                        Some(Value::Array(items)) => {
                            return ListShape::Wrapped {
                                container: key,
                                items: items.as_slice(),
                            };
                        }
                        Some(inner @ Value::Object(_)) => {
                            let shape = Self::decode_at(inner, depth + 1);
                            if shape != ListShape::Unrecognized {
                                return shape;
                            }
                        }
                        _ => {}
                    }
                }
                if is_person_like(map) {
                    ListShape::Record(map)
                } else {
                    ListShape::Unrecognized
                }
            }
            _ => ListShape::Unrecognized,
        }
    }

    /// Object entries of the decoded shape.
    pub fn records(&self) -> Vec<&'a Map<String, Value>> {
        match self {
            ListShape::Bare(items) | ListShape::Wrapped { items, .. } => {
                let items: &'a [Value] = items;
                items.iter().filter_map(Value::as_object).collect()
            }
            ListShape::Record(map) => vec![*map],
            ListShape::Unrecognized => Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ListShape::Bare(_) => "array",
            ListShape::Wrapped { container, .. } => *container,
            ListShape::Record(_) => "record",
            ListShape::Unrecognized => "unrecognized",
        }
    }
}

fn is_person_like(map: &Map<String, Value>) -> bool {
    map.get("email").is_some_and(Value::is_string) || map.get("user").is_some_and(Value::is_object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_array() {
        let body = json!([{"id": "1"}, 3, {"id": "2"}]);
        let shape = ListShape::decode(&body);
        assert_eq!(shape.name(), "array");
        assert_eq!(shape.records().len(), 2);
    }

    #[test]
    fn test_wrapped_containers() {
        for key in CONTAINER_KEYS {
            let mut body = json!({"total": 1});
            body[key] = json!([{"id": "1"}]);
            let shape = ListShape::decode(&body);
            assert_eq!(shape.name(), key);
            assert_eq!(shape.records().len(), 1);
        }
    }

    #[test]
    fn test_nested_container() {
        let body = json!({"data": {"items": [{"id": "1"}, {"id": "2"}]}});
        let shape = ListShape::decode(&body);
        assert_eq!(shape.name(), "items");
        assert_eq!(shape.records().len(), 2);
    }

    #[test]
    fn test_single_profile_record() {
        let body = json!({"id": "p1", "user": {"id": "u1", "email": "t@x.io"}});
        assert_eq!(ListShape::decode(&body).name(), "record");
    }

    #[test]
    fn test_unrecognized() {
        assert_eq!(ListShape::decode(&json!({"total": 0})), ListShape::Unrecognized);
        assert_eq!(ListShape::decode(&json!("users")), ListShape::Unrecognized);
        assert!(ListShape::decode(&json!(null)).records().is_empty());
    }
}
