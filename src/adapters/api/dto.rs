use crate::domain::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// Stored document under /todos/{id}
#[derive(Debug, Serialize, Deserialize)]
pub struct TodoDto {
    pub title: String,
    #[serde(default)]
    pub status: bool,
}

// Response to a POST on a collection
#[derive(Debug, Deserialize)]
pub struct CreatedDto {
    pub name: String,
}

// Request DTOs
#[derive(Debug, Serialize)]
pub struct StatusPatchDto {
    pub status: bool,
}

impl TodoDto {
    pub fn into_todo(self, id: TodoId) -> Todo {
        Todo::new(id, self.title, self.status)
    }
}

impl From<&TodoTitle> for TodoDto {
    fn from(title: &TodoTitle) -> Self {
        Self {
            title: title.as_str().to_string(),
            status: false,
        }
    }
}

/// Decodes a collection body (`{ id: {title, status}, ... }`) in key order.
///
/// `null`, non-object and non-JSON bodies all decode to an empty list.
/// Entries that don't look like a todo are skipped.
pub fn parse_todo_list(body: &str) -> Vec<Todo> {
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Treating unparseable list response as empty: {}", e);
            return Vec::new();
        }
    };

    let entries = match value {
        Value::Object(entries) => entries,
        Value::Null => return Vec::new(),
        other => {
            tracing::warn!("Treating non-object list response as empty: {}", other);
            return Vec::new();
        }
    };

    entries
        .into_iter()
        .filter_map(|(id, entry)| match serde_json::from_value::<TodoDto>(entry) {
            Ok(dto) => Some(dto.into_todo(TodoId(id))),
            Err(e) => {
                tracing::warn!("Skipping malformed todo {}: {}", id, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_entry() {
        let todos = parse_todo_list(r#"{"a1":{"title":"x","status":false}}"#);
        assert_eq!(todos, vec![Todo::new("a1", "x", false)]);
    }

    #[test]
    fn test_parse_keeps_response_key_order() {
        let body = r#"{
            "-Nzz": {"title": "first", "status": true},
            "-Naa": {"title": "second", "status": false},
            "-Nmm": {"title": "third", "status": false}
        }"#;

        let ids: Vec<String> = parse_todo_list(body).into_iter().map(|t| t.id.0).collect();
        assert_eq!(ids, vec!["-Nzz", "-Naa", "-Nmm"]);
    }

    #[test]
    fn test_empty_and_malformed_bodies_are_empty() {
        assert!(parse_todo_list("null").is_empty());
        assert!(parse_todo_list("{}").is_empty());
        assert!(parse_todo_list("").is_empty());
        assert!(parse_todo_list("[1, 2]").is_empty());
        assert!(parse_todo_list("\"nope\"").is_empty());
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let body = r#"{
            "a1": {"title": "kept", "status": true},
            "a2": {"status": false},
            "a3": 42,
            "a4": {"title": "no status"}
        }"#;

        let todos = parse_todo_list(body);
        assert_eq!(
            todos,
            vec![
                Todo::new("a1", "kept", true),
                Todo::new("a4", "no status", false),
            ]
        );
    }

    #[test]
    fn test_new_todo_body_is_incomplete() {
        let title = TodoTitle::parse("buy milk").unwrap();
        let body = serde_json::to_value(TodoDto::from(&title)).unwrap();
        assert_eq!(body, serde_json::json!({"title": "buy milk", "status": false}));
    }
}
