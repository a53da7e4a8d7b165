use serde::{Deserialize, Serialize};
use std::fmt;

use super::{DomainError, DomainResult};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TodoId(pub String);

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TodoId {
    fn from(s: String) -> Self {
        TodoId(s)
    }
}

impl From<&str> for TodoId {
    fn from(s: &str) -> Self {
        TodoId(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub status: bool,
}

impl Todo {
    pub fn new(id: impl Into<TodoId>, title: impl Into<String>, status: bool) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            status,
        }
    }

    /// Business rule: only completed items may be deleted from the list view
    pub fn can_delete(&self) -> bool {
        self.status
    }

    pub fn checkbox(&self) -> &'static str {
        if self.status {
            "[x]"
        } else {
            "[ ]"
        }
    }
}

/// A title that passed validation. Only the blank check exists; the text is
/// kept exactly as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoTitle(String);

impl TodoTitle {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        if raw.trim().is_empty() {
            return Err(DomainError::EmptyTitle);
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TodoTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_rejects_blank_input() {
        assert!(matches!(TodoTitle::parse(""), Err(DomainError::EmptyTitle)));
        assert!(matches!(
            TodoTitle::parse("   \t"),
            Err(DomainError::EmptyTitle)
        ));
        assert_eq!(
            DomainError::EmptyTitle.to_string(),
            "The task cannot be empty!"
        );
    }

    #[test]
    fn test_title_keeps_text_as_typed() {
        let title = TodoTitle::parse("  buy milk ").unwrap();
        assert_eq!(title.as_str(), "  buy milk ");
    }

    #[test]
    fn test_only_completed_todos_can_be_deleted() {
        let open = Todo::new("a1", "x", false);
        let done = Todo::new("a2", "y", true);

        assert!(!open.can_delete());
        assert!(done.can_delete());
        assert_eq!(open.checkbox(), "[ ]");
        assert_eq!(done.checkbox(), "[x]");
    }
}
