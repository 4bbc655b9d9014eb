//! Domain DTOs for the todo API.
//!
//! # Design
//! These types mirror the server's schema but are defined independently;
//! integration tests catch any drift between the two crates. The wire format
//! is camelCase (`isCompleted`), field names stay snake_case in Rust.

use serde::{Deserialize, Serialize};

/// A single todo item returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub is_completed: bool,
}

/// Request payload for creating a new todo. The server rejects an empty
/// title with a structured 400 body; the client sends it as-is and lets the
/// server be the validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTodo {
    pub title: String,
}

/// Request payload for updating an existing todo. The id travels in the
/// body (`PATCH /todo`) and both mutable fields are replaced wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodo {
    pub id: i64,
    pub title: String,
    pub is_completed: bool,
}

impl From<&Todo> for UpdateTodo {
    fn from(todo: &Todo) -> Self {
        Self {
            id: todo.id,
            title: todo.title.clone(),
            is_completed: todo.is_completed,
        }
    }
}
