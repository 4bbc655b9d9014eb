//! HTTP storage layer for the todo service.
//!
//! # Overview
//! Owns the todo items and their identifiers: ids come from a monotonic
//! counter, so creation order is observable and list reads come back in id
//! order. State lives in memory behind a `tokio::sync::RwLock`.
//!
//! # Surface
//! - `GET /todo` — 200, full list
//! - `POST /todo` — 201 created item, or 400 `{"errorMessage":"plz input title"}`
//! - `PATCH /todo` — 200 updated item (body carries the id), or 404
//! - `DELETE /todo/{id}` — 200 remaining list, or 404

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{info, warn};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub is_completed: bool,
}

/// Create payload. `title` stays optional so a missing field reaches the
/// handler and gets the structured 400 body instead of an extractor reject.
#[derive(Deserialize)]
pub struct CreateTodo {
    #[serde(default)]
    pub title: Option<String>,
}

/// Update payload. The id travels in the body (`PATCH /todo`), and both
/// mutable fields are required: an update replaces them wholesale.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodo {
    pub id: i64,
    pub title: String,
    pub is_completed: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub error_message: String,
}

/// In-memory store. `BTreeMap` iterates in key order, which together with
/// the monotonic id counter keeps list reads in creation order.
#[derive(Default)]
pub struct Store {
    next_id: i64,
    todos: BTreeMap<i64, Todo>,
}

impl Store {
    fn insert(&mut self, title: String) -> Todo {
        self.next_id += 1;
        let todo = Todo {
            id: self.next_id,
            title,
            is_completed: false,
        };
        self.todos.insert(todo.id, todo.clone());
        todo
    }

    fn list(&self) -> Vec<Todo> {
        self.todos.values().cloned().collect()
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/todo", get(list_todos).post(create_todo).patch(update_todo))
        .route("/todo/{id}", delete(delete_todo))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_todos(State(db): State<Db>) -> Json<Vec<Todo>> {
    Json(db.read().await.list())
}

async fn create_todo(
    State(db): State<Db>,
    Json(input): Json<CreateTodo>,
) -> Result<(StatusCode, Json<Todo>), (StatusCode, Json<ValidationError>)> {
    let title = match input.title {
        Some(title) if !title.is_empty() => title,
        _ => {
            warn!("create rejected: missing or empty title");
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ValidationError {
                    error_message: "plz input title".to_string(),
                }),
            ));
        }
    };
    let todo = db.write().await.insert(title);
    info!(id = todo.id, "created todo");
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn update_todo(
    State(db): State<Db>,
    Json(input): Json<UpdateTodo>,
) -> Result<Json<Todo>, StatusCode> {
    let mut store = db.write().await;
    let todo = store.todos.get_mut(&input.id).ok_or_else(|| {
        warn!(id = input.id, "update rejected: unknown id");
        StatusCode::NOT_FOUND
    })?;
    todo.title = input.title;
    todo.is_completed = input.is_completed;
    info!(id = todo.id, completed = todo.is_completed, "updated todo");
    Ok(Json(todo.clone()))
}

async fn delete_todo(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Todo>>, StatusCode> {
    let mut store = db.write().await;
    if store.todos.remove(&id).is_none() {
        warn!(id, "delete rejected: unknown id");
        return Err(StatusCode::NOT_FOUND);
    }
    info!(id, "deleted todo");
    Ok(Json(store.list()))
}
