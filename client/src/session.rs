//! Live wiring between the list cache, the three mutations, and the
//! most-recent-action view state.
//!
//! # Design
//! `TodoSession` owns one list `Query`, three independent `Mutation`s, the
//! pending input text, and the recorded outcome of each mutation kind.
//! I/O is injected as an async `Transport` closure, so the session itself
//! stays free of any HTTP dependency: the wire layer builds requests, the
//! transport executes them, the session reacts to completions.
//!
//! Completions are observed in `poll()`, on the caller's event loop. A
//! successful mutation is stamped with the next value of a logical clock,
//! recorded in its slot, and followed by invalidating the list cache so
//! the next read reflects server state. Failed mutations are logged and
//! change nothing. Stamps are handed out in observed completion order, so
//! they are strictly increasing and deterministic under test.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::warn;

use crate::client::TodoClient;
use crate::http::{HttpRequest, HttpResponse};
use crate::mutation::{Mutation, MutationState};
use crate::outcome::{ActionKind, MutationOutcome};
use crate::query::{Query, QueryKey, QueryState};
use crate::reconcile::select_latest;
use crate::types::{AddTodo, Todo, UpdateTodo};

/// Logical identity of the cached list read.
pub const LIST_QUERY: QueryKey = QueryKey::new("get", "/todo");

/// Future returned by a transport invocation.
pub type TransportFuture = Pin<Box<dyn Future<Output = Result<HttpResponse, String>> + Send>>;

/// Executes one HTTP round-trip. The session builds requests and parses
/// responses; the transport owns the wire.
pub type Transport = Arc<dyn Fn(HttpRequest) -> TransportFuture + Send + Sync>;

/// Client-side session over the todo service.
pub struct TodoSession {
    list: Query<Vec<Todo>>,
    add: Mutation<String, Vec<Todo>>,
    update: Mutation<Todo, Vec<Todo>>,
    delete: Mutation<i64, Vec<Todo>>,
    input: String,
    add_outcome: Option<MutationOutcome>,
    update_outcome: Option<MutationOutcome>,
    delete_outcome: Option<MutationOutcome>,
    clock: u64,
}

impl TodoSession {
    pub fn new(base_url: &str, transport: Transport) -> Self {
        let client = TodoClient::new(base_url);

        let list = {
            let client = client.clone();
            let transport = transport.clone();
            Query::new(LIST_QUERY, move || {
                let client = client.clone();
                let transport = transport.clone();
                async move {
                    let resp = transport(client.build_list_todos()).await?;
                    client.parse_list_todos(resp).map_err(|e| e.to_string())
                }
            })
        };

        let add = {
            let client = client.clone();
            let transport = transport.clone();
            Mutation::new(move |title: String| {
                let client = client.clone();
                let transport = transport.clone();
                async move {
                    let req = client
                        .build_add_todo(&AddTodo { title })
                        .map_err(|e| e.to_string())?;
                    let resp = transport(req).await?;
                    let created = client.parse_add_todo(resp).map_err(|e| e.to_string())?;
                    Ok(vec![created])
                }
            })
        };

        let update = {
            let client = client.clone();
            let transport = transport.clone();
            Mutation::new(move |todo: Todo| {
                let client = client.clone();
                let transport = transport.clone();
                async move {
                    let req = client
                        .build_update_todo(&UpdateTodo::from(&todo))
                        .map_err(|e| e.to_string())?;
                    let resp = transport(req).await?;
                    let updated = client.parse_update_todo(resp).map_err(|e| e.to_string())?;
                    Ok(vec![updated])
                }
            })
        };

        let delete = {
            let client = client.clone();
            let transport = transport.clone();
            Mutation::new(move |id: i64| {
                let client = client.clone();
                let transport = transport.clone();
                async move {
                    let resp = transport(client.build_delete_todo(id)).await?;
                    client.parse_delete_todo(resp).map_err(|e| e.to_string())
                }
            })
        };

        Self {
            list,
            add,
            update,
            delete,
            input: String::new(),
            add_outcome: None,
            update_outcome: None,
            delete_outcome: None,
            clock: 0,
        }
    }

    /// Pending input text for the add form.
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Start the list query (cached: a no-op while fresh data is present).
    pub fn load(&mut self) {
        self.list.fetch();
    }

    /// Current state of the cached list read.
    pub fn list(&self) -> &QueryState<Vec<Todo>> {
        self.list.state()
    }

    /// Whether any mutation is in flight.
    pub fn is_mutating(&self) -> bool {
        self.add.is_pending() || self.update.is_pending() || self.delete.is_pending()
    }

    /// Submit the current input as a new todo. Empty input still goes to
    /// the server, which answers with the structured validation error.
    pub fn add_todo(&mut self) {
        let title = self.input.clone();
        self.add.mutate(title);
    }

    /// Update `todo` with its completion flag flipped.
    pub fn toggle_todo(&mut self, todo: &Todo) {
        let mut next = todo.clone();
        next.is_completed = !next.is_completed;
        self.update.mutate(next);
    }

    pub fn remove_todo(&mut self, id: i64) {
        self.delete.mutate(id);
    }

    /// Invalidate any cached query matching `key` and kick off its refetch.
    pub fn invalidate(&mut self, key: &QueryKey) {
        if self.list.key() == key {
            self.list.invalidate();
            self.list.fetch();
        }
    }

    /// Drain completions from the query and all three mutations.
    ///
    /// Returns `true` if any visible state changed. Each mutation
    /// completion is handled exactly once, at the poll that observes it.
    pub fn poll(&mut self) -> bool {
        let mut changed = self.list.poll();
        changed |= self.poll_add();
        changed |= self.poll_delete();
        changed |= self.poll_update();
        changed
    }

    /// The most recently completed mutation, or the sentinel when none has
    /// completed yet.
    pub fn last_action(&self) -> MutationOutcome {
        select_latest(
            self.add_outcome.as_ref(),
            self.delete_outcome.as_ref(),
            self.update_outcome.as_ref(),
        )
    }

    fn poll_add(&mut self) -> bool {
        if !self.add.poll() {
            return false;
        }
        let completed = match self.add.state() {
            MutationState::Success(todos) => Some(todos.clone()),
            MutationState::Error(err) => {
                warn!(action = "add", error = %err, "mutation failed");
                None
            }
            _ => None,
        };
        if let Some(todos) = completed {
            self.record(ActionKind::Add, todos);
            self.input.clear();
        }
        true
    }

    fn poll_delete(&mut self) -> bool {
        if !self.delete.poll() {
            return false;
        }
        let completed = match self.delete.state() {
            MutationState::Success(todos) => Some(todos.clone()),
            MutationState::Error(err) => {
                warn!(action = "delete", error = %err, "mutation failed");
                None
            }
            _ => None,
        };
        if let Some(todos) = completed {
            self.record(ActionKind::Delete, todos);
        }
        true
    }

    fn poll_update(&mut self) -> bool {
        if !self.update.poll() {
            return false;
        }
        let completed = match self.update.state() {
            MutationState::Success(todos) => Some(todos.clone()),
            MutationState::Error(err) => {
                warn!(action = "update", error = %err, "mutation failed");
                None
            }
            _ => None,
        };
        if let Some(todos) = completed {
            self.record(ActionKind::Update, todos);
        }
        true
    }

    fn record(&mut self, action: ActionKind, result_data: Vec<Todo>) {
        self.clock += 1;
        let outcome = MutationOutcome::new(action, result_data, self.clock);
        match action {
            ActionKind::Add => self.add_outcome = Some(outcome),
            ActionKind::Delete => self.delete_outcome = Some(outcome),
            ActionKind::Update => self.update_outcome = Some(outcome),
            ActionKind::None => {}
        }
        self.invalidate(&LIST_QUERY);
    }
}
