//! Client-side data layer for the todo service.
//!
//! # Overview
//! Three layers, from pure to wired:
//! - `client` builds `HttpRequest` values and parses `HttpResponse` values
//!   without touching the network (host-does-IO pattern), so the wire layer
//!   is fully deterministic and testable.
//! - `query` / `mutation` provide the cached-read and tracked-write
//!   lifecycle (idle/pending/success/error), with completions observed via
//!   `poll` on the caller's event loop.
//! - `session` wires one list query and the three mutation kinds together:
//!   successful mutations stamp a `MutationOutcome` and invalidate the list
//!   cache; `reconcile::select_latest` derives the "last action" view from
//!   the three outcome slots.
//!
//! # Design
//! - `TodoClient` is stateless — it holds only `base_url`.
//! - I/O is injected: the session takes a `Transport` closure, tests supply
//!   an in-memory stub or a real HTTP executor.
//! - DTOs are defined independently from the server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod error;
pub mod http;
pub mod mutation;
pub mod outcome;
pub mod query;
pub mod reconcile;
pub mod session;
pub mod types;

pub use client::TodoClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use mutation::{Mutation, MutationState};
pub use outcome::{ActionKind, MutationOutcome};
pub use query::{Query, QueryKey, QueryState};
pub use reconcile::select_latest;
pub use session::{TodoSession, Transport, TransportFuture, LIST_QUERY};
pub use types::{AddTodo, Todo, UpdateTodo};
