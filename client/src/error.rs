//! Error types for the todo API client.
//!
//! # Design
//! `Validation` and `NotFound` get dedicated variants because callers
//! distinguish "the server rejected my input" and "the resource does not
//! exist" from "the server returned an unexpected status." All other
//! non-2xx responses land in `Http` with the raw status code and body.

use std::fmt;

/// Errors returned by `TodoClient` parse methods.
#[derive(Debug)]
pub enum ApiError {
    /// The server rejected the request with a structured 400 body; the
    /// payload is the server's human-readable `errorMessage`.
    Validation(String),

    /// The server returned 404 — the requested todo does not exist.
    NotFound,

    /// The server returned a non-2xx status other than 400/404.
    Http { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    Serialization(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(message) => write!(f, "validation failed: {message}"),
            ApiError::NotFound => write!(f, "resource not found"),
            ApiError::Http { status, body } => {
                write!(f, "HTTP {status}: {body}")
            }
            ApiError::Deserialization(msg) => {
                write!(f, "deserialization failed: {msg}")
            }
            ApiError::Serialization(msg) => {
                write!(f, "serialization failed: {msg}")
            }
        }
    }
}

impl std::error::Error for ApiError {}
