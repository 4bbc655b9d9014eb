//! Cached async read with explicit invalidation.
//!
//! `Query<T>` encapsulates one logical read: the fetching closure, the
//! loading/success/error lifecycle, and a staleness flag. Staleness is
//! purely explicit — a successful mutation calls `invalidate()` — there is
//! no time-based expiry.
//!
//! Results come back over a channel and are observed only through
//! `poll()`, so state transitions happen atomically with respect to the
//! caller's event loop: between two polls the visible state never changes.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;

/// Logical identity of a cached read: the verb and path it stands for.
/// The list query's key is `("get", "/todo")`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryKey {
    verb: &'static str,
    path: &'static str,
}

impl QueryKey {
    pub const fn new(verb: &'static str, path: &'static str) -> Self {
        Self { verb, path }
    }
}

/// The state of a query.
#[derive(Debug, Clone)]
pub enum QueryState<T> {
    /// Query has not been started.
    Idle,
    /// Query is currently fetching data.
    Loading,
    /// Query completed successfully.
    Success(T),
    /// Query failed with an error.
    Error(String),
}

impl<T> QueryState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, QueryState::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, QueryState::Error(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            QueryState::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            QueryState::Error(e) => Some(e),
            _ => None,
        }
    }
}

/// A boxed future that returns a Result<T, String>.
type BoxFuture<T> = Pin<Box<dyn Future<Output = Result<T, String>> + Send>>;

/// A factory function that creates futures for fetching data.
type FetcherFn<T> = Box<dyn Fn() -> BoxFuture<T> + Send + Sync>;

/// Cached async read keyed by a logical `QueryKey`.
///
/// - `fetch()` starts the fetcher unless the cached value is still fresh;
/// - `invalidate()` marks the value stale so the next `fetch()` goes out;
/// - `refetch()` unconditionally starts over, discarding any pending fetch;
/// - `poll()` drains the completion channel in the caller's event loop.
pub struct Query<T> {
    key: QueryKey,
    state: QueryState<T>,
    fetcher: FetcherFn<T>,
    receiver: Option<mpsc::UnboundedReceiver<Result<T, String>>>,
    stale: bool,
}

impl<T: Send + 'static> Query<T> {
    pub fn new<F, Fut>(key: QueryKey, fetcher: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, String>> + Send + 'static,
    {
        Self {
            key,
            state: QueryState::Idle,
            fetcher: Box::new(move || Box::pin(fetcher())),
            receiver: None,
            stale: false,
        }
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn state(&self) -> &QueryState<T> {
        &self.state
    }

    pub fn data(&self) -> Option<&T> {
        self.state.data()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn is_success(&self) -> bool {
        self.state.is_success()
    }

    pub fn is_error(&self) -> bool {
        self.state.is_error()
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error()
    }

    /// Whether the cached value has been invalidated since it arrived.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Mark the cached value stale. The next `fetch()` will refetch even
    /// though data is present.
    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    /// Start fetching unless a fetch is in flight or the cached value is
    /// still fresh. Idle, stale, and error states all trigger a fetch.
    pub fn fetch(&mut self) {
        if self.state.is_loading() {
            return;
        }
        if self.state.is_success() && !self.stale {
            return;
        }
        self.start_fetch();
    }

    /// Force a refetch, discarding any pending one.
    pub fn refetch(&mut self) {
        self.receiver = None;
        self.start_fetch();
    }

    /// Poll for results from a pending fetch.
    ///
    /// Returns `true` if the state changed (data arrived or error occurred).
    /// Call this in your event loop tick handler.
    pub fn poll(&mut self) -> bool {
        let receiver = match &mut self.receiver {
            Some(rx) => rx,
            None => return false,
        };

        match receiver.try_recv() {
            Ok(Ok(data)) => {
                self.state = QueryState::Success(data);
                self.stale = false;
                self.receiver = None;
                true
            }
            Ok(Err(error)) => {
                self.state = QueryState::Error(error);
                self.receiver = None;
                true
            }
            Err(mpsc::error::TryRecvError::Empty) => false,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                // Sender dropped without sending - treat as error
                self.state = QueryState::Error("query was cancelled".to_string());
                self.receiver = None;
                true
            }
        }
    }

    fn start_fetch(&mut self) {
        let (tx, rx) = mpsc::unbounded_channel();
        self.receiver = Some(rx);
        self.state = QueryState::Loading;

        let future = (self.fetcher)();
        tokio::spawn(async move {
            let result = future.await;
            // Ignore send errors - receiver may have been dropped
            let _ = tx.send(result);
        });
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("key", &self.key)
            .field("state", &self.state)
            .field("stale", &self.stale)
            .finish_non_exhaustive()
    }
}
