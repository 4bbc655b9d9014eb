//! Async write operation with a pending/success/error lifecycle.
//!
//! `Mutation<I, T>` is the write-side counterpart of `Query<T>`: the same
//! channel-and-poll shape, but the closure takes an input value per
//! invocation. Each mutation kind is an independent instance, so different
//! kinds can be in flight concurrently; a single instance runs one
//! operation at a time and ignores `mutate` calls while pending. No
//! cancellation, no retry.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;

/// The state of a mutation.
#[derive(Debug, Clone)]
pub enum MutationState<T> {
    /// Mutation has never been started.
    Idle,
    /// Mutation is in flight.
    Pending,
    /// The most recent run completed successfully.
    Success(T),
    /// The most recent run failed.
    Error(String),
}

impl<T> MutationState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, MutationState::Pending)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, MutationState::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, MutationState::Error(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            MutationState::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            MutationState::Error(e) => Some(e),
            _ => None,
        }
    }
}

type BoxFuture<T> = Pin<Box<dyn Future<Output = Result<T, String>> + Send>>;

/// The operation itself: takes the input, returns a future.
type MutationFn<I, T> = Box<dyn Fn(I) -> BoxFuture<T> + Send + Sync>;

/// One asynchronous write operation with state tracking.
pub struct Mutation<I, T> {
    state: MutationState<T>,
    mutation_fn: MutationFn<I, T>,
    receiver: Option<mpsc::UnboundedReceiver<Result<T, String>>>,
}

impl<I, T: Send + 'static> Mutation<I, T> {
    pub fn new<F, Fut>(mutation_fn: F) -> Self
    where
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, String>> + Send + 'static,
    {
        Self {
            state: MutationState::Idle,
            mutation_fn: Box::new(move |input| Box::pin(mutation_fn(input))),
            receiver: None,
        }
    }

    pub fn state(&self) -> &MutationState<T> {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state.is_pending()
    }

    pub fn data(&self) -> Option<&T> {
        self.state.data()
    }

    /// Start the operation with the given input.
    ///
    /// Returns `false` (and does nothing) if a run is already pending.
    pub fn mutate(&mut self, input: I) -> bool {
        if self.state.is_pending() {
            return false;
        }

        let (tx, rx) = mpsc::unbounded_channel();
        self.receiver = Some(rx);
        self.state = MutationState::Pending;

        let future = (self.mutation_fn)(input);
        tokio::spawn(async move {
            let result = future.await;
            // Ignore send errors - receiver may have been dropped
            let _ = tx.send(result);
        });
        true
    }

    /// Poll for completion of a pending run.
    ///
    /// Returns `true` if the state changed. The new state stays visible
    /// until the next run starts, so a caller that acts only when `poll`
    /// reports a change handles each completion exactly once.
    pub fn poll(&mut self) -> bool {
        let receiver = match &mut self.receiver {
            Some(rx) => rx,
            None => return false,
        };

        match receiver.try_recv() {
            Ok(Ok(data)) => {
                self.state = MutationState::Success(data);
                self.receiver = None;
                true
            }
            Ok(Err(error)) => {
                self.state = MutationState::Error(error);
                self.receiver = None;
                true
            }
            Err(mpsc::error::TryRecvError::Empty) => false,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                self.state = MutationState::Error("mutation was cancelled".to_string());
                self.receiver = None;
                true
            }
        }
    }
}

impl<I, T: std::fmt::Debug> std::fmt::Debug for Mutation<I, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mutation")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn mutation_success() {
        let mut mutation = Mutation::new(|n: i32| async move { Ok::<_, String>(n * 2) });

        assert!(matches!(mutation.state(), MutationState::Idle));
        assert!(mutation.mutate(21));
        assert!(mutation.is_pending());

        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(mutation.poll());
        assert_eq!(mutation.data(), Some(&42));
    }

    #[tokio::test]
    async fn mutation_error() {
        let mut mutation: Mutation<i32, i32> =
            Mutation::new(|_| async { Err("rejected".to_string()) });

        mutation.mutate(1);
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(mutation.poll());
        assert!(mutation.state().is_error());
        assert_eq!(mutation.state().error(), Some("rejected"));
    }

    #[tokio::test]
    async fn mutate_while_pending_is_ignored() {
        let mut mutation = Mutation::new(|n: i32| async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok::<_, String>(n)
        });

        assert!(mutation.mutate(1));
        assert!(!mutation.mutate(2), "second mutate should be rejected");

        tokio::time::sleep(Duration::from_millis(100)).await;
        mutation.poll();
        assert_eq!(mutation.data(), Some(&1));
    }

    #[tokio::test]
    async fn poll_reports_each_completion_once() {
        let mut mutation = Mutation::new(|n: i32| async move { Ok::<_, String>(n) });

        mutation.mutate(7);
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(mutation.poll());
        assert!(!mutation.poll(), "no further change after completion");
    }
}
