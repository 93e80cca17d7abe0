//! Async work for the UI loop.
//!
//! Tasks run on the tokio runtime and report back as [`Message`]s over a
//! channel the main loop drains every tick. Each task is bound to a
//! cancellation token; a cancelled task sends nothing.

use std::future::Future;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::domain::Message;

#[derive(Clone)]
pub struct Tasks {
    handle: Handle,
    sender: UnboundedSender<Message>,
}

impl Tasks {
    pub fn new(handle: Handle, sender: UnboundedSender<Message>) -> Self {
        Self { handle, sender }
    }

    pub fn spawn<F>(&self, cancel: CancellationToken, task: F)
    where
        F: Future<Output = Message> + Send + 'static,
    {
        let sender = self.sender.clone();
        self.handle.spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => trace!("Task cancelled"),
                message = task => {
                    if sender.send(message).is_err() {
                        debug!("UI loop is gone, dropping task result");
                    }
                }
            }
        });
    }
}

/// Waits until `min_display` has passed since `started`. Returns at once
/// when it already has.
pub async fn hold_until(started: Instant, min_display: Duration) {
    let elapsed = started.elapsed();
    if elapsed < min_display {
        tokio::time::sleep(min_display - elapsed).await;
    }
}

/// Cancellation and request generations of one page.
///
/// Every request takes a new generation; only the result carrying the
/// latest one is applied. Dropping the scope (or leaving the page) cancels
/// everything still in flight.
#[derive(Debug, Default)]
pub struct TaskScope {
    cancel: CancellationToken,
    generation: u64,
}

impl TaskScope {
    /// Starts a superseding request.
    pub fn next_request(&mut self) -> (u64, CancellationToken) {
        self.generation += 1;
        (self.generation, self.cancel.child_token())
    }

    /// Token for work that does not supersede earlier requests.
    pub fn token(&self) -> CancellationToken {
        self.cancel.child_token()
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    pub fn cancel_all(&mut self) {
        trace!("Cancelling tasks up to generation {}", self.generation);
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
    }
}

impl Drop for TaskScope {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
