//! Cancellable fetch scopes
//!
//! A view creates one `FetchScope` and runs its fetches through it. When the
//! view goes away the scope is dropped, which cancels every fetch still in
//! flight instead of leaving it to complete into a dead view.

use crate::error::{OptibillError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Owner of a group of fetches; dropping it cancels them
#[derive(Debug)]
pub struct FetchScope {
    cancel: watch::Sender<bool>,
    timeout: Option<Duration>,
}

impl FetchScope {
    /// Scope without a per-fetch time limit
    pub fn new() -> Self {
        let (cancel, _) = watch::channel(false);
        Self {
            cancel,
            timeout: None,
        }
    }

    /// Scope whose fetches fail with `Timeout` after `timeout`
    pub fn with_timeout(timeout: Duration) -> Self {
        let (cancel, _) = watch::channel(false);
        Self {
            cancel,
            timeout: Some(timeout),
        }
    }

    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    /// Await `fetch`, unless the scope is cancelled or the timeout expires first
    pub async fn run<T, F>(&self, resource: &str, fetch: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        guarded(self.cancel.subscribe(), self.timeout, resource.to_string(), fetch).await
    }

    /// Spawn `fetch` on the runtime, bound to this scope
    pub fn spawn<T, F>(&self, resource: &str, fetch: F) -> JoinHandle<Result<T>>
    where
        T: Send + 'static,
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let cancelled = self.cancel.subscribe();
        let timeout = self.timeout;
        let resource = resource.to_string();
        tokio::spawn(guarded(cancelled, timeout, resource, fetch))
    }
}

impl Default for FetchScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for FetchScope {
    fn drop(&mut self) {
        self.cancel.send_replace(true);
    }
}

async fn guarded<T, F>(
    mut cancelled: watch::Receiver<bool>,
    timeout: Option<Duration>,
    resource: String,
    fetch: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if *cancelled.borrow() {
        return Err(OptibillError::Cancelled(resource));
    }

    let raced = async {
        tokio::select! {
            result = fetch => result,
            _ = cancelled.wait_for(|c| *c) => {
                log::debug!("Fetch of {} cancelled", resource);
                Err(OptibillError::Cancelled(resource.clone()))
            }
        }
    };

    let limit = match timeout {
        Some(limit) => limit,
        None => return raced.await,
    };

    let outcome = tokio::time::timeout(limit, raced).await;
    outcome.unwrap_or_else(|_| {
        log::warn!("Fetch of {} timed out after {:?}", resource, limit);
        Err(OptibillError::Timeout {
            resource: resource.clone(),
            after: limit,
        })
    })
}
