// ── Atomic counter primitive ──
//
// Named 64-bit counters handed out by `StorageService`. Each increment runs
// as its own spawned task; the caller gets a future for the result and may
// stop waiting on it at any time without undoing the increment.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::store::{StorageService, StoreError};

/// Default upper bound a caller waits for an increment.
pub const DEFAULT_INCREMENT_TIMEOUT: Duration = Duration::from_secs(3);

// ── Builder ─────────────────────────────────────────────────────────

/// Returned by [`StorageService::atomic_counter_builder`].
pub struct AtomicCounterBuilder<'a> {
    service: &'a StorageService,
    name: Option<String>,
    replicated: bool,
}

impl<'a> AtomicCounterBuilder<'a> {
    pub(crate) fn new(service: &'a StorageService) -> Self {
        Self {
            service,
            name: None,
            replicated: true,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Build a single-node, in-memory counter instead of the replicated
    /// one. The two never share state, even under the same name.
    #[must_use]
    pub fn with_partitions_disabled(mut self) -> Self {
        self.replicated = false;
        self
    }

    pub fn build_async_counter(self) -> Result<AsyncAtomicCounter, StoreError> {
        let name = self.name.ok_or(StoreError::MissingName {
            what: "atomic counter",
        })?;
        let cell = self.service.counter_cell(&name, self.replicated);
        Ok(AsyncAtomicCounter {
            name,
            replicated: self.replicated,
            cell,
        })
    }
}

// ── Counter handle ──────────────────────────────────────────────────

/// Handle to a named counter. Cheap to clone; clones share the value.
#[derive(Debug, Clone)]
pub struct AsyncAtomicCounter {
    name: String,
    replicated: bool,
    cell: Arc<AtomicI64>,
}

impl AsyncAtomicCounter {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_replicated(&self) -> bool {
        self.replicated
    }

    /// Atomically add one and resolve to the new value.
    pub fn increment_and_get(&self) -> PendingIncrement {
        self.add_and_get(1)
    }

    /// Atomically add `delta` and resolve to the new value.
    ///
    /// Must be called from within a Tokio runtime; otherwise the returned
    /// future resolves to [`CoreError::CounterFailed`] without touching the
    /// counter.
    pub fn add_and_get(&self, delta: i64) -> PendingIncrement {
        let name = self.name.clone();
        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                return PendingIncrement {
                    name,
                    state: PendingState::Failed(Some(e.to_string())),
                };
            }
        };

        let cell = Arc::clone(&self.cell);
        let task_name = name.clone();
        let task = handle.spawn(async move {
            cell.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| v.checked_add(delta))
                .map(|previous| previous + delta)
                .map_err(|current| CoreError::CounterFailed {
                    name: task_name,
                    reason: format!("adding {delta} to {current} overflows"),
                })
        });

        PendingIncrement {
            name,
            state: PendingState::Spawned(task),
        }
    }

    /// Current value.
    pub fn get(&self) -> i64 {
        self.cell.load(Ordering::SeqCst)
    }

    /// Increment and wait at most `timeout` for the result.
    ///
    /// Timeouts and failures are logged and reported, never retried.
    /// Cancelling `cancel` abandons the wait silently; the increment itself
    /// still completes.
    pub async fn increment_with_timeout(
        &self,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> IncrementOutcome {
        self.wait_for(self.increment_and_get(), timeout, cancel).await
    }

    async fn wait_for<F>(
        &self,
        pending: F,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> IncrementOutcome
    where
        F: Future<Output = Result<i64, CoreError>> + Send,
    {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!(counter = %self.name, "increment wait cancelled");
                IncrementOutcome::Cancelled
            }
            result = tokio::time::timeout(timeout, pending) => match result {
                Ok(Ok(value)) => {
                    debug!(counter = %self.name, value, "incremented");
                    IncrementOutcome::Incremented(value)
                }
                Ok(Err(e)) => {
                    warn!(counter = %self.name, error = %e, "increment failed");
                    IncrementOutcome::Failed(e)
                }
                Err(_) => {
                    warn!(
                        counter = %self.name,
                        timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                        "increment timed out"
                    );
                    IncrementOutcome::Failed(CoreError::CounterTimeout {
                        name: self.name.clone(),
                        timeout,
                    })
                }
            }
        }
    }
}

// ── Pending result ──────────────────────────────────────────────────

enum PendingState {
    Spawned(JoinHandle<Result<i64, CoreError>>),
    /// Could not be spawned; holds the reason until first polled.
    Failed(Option<String>),
}

/// Future of an in-flight increment. Dropping it does not cancel the
/// increment.
pub struct PendingIncrement {
    name: String,
    state: PendingState,
}

impl Future for PendingIncrement {
    type Output = Result<i64, CoreError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match &mut this.state {
            PendingState::Spawned(task) => Pin::new(task).poll(cx).map(|joined| {
                joined.unwrap_or_else(|e| {
                    Err(CoreError::CounterFailed {
                        name: this.name.clone(),
                        reason: e.to_string(),
                    })
                })
            }),
            PendingState::Failed(reason) => Poll::Ready(Err(CoreError::CounterFailed {
                name: this.name.clone(),
                reason: reason
                    .take()
                    .unwrap_or_else(|| "increment already reported".into()),
            })),
        }
    }
}

/// Result of [`AsyncAtomicCounter::increment_with_timeout`].
#[derive(Debug)]
pub enum IncrementOutcome {
    Incremented(i64),
    /// Timed out ([`CoreError::CounterTimeout`]) or failed outright.
    Failed(CoreError),
    /// The wait was cancelled; nothing is reported.
    Cancelled,
}

impl IncrementOutcome {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Failed(CoreError::CounterTimeout { .. }))
    }
}
