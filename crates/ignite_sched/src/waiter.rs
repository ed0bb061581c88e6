//! Resource readiness waiter.
//!
//! Any caller can ask to be notified once a set of resources all exist. The
//! request is answered with a [`WhenReady`] future backed by a oneshot
//! continuation; the scheduler's resolution pass fires the continuation the
//! instant every awaited resource is present.
//!
//! A waiter whose resources never gain a producer never resolves. That is
//! the documented contract — the scheduler does not time out or diagnose it
//! beyond the observational stalled-waiter report.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use serde::Serialize;

use ignite_resource::ResourceId;

/// A unique identifier for a waiter entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, PartialOrd, Ord)]
pub struct WaiterId(pub u64);

impl std::fmt::Display for WaiterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WaiterId({})", self.0)
    }
}

/// A queued readiness request.
pub(crate) struct WaiterEntry {
    pub id: WaiterId,
    /// Resources being awaited, in request order.
    pub awaited: Vec<ResourceId>,
    /// Fired exactly once, when every awaited resource is present.
    pub notify: oneshot::Sender<()>,
    /// Tick on which the request was queued, for stall diagnostics.
    pub created_tick: u64,
}

/// Queue of unresolved readiness requests.
#[derive(Default)]
pub struct ReadyWaiter {
    next_id: u64,
    entries: Vec<WaiterEntry>,
}

impl ReadyWaiter {
    /// Create a new empty waiter queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a request and return the future that resolves with it.
    pub(crate) fn enqueue(&mut self, awaited: Vec<ResourceId>, created_tick: u64) -> WhenReady {
        let id = WaiterId(self.next_id);
        self.next_id += 1;
        let (notify, receiver) = oneshot::channel();
        self.entries.push(WaiterEntry {
            id,
            awaited,
            notify,
            created_tick,
        });
        WhenReady::waiting(receiver)
    }

    /// Take the current entries for a resolution pass. Unmet entries are
    /// handed back via [`ReadyWaiter::requeue`].
    pub(crate) fn take_entries(&mut self) -> Vec<WaiterEntry> {
        std::mem::take(&mut self.entries)
    }

    /// Put an unmet entry back in the queue.
    pub(crate) fn requeue(&mut self, entry: WaiterEntry) {
        self.entries.push(entry);
    }

    pub(crate) fn entries(&self) -> &[WaiterEntry] {
        &self.entries
    }

    /// Returns the number of unresolved requests.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.entries.len()
    }
}

/// Future returned by `when_ready`: resolves once every awaited resource is
/// present in the resource registry.
///
/// If all resources were already present at request time the future is born
/// resolved and completes on its first poll, without waiting for a tick.
pub struct WhenReady {
    state: WhenReadyState,
}

enum WhenReadyState {
    /// Everything was present at request time.
    Ready,
    /// Waiting on the scheduler's resolution pass.
    Waiting(oneshot::Receiver<()>),
}

impl WhenReady {
    /// A future that is already resolved.
    pub(crate) fn ready() -> Self {
        Self {
            state: WhenReadyState::Ready,
        }
    }

    pub(crate) fn waiting(receiver: oneshot::Receiver<()>) -> Self {
        Self {
            state: WhenReadyState::Waiting(receiver),
        }
    }
}

impl Future for WhenReady {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = self.get_mut();
        match &mut this.state {
            WhenReadyState::Ready => Poll::Ready(()),
            WhenReadyState::Waiting(receiver) => match Pin::new(receiver).poll(cx) {
                Poll::Ready(Ok(())) => Poll::Ready(()),
                // The scheduler was torn down before the resources appeared.
                // The contract is an indefinite silent wait, not an error.
                Poll::Ready(Err(oneshot::Canceled)) => Poll::Pending,
                Poll::Pending => Poll::Pending,
            },
        }
    }
}
