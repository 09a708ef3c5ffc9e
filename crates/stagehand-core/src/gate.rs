//! One-shot synchronization gate.
//!
//! A [`Gate`] is a future value with external settlement: created pending,
//! settled exactly once by [`Gate::open`] or [`Gate::fault`], awaited any
//! number of times through [`Gate::opened`]. The orchestrator uses the same
//! primitive for two barriers:
//!
//! - the process-wide "framework started" gate, opened once by startup and
//!   never re-created;
//! - the per-swap "previous app fully unmounted" gates created in singular
//!   mode, one per application swap.
//!
//! Built on `tokio::sync::watch` so any number of waiters can park on one
//! gate; all of them resume on the single settlement.

use std::{future::Future, sync::Arc};

use tokio::sync::watch;

use crate::error::GateError;

#[derive(Debug, Clone)]
enum State {
    Pending,
    Open,
    Faulted(Arc<str>),
}

/// A cloneable one-shot gate with external settlement.
///
/// Clones share the same underlying state; settling any clone settles the
/// gate for every waiter. Settlement is forward-only: once open or faulted
/// the gate never reverts to pending and later settlement attempts are
/// no-ops.
#[derive(Debug, Clone)]
pub struct Gate {
    state: Arc<watch::Sender<State>>,
}

impl Default for Gate {
    fn default() -> Self {
        Self::new()
    }
}

impl Gate {
    /// Create a gate in the pending state.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(State::Pending);
        Self { state: Arc::new(tx) }
    }

    /// Resolve the gate, releasing every waiter.
    ///
    /// Returns `true` if this call settled the gate, `false` if it was
    /// already settled.
    pub fn open(&self) -> bool {
        self.settle(State::Open)
    }

    /// Reject the gate; waiters observe [`GateError::Faulted`].
    ///
    /// Returns `true` if this call settled the gate, `false` if it was
    /// already settled.
    pub fn fault(&self, reason: impl Into<String>) -> bool {
        self.settle(State::Faulted(Arc::from(reason.into())))
    }

    /// Whether the gate has been settled (open or faulted).
    #[must_use]
    pub fn is_settled(&self) -> bool {
        !matches!(&*self.state.borrow(), State::Pending)
    }

    /// Wait until the gate settles.
    ///
    /// The returned future is `'static` and holds no [`Gate`] handle, so it
    /// can be parked across task boundaries. Completes immediately if the
    /// gate is already settled.
    ///
    /// # Errors
    ///
    /// Resolves to [`GateError::Faulted`] if the gate was rejected, or
    /// [`GateError::Abandoned`] if every [`Gate`] handle was dropped while
    /// the gate was still pending.
    pub fn opened(&self) -> impl Future<Output = Result<(), GateError>> + Send + 'static {
        let mut rx = self.state.subscribe();
        async move {
            loop {
                match &*rx.borrow_and_update() {
                    State::Open => return Ok(()),
                    State::Faulted(reason) => return Err(GateError::Faulted(reason.to_string())),
                    State::Pending => {},
                }
                if rx.changed().await.is_err() {
                    return Err(GateError::Abandoned);
                }
            }
        }
    }

    fn settle(&self, next: State) -> bool {
        self.state.send_if_modified(|state| {
            if matches!(state, State::Pending) {
                *state = next.clone();
                true
            } else {
                false
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn opens_once() {
        let gate = Gate::new();
        assert!(!gate.is_settled());

        assert!(gate.open());
        assert!(gate.is_settled());
        gate.opened().await.unwrap();

        // Second settlement is a no-op either way.
        assert!(!gate.open());
        assert!(!gate.fault("late"));
        gate.opened().await.unwrap();
    }

    #[tokio::test]
    async fn fault_rejects_waiters() {
        let gate = Gate::new();
        assert!(gate.fault("sandbox exploded"));

        let err = gate.opened().await.unwrap_err();
        assert_eq!(err, GateError::Faulted("sandbox exploded".into()));
    }

    #[tokio::test]
    async fn releases_multiple_waiters() {
        let gate = Gate::new();

        let mut waiters = Vec::new();
        for _ in 0..3 {
            waiters.push(tokio::spawn(gate.opened()));
        }
        tokio::task::yield_now().await;

        gate.open();
        for waiter in waiters {
            waiter.await.unwrap().unwrap();
        }
    }

    #[tokio::test]
    async fn waiter_observes_prior_settlement() {
        let gate = Gate::new();
        gate.open();

        // A clone taken after settlement still resolves.
        gate.clone().opened().await.unwrap();
    }

    #[tokio::test]
    async fn abandoned_when_all_handles_drop() {
        let gate = Gate::new();
        let wait = gate.opened();

        drop(gate);
        assert_eq!(wait.await.unwrap_err(), GateError::Abandoned);
    }
}
