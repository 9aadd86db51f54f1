//! Outstanding-task tracking and the drain-on-shutdown state machine.
//!
//! ```text
//! Running --initiate_shutdown()--> Draining --outstanding == 0--> Stopped
//! ```
//!
//! Every background task registers with the [`ShutdownCoordinator`] before it
//! is spawned and holds the returned [`TaskGuard`] until it finishes. Once
//! shutdown is initiated no further registrations are accepted, and the
//! coordinator moves to [`ShutdownState::Stopped`] as soon as the last guard is
//! dropped.
//!
//! The drain has no timeout. A task that never finishes keeps the coordinator
//! in `Draining` forever.

use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;

/// Lifecycle of the service with respect to shutdown.
///
/// Transitions are monotonic: the state never moves backwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShutdownState {
    /// Accepting submissions.
    Running,
    /// Shutdown was initiated; waiting for outstanding tasks to finish.
    Draining,
    /// Every outstanding task has finished.
    Stopped,
}

/// Tracks outstanding background tasks and sequences shutdown.
///
/// The state and the outstanding count are guarded by one mutex so that a
/// registration can never slip in between the decision to drain and the
/// transition to [`ShutdownState::Stopped`]. Each transition is published on a
/// [`watch`] channel, which lets any number of waiters await it without
/// missing the wake-up.
pub struct ShutdownCoordinator {
    inner: Mutex<Inner>,
    state_tx: watch::Sender<ShutdownState>,
}

struct Inner {
    state: ShutdownState,
    outstanding: usize,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (state_tx, _) = watch::channel(ShutdownState::Running);
        Self {
            inner: Mutex::new(Inner {
                state: ShutdownState::Running,
                outstanding: 0,
            }),
            state_tx,
        }
    }

    /// Registers one outstanding task.
    ///
    /// Must be called synchronously at submission time, before the task is
    /// spawned. The task is deregistered when the returned guard is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ServiceShutdown`] once shutdown has been initiated.
    pub fn register(self: &Arc<Self>) -> Result<TaskGuard> {
        let mut inner = self.inner.lock();
        if inner.state != ShutdownState::Running {
            return Err(Error::ServiceShutdown);
        }
        inner.outstanding += 1;

        Ok(TaskGuard {
            coordinator: Arc::clone(self),
        })
    }

    fn deregister(&self) {
        let mut inner = self.inner.lock();
        inner.outstanding -= 1;

        if inner.state == ShutdownState::Draining && inner.outstanding == 0 {
            self.transition(&mut inner, ShutdownState::Stopped);
        }
    }

    /// Stops accepting new tasks and starts draining.
    ///
    /// Returns immediately; use [`Self::await_stopped`] to wait for the drain
    /// to finish. If nothing is outstanding the coordinator goes straight to
    /// [`ShutdownState::Stopped`].
    ///
    /// Returns `true` if this call initiated shutdown and `false` if shutdown
    /// was already underway, in which case nothing changes.
    pub fn initiate_shutdown(&self) -> bool {
        let mut inner = self.inner.lock();
        if inner.state != ShutdownState::Running {
            return false;
        }

        #[cfg(feature = "tracing")]
        tracing::info!(
            outstanding = inner.outstanding,
            "Shutdown initiated, draining outstanding tasks"
        );

        self.transition(&mut inner, ShutdownState::Draining);
        if inner.outstanding == 0 {
            self.transition(&mut inner, ShutdownState::Stopped);
        }
        true
    }

    fn transition(&self, inner: &mut Inner, next: ShutdownState) {
        debug_assert!(next > inner.state);
        inner.state = next;
        // Published under the lock so observers see transitions in order.
        self.state_tx.send_replace(next);

        #[cfg(feature = "tracing")]
        tracing::debug!(state = ?next, "Shutdown state changed");
    }

    /// Waits until the coordinator reaches [`ShutdownState::Stopped`].
    ///
    /// Resolves immediately if it already has. There is no timeout.
    pub async fn await_stopped(&self) {
        self.await_state(ShutdownState::Stopped).await;
    }

    /// Waits until shutdown has been initiated.
    pub async fn await_draining(&self) {
        self.await_state(ShutdownState::Draining).await;
    }

    async fn await_state(&self, target: ShutdownState) {
        let mut rx = self.state_tx.subscribe();
        // The sender lives as long as `self`, so the channel cannot close
        // while we wait.
        let _ = rx.wait_for(|state| *state >= target).await;
    }

    pub fn state(&self) -> ShutdownState {
        self.inner.lock().state
    }

    /// Returns `true` while new tasks may still be registered.
    pub fn is_accepting(&self) -> bool {
        self.state() == ShutdownState::Running
    }

    /// Number of registered tasks that have not finished yet.
    pub fn outstanding(&self) -> usize {
        self.inner.lock().outstanding
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Proof of registration for one outstanding task.
///
/// Dropping the guard deregisters the task, including when the task unwinds.
#[must_use = "dropping the guard deregisters the task immediately"]
pub struct TaskGuard {
    coordinator: Arc<ShutdownCoordinator>,
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.coordinator.deregister();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::time::Duration;
    use tokio::time::timeout;

    #[test]
    fn starts_running_and_accepting() {
        let coordinator = ShutdownCoordinator::new();

        assert_eq!(coordinator.state(), ShutdownState::Running);
        assert!(coordinator.is_accepting());
        assert_eq!(coordinator.outstanding(), 0);
    }

    #[test]
    fn guards_track_outstanding_tasks() {
        let coordinator = Arc::new(ShutdownCoordinator::new());

        let first = coordinator.register().unwrap();
        let second = coordinator.register().unwrap();
        assert_eq!(coordinator.outstanding(), 2);

        drop(first);
        assert_eq!(coordinator.outstanding(), 1);
        drop(second);
        assert_eq!(coordinator.outstanding(), 0);
        assert_eq!(coordinator.state(), ShutdownState::Running);
    }

    #[test]
    fn idle_shutdown_stops_immediately() {
        let coordinator = ShutdownCoordinator::new();

        assert!(coordinator.initiate_shutdown());
        assert_eq!(coordinator.state(), ShutdownState::Stopped);
        assert!(!coordinator.is_accepting());
    }

    #[test]
    fn draining_rejects_new_registrations() {
        let coordinator = Arc::new(ShutdownCoordinator::new());
        let guard = coordinator.register().unwrap();

        assert!(coordinator.initiate_shutdown());
        assert_eq!(coordinator.state(), ShutdownState::Draining);
        assert!(matches!(
            coordinator.register(),
            Err(Error::ServiceShutdown)
        ));
        assert_eq!(coordinator.outstanding(), 1);

        drop(guard);
        assert_eq!(coordinator.state(), ShutdownState::Stopped);
        assert!(matches!(
            coordinator.register(),
            Err(Error::ServiceShutdown)
        ));
    }

    #[test]
    fn second_shutdown_is_a_no_op() {
        let coordinator = Arc::new(ShutdownCoordinator::new());
        let guard = coordinator.register().unwrap();

        assert!(coordinator.initiate_shutdown());
        assert!(!coordinator.initiate_shutdown());
        assert_eq!(coordinator.state(), ShutdownState::Draining);

        drop(guard);
        assert!(!coordinator.initiate_shutdown());
        assert_eq!(coordinator.state(), ShutdownState::Stopped);
        assert_eq!(coordinator.outstanding(), 0);
    }

    #[tokio::test]
    async fn await_stopped_blocks_until_last_guard_drops() {
        let coordinator = Arc::new(ShutdownCoordinator::new());
        let first = coordinator.register().unwrap();
        let second = coordinator.register().unwrap();

        let waiter = tokio::spawn({
            let coordinator = Arc::clone(&coordinator);
            async move { coordinator.await_stopped().await }
        });

        coordinator.initiate_shutdown();
        drop(first);
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());
        assert_eq!(coordinator.state(), ShutdownState::Draining);

        drop(second);
        timeout(Duration::from_secs(5), waiter)
            .await
            .expect("waiter should finish after the drain")
            .unwrap();
        assert_eq!(coordinator.state(), ShutdownState::Stopped);
    }

    #[tokio::test]
    async fn waiters_after_the_fact_resolve_immediately() {
        let coordinator = ShutdownCoordinator::new();
        coordinator.initiate_shutdown();

        timeout(Duration::from_secs(1), coordinator.await_draining())
            .await
            .unwrap();
        timeout(Duration::from_secs(1), coordinator.await_stopped())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn await_draining_resolves_before_stopped() {
        let coordinator = Arc::new(ShutdownCoordinator::new());
        let guard = coordinator.register().unwrap();

        let draining = tokio::spawn({
            let coordinator = Arc::clone(&coordinator);
            async move { coordinator.await_draining().await }
        });
        tokio::task::yield_now().await;
        assert!(!draining.is_finished());

        coordinator.initiate_shutdown();
        timeout(Duration::from_secs(5), draining)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(coordinator.state(), ShutdownState::Draining);

        drop(guard);
        coordinator.await_stopped().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_guards_drain_exactly_once() {
        const TASKS: usize = 256;

        let coordinator = Arc::new(ShutdownCoordinator::new());
        let mut handles = Vec::with_capacity(TASKS);

        for i in 0..TASKS {
            let guard = coordinator.register().unwrap();
            handles.push(tokio::spawn(async move {
                tokio::time::sleep(Duration::from_micros((i % 7) as u64 * 100)).await;
                drop(guard);
            }));
        }

        coordinator.initiate_shutdown();
        timeout(Duration::from_secs(10), coordinator.await_stopped())
            .await
            .unwrap();

        assert_eq!(coordinator.outstanding(), 0);
        assert_eq!(coordinator.state(), ShutdownState::Stopped);
        for handle in handles {
            handle.await.unwrap();
        }
    }
}
