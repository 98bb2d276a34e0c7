//! Delay service - timed waits grouped under a key, cancellable in bulk
//!
//! Every wait is registered under a group when it is created. Cancelling a
//! group interrupts every wait pending under it at that moment; each of those
//! waiters resolves to [`Cancelled`] exactly once. A wait that completes (or is
//! dropped) removes its own registration, so a later cancel never touches it.

use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::oneshot;

/// The wait was interrupted by [`DelayService::cancel_group`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("delayed operation was cancelled")]
pub struct Cancelled;

/// Group keys used by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DelayGroup {
    /// Every wait that guards a board mutation (swap, fall, destroy).
    BoardMutation,
}

struct Registry<G> {
    next_id: u64,
    pending: HashMap<G, HashMap<u64, oneshot::Sender<()>>>,
}

impl<G: Eq + Hash> Registry<G> {
    fn remove(&mut self, group: &G, id: u64) -> Option<oneshot::Sender<()>> {
        let waits = self.pending.get_mut(group)?;
        let sender = waits.remove(&id);
        if waits.is_empty() {
            self.pending.remove(group);
        }
        sender
    }
}

/// Awaitable timed gate keyed by group.
///
/// Cheap to clone; clones share the same registry.
pub struct DelayService<G = DelayGroup> {
    registry: Arc<Mutex<Registry<G>>>,
}

impl<G> Clone for DelayService<G> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<G> Default for DelayService<G>
where
    G: Copy + Eq + Hash + Debug + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Removes the registration when the wait finishes for any reason.
struct Registration<G: Eq + Hash> {
    registry: Arc<Mutex<Registry<G>>>,
    group: G,
    id: u64,
}

impl<G: Eq + Hash> Drop for Registration<G> {
    fn drop(&mut self) {
        lock(&self.registry).remove(&self.group, self.id);
    }
}

fn lock<G>(registry: &Mutex<Registry<G>>) -> MutexGuard<'_, Registry<G>> {
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<G> DelayService<G>
where
    G: Copy + Eq + Hash + Debug + Send + 'static,
{
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                pending: HashMap::new(),
            })),
        }
    }

    /// Register a wait under `group` and return the future that awaits it.
    ///
    /// Registration happens here, before the first poll, so a
    /// [`cancel_group`](Self::cancel_group) issued between this call and the
    /// first `.await` still interrupts the wait.
    pub fn wait(
        &self,
        group: G,
        duration: Duration,
    ) -> impl Future<Output = Result<(), Cancelled>> + Send + 'static {
        let (tx, rx) = oneshot::channel();
        let id = {
            let mut registry = lock(&self.registry);
            let id = registry.next_id;
            registry.next_id += 1;
            registry.pending.entry(group).or_default().insert(id, tx);
            id
        };

        let registration = Registration {
            registry: Arc::clone(&self.registry),
            group,
            id,
        };

        async move {
            let _registration = registration;
            tokio::select! {
                biased;
                _ = rx => {
                    tracing::debug!(?group, id, "delay cancelled");
                    Err(Cancelled)
                }
                _ = tokio::time::sleep(duration) => Ok(()),
            }
        }
    }

    /// Interrupt every wait currently pending under `group`.
    ///
    /// Returns the number of waits interrupted.
    pub fn cancel_group(&self, group: G) -> usize {
        let waits = lock(&self.registry).pending.remove(&group);
        let Some(waits) = waits else {
            return 0;
        };

        let count = waits.len();
        for (_, tx) in waits {
            let _ = tx.send(());
        }
        tracing::debug!(?group, count, "delay group cancelled");
        count
    }

    /// Number of waits pending under `group`.
    pub fn pending(&self, group: G) -> usize {
        lock(&self.registry)
            .pending
            .get(&group)
            .map_or(0, HashMap::len)
    }

    pub fn has_pending(&self, group: G) -> bool {
        self.pending(group) > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_pending, assert_ready_eq, task};

    #[tokio::test(start_paused = true)]
    async fn test_wait_completes_after_duration() {
        let delays: DelayService = DelayService::new();
        let wait = delays.wait(DelayGroup::BoardMutation, Duration::from_millis(100));
        assert_eq!(delays.pending(DelayGroup::BoardMutation), 1);

        assert_eq!(wait.await, Ok(()));
        assert_eq!(delays.pending(DelayGroup::BoardMutation), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_is_pending_until_elapsed() {
        let delays: DelayService = DelayService::new();
        let mut wait = task::spawn(delays.wait(DelayGroup::BoardMutation, Duration::from_millis(100)));

        assert_pending!(wait.poll());
        tokio::time::advance(Duration::from_millis(50)).await;
        assert_pending!(wait.poll());
        tokio::time::advance(Duration::from_millis(60)).await;
        assert_ready_eq!(wait.poll(), Ok(()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_every_wait_once() {
        let delays: DelayService<&'static str> = DelayService::new();
        let a = delays.wait("moves", Duration::from_secs(1));
        let b = delays.wait("moves", Duration::from_secs(1));
        let other = delays.wait("decor", Duration::from_millis(10));

        assert_eq!(delays.cancel_group("moves"), 2);
        assert_eq!(delays.cancel_group("moves"), 0);

        assert_eq!(a.await, Err(Cancelled));
        assert_eq!(b.await, Err(Cancelled));
        assert_eq!(other.await, Ok(()));
        assert!(!delays.has_pending("moves"));
        assert!(!delays.has_pending("decor"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_first_poll() {
        let delays: DelayService = DelayService::new();
        let wait = delays.wait(DelayGroup::BoardMutation, Duration::from_secs(5));
        delays.cancel_group(DelayGroup::BoardMutation);
        assert_eq!(wait.await, Err(Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_wait_is_not_cancelled_later() {
        let delays: DelayService = DelayService::new();
        delays
            .wait(DelayGroup::BoardMutation, Duration::from_millis(1))
            .await
            .unwrap();
        assert_eq!(delays.cancel_group(DelayGroup::BoardMutation), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_wait_unregisters() {
        let delays: DelayService = DelayService::new();
        let wait = delays.wait(DelayGroup::BoardMutation, Duration::from_secs(1));
        assert!(delays.has_pending(DelayGroup::BoardMutation));
        drop(wait);
        assert!(!delays.has_pending(DelayGroup::BoardMutation));
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_waiters_observe_cancel() {
        let delays: DelayService = DelayService::new();
        let handles: Vec<_> = (0..4)
            .map(|_| tokio::spawn(delays.wait(DelayGroup::BoardMutation, Duration::from_secs(1))))
            .collect();

        assert_eq!(delays.cancel_group(DelayGroup::BoardMutation), 4);
        for h in handles {
            assert_eq!(h.await.unwrap(), Err(Cancelled));
        }
    }
}
