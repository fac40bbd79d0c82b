//! Cancellable countdown timers.
//!
//! Every running countdown owns a set of spawned tasks: one execution
//! task that fires the raid engine at zero, plus log-only notification
//! tasks. The [`TimerRegistry`] maps each party to its task handles so
//! an abort or disband can cancel the pending work outright instead of
//! relying solely on the fire-time state guard.

use std::collections::BTreeMap;

use tokio::task::JoinHandle;
use tracing::debug;
use uprising_types::PartyId;

/// The spawned tasks backing one party's countdown.
#[derive(Debug)]
pub struct CountdownTimers {
    execute: JoinHandle<()>,
    notifications: Vec<JoinHandle<()>>,
}

impl CountdownTimers {
    /// Bundle an execution task with its notification tasks.
    pub const fn new(execute: JoinHandle<()>, notifications: Vec<JoinHandle<()>>) -> Self {
        Self {
            execute,
            notifications,
        }
    }

    /// Bundle a single task, such as the post-execution cleanup timer.
    pub const fn single(task: JoinHandle<()>) -> Self {
        Self {
            execute: task,
            notifications: Vec::new(),
        }
    }

    fn abort_all(&self) {
        self.execute.abort();
        for handle in &self.notifications {
            handle.abort();
        }
    }
}

/// Pending countdown tasks per party.
///
/// Registering a new set for a party aborts whatever was registered
/// before, so a party never has two live countdowns.
#[derive(Debug, Default)]
pub struct TimerRegistry {
    timers: BTreeMap<PartyId, CountdownTimers>,
}

impl TimerRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            timers: BTreeMap::new(),
        }
    }

    /// Register the timers for a party, aborting any previous set.
    pub fn register(&mut self, party: PartyId, timers: CountdownTimers) {
        if let Some(previous) = self.timers.insert(party, timers) {
            previous.abort_all();
            debug!(party = %party, "Replaced pending timers");
        }
    }

    /// Abort and remove a party's pending timers.
    ///
    /// Returns false if the party had none.
    pub fn cancel(&mut self, party: PartyId) -> bool {
        match self.timers.remove(&party) {
            Some(timers) => {
                timers.abort_all();
                debug!(party = %party, "Cancelled pending timers");
                true
            }
            None => false,
        }
    }

    /// Drop a party's entry without aborting.
    ///
    /// Used by a finished task removing its own bookkeeping.
    pub fn discard(&mut self, party: PartyId) {
        let _ = self.timers.remove(&party);
    }

    /// Whether a party has pending timers.
    pub fn contains(&self, party: PartyId) -> bool {
        self.timers.contains_key(&party)
    }

    /// Number of parties with pending timers.
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    /// Whether no timers are pending.
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use super::*;

    fn flag_after(delay: Duration) -> (Arc<AtomicBool>, JoinHandle<()>) {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            flag.store(true, Ordering::SeqCst);
        });
        (fired, handle)
    }

    #[tokio::test(start_paused = true)]
    async fn uncancelled_timer_fires() {
        let (fired, handle) = flag_after(Duration::from_secs(30));
        let mut registry = TimerRegistry::new();
        registry.register(PartyId::new(), CountdownTimers::single(handle));

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert!(fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_aborts_pending_tasks() {
        let (fired, execute) = flag_after(Duration::from_secs(30));
        let (notified, notify) = flag_after(Duration::from_secs(20));
        let mut registry = TimerRegistry::new();
        let party = PartyId::new();
        registry.register(party, CountdownTimers::new(execute, vec![notify]));

        assert!(registry.cancel(party));
        assert!(!registry.contains(party));

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(!fired.load(Ordering::SeqCst));
        assert!(!notified.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn register_replaces_and_aborts_previous() {
        let (first_fired, first) = flag_after(Duration::from_secs(10));
        let (second_fired, second) = flag_after(Duration::from_secs(10));
        let mut registry = TimerRegistry::new();
        let party = PartyId::new();
        registry.register(party, CountdownTimers::single(first));
        registry.register(party, CountdownTimers::single(second));
        assert_eq!(registry.len(), 1);

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert!(!first_fired.load(Ordering::SeqCst));
        assert!(second_fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_unknown_party_is_false() {
        let mut registry = TimerRegistry::new();
        assert!(!registry.cancel(PartyId::new()));
        assert!(registry.is_empty());
    }
}
