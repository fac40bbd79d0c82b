//! Write-through persistence seam.
//!
//! Raid execution mutates in-memory state first and then hands durable
//! facts (loyalty totals, credit balances, full rebel records) to a
//! [`Persistence`] implementation. The interface is a required
//! capability: callers always supply one, and environments without a
//! backing store use [`NoOpPersistence`] rather than a missing hook.
//! Persistence failures are surfaced to the caller, which logs and
//! continues; a write-through miss never rolls back gameplay state.

use uprising_types::{Rebel, UserId};

/// Error from a persistence backend.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// The backend rejected or failed the write.
    #[error("persistence backend failure: {context}")]
    Backend {
        /// What was being written when the backend failed.
        context: String,
    },
}

/// Durable storage for rebel progression earned during raids.
pub trait Persistence: Send + Sync {
    /// Record loyalty earned by a rebel.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Backend`] if the write fails.
    fn add_loyalty(&self, user: &UserId, amount: u32) -> Result<(), PersistenceError>;

    /// Record credits earned by a rebel.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Backend`] if the write fails.
    fn add_credits(&self, user: &UserId, amount: u64) -> Result<(), PersistenceError>;

    /// Persist a full rebel record, typically after a raid resolves or
    /// before an inactivity eviction.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Backend`] if the write fails.
    fn persist_rebel(&self, rebel: &Rebel) -> Result<(), PersistenceError>;
}

/// A persistence implementation that discards every write.
///
/// Used in tests and in deployments that run purely in memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpPersistence;

impl Persistence for NoOpPersistence {
    fn add_loyalty(&self, _user: &UserId, _amount: u32) -> Result<(), PersistenceError> {
        Ok(())
    }

    fn add_credits(&self, _user: &UserId, _amount: u64) -> Result<(), PersistenceError> {
        Ok(())
    }

    fn persist_rebel(&self, _rebel: &Rebel) -> Result<(), PersistenceError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use uprising_types::RebelClass;

    #[test]
    fn noop_accepts_everything() {
        let store = NoOpPersistence;
        let user = UserId::from("u1");
        store.add_loyalty(&user, 10).unwrap();
        store.add_credits(&user, 500).unwrap();
        store
            .persist_rebel(&Rebel::new(user, "Nyx", RebelClass::Freerunner))
            .unwrap();
    }
}
