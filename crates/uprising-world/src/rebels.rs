//! Rebel registry: character records created on first interaction.
//!
//! The registry enforces user-id uniqueness, tracks activity for the
//! inactivity prune, and owns the small mutators (energy, loyalty, damage
//! tallies) so callers never reach into the record with unchecked math.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uprising_types::{Rebel, UserId};

use crate::error::WorldError;

/// All known rebels, indexed by external user id.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RebelRegistry {
    rebels: BTreeMap<UserId, Rebel>,
}

impl RebelRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            rebels: BTreeMap::new(),
        }
    }

    /// Register a new rebel.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateRebel`] if the user id is taken.
    pub fn register(&mut self, rebel: Rebel) -> Result<(), WorldError> {
        let id = rebel.user_id.clone();
        if self.rebels.contains_key(&id) {
            return Err(WorldError::DuplicateRebel(id));
        }
        info!(user = %id, class = ?rebel.class, "Rebel registered");
        self.rebels.insert(id, rebel);
        Ok(())
    }

    /// Get an immutable reference to a rebel.
    pub fn get(&self, user: &UserId) -> Option<&Rebel> {
        self.rebels.get(user)
    }

    /// Get a mutable reference to a rebel.
    pub fn get_mut(&mut self, user: &UserId) -> Option<&mut Rebel> {
        self.rebels.get_mut(user)
    }

    /// Look up a rebel, erroring when absent.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::RebelNotFound`] if the user id is unknown.
    pub fn require(&self, user: &UserId) -> Result<&Rebel, WorldError> {
        self.rebels
            .get(user)
            .ok_or_else(|| WorldError::RebelNotFound(user.clone()))
    }

    /// Iterate over all registered rebels.
    pub fn iter(&self) -> impl Iterator<Item = &Rebel> {
        self.rebels.values()
    }

    /// Number of registered rebels.
    pub fn len(&self) -> usize {
        self.rebels.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.rebels.is_empty()
    }

    /// Refresh a rebel's `last_active` timestamp.
    pub fn touch(&mut self, user: &UserId, now: DateTime<Utc>) {
        if let Some(rebel) = self.rebels.get_mut(user) {
            rebel.last_active = now;
        }
    }

    /// Deduct energy from a rebel, saturating at zero.
    ///
    /// Returns the rebel's remaining energy.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::RebelNotFound`] if the user id is unknown.
    pub fn spend_energy(&mut self, user: &UserId, cost: u32) -> Result<u32, WorldError> {
        let rebel = self
            .rebels
            .get_mut(user)
            .ok_or_else(|| WorldError::RebelNotFound(user.clone()))?;
        rebel.energy = rebel.energy.saturating_sub(cost);
        debug!(user = %user, cost, energy = rebel.energy, "Energy spent");
        Ok(rebel.energy)
    }

    /// Restore energy to a rebel, clamped to their ceiling.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::RebelNotFound`] if the user id is unknown.
    pub fn restore_energy(&mut self, user: &UserId, amount: u32) -> Result<u32, WorldError> {
        let rebel = self
            .rebels
            .get_mut(user)
            .ok_or_else(|| WorldError::RebelNotFound(user.clone()))?;
        rebel.energy = rebel.energy.saturating_add(amount).min(rebel.max_energy);
        Ok(rebel.energy)
    }

    /// Add to a rebel's loyalty score, saturating at the `u32` ceiling.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::RebelNotFound`] if the user id is unknown.
    pub fn add_loyalty(&mut self, user: &UserId, amount: u32) -> Result<u32, WorldError> {
        let rebel = self
            .rebels
            .get_mut(user)
            .ok_or_else(|| WorldError::RebelNotFound(user.clone()))?;
        rebel.loyalty_score = rebel.loyalty_score.saturating_add(amount);
        Ok(rebel.loyalty_score)
    }

    /// Add to a rebel's lifetime corporate damage tally.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::RebelNotFound`] if the user id is unknown.
    pub fn record_damage(&mut self, user: &UserId, damage: u64) -> Result<u64, WorldError> {
        let rebel = self
            .rebels
            .get_mut(user)
            .ok_or_else(|| WorldError::RebelNotFound(user.clone()))?;
        rebel.corporate_damage = rebel.corporate_damage.saturating_add(damage);
        Ok(rebel.corporate_damage)
    }

    /// Evict rebels whose `last_active` is older than `cutoff`.
    ///
    /// Returns the evicted user ids. Eviction is garbage collection, not
    /// deletion of record -- the write-through persistence layer retains
    /// whatever it has been handed.
    pub fn prune_inactive(&mut self, cutoff: DateTime<Utc>) -> Vec<UserId> {
        let evicted: Vec<UserId> = self
            .rebels
            .iter()
            .filter(|(_, rebel)| rebel.last_active < cutoff)
            .map(|(id, _)| id.clone())
            .collect();

        for id in &evicted {
            self.rebels.remove(id);
        }

        if !evicted.is_empty() {
            info!(count = evicted.len(), "Pruned inactive rebels");
        }

        evicted
    }
}

impl Default for RebelRegistry {
    fn default() -> Self {
        Self::new()
    }
}
